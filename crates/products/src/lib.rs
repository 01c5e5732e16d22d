//! Catalog resources: products and their customer reviews.
//!
//! Plain data as the backend serves it; the generic service/cache layers do
//! all the IO.

pub mod product;
pub mod review;

pub use product::{Product, ProductInput, ProductStatus};
pub use review::{Review, ReviewStatus};
