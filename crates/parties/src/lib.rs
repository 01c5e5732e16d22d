//! Parties the back office deals with: customers (and their addresses) and suppliers.

pub mod customer;
pub mod supplier;

pub use customer::{Customer, CustomerAddress, PartyStatus};
pub use supplier::Supplier;
