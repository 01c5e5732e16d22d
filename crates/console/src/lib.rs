//! `backoffice-console`: command-line front end over the back-office API.
//!
//! The binary is a thin wrapper: argument parsing lives in [`cli`], wiring in
//! [`context`], and every command writes to a caller-supplied writer so the
//! commands can be driven from tests.

pub mod cli;
pub mod commands;
pub mod context;
pub mod screens;

pub use cli::{Cli, Command, ListArgs, ResourceKind};
pub use commands::{Confirm, StdinConfirm, run};
pub use context::{Console, ConsoleNotifier};
pub use screens::Screen;
