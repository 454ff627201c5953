//! CLI module
//!
//! Command-line interface for paging through views.
//!
//! # Commands
//!
//! - `query` - Page through a view, printing rows as they arrive
//! - `compile` - Print the query string a set of options compiles to

mod commands;
mod runner;

pub use commands::{Cli, Commands, ViewArgs};
pub use runner::Runner;
