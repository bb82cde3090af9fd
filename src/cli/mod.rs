//! Command-line interface.

mod commands;
mod interactive;

pub use commands::{Cli, LogLevel};
pub use interactive::prompt_for_token;
