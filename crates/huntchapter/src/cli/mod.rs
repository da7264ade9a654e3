//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the huntchapter binary.

mod commands;
mod play;
mod server;

pub use commands::{Cli, Commands, PlayArgs};
pub use play::play;
pub use server::{list_sessions, serve};
