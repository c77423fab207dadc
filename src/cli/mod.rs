//! Command Assembler
//!
//! Features declare named [`Command`]s; [`assemble`] wraps them, together
//! with the built-in `start` command, into one [`EntryPoint`].

pub mod assembler;
pub mod command;

pub use assembler::{assemble, EntryPoint, OnListen, EXIT_FAILURE, EXIT_OK, EXIT_USAGE};
pub use command::{ArgSpec, Command, CommandContext, CommandFuture, START_COMMAND};
