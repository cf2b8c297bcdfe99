//! A tiny interactive shell with pipelines and cloud-storage builtins.
//!
//! This crate provides a line-oriented command interpreter: input lines are
//! split into commands separated by `;` (sequential) or `|` (piped), external
//! programs are spawned with their standard streams wired through OS pipes,
//! and a small set of builtins (`cd`, `quit`, and the remote-storage verbs)
//! run synchronously inside the interpreter itself. The storage side of the
//! remote protocol lives in [`server`] and is shipped as a second binary.
//!
//! The main entry point is [`Interpreter`], which owns the environment and
//! the storage session and drives the read-eval-print loop. The public
//! modules [`parser`] and [`command`] expose the parsing layer for embedding
//! and testing.

mod builtin;
pub mod command;
pub mod env;
mod executor;
mod interpreter;
pub mod parser;
pub mod protocol;
pub mod remote;
pub mod server;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
