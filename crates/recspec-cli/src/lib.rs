//! Library half of the `recspec` command-line host: everything `main.rs`
//! needs to turn parsed arguments into a batch run and rendered output.
//!
//! Splitting the command bodies out of `main.rs` into this library crate
//! keeps them unit-testable without spawning a process.

pub mod cli_args;
pub mod input;
pub mod progress;
pub mod render;
