//! Command line interface module
//!
//! Argument parsing and the runner that drives the library against a live cluster.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
