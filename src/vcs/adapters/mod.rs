//! Adapter implementations for remote repository and working-copy ports.

pub mod memory;

mod git_cli;

pub use git_cli::GitCli;
