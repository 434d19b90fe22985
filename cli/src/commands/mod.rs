//! Subcommand implementations for the Palabra CLI.

pub mod completions;
pub mod upload;

pub use completions::generate_completions;
pub use upload::run_upload;
