use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "palabra")]
#[command(about = "Upload books to Palabra", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a book to the ingestion API
    Upload(UploadArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct UploadArgs {
    /// Book file to upload
    pub file: PathBuf,

    /// API base URL (defaults to $PALABRA_API_URL, then http://localhost:4000)
    #[arg(long)]
    pub api_url: Option<String>,

    /// User the book belongs to
    #[arg(long, default_value = "1")]
    pub user_id: String,

    /// Language of the book
    #[arg(long, short = 'l', default_value = "es")]
    pub language: String,
}
