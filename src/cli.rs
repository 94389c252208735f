use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sow_studio_llm::ChatMode;

#[derive(Parser)]
#[command(name = "sow-studio", about = "Streaming SOW generation for AnythingLLM", version)]
pub struct Cli {
    /// Config file (defaults to ~/.sow-studio/config.json)
    #[arg(long, global = true, env = "SOW_STUDIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a SOW and print its prose and pricing
    Generate {
        #[arg(long, short)]
        workspace: Option<String>,
        #[arg(long)]
        thread: Option<String>,
        /// chat or query
        #[arg(long)]
        mode: Option<ChatMode>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the pricing document only, as JSON
        #[arg(long)]
        json: bool,
        message: String,
    },
    /// Extract pricing from a saved response (`-` reads stdin)
    Extract {
        input: String,
    },
    /// Render a rate card JSON file as markdown
    RateCard {
        path: PathBuf,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}
