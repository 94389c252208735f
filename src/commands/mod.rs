//! Commands
//!
//! Command handlers behind the `sow-studio` CLI. Each handler returns data;
//! printing is left to the binary.

pub mod config;
pub mod extract;
pub mod generate;
pub mod rate_card;

pub use config::{config_path_display, show_config};
pub use extract::{read_input, run_extract, ExtractReport};
pub use generate::{run_generate, GenerateArgs};
pub use rate_card::{load_rate_card, render_rate_card};
