// SOW Studio - CLI Entry Point

mod cli;

use anyhow::Context;
use clap::Parser;
use sow_studio::commands::{self, GenerateArgs};
use sow_studio::services::generation::GenerationOutcome;
use sow_studio::storage::config::ConfigService;
use sow_studio_core::finance::format_financial_breakdown;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;
    let config = service.effective_config();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("sow-studio v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Generate {
            workspace,
            thread,
            mode,
            timeout,
            json,
            message,
        } => {
            let args = GenerateArgs {
                workspace,
                thread,
                mode,
                timeout_secs: timeout,
                message,
            };
            let outcome = commands::run_generate(&config, args).await?;
            print_outcome(&outcome, json)?;
        }
        Command::Extract { input } => {
            let text = commands::read_input(&input)
                .with_context(|| format!("failed to read {}", input))?;
            let report = commands::run_extract(&text);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::RateCard { path } => {
            println!("{}", commands::render_rate_card(&path)?);
        }
        Command::Config { action } => match action {
            ConfigAction::Show => println!("{}", commands::show_config(&service)?),
            ConfigAction::Path => println!("{}", commands::config_path_display(&service)),
        },
    }

    Ok(())
}

fn print_outcome(outcome: &GenerationOutcome, json_only: bool) -> anyhow::Result<()> {
    if json_only {
        println!("{}", serde_json::to_string_pretty(&outcome.document)?);
        return Ok(());
    }

    println!("{}", outcome.prose.trim());
    let Some(document) = &outcome.document else {
        println!("\n(no structured pricing found)");
        return Ok(());
    };

    println!("\n--- Pricing ({} revision(s)) ---", outcome.candidate_count);
    println!("{}", serde_json::to_string_pretty(document)?);

    let breakdown = format_financial_breakdown(&document.breakdown());
    println!("\nRecomputed from role rows:");
    println!("  Subtotal:       {}", breakdown.subtotal);
    println!("  Discount:       {}", breakdown.discount);
    println!("  After discount: {}", breakdown.subtotal_after_discount);
    println!("  GST:            {}", breakdown.gst);
    println!("  Total:          {}", breakdown.grand_total);
    if let Some(note) = &breakdown.rounding_note {
        println!("  {}", note);
    }

    for unknown in &outcome.unknown_roles {
        println!(
            "  ! '{}' (scope {}) is not on the rate card",
            unknown.role, unknown.scope_name
        );
    }
    Ok(())
}
