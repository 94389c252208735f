//! Rate Card Command

use std::path::Path;

use sow_studio_core::rate_card::RateCard;

use crate::utils::error::AppResult;

/// Load a rate card JSON file.
pub fn load_rate_card(path: &Path) -> AppResult<RateCard> {
    let content = std::fs::read_to_string(path)?;
    Ok(RateCard::from_json(&content)?)
}

/// Render the rate card at `path` as prompt markdown, versioned with today's date.
pub fn render_rate_card(path: &Path) -> AppResult<String> {
    let card = load_rate_card(path)?;
    let version = chrono::Local::now().format("%Y-%m-%d").to_string();
    tracing::debug!("[RateCard] Rendering {} roles from {}", card.len(), path.display());
    Ok(card.to_markdown(&version))
}
