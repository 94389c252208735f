//! Config Commands

use serde_json::json;

use crate::storage::config::ConfigService;
use crate::utils::error::AppResult;

/// Effective configuration as pretty JSON. The API key is reported only as
/// present or absent.
pub fn show_config(service: &ConfigService) -> AppResult<String> {
    let config = service.effective_config();
    let mut value = serde_json::to_value(&config)?;
    value["api_key_configured"] = json!(config.api_key.is_some());
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn config_path_display(service: &ConfigService) -> String {
    service.path().display().to_string()
}
