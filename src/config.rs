use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    pub scrape_results_path: String,
    /// When set, the scrape results are also dumped here before reconciling.
    #[serde(default)]
    pub export_path: Option<String>,
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,
}

fn default_report_limit() -> usize {
    5
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
