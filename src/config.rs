use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "EQUALIZE_CONFIG";

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "equalize.json";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// User-editable settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV loaded at start-up.
    pub dataset_path: PathBuf,
    /// Level colours as hex, ordered Very High, High, Medium, Low.
    pub level_colors: [String; 4],
    /// Colour of ISO nodes in the network graph.
    pub network_accent: String,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Query pre-filled in the data table.
    pub default_query: String,
    /// Rows sampled for the network graph.
    pub network_sample_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/Gender_Inequality_Index.csv"),
            level_colors: [
                "#39B5E0".into(),
                "#FB2576".into(),
                "#C9F4AA".into(),
                "#F5EA5A".into(),
            ],
            network_accent: "#EA168E".into(),
            window_size: [1200.0, 800.0],
            default_query: "ISO in ['ISL','SWE'] or 0.05 > GII > 0.01".into(),
            network_sample_size: 15,
        }
    }
}

impl AppConfig {
    /// Load from `$EQUALIZE_CONFIG` or `./equalize.json`; defaults when absent.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        if !path.exists() {
            log::info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "dataset_path": "other.csv", "network_sample_size": 5 }"#)
                .unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("other.csv"));
        assert_eq!(config.network_sample_size, 5);
        assert_eq!(config.level_colors, AppConfig::default().level_colors);
        assert_eq!(config.default_query, AppConfig::default().default_query);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let path = std::env::temp_dir().join(format!("equalize-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("parsing configuration"));
    }
}
