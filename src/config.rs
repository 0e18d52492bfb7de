use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "INDICATOR_DASHBOARD_CONFIG";

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Period columns of the source layout, in source column order.
pub const DEFAULT_PERIOD_COLUMNS: [&str; 8] = [
    "2022_1", "2022_2", "2023_1", "2023_2", "2024_1", "2024_2", "2025_1", "2025_2",
];

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// How a source table is located and laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Title rows to ignore before the header row.
    pub skip_rows: usize,
    /// Sheet to read from a multi-sheet workbook.
    pub sheet_selector: Option<String>,
    /// Canonical `{year}_{half}` tokens for the value columns.
    pub period_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 2,
            sheet_selector: None,
            period_columns: DEFAULT_PERIOD_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub load: LoadOptions,
    /// How many `%` indicators are pre-selected in the percentage view.
    pub default_percent_indicators: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            default_percent_indicators: 3,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the configuration from `$INDICATOR_DASHBOARD_CONFIG`, then
    /// `./dashboard.json`, then built-in defaults.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(&PathBuf::from(path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }
}
