use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::debouncer::DEFAULT_DEBOUNCE_MS;
use crate::table::controller::{TableOptions, DEFAULT_PAGE_SIZE, DEFAULT_SERVER_MODE_THRESHOLD};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub table: TableConfig,
    pub display: DisplayConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page
    pub page_size: usize,

    /// Record count at which filtering, sorting and paging move to the server
    pub server_mode_threshold: usize,

    /// Delay before a column search is committed, in milliseconds
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show "page x of y" under each rendered page
    pub show_page_footer: bool,

    /// Text shown for null or missing cells
    pub null_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL; empty means no remote source
    pub base_url: String,

    /// Path of the paged rows endpoint
    pub page_path: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            server_mode_threshold: DEFAULT_SERVER_MODE_THRESHOLD,
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_page_footer: true,
            null_text: String::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            page_path: "/api/rows".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, creating it when missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        debug!(target: "config", "loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("fleet-table").join("config.toml"))
    }

    /// Controller options described by this config
    pub fn table_options(&self) -> TableOptions {
        TableOptions::default()
            .with_page_size(self.table.page_size)
            .with_threshold(self.table.server_mode_threshold)
            .with_debounce(Duration::from_millis(self.table.search_debounce_ms))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# fleet-table configuration file
# Location: ~/.config/fleet-table/config.toml (Linux)
#           ~/Library/Application Support/fleet-table/config.toml (macOS)
#           %APPDATA%\fleet-table\config.toml (Windows)

[table]
# Rows per page
page_size = 10

# Tables with at least this many records are filtered, sorted and paged
# by the backend instead of in memory
server_mode_threshold = 200

# Milliseconds of typing inactivity before a column search is applied
search_debounce_ms = 1000

[display]
# Show "page x of y" under each page
show_page_footer = true

# Text shown for null or missing cells
null_text = ""

[api]
# Backend base URL (leave empty to work from local files only)
base_url = ""

# Paged rows endpoint
page_path = "/api/rows"
"#
        .to_string()
    }
}
