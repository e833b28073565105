//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use servo_lock::TesterConfig;
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tester: TesterConfig,
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interface: Option<String>,
    pub transient: Option<i64>,
    pub stable: Option<i64>,
}

impl AppConfig {
    /// Apply command-line overrides on top of file or default values
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let mut tester = self.tester;
        if let Some(interface) = overrides.interface {
            tester = tester.with_interface(interface);
        }
        if let Some(transient) = overrides.transient {
            tester = tester.with_transient_secs(transient);
        }
        if let Some(stable) = overrides.stable {
            tester = tester.with_stable_ns(stable);
        }
        self.tester = tester;
        self
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
