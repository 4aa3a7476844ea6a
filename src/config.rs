use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{Result, bail};
use serde::Deserialize;

use crate::system::category::CategoryRule;
use crate::system::collector::CollectorOptions;
use crate::system::cpu::DEFAULT_MAX_PERCENT;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub logging: LoggingConfig,
    pub categories: CategoriesConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    pub top_n: usize,
    pub min_wall_delta_ms: u64,
    pub max_cpu_percent: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            interval_ms: 3000,
            top_n: 5,
            min_wall_delta_ms: 100,
            max_cpu_percent: DEFAULT_MAX_PERCENT,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub rules: Vec<CategoryRule>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval_ms == 0 {
            bail!("sampling.interval_ms must be greater than 0");
        }
        if self.sampling.top_n == 0 {
            bail!("sampling.top_n must be greater than 0");
        }
        let max = self.sampling.max_cpu_percent;
        if !max.is_finite() || max <= 0.0 || max > DEFAULT_MAX_PERCENT {
            bail!(
                "sampling.max_cpu_percent must be in (0, {DEFAULT_MAX_PERCENT}], got {max}"
            );
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.sampling.interval_ms)
    }

    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            top_n: self.sampling.top_n,
            min_wall_delta: Duration::from_millis(self.sampling.min_wall_delta_ms),
            max_cpu_percent: self.sampling.max_cpu_percent,
            category_rules: self.categories.rules.clone(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procscope").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

/// Unreadable or invalid files fall back to defaults; logging is not up yet,
/// so the reason goes to stderr.
pub fn load_config_from_path(path: &Path) -> Config {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return Config::default(),
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("procscope: ignoring invalid config {}: {err}", path.display());
            Config::default()
        }
    }
}
