//! User configuration, stored as `config.toml` in the OS config directory.
//!
//! Every field has a default, so a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::DEFAULT_BASE_URL;
use crate::model::timeline::{MAX_DAY_WIDTH, MIN_DAY_WIDTH};
use crate::model::WindowSpan;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "TASKLANE_API_URL";

const MAX_MONTHS: u32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub months_before: u32,
    pub months_after: u32,
    /// Pixels per calendar day.
    pub day_width: f32,
    pub row_height: f32,
    pub sidebar_width: f32,
    /// Distance of today from the left edge after the window changes.
    pub today_inset: f32,
    /// Locale for month names, e.g. `ru_RU`.
    pub locale: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            months_before: 3,
            months_after: 3,
            day_width: 24.0,
            row_height: 48.0,
            sidebar_width: 260.0,
            today_inset: 200.0,
            locale: "en_US".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Read the config file, writing a default one if it does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!(path = %path.display(), "wrote default config");
            return Ok(config);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                info!(url = %url, "api url overridden from {API_URL_ENV}");
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    /// Clamp out-of-range values, warning about each one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.months_before > MAX_MONTHS {
            warn!(value = self.months_before, "months_before too large, clamping");
            self.months_before = MAX_MONTHS;
        }
        if self.months_after > MAX_MONTHS {
            warn!(value = self.months_after, "months_after too large, clamping");
            self.months_after = MAX_MONTHS;
        }
        if self.months_before + self.months_after == 0 {
            warn!("empty day window configured, using defaults");
            self.months_before = defaults.months_before;
            self.months_after = defaults.months_after;
        }
        if !(MIN_DAY_WIDTH..=MAX_DAY_WIDTH).contains(&self.day_width) {
            warn!(value = self.day_width, "day_width out of range, clamping");
            self.day_width = if self.day_width.is_nan() {
                defaults.day_width
            } else {
                self.day_width.clamp(MIN_DAY_WIDTH, MAX_DAY_WIDTH)
            };
        }
        if self.row_height.is_nan() || self.row_height < 16.0 {
            warn!(value = self.row_height, "row_height too small, using default");
            self.row_height = defaults.row_height;
        }
        if self.sidebar_width.is_nan() || self.sidebar_width < 80.0 {
            warn!(value = self.sidebar_width, "sidebar_width too small, using default");
            self.sidebar_width = defaults.sidebar_width;
        }
        if self.today_inset.is_nan() || self.today_inset < 0.0 {
            warn!(value = self.today_inset, "negative today_inset, using default");
            self.today_inset = defaults.today_inset;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.locale.parse::<Locale>().is_err() {
            warn!(locale = %self.locale, "unknown locale, using en_US");
            self.locale = defaults.locale;
        }
        self
    }

    pub fn span(&self) -> WindowSpan {
        WindowSpan {
            months_before: self.months_before,
            months_after: self.months_after,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale.parse().unwrap_or(Locale::en_US)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the app keeps its files.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_file: PathBuf,
    pub tokens_file: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("", "", "tasklane") {
            Self {
                config_file: dirs.config_dir().join("config.toml"),
                tokens_file: dirs.data_dir().join("tokens.json"),
            }
        } else {
            // Fallback
            let dir = PathBuf::from(".");
            Self {
                config_file: dir.join("config.toml"),
                tokens_file: dir.join("tokens.json"),
            }
        }
    }
}
