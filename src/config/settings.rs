use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::prayer_times::{AsrSchool, FALLBACK_PLACE_NAME};

fn default_location_name() -> String {
    FALLBACK_PLACE_NAME.to_string()
}
fn default_calc_method() -> u8 {
    1
}
fn default_timezone_offset() -> i32 {
    330
}
fn default_api_base_url() -> String {
    "https://api.aladhan.com".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_tick_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    /// Unset means "unknown"; the fallback position is used until both are set.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingProvider {
    #[default]
    AlAdhan,
    Offline,
}

impl std::str::FromStr for TimingProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aladhan" | "api" => Ok(TimingProvider::AlAdhan),
            "offline" | "local" => Ok(TimingProvider::Offline),
            _ => Err(anyhow::anyhow!("Unknown timing source: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// AlAdhan method id.
    #[serde(default = "default_calc_method")]
    pub method: u8,
    #[serde(default)]
    pub asr_school: AsrSchool,
    #[serde(default)]
    pub source: TimingProvider,
    /// Minutes east of UTC, used by the offline calculator.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            method: default_calc_method(),
            asr_school: AsrSchool::default(),
            source: TimingProvider::default(),
            timezone_offset: default_timezone_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub selected_masjid: Option<String>,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
    #[serde(default)]
    pub clock_24h: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            selected_masjid: None,
            hijri_offset: default_hijri_offset(),
            clock_24h: false,
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub calculation: CalculationConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "miqat").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
