use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_user_id() -> String {
    "local".to_string()
}
fn default_latitude() -> f64 {
    31.9454
}
fn default_longitude() -> f64 {
    35.9284
}
fn default_calc_method() -> String {
    "MuslimWorldLeague".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_timezone_offset() -> i32 {
    180
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_classify_secs() -> u64 {
    60
}
fn default_stats_secs() -> u64 {
    30
}
fn default_double_click_ms() -> u64 {
    300
}
fn default_swipe_min_dx() -> f64 {
    100.0
}
fn default_swipe_max_dy() -> f64 {
    50.0
}
fn default_cell_width() -> f64 {
    8.0
}
fn default_cell_height() -> f64 {
    16.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            partner_id: None,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
    /// Days added to the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone_offset: default_timezone_offset(),
            hijri_offset: default_hijri_offset(),
        }
    }
}

/// Refresh cadence and gesture thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_classify_secs")]
    pub classify_interval_secs: u64,
    #[serde(default = "default_stats_secs")]
    pub stats_interval_secs: u64,
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
    #[serde(default = "default_swipe_min_dx")]
    pub swipe_min_dx: f64,
    #[serde(default = "default_swipe_max_dy")]
    pub swipe_max_dy: f64,
    /// Pixel size of one terminal cell, used to turn mouse drags into
    /// displacement.
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f64,
    #[serde(default = "default_cell_height")]
    pub cell_height_px: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            classify_interval_secs: default_classify_secs(),
            stats_interval_secs: default_stats_secs(),
            double_click_ms: default_double_click_ms(),
            swipe_min_dx: default_swipe_min_dx(),
            swipe_max_dy: default_swipe_max_dy(),
            cell_width_px: default_cell_width(),
            cell_height_px: default_cell_height(),
        }
    }
}

impl TimelineConfig {
    pub fn classify_interval(&self) -> Duration {
        Duration::from_secs(self.classify_interval_secs.max(1))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs.max(1))
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "nooruna")
            .context("Could not determine project directories")
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
        Ok(Self::data_dir()?.join("nooruna.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
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

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.user.id, "local");
        assert_eq!(config.timeline.double_click_ms, 300);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.user.id = "amina".to_string();
        config.user.partner_id = Some("yusuf".to_string());
        config.location.madhab = "Hanafi".to_string();
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[user]\nid = \"u7\"\n\n[timeline]\nswipe_min_dx = 120.0\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.user.id, "u7");
        assert_eq!(config.user.partner_id, None);
        assert_eq!(config.timeline.swipe_min_dx, 120.0);
        assert_eq!(config.timeline.swipe_max_dy, 50.0);
        assert_eq!(config.location, LocationConfig::default());
    }

    #[test]
    fn intervals_never_drop_to_zero() {
        let timeline = TimelineConfig {
            classify_interval_secs: 0,
            ..TimelineConfig::default()
        };
        assert_eq!(timeline.classify_interval(), Duration::from_secs(1));
        assert_eq!(timeline.stats_interval(), Duration::from_secs(30));
    }
}
