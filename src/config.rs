use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::viewport::DEFAULT_ZOOM_SENSITIVITY;

pub const ZOOM_SENSITIVITY_ENV: &str = "REGIONVIEW_ZOOM_SENSITIVITY";

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted UI/application settings for regionview.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub zoom_sensitivity: Option<f32>,
    pub export_dir: Option<PathBuf>,
    pub png_compression: Option<u8>,
    pub open_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("regionview").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!("ignoring malformed {}: {}", path.display(), err);
            Self::default()
        })
    }

    /// Writes config to disk. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match toml::to_string_pretty(self) {
            Ok(s) => {
                if let Err(err) = std::fs::write(&path, s) {
                    tracing::warn!("could not save {}: {}", path.display(), err);
                }
            }
            Err(err) => tracing::warn!("could not serialize config: {}", err),
        }
    }

    pub fn png_compression(&self) -> u8 {
        self.png_compression.unwrap_or(6).min(9)
    }

    /// Directory exports go to unless the user types another path.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(default_export_dir)
    }
}

fn default_export_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Exports")
}

/// A usable wheel ratio: finite and strictly above 1.
pub fn parse_zoom_sensitivity(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 1.0)
}

/// Environment first, then the config file, then the built-in default.
pub fn resolve_zoom_sensitivity(config: &AppConfig) -> f32 {
    if let Ok(raw) = std::env::var(ZOOM_SENSITIVITY_ENV) {
        if let Some(v) = parse_zoom_sensitivity(&raw) {
            return v;
        }
        tracing::warn!("{}={:?} is not a usable zoom ratio", ZOOM_SENSITIVITY_ENV, raw);
    }
    config
        .zoom_sensitivity
        .filter(|v| v.is_finite() && *v > 1.0)
        .unwrap_or(DEFAULT_ZOOM_SENSITIVITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_zoom_sensitivity_accepts_ratios_above_one() {
        assert_eq!(parse_zoom_sensitivity("1.25"), Some(1.25));
        assert_eq!(parse_zoom_sensitivity(" 2 "), Some(2.0));
    }

    #[test]
    fn parse_zoom_sensitivity_rejects_unusable_values() {
        assert_eq!(parse_zoom_sensitivity("1.0"), None);
        assert_eq!(parse_zoom_sensitivity("0.5"), None);
        assert_eq!(parse_zoom_sensitivity("inf"), None);
        assert_eq!(parse_zoom_sensitivity("fast"), None);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig {
            window_width: Some(1280.0),
            zoom_sensitivity: Some(1.2),
            export_dir: Some(PathBuf::from("/tmp/out")),
            png_compression: Some(9),
            ..AppConfig::default()
        };
        let text = toml::to_string_pretty(&config).expect("config serializes");
        let back: AppConfig = toml::from_str(&text).expect("config parses");
        assert_eq!(back.window_width, Some(1280.0));
        assert_eq!(back.zoom_sensitivity, Some(1.2));
        assert_eq!(back.export_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(back.window_height, None);
    }

    #[test]
    fn missing_fields_parse_as_defaults() {
        let config: AppConfig = toml::from_str("png_compression = 42\n").expect("partial config parses");
        assert_eq!(config.png_compression(), 9);
        assert_eq!(config.zoom_sensitivity, None);
    }
}
