use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::Color;
use crate::watermark::{
    FontFamily, Placement, PresetPosition, WatermarkStyle, CUSTOM_PLACEMENT_LABEL, MAX_FONT_SIZE,
    MAX_OPACITY, MIN_FONT_SIZE, MIN_OPACITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "aquamark";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Searched for font files before the platform font directories.
    pub font_dirs: Vec<PathBuf>,
    pub default_text: String,
    pub default_color: String,
    pub default_font_family: String,
    pub default_font_size: u32,
    pub default_opacity: f32,
    pub default_position: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let style = WatermarkStyle::default();
        Self {
            font_dirs: Vec::new(),
            default_text: style.text,
            default_color: style.color.to_hex(),
            default_font_family: style.font_family.label().to_string(),
            default_font_size: style.font_size,
            default_opacity: style.opacity,
            default_position: PresetPosition::default().label().to_string(),
        }
    }
}

impl AppConfig {
    pub fn initial_style(&self) -> WatermarkStyle {
        let fallback = WatermarkStyle::default();
        let color = self.default_color.parse::<Color>().unwrap_or_else(|err| {
            tracing::warn!(value = %self.default_color, %err, "ignoring invalid default_color");
            fallback.color
        });
        let font_family = self
            .default_font_family
            .parse::<FontFamily>()
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring invalid default_font_family");
                fallback.font_family
            });
        let opacity = if self.default_opacity.is_finite() {
            self.default_opacity.clamp(MIN_OPACITY, MAX_OPACITY)
        } else {
            fallback.opacity
        };

        WatermarkStyle {
            text: self.default_text.clone(),
            font_family,
            font_size: self.default_font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE),
            color,
            opacity,
        }
    }

    pub fn initial_placement(&self) -> Placement {
        let label = self.default_position.trim();
        if label.eq_ignore_ascii_case(CUSTOM_PLACEMENT_LABEL) {
            return Placement::Custom {
                offset_x: 0,
                offset_y: 0,
            };
        }
        match label.parse::<PresetPosition>() {
            Ok(preset) => Placement::Preset(preset),
            Err(err) => {
                tracing::warn!(%err, "ignoring invalid default_position");
                Placement::default()
            }
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
