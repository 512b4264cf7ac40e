use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::LayerKind;

pub const MIN_FRAME_COUNT: u32 = 50;
pub const MAX_FRAME_COUNT: u32 = 250;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 2000;
pub const MIN_OPACITY: f32 = 0.1;
pub const MAX_OPACITY: f32 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("frame_count {0} outside {MIN_FRAME_COUNT}..={MAX_FRAME_COUNT}")]
    FrameCountOutOfRange(u32),
    #[error("interval_ms {0} outside {MIN_INTERVAL_MS}..={MAX_INTERVAL_MS}")]
    IntervalOutOfRange(u64),
    #[error("opacity {0} outside {MIN_OPACITY}..={MAX_OPACITY}")]
    OpacityOutOfRange(f32),
    #[error("unknown layer category '{0}'")]
    UnknownCategory(String),
}

#[derive(Debug, Deserialize, Resource)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub paths: PathConfig,
    pub saves: SaveConfig,
    #[serde(default)]
    pub map: MapOptions,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PathConfig {
    pub stations_file: String,
    pub feed_directory: String,
    /// Asset-relative image ref pattern; `{timestamp}` is replaced per frame.
    pub radar_ref_template: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveConfig {
    pub directory: String,
    pub theme_file: String,
    pub settings_file: String,
}

/// The recognized engine options. Out-of-range values are rejected one field
/// at a time: the offending field falls back to its previous valid value
/// (the default, at load time) while the rest of the block applies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub frame_count: u32,
    pub interval_ms: u64,
    pub opacity: f32,
    pub visible_categories: Vec<String>,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            frame_count: 100,
            interval_ms: 500,
            opacity: 0.85,
            visible_categories: vec![
                "stations".to_string(),
                "storm_cells".to_string(),
                "tornado_events".to_string(),
                "weather_markers".to_string(),
            ],
        }
    }
}

impl MapOptions {
    /// Validates against the previous valid options, keeping the prior value
    /// for every rejected field. Returns the surviving options plus every
    /// rejection, so callers can surface them.
    pub fn sanitized_against(self, prior: &MapOptions) -> (MapOptions, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let mut out = self;

        if !(MIN_FRAME_COUNT..=MAX_FRAME_COUNT).contains(&out.frame_count) {
            errors.push(ConfigError::FrameCountOutOfRange(out.frame_count));
            out.frame_count = prior.frame_count;
        }
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&out.interval_ms) {
            errors.push(ConfigError::IntervalOutOfRange(out.interval_ms));
            out.interval_ms = prior.interval_ms;
        }
        if !(MIN_OPACITY..=MAX_OPACITY).contains(&out.opacity) {
            errors.push(ConfigError::OpacityOutOfRange(out.opacity));
            out.opacity = prior.opacity;
        }

        let mut categories = Vec::new();
        for name in out.visible_categories.drain(..) {
            if LayerKind::from_name(&name).is_some() {
                categories.push(name);
            } else {
                errors.push(ConfigError::UnknownCategory(name));
            }
        }
        out.visible_categories = categories;

        (out, errors)
    }

    pub fn visible_kinds(&self) -> Vec<LayerKind> {
        self.visible_categories
            .iter()
            .filter_map(|name| LayerKind::from_name(name))
            .collect()
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        let mut config = load_config("stormscope.cfg");
        let save_path = get_save_directory(&config.saves.directory);
        if !save_path.exists() {
            fs::create_dir_all(&save_path).expect("Failed to create save directory");
        }
        config.saves.directory = save_path.into_os_string().into_string().unwrap();

        let (map, rejected) = config.map.clone().sanitized_against(&MapOptions::default());
        for error in &rejected {
            warn!("Rejected map option: {error}");
        }
        config.map = map;

        app.insert_resource(config);
    }
}

fn load_config(path: &str) -> AppConfig {
    let content = fs
        ::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read config file at: {path}"));

    serde_yaml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse YAML: {e}"))
}

fn get_save_directory(save_dir: &String) -> PathBuf {
    let mut path = dirs::config_dir().expect("Could not find local data directory");
    path.push(save_dir);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_their_own_validation() {
        let (options, errors) = MapOptions::default().sanitized_against(&MapOptions::default());
        assert!(errors.is_empty());
        assert_eq!(options.frame_count, 100);
        assert_eq!(options.interval_ms, 500);
        assert_eq!(options.visible_kinds().len(), 4);
    }

    #[test]
    fn rejected_fields_keep_the_prior_value() {
        let prior = MapOptions::default();
        let requested = MapOptions {
            frame_count: 10_000,
            interval_ms: 50,
            opacity: 0.5,
            visible_categories: vec!["storm_cells".to_string(), "billing".to_string()],
        };
        let (options, errors) = requested.sanitized_against(&prior);

        assert_eq!(options.frame_count, prior.frame_count);
        assert_eq!(options.interval_ms, prior.interval_ms);
        assert_eq!(options.opacity, 0.5);
        assert_eq!(options.visible_categories, vec!["storm_cells".to_string()]);
        assert!(errors.contains(&ConfigError::FrameCountOutOfRange(10_000)));
        assert!(errors.contains(&ConfigError::IntervalOutOfRange(50)));
        assert!(errors.contains(&ConfigError::UnknownCategory("billing".to_string())));
    }
}
