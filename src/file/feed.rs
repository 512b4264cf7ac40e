use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::data::{
    FrameDescriptor, GeoBounds, Station, StormCell, TornadoEvent, WeatherMarker,
};
use crate::file::config::{MAX_FRAME_COUNT, MIN_FRAME_COUNT};

/// Radar composites are published on a ten minute cadence.
pub const FRAME_SPACING_MS: i64 = 10 * 60 * 1000;
/// Half-width of the viewport when locked to a single station.
pub const STATION_HALF_SPAN_DEG: f64 = 2.0;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("I/O error while reading feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse feed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No station with id '{0}' in the catalog")]
    UnknownStation(String),
}

pub fn clamp_frame_count(requested: u32) -> u32 {
    requested.clamp(MIN_FRAME_COUNT, MAX_FRAME_COUNT)
}

fn resolve_ref(template: &str, timestamp_ms: i64) -> String {
    template.replace("{timestamp}", &timestamp_ms.to_string())
}

/// Builds the national loop, oldest first so index order matches time order.
/// The newest frame lands at `base_time_ms`.
pub fn national_frames(count: u32, base_time_ms: i64, ref_template: &str) -> Vec<FrameDescriptor> {
    frames_for(GeoBounds::national(), None, count, base_time_ms, ref_template)
}

/// Builds the loop for one station, centered on its coordinates.
pub fn station_frames(
    station: &Station,
    count: u32,
    base_time_ms: i64,
    ref_template: &str,
) -> Vec<FrameDescriptor> {
    let bounds = GeoBounds::around(station.latitude, station.longitude, STATION_HALF_SPAN_DEG);
    frames_for(
        bounds,
        Some(station.station_id.clone()),
        count,
        base_time_ms,
        ref_template,
    )
}

fn frames_for(
    bounds: GeoBounds,
    station_id: Option<String>,
    count: u32,
    base_time_ms: i64,
    ref_template: &str,
) -> Vec<FrameDescriptor> {
    let count = clamp_frame_count(count) as i64;
    (0..count)
        .map(|i| {
            let timestamp_ms = base_time_ms - (count - 1 - i) * FRAME_SPACING_MS;
            FrameDescriptor {
                timestamp_ms,
                index: i as usize,
                image_ref: Some(resolve_ref(ref_template, timestamp_ms)),
                bounds,
                station_id: station_id.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct StationCatalog {
    stations: Vec<Station>,
}

pub fn load_stations(path: &Path) -> Result<Vec<Station>, FeedError> {
    let content = fs::read_to_string(path)?;
    let catalog: StationCatalog = serde_yaml::from_str(&content)?;
    Ok(catalog.stations)
}

pub fn find_station<'a>(stations: &'a [Station], station_id: &str) -> Result<&'a Station, FeedError> {
    stations
        .iter()
        .find(|s| s.station_id == station_id)
        .ok_or_else(|| FeedError::UnknownStation(station_id.to_string()))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FeedSnapshot {
    storm_cells: Vec<StormCell>,
    tornado_events: Vec<TornadoEvent>,
    weather_markers: Vec<WeatherMarker>,
}

/// One demo snapshot file carries every overlay category at once. A missing
/// file is not an error, the map just starts empty.
pub fn load_snapshot(
    path: &Path,
) -> Result<(Vec<StormCell>, Vec<TornadoEvent>, Vec<WeatherMarker>), FeedError> {
    if !path.exists() {
        warn!("Feed snapshot not found at '{}', starting empty", path.display());
        return Ok((Vec::new(), Vec::new(), Vec::new()));
    }
    let content = fs::read_to_string(path)?;
    let snapshot: FeedSnapshot = serde_yaml::from_str(&content)?;
    Ok((
        snapshot.storm_cells,
        snapshot.tornado_events,
        snapshot.weather_markers,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_is_clamped_to_catalog_limits() {
        assert_eq!(clamp_frame_count(10), MIN_FRAME_COUNT);
        assert_eq!(clamp_frame_count(100), 100);
        assert_eq!(clamp_frame_count(9999), MAX_FRAME_COUNT);
    }

    #[test]
    fn national_frames_are_oldest_first_with_ten_minute_spacing() {
        let frames = national_frames(50, 1_700_000_000_000, "radar/{timestamp}.png");
        assert_eq!(frames.len(), 50);
        assert_eq!(frames.last().unwrap().timestamp_ms, 1_700_000_000_000);
        for pair in frames.windows(2) {
            assert_eq!(pair[1].timestamp_ms - pair[0].timestamp_ms, FRAME_SPACING_MS);
        }
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            assert!(frame.station_id.is_none());
        }
    }

    #[test]
    fn station_frames_center_on_the_station() {
        let station = Station {
            station_id: "KTLX".to_string(),
            name: "Oklahoma City".to_string(),
            latitude: 35.33,
            longitude: -97.28,
            elevation_m: 370,
            state: "OK".to_string(),
            status: "operational".to_string(),
        };
        let frames = station_frames(&station, 60, 1_700_000_000_000, "radar/{timestamp}.png");
        assert_eq!(frames.len(), 60);
        let bounds = frames[0].bounds;
        assert!((bounds.north - 37.33).abs() < 1e-9);
        assert!((bounds.south - 33.33).abs() < 1e-9);
        assert_eq!(frames[0].station_id.as_deref(), Some("KTLX"));
    }

    #[test]
    fn image_refs_substitute_the_frame_timestamp() {
        let frames = national_frames(50, FRAME_SPACING_MS * 49, "tiles/{timestamp}/conus.png");
        assert_eq!(frames[0].image_ref.as_deref(), Some("tiles/0/conus.png"));
    }

    #[test]
    fn rebuilding_the_same_feed_is_deterministic() {
        let a = national_frames(75, 1_700_000_000_000, "radar/{timestamp}.png");
        let b = national_frames(75, 1_700_000_000_000, "radar/{timestamp}.png");
        assert_eq!(a, b);
    }
}
