use bevy::prelude::*;
use serde::Deserialize;

/// Marker layer categories. Each category owns an independent partition of
/// the layer registry; the frame overlay is a singleton category of size <= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Stations,
    StormCells,
    TornadoEvents,
    WeatherMarkers,
    FrameOverlay,
}

impl LayerKind {
    pub const MARKER_CATEGORIES: [LayerKind; 4] = [
        LayerKind::Stations,
        LayerKind::StormCells,
        LayerKind::TornadoEvents,
        LayerKind::WeatherMarkers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Stations => "Stations",
            LayerKind::StormCells => "Storm Cells",
            LayerKind::TornadoEvents => "Tornado Events",
            LayerKind::WeatherMarkers => "Weather",
            LayerKind::FrameOverlay => "Radar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stations" => Some(LayerKind::Stations),
            "storm_cells" => Some(LayerKind::StormCells),
            "tornado_events" => Some(LayerKind::TornadoEvents),
            "weather_markers" => Some(LayerKind::WeatherMarkers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// NEXRAD radar site record, as the station catalog ships it.
#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: i32,
    pub state: String,
    #[serde(default = "default_station_status")]
    pub status: String,
}

fn default_station_status() -> String {
    "operational".to_string()
}

/// Tracked storm cell with its tornado-probability assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct StormCell {
    pub id: String,
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Percent, 0..=100.
    pub tornado_probability: u8,
    pub predicted_ef_scale: String,
    /// Percent, 0..=100.
    pub confidence: u8,
    #[serde(default)]
    pub movement_deg: f32,
    #[serde(default)]
    pub movement_kts: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AlertKind {
    Watch,
    Warning,
    Prediction,
}

/// Issued tornado watch/warning/prediction with its projected ground track.
#[derive(Debug, Clone, Deserialize)]
pub struct TornadoEvent {
    pub id: String,
    pub alert_kind: AlertKind,
    /// 1..=5 scale.
    pub severity: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub confidence: u8,
    #[serde(default)]
    pub path: Vec<GeoPoint>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum WeatherKind {
    Lightning,
    Hail,
    Wind,
    Precipitation,
}

/// Auxiliary point event (lightning strike, hail core, wind gust, heavy
/// precipitation cell).
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMarker {
    pub id: String,
    pub kind: WeatherKind,
    pub latitude: f64,
    pub longitude: f64,
    /// Percent, 0..=100.
    pub intensity: u8,
}

/// Threat classification used for storm-cell color ramps. Thresholds match
/// the monitoring feed: low from 20%, moderate from 40%, high above 70%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreatLevel {
    Minimal,
    Low,
    Moderate,
    High,
}

pub fn threat_level(tornado_probability: u8) -> ThreatLevel {
    match tornado_probability {
        p if p > 70 => ThreatLevel::High,
        p if p >= 40 => ThreatLevel::Moderate,
        p if p >= 20 => ThreatLevel::Low,
        _ => ThreatLevel::Minimal,
    }
}

/// The one seam the reconciler needs from every marker record: a stable id
/// within its category and a position.
pub trait MapPoint {
    fn layer_id(&self) -> &str;
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

impl MapPoint for Station {
    fn layer_id(&self) -> &str {
        &self.station_id
    }
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl MapPoint for StormCell {
    fn layer_id(&self) -> &str {
        &self.id
    }
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl MapPoint for TornadoEvent {
    fn layer_id(&self) -> &str {
        &self.id
    }
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl MapPoint for WeatherMarker {
    fn layer_id(&self) -> &str {
        &self.id
    }
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

// Snapshot resources. Each update replaces the whole vector; the engine never
// carries entities across snapshots beyond the layers currently rendered.

#[derive(Resource, Default)]
pub struct StationSnapshot(pub Vec<Station>);

#[derive(Resource, Default)]
pub struct StormCellSnapshot(pub Vec<StormCell>);

#[derive(Resource, Default)]
pub struct TornadoEventSnapshot(pub Vec<TornadoEvent>);

#[derive(Resource, Default)]
pub struct WeatherMarkerSnapshot(pub Vec<WeatherMarker>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threat_levels_match_feed_thresholds() {
        assert_eq!(threat_level(0), ThreatLevel::Minimal);
        assert_eq!(threat_level(19), ThreatLevel::Minimal);
        assert_eq!(threat_level(20), ThreatLevel::Low);
        assert_eq!(threat_level(39), ThreatLevel::Low);
        assert_eq!(threat_level(40), ThreatLevel::Moderate);
        assert_eq!(threat_level(70), ThreatLevel::Moderate);
        assert_eq!(threat_level(71), ThreatLevel::High);
        assert_eq!(threat_level(100), ThreatLevel::High);
    }

    #[test]
    fn category_names_round_trip() {
        for kind in LayerKind::MARKER_CATEGORIES {
            let name = match kind {
                LayerKind::Stations => "stations",
                LayerKind::StormCells => "storm_cells",
                LayerKind::TornadoEvents => "tornado_events",
                LayerKind::WeatherMarkers => "weather_markers",
                LayerKind::FrameOverlay => unreachable!(),
            };
            assert_eq!(LayerKind::from_name(name), Some(kind));
        }
        assert_eq!(LayerKind::from_name("radar"), None);
    }
}
