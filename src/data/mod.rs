pub mod entities;
pub mod frames;

pub use entities::{
    threat_level, AlertKind, GeoPoint, LayerKind, MapPoint, Station, StationSnapshot, StormCell,
    StormCellSnapshot, ThreatLevel, TornadoEvent, TornadoEventSnapshot, WeatherKind, WeatherMarker,
    WeatherMarkerSnapshot,
};
pub use frames::{FrameDescriptor, FrameTimeline, GeoBounds, TimelineError};
