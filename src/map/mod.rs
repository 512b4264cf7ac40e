use bevy::prelude::*;

pub mod markers;
pub mod overlay;
pub mod registry;
pub mod severity;
pub mod sync;

pub use markers::{MapMarker, MarkerPulse};
pub use registry::LayerRegistry;
pub use severity::{
    station_visual, storm_cell_visual, tornado_visual, weather_visual, MarkerVisual,
};
pub use sync::{project, CategoryVisibility, MapSurface};

use crate::data::{
    LayerKind, StationSnapshot, StormCellSnapshot, TornadoEventSnapshot, WeatherMarkerSnapshot,
};
use crate::states::AppState;

/// Pointer entered or moved over a marker. `screen` is the cursor position in
/// window coordinates, the anchor for the info panel.
#[derive(Message, Clone)]
pub struct EntityHovered {
    pub kind: LayerKind,
    pub id: String,
    pub screen: Vec2,
}

#[derive(Message)]
pub struct EntityLeft;

#[derive(Message)]
pub struct EntityClicked {
    pub kind: LayerKind,
    pub id: String,
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayerRegistry>()
            .init_resource::<CategoryVisibility>()
            .init_resource::<StationSnapshot>()
            .init_resource::<StormCellSnapshot>()
            .init_resource::<TornadoEventSnapshot>()
            .init_resource::<WeatherMarkerSnapshot>()
            .add_event::<EntityHovered>()
            .add_event::<EntityLeft>()
            .add_event::<EntityClicked>()
            .add_systems(
                Update,
                (
                    sync::sync_stations,
                    sync::sync_storm_cells,
                    sync::sync_tornado_events,
                    sync::sync_weather_markers,
                    overlay::sync_frame_overlay,
                    markers::animate_marker_pulse,
                )
                    .run_if(in_state(AppState::MapView))
                    .run_if(resource_exists::<MapSurface>),
            );
    }
}
