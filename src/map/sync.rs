use bevy::prelude::*;
use std::collections::HashMap;

use crate::data::{
    GeoBounds, LayerKind, MapPoint, StationSnapshot, StormCellSnapshot, TornadoEventSnapshot,
    WeatherMarkerSnapshot,
};
use crate::map::markers::{spawn_marker, MapMarker};
use crate::map::registry::LayerRegistry;
use crate::map::severity::{
    station_visual, storm_cell_visual, tornado_visual, weather_visual, MarkerVisual,
};

/// Handles to the mounted map UI. Present only while the map view is up;
/// systems that touch the surface gate on this resource existing.
#[derive(Resource)]
pub struct MapSurface {
    pub root: Entity,
    pub image_layer: Entity,
    pub marker_layer: Entity,
    pub view_bounds: GeoBounds,
}

/// Per-category show/hide toggles. Hiding a category reconciles it against an
/// empty set, so its entities actually leave the world instead of going
/// transparent.
#[derive(Resource)]
pub struct CategoryVisibility {
    visible: HashMap<LayerKind, bool>,
}

impl Default for CategoryVisibility {
    fn default() -> Self {
        let visible = LayerKind::MARKER_CATEGORIES
            .iter()
            .map(|kind| (*kind, true))
            .collect();
        CategoryVisibility { visible }
    }
}

impl CategoryVisibility {
    pub fn from_kinds(kinds: &[LayerKind]) -> Self {
        let visible = LayerKind::MARKER_CATEGORIES
            .iter()
            .map(|kind| (*kind, kinds.contains(kind)))
            .collect();
        CategoryVisibility { visible }
    }

    pub fn visible(&self, kind: LayerKind) -> bool {
        self.visible.get(&kind).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, kind: LayerKind) -> bool {
        let flag = self.visible.entry(kind).or_insert(true);
        *flag = !*flag;
        *flag
    }
}

/// Geographic to surface-pixel projection, linear in both axes. Returns None
/// for points outside the viewport so callers can cull instead of drawing
/// off-surface markers.
pub fn project(bounds: &GeoBounds, surface_size: Vec2, latitude: f64, longitude: f64) -> Option<Vec2> {
    if !bounds.contains(latitude, longitude) {
        return None;
    }
    let x = (longitude - bounds.west) / (bounds.east - bounds.west);
    let y = (bounds.north - latitude) / (bounds.north - bounds.south);
    Some(Vec2::new(
        x as f32 * surface_size.x,
        y as f32 * surface_size.y,
    ))
}

fn reconcile_category<T: MapPoint>(
    commands: &mut Commands,
    registry: &mut LayerRegistry,
    surface: &MapSurface,
    surface_size: Vec2,
    kind: LayerKind,
    items: &[T],
    visible: bool,
    visual_of: impl Fn(&T) -> MarkerVisual,
    marker_nodes: &mut Query<&mut Node, With<MapMarker>>,
) {
    let mut desired: Vec<String> = Vec::new();
    let mut placeable: HashMap<&str, (&T, Vec2)> = HashMap::new();
    if visible {
        for item in items {
            if let Some(position) =
                project(&surface.view_bounds, surface_size, item.latitude(), item.longitude())
            {
                desired.push(item.layer_id().to_string());
                placeable.insert(item.layer_id(), (item, position));
            }
        }
    }

    let (to_despawn, to_add) = registry.reconcile(kind, &desired);
    for entity in to_despawn {
        commands.entity(entity).despawn();
    }
    for id in to_add {
        let (item, position) = placeable[id.as_str()];
        let entity = spawn_marker(
            commands,
            surface.marker_layer,
            kind,
            &id,
            visual_of(item),
            position,
        );
        registry.insert(kind, id, entity);
    }

    // Re-anchor the survivors; the surface may have been resized.
    for id in &desired {
        let Some(entity) = registry.get(kind, id) else {
            continue;
        };
        let Ok(mut node) = marker_nodes.get_mut(entity) else {
            continue;
        };
        let (item, position) = placeable[id.as_str()];
        let radius = visual_of(item).diameter / 2.0;
        node.left = Val::Px(position.x - radius);
        node.top = Val::Px(position.y - radius);
    }
}

fn layer_size(nodes: &Query<&ComputedNode>, layer: Entity) -> Option<Vec2> {
    let computed = nodes.get(layer).ok()?;
    let size = computed.size() * computed.inverse_scale_factor();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some(size)
}

pub fn sync_stations(
    mut commands: Commands,
    snapshot: Res<StationSnapshot>,
    visibility: Res<CategoryVisibility>,
    surface: Res<MapSurface>,
    nodes: Query<&ComputedNode>,
    resized: Query<(), Changed<ComputedNode>>,
    mut marker_nodes: Query<&mut Node, With<MapMarker>>,
    mut registry: ResMut<LayerRegistry>,
) {
    if !(snapshot.is_changed()
        || visibility.is_changed()
        || surface.is_changed()
        || resized.contains(surface.marker_layer))
    {
        return;
    }
    let Some(size) = layer_size(&nodes, surface.marker_layer) else {
        return;
    };
    reconcile_category(
        &mut commands,
        &mut registry,
        &surface,
        size,
        LayerKind::Stations,
        &snapshot.0,
        visibility.visible(LayerKind::Stations),
        |station| station_visual(&station.status),
        &mut marker_nodes,
    );
}

pub fn sync_storm_cells(
    mut commands: Commands,
    snapshot: Res<StormCellSnapshot>,
    visibility: Res<CategoryVisibility>,
    surface: Res<MapSurface>,
    nodes: Query<&ComputedNode>,
    resized: Query<(), Changed<ComputedNode>>,
    mut marker_nodes: Query<&mut Node, With<MapMarker>>,
    mut registry: ResMut<LayerRegistry>,
) {
    if !(snapshot.is_changed()
        || visibility.is_changed()
        || surface.is_changed()
        || resized.contains(surface.marker_layer))
    {
        return;
    }
    let Some(size) = layer_size(&nodes, surface.marker_layer) else {
        return;
    };
    reconcile_category(
        &mut commands,
        &mut registry,
        &surface,
        size,
        LayerKind::StormCells,
        &snapshot.0,
        visibility.visible(LayerKind::StormCells),
        |cell| storm_cell_visual(cell.tornado_probability),
        &mut marker_nodes,
    );
}

pub fn sync_tornado_events(
    mut commands: Commands,
    snapshot: Res<TornadoEventSnapshot>,
    visibility: Res<CategoryVisibility>,
    surface: Res<MapSurface>,
    nodes: Query<&ComputedNode>,
    resized: Query<(), Changed<ComputedNode>>,
    mut marker_nodes: Query<&mut Node, With<MapMarker>>,
    mut registry: ResMut<LayerRegistry>,
) {
    if !(snapshot.is_changed()
        || visibility.is_changed()
        || surface.is_changed()
        || resized.contains(surface.marker_layer))
    {
        return;
    }
    let Some(size) = layer_size(&nodes, surface.marker_layer) else {
        return;
    };
    reconcile_category(
        &mut commands,
        &mut registry,
        &surface,
        size,
        LayerKind::TornadoEvents,
        &snapshot.0,
        visibility.visible(LayerKind::TornadoEvents),
        |event| tornado_visual(event.severity),
        &mut marker_nodes,
    );
}

pub fn sync_weather_markers(
    mut commands: Commands,
    snapshot: Res<WeatherMarkerSnapshot>,
    visibility: Res<CategoryVisibility>,
    surface: Res<MapSurface>,
    nodes: Query<&ComputedNode>,
    resized: Query<(), Changed<ComputedNode>>,
    mut marker_nodes: Query<&mut Node, With<MapMarker>>,
    mut registry: ResMut<LayerRegistry>,
) {
    if !(snapshot.is_changed()
        || visibility.is_changed()
        || surface.is_changed()
        || resized.contains(surface.marker_layer))
    {
        return;
    }
    let Some(size) = layer_size(&nodes, surface.marker_layer) else {
        return;
    };
    reconcile_category(
        &mut commands,
        &mut registry,
        &surface,
        size,
        LayerKind::WeatherMarkers,
        &snapshot.0,
        visibility.visible(LayerKind::WeatherMarkers),
        |marker| weather_visual(marker.kind, marker.intensity),
        &mut marker_nodes,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_maps_corners_to_surface_corners() {
        let bounds = GeoBounds::national();
        let size = Vec2::new(1200.0, 600.0);
        assert_eq!(project(&bounds, size, 50.0, -125.0), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(project(&bounds, size, 25.0, -65.0), Some(Vec2::new(1200.0, 600.0)));
    }

    #[test]
    fn project_culls_points_outside_the_viewport() {
        let bounds = GeoBounds::around(35.0, -97.0, 2.0);
        let size = Vec2::new(800.0, 800.0);
        assert!(project(&bounds, size, 35.0, -97.0).is_some());
        assert!(project(&bounds, size, 40.0, -97.0).is_none());
        assert!(project(&bounds, size, 35.0, -80.0).is_none());
    }

    #[test]
    fn projection_is_monotone_west_to_east() {
        let bounds = GeoBounds::national();
        let size = Vec2::new(1000.0, 500.0);
        let a = project(&bounds, size, 40.0, -110.0).unwrap();
        let b = project(&bounds, size, 40.0, -90.0).unwrap();
        assert!(b.x > a.x);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn toggling_visibility_flips_and_reports() {
        let mut visibility = CategoryVisibility::default();
        assert!(visibility.visible(LayerKind::StormCells));
        assert!(!visibility.toggle(LayerKind::StormCells));
        assert!(!visibility.visible(LayerKind::StormCells));
        assert!(visibility.toggle(LayerKind::StormCells));
    }

    #[test]
    fn from_kinds_hides_everything_not_listed() {
        let visibility = CategoryVisibility::from_kinds(&[LayerKind::Stations]);
        assert!(visibility.visible(LayerKind::Stations));
        assert!(!visibility.visible(LayerKind::TornadoEvents));
    }
}
