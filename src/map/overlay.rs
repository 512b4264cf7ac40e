use bevy::prelude::*;

use crate::data::{FrameTimeline, LayerKind};
use crate::file::config::AppConfig;
use crate::map::registry::LayerRegistry;
use crate::map::MapSurface;
use crate::playback::FrameChanged;

/// Keeps the radar image in step with the shown frame. The previous overlay
/// is removed before the replacement spawns, so at most one radar image is
/// ever attached to the surface.
pub fn sync_frame_overlay(
    mut commands: Commands,
    mut changed: EventReader<FrameChanged>,
    timeline: Res<FrameTimeline>,
    surface: Res<MapSurface>,
    config: Res<AppConfig>,
    asset_server: Res<AssetServer>,
    mut registry: ResMut<LayerRegistry>,
) {
    // Coalesce: only the last change this tick matters for the image.
    let Some(FrameChanged(index)) = changed.read().last() else {
        return;
    };
    let Ok(frame) = timeline.get(*index) else {
        return;
    };

    let (stale, _) = registry.reconcile(LayerKind::FrameOverlay, &[]);
    for entity in stale {
        commands.entity(entity).despawn();
    }

    let Some(image_ref) = frame.image_ref.as_deref() else {
        debug!("Frame {index} has no image ref, leaving the surface bare");
        return;
    };

    let overlay = commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            ImageNode {
                image: asset_server.load(image_ref.to_string()),
                color: Color::WHITE.with_alpha(config.map.opacity),
                ..default()
            },
            Pickable::IGNORE,
        ))
        .id();
    commands.entity(overlay).insert(ChildOf(surface.image_layer));

    registry.insert(LayerKind::FrameOverlay, frame.timestamp_ms.to_string(), overlay);
}
