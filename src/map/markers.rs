use bevy::prelude::*;

use crate::data::LayerKind;
use crate::map::severity::MarkerVisual;
use crate::map::{EntityClicked, EntityHovered, EntityLeft};

/// Identity of one marker on the map, matching its registry entry.
#[derive(Component, Clone)]
pub struct MapMarker {
    pub kind: LayerKind,
    pub id: String,
}

/// Attached only to markers with a nonzero pulse rate.
#[derive(Component)]
pub struct MarkerPulse {
    pub rate_hz: f32,
    pub base_color: Color,
    pub base_opacity: f32,
}

/// Spawns one circular marker at a pixel position inside the marker layer and
/// wires up its pointer observers. The node is centered on the position.
pub fn spawn_marker(
    commands: &mut Commands,
    layer: Entity,
    kind: LayerKind,
    id: &str,
    visual: MarkerVisual,
    position: Vec2,
) -> Entity {
    let radius = visual.diameter / 2.0;
    let mut entity_commands = commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(position.x - radius),
            top: Val::Px(position.y - radius),
            width: Val::Px(visual.diameter),
            height: Val::Px(visual.diameter),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
        BorderRadius::MAX,
        BorderColor::all(Color::srgba(0.0, 0.0, 0.0, 0.4)),
        BackgroundColor(visual.color.with_alpha(visual.opacity)),
        MapMarker {
            kind,
            id: id.to_string(),
        },
        ChildOf(layer),
    ));

    if visual.pulse_rate_hz > 0.0 {
        entity_commands.insert(MarkerPulse {
            rate_hz: visual.pulse_rate_hz,
            base_color: visual.color,
            base_opacity: visual.opacity,
        });
    }

    let marker_entity = entity_commands.id();

    let hover_kind = kind;
    let hover_id = id.to_string();
    entity_commands.observe(
        move |mut trigger: Trigger<Pointer<Over>>, mut hovered: EventWriter<EntityHovered>| {
            hovered.write(EntityHovered {
                kind: hover_kind,
                id: hover_id.clone(),
                screen: trigger.event().pointer_location.position,
            });
            trigger.propagate(false);
        },
    );

    let move_kind = kind;
    let move_id = id.to_string();
    entity_commands.observe(
        move |mut trigger: Trigger<Pointer<Move>>, mut hovered: EventWriter<EntityHovered>| {
            hovered.write(EntityHovered {
                kind: move_kind,
                id: move_id.clone(),
                screen: trigger.event().pointer_location.position,
            });
            trigger.propagate(false);
        },
    );

    entity_commands.observe(
        move |mut trigger: Trigger<Pointer<Out>>, mut left: EventWriter<EntityLeft>| {
            left.write(EntityLeft);
            trigger.propagate(false);
        },
    );

    let click_kind = kind;
    let click_id = id.to_string();
    entity_commands.observe(
        move |mut trigger: Trigger<Pointer<Click>>, mut clicked: EventWriter<EntityClicked>| {
            clicked.write(EntityClicked {
                kind: click_kind,
                id: click_id.clone(),
            });
            trigger.propagate(false);
        },
    );

    marker_entity
}

/// Breathes the opacity of pulsing markers. Rate is pulses per second; phase
/// comes from wall-clock elapsed time so all markers of one severity beat in
/// step.
pub fn animate_marker_pulse(
    time: Res<Time>,
    mut markers: Query<(&MarkerPulse, &mut BackgroundColor)>,
) {
    let elapsed = time.elapsed_secs();
    for (pulse, mut background) in markers.iter_mut() {
        let wave = (elapsed * pulse.rate_hz * std::f32::consts::TAU).sin();
        let opacity = pulse.base_opacity * (0.7 + 0.3 * wave.max(0.0));
        background.0 = pulse.base_color.with_alpha(opacity);
    }
}
