use bevy::{
    prelude::*,
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin}
};

use crate::data::FrameTimeline;
use crate::playback::Playback;
use crate::widgets::UiLayer;

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct FrameText;

pub fn spawn_debug_readout(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(8.0),
                left: Val::Px(8.0),
                padding: UiRect::all(Val::Px(6.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            GlobalZIndex(UiLayer::Debug.base_z()),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Text::new("FPS: "),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 1.0)),
                ))
                .with_child((
                    TextSpan::default(),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 1.0)),
                    FpsText,
                ));
            parent
                .spawn((
                    Text::new("Frame: "),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 1.0)),
                ))
                .with_child((
                    TextSpan::default(),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 1.0)),
                    FrameText,
                ));
        });
}

pub fn update_fps_text(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut TextSpan, With<FpsText>>,
) {
    for mut span in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                **span = format!("{value:.0}");
            }
        }
    }
}

pub fn update_frame_text(
    timeline: Res<FrameTimeline>,
    playback: Option<Res<Playback>>,
    mut query: Query<&mut TextSpan, With<FrameText>>,
) {
    let state = playback
        .map(|p| if p.playing() { "playing" } else { "paused" })
        .unwrap_or("idle");
    for mut span in &mut query {
        match timeline.current() {
            Some(index) => {
                **span = format!("{}/{} ({state})", index + 1, timeline.len());
            }
            None => {
                **span = format!("none ({state})");
            }
        }
    }
}
