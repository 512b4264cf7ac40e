use bevy::{ prelude::*, diagnostic::{ FrameTimeDiagnosticsPlugin } };

use crate::states::AppState;

pub mod readout;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(OnEnter(AppState::MapView), readout::spawn_debug_readout)
            .add_systems(
                Update,
                (readout::update_fps_text, readout::update_frame_text)
                    .run_if(in_state(AppState::MapView)),
            );
    }
}
