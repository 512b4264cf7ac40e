use bevy::{
    prelude::*,
    window::{ WindowPlugin, ExitCondition, PrimaryWindow, Window, WindowResolution },
    winit::{ WinitWindows },
};

use stormscope::states::{ AppState, StartupPlugin };
use stormscope::file::config::ConfigPlugin;
use stormscope::map::MapPlugin;
use stormscope::playback::PlaybackPlugin;
use stormscope::scenes::MapViewPlugin;
use stormscope::widgets::UiLayerPlugin;

#[cfg(not(feature = "production"))]
use stormscope::debug::{ DebugPlugin };

fn main() {
    App::new()
        .add_plugins((
            ConfigPlugin,
            #[cfg(not(feature = "production"))] DebugPlugin,
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "StormScope".to_string(),
                    resolution: WindowResolution::new(1280, 800),
                    ..default()
                }),
                exit_condition: ExitCondition::OnPrimaryClosed,
                ..default()
            }),
            UiLayerPlugin,
            StartupPlugin,
            PlaybackPlugin,
            MapPlugin,
            MapViewPlugin,
        ))
        .init_state::<AppState>()
        .add_systems(OnEnter(AppState::InitialLoad), start_maximized)
        .run();
}

fn start_maximized(
    winit_windows: NonSend<WinitWindows>,
    primary_window_query: Query<Entity, With<PrimaryWindow>>,
    mut windows: Query<&mut Window>
) {
    if let Ok(window_entity) = primary_window_query.single() {
        if let Some(window) = winit_windows.get_window(window_entity) {
            if !window.is_maximized() {
                if let Ok(mut window) = windows.get_mut(window_entity) {
                    window.set_maximized(true);
                }
            }
        }
    }
}
