use bevy::{
    prelude::*,
};
use crate::file::theme::setup_theme;
use crate::file::settings::setup_settings;
use crate::scenes::setup_camera;

#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    InitialLoad,
    Startup,
    MapView,
}

// Latches will work as synchronization tools for states. So if two functions need to work before state transitioning, we will use the latch system

#[derive(Resource, Default)]
pub struct StartupLatch {
    pub settings_loaded: bool,
    pub theme_loaded: bool,
}

pub fn check_startup_complete(
    latch: Res<StartupLatch>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if latch.settings_loaded && latch.theme_loaded {
        next_state.set(AppState::Startup);
    }
}

fn enter_map_view(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::MapView);
}

pub struct StartupPlugin;

impl Plugin for StartupPlugin {
    fn build(&self, app: &mut App) {
        app
        .insert_resource(StartupLatch::default())
        .add_systems(OnEnter(AppState::InitialLoad), setup_theme)
        .add_systems(OnEnter(AppState::InitialLoad), setup_settings)
        .add_systems(OnEnter(AppState::InitialLoad), setup_camera)
        .add_systems(Update, check_startup_complete.run_if(in_state(AppState::InitialLoad)))
        .add_systems(OnEnter(AppState::Startup), enter_map_view)
        ;
    }
}
