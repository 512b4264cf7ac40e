use bevy::prelude::*;

pub mod map_view;

pub use map_view::MapViewPlugin;

pub fn setup_camera(mut commands: Commands){
    commands.spawn(Camera2d::default());
}
