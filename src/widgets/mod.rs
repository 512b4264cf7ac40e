use bevy::prelude::*;
use bevy::ecs::system::SystemParam;
use crate::file::{ AppConfig, Settings, Themes };
use crate::states::AppState;

pub mod button;
pub use button::{ UiButton, GenericButton, ButtonStyle, Active };

pub mod scrubber;
pub use scrubber::{ Scrubber, ScrubState, spawn_scrubber };

pub mod info_panel;
pub use info_panel::{ InfoPanel, PanelPlacement, place, spawn_info_panel };

pub mod layers;
pub use layers::{ UiLayer, UiLayerStack };

#[derive(SystemParam)]
pub struct UiContext<'w, 's> {
    pub themes: Res<'w, Themes>,
    pub settings: Res<'w, Settings>,
    pub config: Res<'w, AppConfig>,
    pub children_query: Query<'w, 's, &'static Children>,
    pub asset_server: Res<'w, AssetServer>,
    pub window: Single<'w, 's, Entity, With<Window>>,
}

#[derive(Debug, Clone)]
pub struct UiBorder {
    pub color: Color,
    pub size: UiRect,
    pub radius: BorderRadius,
}

impl Default for UiBorder {
    fn default() -> Self {
        UiBorder {
            color: Color::BLACK,
            size: UiRect::all(Val::Px(1.0)),
            radius: BorderRadius::all(Val::Px(0.0)),
        }
    }
}

pub struct UiLayerPlugin;

impl Plugin for UiLayerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(UiLayerStack::default())
            .add_systems(Update, (
                button::default_button_setup,
                button::add_active_listener,
                button::remove_active_listener,
            ))
            .add_systems(Update, (
                scrubber::follow_timeline,
                scrubber::render_scrubber,
                scrubber::rebuild_ticks,
                info_panel::update_info_panel,
            ).run_if(in_state(AppState::MapView)));
    }
}
