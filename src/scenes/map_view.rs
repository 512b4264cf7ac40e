use bevy::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::data::{
    FrameTimeline, LayerKind, StationSnapshot, StormCellSnapshot, TornadoEventSnapshot,
    WeatherMarkerSnapshot,
};
use crate::file::feed::{find_station, load_snapshot, load_stations, national_frames, station_frames};
use crate::file::{AppConfig, DisplayMode, Settings, Themes};
use crate::map::{CategoryVisibility, EntityClicked, LayerRegistry, MapSurface};
use crate::playback::{FrameChanged, Playback, SpeedChanged};
use crate::states::AppState;
use crate::widgets::{
    spawn_info_panel, spawn_scrubber, ButtonStyle, GenericButton, UiBorder, UiLayer, UiLayerStack,
};

#[derive(Component)]
struct MapViewRoot;

#[derive(Component)]
struct FrameReadout;

const SPEED_CHOICES: [(&str, u64); 3] = [("0.5x", 1000), ("1x", 500), ("2x", 250)];

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn setup_map_view(
    mut commands: Commands,
    config: Res<AppConfig>,
    settings: Res<Settings>,
    themes: Res<Themes>,
    mut timeline: ResMut<FrameTimeline>,
    mut layer_stack: ResMut<UiLayerStack>,
    mut changed: EventWriter<FrameChanged>,
) {
    let theme = themes
        .get(&settings.start_theme)
        .unwrap_or_else(|| panic!("Theme '{}' not found", settings.start_theme))
        .clone();

    // Data feeds first, the sync systems pick the snapshots up next frame.
    let stations = match load_stations(Path::new(&config.paths.stations_file)) {
        Ok(stations) => stations,
        Err(e) => {
            error!("Failed to load station catalog: {e}");
            Vec::new()
        }
    };

    let snapshot_path = PathBuf::from(&config.paths.feed_directory).join("snapshot.yaml");
    let (cells, events, weather) = match load_snapshot(&snapshot_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load feed snapshot: {e}");
            (Vec::new(), Vec::new(), Vec::new())
        }
    };

    let base_time = now_ms();
    let template = &config.paths.radar_ref_template;
    let frames = match &settings.display_mode {
        DisplayMode::National => national_frames(config.map.frame_count, base_time, template),
        DisplayMode::Station { station_id } => match find_station(&stations, station_id) {
            Ok(station) => station_frames(station, config.map.frame_count, base_time, template),
            Err(e) => {
                warn!("{e}, falling back to the national view");
                national_frames(config.map.frame_count, base_time, template)
            }
        },
    };
    let view_bounds = frames
        .first()
        .map(|frame| frame.bounds)
        .unwrap_or_else(crate::data::GeoBounds::national);
    timeline.load(frames);
    info!("Loaded {} radar frames", timeline.len());

    commands.insert_resource(StationSnapshot(stations));
    commands.insert_resource(StormCellSnapshot(cells));
    commands.insert_resource(TornadoEventSnapshot(events));
    commands.insert_resource(WeatherMarkerSnapshot(weather));
    commands.insert_resource(CategoryVisibility::from_kinds(&config.map.visible_kinds()));

    let mut playback = Playback::new(Duration::from_millis(config.map.interval_ms));
    playback.play();
    commands.insert_resource(playback);

    // UI tree: map surface on top, control bar and scrubber beneath.
    let mut image_layer = Entity::PLACEHOLDER;
    let mut marker_layer = Entity::PLACEHOLDER;

    let button_style = ButtonStyle {
        color: theme.background_paper,
        hover_color: theme.track,
        press_color: theme.track_fill,
        label_color: theme.text_primary,
        font_size: 14.0,
        border: Some(UiBorder {
            color: theme.divider,
            size: UiRect::all(Val::Px(1.0)),
            radius: BorderRadius::all(Val::Px(4.0)),
        }),
        padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
        margin: UiRect::right(Val::Px(6.0)),
        ..default()
    };

    let root = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(theme.background_default),
            MapViewRoot,
        ))
        .with_children(|parent| {
            parent
                .spawn((Node {
                    width: Val::Percent(100.0),
                    flex_grow: 1.0,
                    ..default()
                },))
                .with_children(|surface| {
                    image_layer = surface
                        .spawn((
                            Node {
                                position_type: PositionType::Absolute,
                                width: Val::Percent(100.0),
                                height: Val::Percent(100.0),
                                ..default()
                            },
                            Pickable::IGNORE,
                        ))
                        .id();
                    marker_layer = surface
                        .spawn((Node {
                            position_type: PositionType::Absolute,
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },))
                        .id();
                });

            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        padding: UiRect::all(Val::Px(10.0)),
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(theme.background_paper),
                ))
                .with_children(|bar| {
                    let play = GenericButton::builder("Pause")
                        .style(button_style.clone())
                        .spawn(bar);
                    bar.commands().entity(play).observe(
                        |_: Trigger<Pointer<Click>>, mut playback: ResMut<Playback>| {
                            playback.toggle();
                        },
                    );

                    for (label, interval_ms) in SPEED_CHOICES {
                        let speed = GenericButton::builder(label)
                            .style(button_style.clone())
                            .spawn(bar);
                        bar.commands().entity(speed).observe(
                            move |_: Trigger<Pointer<Click>>,
                                  mut speeds: EventWriter<SpeedChanged>| {
                                speeds.write(SpeedChanged(Duration::from_millis(interval_ms)));
                            },
                        );
                    }

                    for kind in LayerKind::MARKER_CATEGORIES {
                        let toggle = GenericButton::builder(kind.label())
                            .style(button_style.clone())
                            .stay_active(true)
                            .spawn(bar);
                        bar.commands().entity(toggle).observe(
                            move |_: Trigger<Pointer<Click>>,
                                  mut visibility: ResMut<CategoryVisibility>| {
                                let shown = visibility.toggle(kind);
                                info!("{} layer {}", kind.label(), if shown { "shown" } else { "hidden" });
                            },
                        );
                    }

                    bar.spawn((
                        Text::new(""),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(theme.text_secondary),
                        Node {
                            margin: UiRect::left(Val::Auto),
                            ..default()
                        },
                        FrameReadout,
                    ));
                });

            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(theme.background_paper),
                ))
                .with_children(|row| {
                    spawn_scrubber(row, &theme, timeline.len());
                });
        })
        .id();
    layer_stack.push(UiLayer::Surface, root, &mut commands);

    let panel = spawn_info_panel(&mut commands, &themes, &settings);
    commands.entity(panel).insert(MapViewRoot);
    layer_stack.push(UiLayer::Panels, panel, &mut commands);

    commands.insert_resource(MapSurface {
        root,
        image_layer,
        marker_layer,
        view_bounds,
    });

    if let Some(current) = timeline.current() {
        changed.write(FrameChanged(current));
    }
}

fn update_play_label(
    playback: Res<Playback>,
    buttons: Query<&Children, With<GenericButton>>,
    mut labels: Query<&mut Text>,
) {
    if !playback.is_changed() {
        return;
    }
    // The play/pause button is the only one whose label alternates.
    let wanted = if playback.playing() { "Pause" } else { "Play" };
    for children in buttons.iter() {
        for child in children.iter() {
            if let Ok(mut text) = labels.get_mut(child) {
                if text.0 == "Pause" || text.0 == "Play" {
                    text.0 = wanted.to_string();
                }
            }
        }
    }
}

fn update_frame_readout(
    mut changed: EventReader<FrameChanged>,
    timeline: Res<FrameTimeline>,
    mut readouts: Query<&mut Text, With<FrameReadout>>,
) {
    let Some(FrameChanged(index)) = changed.read().last() else {
        return;
    };
    let Ok(frame) = timeline.get(*index) else {
        return;
    };
    let minutes_into_day = frame.timestamp_ms.rem_euclid(86_400_000) / 60_000;
    for mut text in readouts.iter_mut() {
        text.0 = format!(
            "Frame {}/{}  {:02}:{:02} UTC",
            index + 1,
            timeline.len(),
            minutes_into_day / 60,
            minutes_into_day % 60,
        );
    }
}

/// Clicking a station marker recenters the loop on that site. The timeline
/// reloads with station-scoped frames and every layer reprojects against the
/// new bounds on the next sync pass.
fn focus_station(
    mut clicks: EventReader<EntityClicked>,
    stations: Res<StationSnapshot>,
    config: Res<AppConfig>,
    mut settings: ResMut<Settings>,
    mut surface: ResMut<MapSurface>,
    mut timeline: ResMut<FrameTimeline>,
    mut changed: EventWriter<FrameChanged>,
) {
    for click in clicks.read() {
        if click.kind != LayerKind::Stations {
            continue;
        }
        let station = match find_station(&stations.0, &click.id) {
            Ok(station) => station,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        info!("Focusing on station {}", station.station_id);
        let frames = station_frames(
            station,
            config.map.frame_count,
            now_ms(),
            &config.paths.radar_ref_template,
        );
        if let Some(frame) = frames.first() {
            surface.view_bounds = frame.bounds;
        }
        settings.display_mode = DisplayMode::Station {
            station_id: station.station_id.clone(),
        };
        timeline.load(frames);
        if let Some(current) = timeline.current() {
            changed.write(FrameChanged(current));
        }
    }
}

fn teardown_map_view(
    mut commands: Commands,
    roots: Query<Entity, With<MapViewRoot>>,
    mut registry: ResMut<LayerRegistry>,
    mut timeline: ResMut<FrameTimeline>,
) {
    // Markers live under the root, so draining the registry only forgets
    // them; the despawn below reclaims the entities.
    registry.drain_all();
    timeline.load(Vec::new());
    for root in roots.iter() {
        commands.entity(root).despawn();
    }
    commands.remove_resource::<MapSurface>();
    commands.remove_resource::<Playback>();
}

pub struct MapViewPlugin;

impl Plugin for MapViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::MapView), setup_map_view)
            .add_systems(OnExit(AppState::MapView), teardown_map_view)
            .add_systems(
                Update,
                (
                    update_play_label.run_if(resource_exists::<Playback>),
                    update_frame_readout,
                    focus_station.run_if(resource_exists::<MapSurface>),
                )
                    .run_if(in_state(AppState::MapView)),
            );
    }
}
