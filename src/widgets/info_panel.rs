use bevy::prelude::*;

use crate::data::{
    threat_level, LayerKind, StationSnapshot, StormCellSnapshot, TornadoEventSnapshot,
    WeatherKind, WeatherMarkerSnapshot,
};
use crate::file::{Settings, Themes};
use crate::map::{EntityHovered, EntityLeft};

/// Minimum clearance between the panel and every viewport edge.
pub const PANEL_MARGIN: f32 = 20.0;
/// Where the panel sits below the anchor after a flip.
const FLIP_OFFSET: f32 = 40.0;
/// Gap between the anchor and the panel's bottom edge when above.
const ANCHOR_GAP: f32 = 20.0;

pub const PANEL_WIDTH: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    pub left: f32,
    pub top: f32,
    pub flipped: bool,
}

/// Positions a panel of size `panel` near `anchor` inside `viewport`. Centers
/// horizontally on the anchor, clamped to the margins with the left edge
/// winning when the panel is wider than the viewport allows. Prefers sitting
/// above the anchor; flips below when above would breach the top margin.
pub fn place(anchor: Vec2, panel: Vec2, viewport: Vec2) -> PanelPlacement {
    let left = (anchor.x - panel.x / 2.0)
        .min(viewport.x - PANEL_MARGIN - panel.x)
        .max(PANEL_MARGIN);

    let above = anchor.y - panel.y - ANCHOR_GAP;
    if above < PANEL_MARGIN {
        PanelPlacement {
            left,
            top: anchor.y + FLIP_OFFSET,
            flipped: true,
        }
    } else {
        PanelPlacement {
            left,
            top: above,
            flipped: false,
        }
    }
}

#[derive(Component)]
pub struct InfoPanel;

#[derive(Component)]
pub struct InfoPanelTitle;

#[derive(Component)]
pub struct InfoPanelBody;

/// Spawns the hidden floating panel. It ignores the pointer entirely, so it
/// can never occlude the marker that opened it into an Out event.
pub fn spawn_info_panel(commands: &mut Commands, themes: &Themes, settings: &Settings) -> Entity {
    let theme = themes
        .get(&settings.start_theme)
        .unwrap_or_else(|| panic!("Theme '{}' not found", settings.start_theme));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Px(PANEL_WIDTH),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                border: UiRect::all(Val::Px(1.0)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(theme.background_paper.with_alpha(0.95)),
            BorderColor::all(theme.divider),
            BorderRadius::all(Val::Px(6.0)),
            Pickable::IGNORE,
            InfoPanel,
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(theme.text_primary),
                InfoPanelTitle,
            ));
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(theme.text_secondary),
                InfoPanelBody,
            ));
        })
        .id()
}

fn weather_label(kind: WeatherKind) -> &'static str {
    match kind {
        WeatherKind::Lightning => "Lightning",
        WeatherKind::Hail => "Hail",
        WeatherKind::Wind => "Wind",
        WeatherKind::Precipitation => "Precipitation",
    }
}

fn panel_text(
    kind: LayerKind,
    id: &str,
    stations: &StationSnapshot,
    cells: &StormCellSnapshot,
    events: &TornadoEventSnapshot,
    weather: &WeatherMarkerSnapshot,
) -> Option<(String, String)> {
    match kind {
        LayerKind::Stations => {
            let station = stations.0.iter().find(|s| s.station_id == id)?;
            Some((
                format!("{} ({})", station.name, station.station_id),
                format!(
                    "{}, {}\n{:.3}, {:.3}\nElevation {} m\nStatus: {}",
                    station.name,
                    station.state,
                    station.latitude,
                    station.longitude,
                    station.elevation_m,
                    station.status
                ),
            ))
        }
        LayerKind::StormCells => {
            let cell = cells.0.iter().find(|c| c.id == id)?;
            Some((
                format!("Storm cell {}", cell.id),
                format!(
                    "Tornado probability: {}% ({:?})\nPredicted: {}\nConfidence: {}%\nMovement: {:.0}\u{00b0} at {:.0} kt",
                    cell.tornado_probability,
                    threat_level(cell.tornado_probability),
                    cell.predicted_ef_scale,
                    cell.confidence,
                    cell.movement_deg,
                    cell.movement_kts
                ),
            ))
        }
        LayerKind::TornadoEvents => {
            let event = events.0.iter().find(|e| e.id == id)?;
            Some((
                format!("{:?}: severity {}/5", event.alert_kind, event.severity),
                format!("{}\nConfidence: {}%", event.message, event.confidence),
            ))
        }
        LayerKind::WeatherMarkers => {
            let marker = weather.0.iter().find(|m| m.id == id)?;
            Some((
                weather_label(marker.kind).to_string(),
                format!(
                    "Intensity: {}%\n{:.3}, {:.3}",
                    marker.intensity, marker.latitude, marker.longitude
                ),
            ))
        }
        LayerKind::FrameOverlay => None,
    }
}

/// Fills and repositions the panel on hover, hides it on leave. Runs every
/// hover move, so the panel tracks the cursor along a marker.
pub fn update_info_panel(
    mut hovered: EventReader<EntityHovered>,
    mut left: EventReader<EntityLeft>,
    windows: Query<&Window>,
    mut panels: Query<(&mut Node, &ComputedNode, &Children), With<InfoPanel>>,
    mut titles: Query<&mut Text, (With<InfoPanelTitle>, Without<InfoPanelBody>)>,
    mut bodies: Query<&mut Text, (With<InfoPanelBody>, Without<InfoPanelTitle>)>,
    stations: Res<StationSnapshot>,
    cells: Res<StormCellSnapshot>,
    events: Res<TornadoEventSnapshot>,
    weather: Res<WeatherMarkerSnapshot>,
) {
    let Ok((mut node, computed, children)) = panels.single_mut() else {
        return;
    };

    if left.read().last().is_some() && hovered.is_empty() {
        node.display = Display::None;
        return;
    }

    let Some(hover) = hovered.read().last() else {
        return;
    };
    let Some((title, body)) =
        panel_text(hover.kind, &hover.id, &stations, &cells, &events, &weather)
    else {
        return;
    };

    for child in children.iter() {
        if let Ok(mut text) = titles.get_mut(child) {
            text.0 = title.clone();
        }
        if let Ok(mut text) = bodies.get_mut(child) {
            text.0 = body.clone();
        }
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Vec2::new(window.width(), window.height());
    let mut panel_size = computed.size() * computed.inverse_scale_factor();
    if panel_size.x <= 0.0 {
        // First show, before layout has run once.
        panel_size = Vec2::new(PANEL_WIDTH, 120.0);
    }

    let placement = place(hover.screen, panel_size, viewport);
    node.left = Val::Px(placement.left);
    node.top = Val::Px(placement.top);
    node.display = Display::Flex;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_the_top_edge_flips_below_the_anchor() {
        let placement = place(Vec2::new(10.0, 10.0), Vec2::new(260.0, 200.0), Vec2::new(1000.0, 800.0));
        assert!(placement.flipped);
        assert_eq!(placement.top, 50.0);
        assert_eq!(placement.left, PANEL_MARGIN);
    }

    #[test]
    fn mid_viewport_sits_centered_above() {
        let placement = place(Vec2::new(500.0, 500.0), Vec2::new(260.0, 200.0), Vec2::new(1000.0, 800.0));
        assert!(!placement.flipped);
        assert_eq!(placement.left, 370.0);
        assert_eq!(placement.top, 500.0 - 200.0 - ANCHOR_GAP);
    }

    #[test]
    fn right_edge_clamps_before_left_edge() {
        let placement = place(Vec2::new(990.0, 400.0), Vec2::new(260.0, 150.0), Vec2::new(1000.0, 800.0));
        assert_eq!(placement.left, 1000.0 - PANEL_MARGIN - 260.0);
    }

    #[test]
    fn wider_than_viewport_pins_to_the_left_margin() {
        let placement = place(Vec2::new(200.0, 400.0), Vec2::new(600.0, 150.0), Vec2::new(500.0, 800.0));
        assert_eq!(placement.left, PANEL_MARGIN);
    }
}
