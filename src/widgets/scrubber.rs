use bevy::prelude::*;
use bevy::ui::RelativeCursorPosition;

use crate::data::FrameTimeline;
use crate::file::{Settings, Theme, Themes};
use crate::playback::{FrameChanged, SeekRequested};

const TRACK_HEIGHT: f32 = 8.0;
const THUMB_SIZE: f32 = 16.0;
const TICK_HEIGHT_MINOR: f32 = 6.0;
const TICK_HEIGHT_MAJOR: f32 = 12.0;
/// At most this many ticks, however long the loop is.
const MAX_TICKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubState {
    Idle,
    Hovering,
    Dragging { start_percent: f32 },
}

/// Scrubber model. `percent` is the committed position in 0..=100;
/// `last_seek` deduplicates seeks so a drag only emits when the mapped frame
/// index actually changes.
#[derive(Component)]
pub struct Scrubber {
    pub total: usize,
    pub state: ScrubState,
    pub percent: f32,
    pub preview_percent: Option<f32>,
    pub last_seek: Option<usize>,
}

impl Scrubber {
    pub fn new(total: usize) -> Self {
        Scrubber {
            total,
            state: ScrubState::Idle,
            percent: if total > 1 { 100.0 } else { 0.0 },
            preview_percent: None,
            last_seek: None,
        }
    }

    pub fn dragging(&self) -> bool {
        matches!(self.state, ScrubState::Dragging { .. })
    }

    /// Moves to `percent` and reports the frame index to seek to, if the
    /// mapped index differs from the last one reported.
    pub fn commit(&mut self, percent: f32) -> Option<usize> {
        self.percent = percent.clamp(0.0, 100.0);
        let index = percent_to_index(self.percent, self.total)?;
        if self.last_seek == Some(index) {
            return None;
        }
        self.last_seek = Some(index);
        Some(index)
    }

    /// Follows an externally caused frame change without re-emitting a seek.
    pub fn follow(&mut self, index: usize) {
        self.percent = index_to_percent(index, self.total);
        self.last_seek = Some(index);
    }
}

/// Nearest frame index for a track position. Linear over the full span, so
/// percent 0 is the first frame and percent 100 the last.
pub fn percent_to_index(percent: f32, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let span = (total - 1) as f32;
    let index = (percent.clamp(0.0, 100.0) / 100.0 * span).round() as usize;
    Some(index.min(total - 1))
}

pub fn index_to_percent(index: usize, total: usize) -> f32 {
    if total < 2 {
        return 0.0;
    }
    (index.min(total - 1) as f32) / ((total - 1) as f32) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub index: usize,
    pub percent: f32,
    pub major: bool,
}

/// Evenly strided tick positions. The stride grows with the loop length to
/// keep the tick count near `MAX_TICKS`; every fifth tick is major.
pub fn tick_marks(total: usize) -> Vec<TickMark> {
    if total == 0 {
        return Vec::new();
    }
    let step = (total / MAX_TICKS).max(1);
    (0..total)
        .step_by(step)
        .enumerate()
        .map(|(n, index)| TickMark {
            index,
            percent: index_to_percent(index, total),
            major: n % 5 == 0,
        })
        .collect()
}

#[derive(Component)]
pub struct ScrubberFill;

#[derive(Component)]
pub struct ScrubberThumb;

/// Thin line marking the hovered track position before a press commits it.
#[derive(Component)]
pub struct ScrubberPreview;

/// Tick container; `total` records the loop length the ticks were built for.
#[derive(Component)]
pub struct ScrubberTicks {
    pub total: usize,
}

/// Spawns the scrubber track with its fill, thumb, and tick children, and
/// wires the pointer observers. Returns the track entity.
pub fn spawn_scrubber(
    commands: &mut ChildSpawnerCommands,
    theme: &Theme,
    total: usize,
) -> Entity {
    let track = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(THUMB_SIZE + TICK_HEIGHT_MAJOR),
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(theme.track),
            BorderRadius::all(Val::Px(TRACK_HEIGHT / 2.0)),
            RelativeCursorPosition::default(),
            Scrubber::new(total),
        ))
        .id();

    commands
        .commands()
        .entity(track)
        .with_children(|track_children| {
            track_children.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(0.0),
                    width: Val::Percent(0.0),
                    height: Val::Px(TRACK_HEIGHT),
                    ..default()
                },
                BackgroundColor(theme.track_fill),
                BorderRadius::all(Val::Px(TRACK_HEIGHT / 2.0)),
                Pickable::IGNORE,
                ScrubberFill,
            ));
            track_children.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(0.0),
                    width: Val::Px(THUMB_SIZE),
                    height: Val::Px(THUMB_SIZE),
                    margin: UiRect::left(Val::Px(-THUMB_SIZE / 2.0)),
                    ..default()
                },
                BackgroundColor(theme.primary),
                BorderRadius::MAX,
                Pickable::IGNORE,
                ScrubberThumb,
            ));
            track_children.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(0.0),
                    width: Val::Px(2.0),
                    height: Val::Px(THUMB_SIZE),
                    display: Display::None,
                    ..default()
                },
                BackgroundColor(theme.accent.with_alpha(0.7)),
                Pickable::IGNORE,
                ScrubberPreview,
            ));
            track_children.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(0.0),
                    top: Val::Px(THUMB_SIZE),
                    width: Val::Percent(100.0),
                    height: Val::Px(TICK_HEIGHT_MAJOR),
                    ..default()
                },
                Pickable::IGNORE,
                ScrubberTicks { total: 0 },
            ));
        });

    register_observers(track, &mut commands.commands_mut());
    track
}

fn register_observers(track: Entity, commands: &mut Commands) {
    commands
        .entity(track)
        .observe(
            |mut trigger: Trigger<Pointer<Press>>,
             mut scrubbers: Query<(&mut Scrubber, &RelativeCursorPosition)>,
             mut seeks: EventWriter<SeekRequested>| {
                let Ok((mut scrubber, cursor)) = scrubbers.get_mut(trigger.target()) else {
                    return;
                };
                let Some(normalized) = cursor.normalized else {
                    return;
                };
                let percent = (normalized.x * 100.0).clamp(0.0, 100.0);
                scrubber.state = ScrubState::Dragging {
                    start_percent: percent,
                };
                if let Some(index) = scrubber.commit(percent) {
                    seeks.write(SeekRequested(index));
                }
                trigger.propagate(false);
            },
        )
        .observe(
            |trigger: Trigger<Pointer<Drag>>,
             mut scrubbers: Query<(&mut Scrubber, &ComputedNode)>,
             mut seeks: EventWriter<SeekRequested>| {
                let Ok((mut scrubber, computed)) = scrubbers.get_mut(trigger.target()) else {
                    return;
                };
                let ScrubState::Dragging { start_percent } = scrubber.state else {
                    return;
                };
                let track_width = computed.size().x * computed.inverse_scale_factor();
                if track_width <= 0.0 {
                    return;
                }
                let delta_percent = trigger.event().distance.x / track_width * 100.0;
                if let Some(index) = scrubber.commit(start_percent + delta_percent) {
                    seeks.write(SeekRequested(index));
                }
            },
        )
        .observe(
            |trigger: Trigger<Pointer<DragEnd>>, mut scrubbers: Query<&mut Scrubber>| {
                if let Ok(mut scrubber) = scrubbers.get_mut(trigger.target()) {
                    scrubber.state = ScrubState::Idle;
                }
            },
        )
        .observe(
            |trigger: Trigger<Pointer<Over>>, mut scrubbers: Query<&mut Scrubber>| {
                if let Ok(mut scrubber) = scrubbers.get_mut(trigger.target()) {
                    if !scrubber.dragging() {
                        scrubber.state = ScrubState::Hovering;
                    }
                }
            },
        )
        .observe(
            |trigger: Trigger<Pointer<Move>>,
             mut scrubbers: Query<(&mut Scrubber, &RelativeCursorPosition)>| {
                let Ok((mut scrubber, cursor)) = scrubbers.get_mut(trigger.target()) else {
                    return;
                };
                if let Some(normalized) = cursor.normalized {
                    scrubber.preview_percent = Some((normalized.x * 100.0).clamp(0.0, 100.0));
                }
            },
        )
        .observe(
            |trigger: Trigger<Pointer<Out>>, mut scrubbers: Query<&mut Scrubber>| {
                if let Ok(mut scrubber) = scrubbers.get_mut(trigger.target()) {
                    scrubber.preview_percent = None;
                    if !scrubber.dragging() {
                        scrubber.state = ScrubState::Idle;
                    }
                }
            },
        );
}

/// Keeps the scrubber tracking playback. Skipped while the user drags so the
/// thumb does not fight the pointer.
pub fn follow_timeline(
    timeline: Res<FrameTimeline>,
    mut changed: EventReader<FrameChanged>,
    mut scrubbers: Query<&mut Scrubber>,
) {
    let last = changed.read().last().map(|FrameChanged(index)| *index);
    for mut scrubber in scrubbers.iter_mut() {
        if scrubber.total != timeline.len() {
            scrubber.total = timeline.len();
            scrubber.last_seek = None;
            if let Some(current) = timeline.current() {
                scrubber.follow(current);
            }
            continue;
        }
        if scrubber.dragging() {
            continue;
        }
        if let Some(index) = last {
            scrubber.follow(index);
        }
    }
}

pub fn render_scrubber(
    scrubbers: Query<(&Scrubber, &Children), Changed<Scrubber>>,
    mut fills: Query<
        &mut Node,
        (With<ScrubberFill>, Without<ScrubberThumb>, Without<ScrubberPreview>),
    >,
    mut thumbs: Query<
        &mut Node,
        (With<ScrubberThumb>, Without<ScrubberFill>, Without<ScrubberPreview>),
    >,
    mut previews: Query<
        &mut Node,
        (With<ScrubberPreview>, Without<ScrubberFill>, Without<ScrubberThumb>),
    >,
) {
    for (scrubber, children) in scrubbers.iter() {
        for child in children.iter() {
            if let Ok(mut node) = fills.get_mut(child) {
                node.width = Val::Percent(scrubber.percent);
            }
            if let Ok(mut node) = thumbs.get_mut(child) {
                node.left = Val::Percent(scrubber.percent);
            }
            if let Ok(mut node) = previews.get_mut(child) {
                match scrubber.preview_percent {
                    Some(percent) if !scrubber.dragging() => {
                        node.left = Val::Percent(percent);
                        node.display = Display::Flex;
                    }
                    _ => {
                        node.display = Display::None;
                    }
                }
            }
        }
    }
}

/// Rebuilds tick children when the loop length changes.
pub fn rebuild_ticks(
    mut commands: Commands,
    scrubbers: Query<(&Scrubber, &Children), Changed<Scrubber>>,
    mut containers: Query<(Entity, &mut ScrubberTicks)>,
    themes: Res<Themes>,
    settings: Res<Settings>,
) {
    let Some(theme) = themes.get(&settings.start_theme) else {
        return;
    };
    for (scrubber, children) in scrubbers.iter() {
        for child in children.iter() {
            let Ok((container, mut ticks)) = containers.get_mut(child) else {
                continue;
            };
            if ticks.total == scrubber.total {
                continue;
            }
            ticks.total = scrubber.total;

            commands.entity(container).despawn_related::<Children>();
            commands.entity(container).with_children(|tick_children| {
                for mark in tick_marks(scrubber.total) {
                    let height = if mark.major {
                        TICK_HEIGHT_MAJOR
                    } else {
                        TICK_HEIGHT_MINOR
                    };
                    tick_children.spawn((
                        Node {
                            position_type: PositionType::Absolute,
                            left: Val::Percent(mark.percent),
                            top: Val::Px(0.0),
                            width: Val::Px(1.0),
                            height: Val::Px(height),
                            ..default()
                        },
                        BackgroundColor(theme.divider),
                        Pickable::IGNORE,
                    ));
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_first_and_last_frame() {
        assert_eq!(percent_to_index(0.0, 100), Some(0));
        assert_eq!(percent_to_index(100.0, 100), Some(99));
        assert_eq!(percent_to_index(50.0, 3), Some(1));
        assert_eq!(percent_to_index(42.0, 0), None);
    }

    #[test]
    fn index_and_percent_round_trip() {
        for total in [2usize, 3, 50, 100, 250] {
            for index in [0, total / 2, total - 1] {
                let percent = index_to_percent(index, total);
                assert_eq!(percent_to_index(percent, total), Some(index));
            }
        }
    }

    #[test]
    fn single_frame_timeline_pins_to_zero() {
        assert_eq!(index_to_percent(0, 1), 0.0);
        assert_eq!(percent_to_index(73.0, 1), Some(0));
    }

    #[test]
    fn drag_sweep_emits_strictly_increasing_seeks() {
        let mut scrubber = Scrubber::new(100);
        scrubber.state = ScrubState::Dragging { start_percent: 0.0 };

        let mut seeks = Vec::new();
        let mut percent = 0.0;
        while percent <= 100.0 {
            if let Some(index) = scrubber.commit(percent) {
                seeks.push(index);
            }
            percent += 0.1;
        }

        assert_eq!(seeks.first(), Some(&0));
        assert_eq!(seeks.last(), Some(&99));
        for pair in seeks.windows(2) {
            assert!(pair[1] > pair[0], "seek went backwards: {pair:?}");
        }
    }

    #[test]
    fn holding_still_emits_no_duplicate_seeks() {
        let mut scrubber = Scrubber::new(50);
        assert_eq!(scrubber.commit(40.0), Some(20));
        assert_eq!(scrubber.commit(40.0), None);
        assert_eq!(scrubber.commit(40.4), None);
    }

    #[test]
    fn tick_stride_follows_the_loop_length() {
        for total in [50usize, 100, 250] {
            let step = (total / MAX_TICKS).max(1);
            let marks = tick_marks(total);
            assert_eq!(marks.len(), total.div_ceil(step), "{total} frames");
            assert_eq!(marks[0].index, 0);
            assert_eq!(marks[1].index, step);
            assert!(marks[0].major);
            assert!(marks.iter().skip(1).take(4).all(|m| !m.major));
            assert!(marks.get(5).is_none_or(|m| m.major));
        }
    }

    #[test]
    fn short_loops_tick_every_frame() {
        let marks = tick_marks(12);
        assert_eq!(marks.len(), 12);
        assert_eq!(marks[11].percent, 100.0);
    }
}
