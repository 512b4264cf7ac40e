use bevy::prelude::*;
use std::time::Duration;

use crate::data::FrameTimeline;
use crate::file::config::{ConfigError, MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::states::AppState;

/// Drives the radar loop. Owns the single repeating timer; changing speed
/// rebuilds the timer in place, so there is never a stale one still firing.
#[derive(Resource)]
pub struct Playback {
    playing: bool,
    interval: Duration,
    timer: Timer,
}

impl Playback {
    pub fn new(interval: Duration) -> Self {
        Playback {
            playing: false,
            interval,
            timer: Timer::new(interval, TimerMode::Repeating),
        }
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the loop from a fresh timer. Already playing is a no-op, a
    /// second press never stacks another cadence on top.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.timer.reset();
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Applies a new frame interval, keeping play/pause state. Out-of-range
    /// values leave the current timer untouched.
    pub fn set_speed(&mut self, interval_ms: u64) -> Result<Duration, ConfigError> {
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval_ms) {
            return Err(ConfigError::IntervalOutOfRange(interval_ms));
        }
        self.interval = Duration::from_millis(interval_ms);
        self.timer = Timer::new(self.interval, TimerMode::Repeating);
        Ok(self.interval)
    }

    /// Advances the clock and reports how many frame steps elapsed. Paused
    /// playback consumes no time, so resuming starts a full interval out.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if !self.playing {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

/// The shown frame index moved, whatever caused it.
#[derive(Message)]
pub struct FrameChanged(pub usize);

/// A jump to an absolute frame index, from the scrubber or anything else.
#[derive(Message)]
pub struct SeekRequested(pub usize);

#[derive(Message)]
pub struct SpeedChanged(pub Duration);

fn tick_playback(
    time: Res<Time>,
    mut playback: ResMut<Playback>,
    mut timeline: ResMut<FrameTimeline>,
    mut changed: EventWriter<FrameChanged>,
) {
    let steps = playback.advance(time.delta());
    for _ in 0..steps {
        if let Some(index) = timeline.advance() {
            changed.write(FrameChanged(index));
        }
    }
}

fn apply_seeks(
    mut seeks: EventReader<SeekRequested>,
    mut timeline: ResMut<FrameTimeline>,
    mut changed: EventWriter<FrameChanged>,
) {
    for seek in seeks.read() {
        let before = timeline.current();
        if let Some(index) = timeline.seek(seek.0) {
            if before != Some(index) {
                changed.write(FrameChanged(index));
            }
        }
    }
}

fn apply_speed_changes(mut playback: ResMut<Playback>, mut changes: EventReader<SpeedChanged>) {
    for change in changes.read() {
        match playback.set_speed(change.0.as_millis() as u64) {
            Ok(interval) => info!("Playback interval set to {}ms", interval.as_millis()),
            Err(e) => warn!("Rejected playback speed: {e}"),
        }
    }
}

pub struct PlaybackPlugin;

impl Plugin for PlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameTimeline>()
            .add_event::<FrameChanged>()
            .add_event::<SeekRequested>()
            .add_event::<SpeedChanged>()
            .add_systems(
                Update,
                (apply_seeks, apply_speed_changes, tick_playback)
                    .chain()
                    .run_if(in_state(AppState::MapView))
                    .run_if(resource_exists::<Playback>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_SECOND: Duration = Duration::from_millis(500);

    fn playing(interval: Duration) -> Playback {
        let mut playback = Playback::new(interval);
        playback.play();
        playback
    }

    #[test]
    fn paused_playback_never_steps() {
        let mut playback = Playback::new(HALF_SECOND);
        assert_eq!(playback.advance(Duration::from_secs(30)), 0);
    }

    #[test]
    fn steps_accumulate_across_long_deltas() {
        let mut playback = playing(HALF_SECOND);
        assert_eq!(playback.advance(Duration::from_millis(499)), 0);
        assert_eq!(playback.advance(Duration::from_millis(1)), 1);
        assert_eq!(playback.advance(Duration::from_millis(1750)), 3);
    }

    #[test]
    fn pause_cancels_the_cadence() {
        let mut playback = playing(HALF_SECOND);
        playback.advance(Duration::from_millis(499));
        playback.pause();
        assert_eq!(playback.advance(HALF_SECOND * 4), 0);
        // Resuming starts over rather than firing from leftover elapsed time.
        playback.play();
        assert_eq!(playback.advance(Duration::from_millis(499)), 0);
        assert_eq!(playback.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn double_play_does_not_stack_timers() {
        let mut playback = playing(HALF_SECOND);
        playback.advance(Duration::from_millis(300));
        playback.play();
        // Second play is a no-op: one cadence keeps running, nothing doubles.
        assert_eq!(playback.advance(Duration::from_millis(200)), 1);
        assert_eq!(playback.advance(HALF_SECOND), 1);
    }

    #[test]
    fn set_speed_replaces_the_single_timer() {
        let mut playback = playing(HALF_SECOND);
        for ms in [100, 2000, 300, 900, 150, 1200, 250, 1000, 400, 700] {
            playback.set_speed(ms).unwrap();
        }
        assert_eq!(playback.interval(), Duration::from_millis(700));
        assert_eq!(playback.advance(Duration::from_millis(700)), 1);
        assert_eq!(playback.advance(Duration::from_millis(699)), 0);
    }

    #[test]
    fn out_of_range_speed_keeps_prior_interval() {
        let mut playback = Playback::new(HALF_SECOND);
        assert_eq!(
            playback.set_speed(50),
            Err(ConfigError::IntervalOutOfRange(50))
        );
        assert_eq!(
            playback.set_speed(5000),
            Err(ConfigError::IntervalOutOfRange(5000))
        );
        assert_eq!(playback.interval(), HALF_SECOND);
    }
}
