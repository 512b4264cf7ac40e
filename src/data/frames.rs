use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Geographic rectangle in degrees. `north > south`, `east > west` for every
/// viewport this app renders (no antimeridian crossing in CONUS coverage).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Continental United States, the bounds the national mosaic ships with.
    pub fn national() -> Self {
        GeoBounds {
            north: 50.0,
            south: 25.0,
            east: -65.0,
            west: -125.0,
        }
    }

    pub fn around(latitude: f64, longitude: f64, half_span_deg: f64) -> Self {
        GeoBounds {
            north: latitude + half_span_deg,
            south: latitude - half_span_deg,
            east: longitude + half_span_deg,
            west: longitude - half_span_deg,
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude <= self.north
            && latitude >= self.south
            && longitude <= self.east
            && longitude >= self.west
    }
}

/// One time-stamped radar image and where it sits on the map. `image_ref` is
/// an opaque, already-resolved locator; `None` means the frame has nothing
/// renderable and the overlay skips it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameDescriptor {
    pub timestamp_ms: i64,
    pub index: usize,
    pub image_ref: Option<String>,
    pub bounds: GeoBounds,
    pub station_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("frame index {index} out of range for timeline of {len} frames")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered frame sequence plus the index currently shown. Replaced wholesale
/// by `load`; never mutated incrementally. An empty timeline has no current
/// index at all rather than an out-of-range one.
#[derive(Resource, Default)]
pub struct FrameTimeline {
    frames: Vec<FrameDescriptor>,
    current: Option<usize>,
}

impl FrameTimeline {
    /// Replaces the timeline and shows the most recent frame. Indices are
    /// reassigned to the dense `0..len` range; out-of-order timestamps are
    /// tolerated but flagged, since the feed contract says they are sorted.
    pub fn load(&mut self, mut frames: Vec<FrameDescriptor>) {
        for window in frames.windows(2) {
            if window[1].timestamp_ms < window[0].timestamp_ms {
                warn!("frame batch timestamps are not sorted, reordering");
                frames.sort_by_key(|frame| frame.timestamp_ms);
                break;
            }
        }
        for (index, frame) in frames.iter_mut().enumerate() {
            frame.index = index;
        }
        self.current = frames.len().checked_sub(1);
        self.frames = frames;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_frame(&self) -> Option<&FrameDescriptor> {
        self.current.and_then(|index| self.frames.get(index))
    }

    pub fn get(&self, index: usize) -> Result<&FrameDescriptor, TimelineError> {
        self.frames.get(index).ok_or(TimelineError::OutOfRange {
            index,
            len: self.frames.len(),
        })
    }

    /// Clamps into range and returns the index actually selected. No-op on an
    /// empty timeline.
    pub fn seek(&mut self, index: usize) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let clamped = index.min(self.frames.len() - 1);
        self.current = Some(clamped);
        Some(clamped)
    }

    /// Steps to the next frame, wrapping at the end. Returns the new index.
    pub fn advance(&mut self) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(current) => (current + 1) % self.frames.len(),
            None => 0,
        };
        self.current = Some(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(count: usize) -> Vec<FrameDescriptor> {
        (0..count)
            .map(|i| FrameDescriptor {
                timestamp_ms: 1_700_000_000_000 + i as i64 * 600_000,
                index: i,
                image_ref: Some(format!("radar/{i}.png")),
                bounds: GeoBounds::national(),
                station_id: None,
            })
            .collect()
    }

    #[test]
    fn load_shows_newest_frame_first() {
        let mut timeline = FrameTimeline::default();
        timeline.load(batch(8));
        assert_eq!(timeline.current(), Some(7));
        assert!(timeline.get(timeline.current().unwrap()).is_ok());
    }

    #[test]
    fn empty_timeline_has_no_current_index() {
        let mut timeline = FrameTimeline::default();
        timeline.load(Vec::new());
        assert_eq!(timeline.current(), None);
        assert!(timeline.current_frame().is_none());
        assert_eq!(timeline.advance(), None);
        assert_eq!(timeline.seek(3), None);
    }

    #[test]
    fn get_out_of_range_is_an_error_not_a_panic() {
        let mut timeline = FrameTimeline::default();
        timeline.load(batch(3));
        assert_eq!(
            timeline.get(3),
            Err(TimelineError::OutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn seek_clamps_to_last_frame() {
        let mut timeline = FrameTimeline::default();
        timeline.load(batch(10));
        assert_eq!(timeline.seek(500), Some(9));
        assert_eq!(timeline.seek(4), Some(4));
    }

    #[test]
    fn reload_with_fewer_frames_clamps_current() {
        let mut timeline = FrameTimeline::default();
        timeline.load(batch(100));
        timeline.seek(87);
        timeline.load(batch(10));
        assert_eq!(timeline.current(), Some(9));
        assert!(timeline.get(timeline.current().unwrap()).is_ok());
    }

    #[test]
    fn advance_wraps_around() {
        let mut timeline = FrameTimeline::default();
        timeline.load(batch(3));
        assert_eq!(timeline.current(), Some(2));
        assert_eq!(timeline.advance(), Some(0));
        assert_eq!(timeline.advance(), Some(1));
        assert_eq!(timeline.advance(), Some(2));
        assert_eq!(timeline.advance(), Some(0));
    }

    #[test]
    fn unsorted_batch_is_reordered_and_reindexed() {
        let mut frames = batch(4);
        frames.swap(0, 3);
        let mut timeline = FrameTimeline::default();
        timeline.load(frames);
        for i in 0..4 {
            let frame = timeline.get(i).unwrap();
            assert_eq!(frame.index, i);
            if i > 0 {
                assert!(frame.timestamp_ms >= timeline.get(i - 1).unwrap().timestamp_ms);
            }
        }
    }
}
