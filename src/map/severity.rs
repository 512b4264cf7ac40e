use bevy::prelude::*;

use crate::data::{threat_level, ThreatLevel, WeatherKind};

/// How a marker should look, computed purely from the datum. Rendering reads
/// this verbatim; no visual decisions live anywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVisual {
    pub diameter: f32,
    pub color: Color,
    pub opacity: f32,
    /// Pulses per second for the attention animation. Zero means static.
    pub pulse_rate_hz: f32,
}

const THREAT_COLORS: [Color; 4] = [
    Color::srgb(0.35, 0.75, 0.35), // minimal, green
    Color::srgb(0.95, 0.85, 0.25), // low, yellow
    Color::srgb(0.95, 0.55, 0.15), // moderate, orange
    Color::srgb(0.9, 0.15, 0.15),  // high, red
];

/// Storm cell appearance from tornado probability 0..=100. Every channel is
/// monotone in the probability: a stronger cell is never drawn smaller,
/// fainter, or slower-pulsing than a weaker one.
pub fn storm_cell_visual(tornado_probability: u8) -> MarkerVisual {
    let p = tornado_probability.min(100) as f32 / 100.0;
    let level = threat_level(tornado_probability);
    MarkerVisual {
        diameter: 14.0 + 22.0 * p,
        color: THREAT_COLORS[level as usize],
        opacity: 0.55 + 0.45 * p,
        pulse_rate_hz: match level {
            ThreatLevel::Minimal | ThreatLevel::Low => 0.0,
            ThreatLevel::Moderate => 1.0,
            ThreatLevel::High => 2.5,
        },
    }
}

/// Tornado alert appearance from severity 1..=5.
pub fn tornado_visual(severity: u8) -> MarkerVisual {
    let s = severity.clamp(1, 5) as f32;
    MarkerVisual {
        diameter: 20.0 + 6.0 * s,
        color: Color::srgb(0.6 + 0.08 * s, 0.1, 0.1),
        opacity: 0.7 + 0.06 * s,
        pulse_rate_hz: 0.5 * s,
    }
}

/// Weather marker appearance from intensity 0..=100.
pub fn weather_visual(kind: WeatherKind, intensity: u8) -> MarkerVisual {
    let i = intensity.min(100) as f32 / 100.0;
    let color = match kind {
        WeatherKind::Lightning => Color::srgb(0.95, 0.9, 0.3),
        WeatherKind::Hail => Color::srgb(0.6, 0.8, 0.95),
        WeatherKind::Wind => Color::srgb(0.6, 0.95, 0.7),
        WeatherKind::Precipitation => Color::srgb(0.3, 0.55, 0.95),
    };
    MarkerVisual {
        diameter: 8.0 + 10.0 * i,
        color,
        opacity: 0.5 + 0.5 * i,
        pulse_rate_hz: 0.0,
    }
}

/// Station dots are small and steady; offline sites are greyed out.
pub fn station_visual(status: &str) -> MarkerVisual {
    let operational = status == "operational";
    MarkerVisual {
        diameter: 10.0,
        color: if operational {
            Color::srgb(0.25, 0.65, 0.95)
        } else {
            Color::srgb(0.45, 0.45, 0.45)
        },
        opacity: if operational { 0.9 } else { 0.5 },
        pulse_rate_hz: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_cell_channels_are_monotone_in_probability() {
        for p in 1..=100u8 {
            let lo = storm_cell_visual(p - 1);
            let hi = storm_cell_visual(p);
            assert!(hi.diameter >= lo.diameter, "diameter fell at p={p}");
            assert!(hi.opacity >= lo.opacity, "opacity fell at p={p}");
            assert!(hi.pulse_rate_hz >= lo.pulse_rate_hz, "pulse fell at p={p}");
        }
    }

    #[test]
    fn tornado_channels_are_monotone_in_severity() {
        for s in 2..=5u8 {
            let lo = tornado_visual(s - 1);
            let hi = tornado_visual(s);
            assert!(hi.diameter >= lo.diameter);
            assert!(hi.opacity >= lo.opacity);
            assert!(hi.pulse_rate_hz > lo.pulse_rate_hz);
        }
    }

    #[test]
    fn threat_color_changes_exactly_at_the_thresholds() {
        assert_eq!(storm_cell_visual(19).color, storm_cell_visual(0).color);
        assert_ne!(storm_cell_visual(20).color, storm_cell_visual(19).color);
        assert_ne!(storm_cell_visual(40).color, storm_cell_visual(39).color);
        assert_ne!(storm_cell_visual(71).color, storm_cell_visual(70).color);
        assert_eq!(storm_cell_visual(100).color, storm_cell_visual(71).color);
    }

    #[test]
    fn offline_stations_are_dimmed() {
        let up = station_visual("operational");
        let down = station_visual("offline");
        assert!(down.opacity < up.opacity);
        assert_ne!(up.color, down.color);
    }
}
