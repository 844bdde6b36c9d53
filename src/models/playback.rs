// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback clock for the loaded video.
//!
//! Frames are never decoded here; the clock only tracks where playback
//! would be so cuts, seeks and the timeline have a position to work with.

use std::time::Instant;

/// Playback rates offered by the speed controls.
pub const SPEEDS: [f32; 9] = [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 8.0];
const NORMAL_SPEED_INDEX: usize = 3;

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    position_ms: u64,
    duration_ms: u64,
    playing: bool,
    speed_index: usize,
    last_tick: Option<Instant>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            playing: false,
            speed_index: NORMAL_SPEED_INDEX,
            last_tick: None,
        }
    }
}

impl PlaybackClock {
    /// Reset for a newly opened video.
    pub fn load(&mut self, duration_ms: u64) {
        *self = Self {
            duration_ms,
            speed_index: self.speed_index,
            ..Self::default()
        };
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f32 {
        SPEEDS[self.speed_index]
    }

    /// Advance the position by the wall-clock time since the previous tick.
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick.replace(now) {
            if self.playing {
                let elapsed = now.saturating_duration_since(last).as_secs_f64();
                let advance = (elapsed * 1000.0 * self.speed() as f64) as u64;
                self.position_ms = self.clamp(self.position_ms + advance);
                if self.duration_ms > 0 && self.position_ms >= self.duration_ms {
                    self.playing = false;
                }
            }
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    /// Update the duration once it is known, keeping the position.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.position_ms = self.clamp(self.position_ms);
    }

    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = self.clamp(position_ms);
    }

    /// Relative seek, clamped to `[0, duration]`.
    pub fn step(&mut self, delta_ms: i64) {
        let target = if delta_ms < 0 {
            self.position_ms.saturating_sub(delta_ms.unsigned_abs())
        } else {
            self.position_ms.saturating_add(delta_ms as u64)
        };
        self.seek(target);
    }

    pub fn faster(&mut self) {
        self.speed_index = (self.speed_index + 1).min(SPEEDS.len() - 1);
    }

    pub fn slower(&mut self) {
        self.speed_index = self.speed_index.saturating_sub(1);
    }

    /// Cycle through the speed ladder, wrapping to the slowest.
    pub fn cycle_speed(&mut self) {
        self.speed_index = (self.speed_index + 1) % SPEEDS.len();
    }

    fn clamp(&self, position_ms: u64) -> u64 {
        if self.duration_ms == 0 {
            position_ms
        } else {
            position_ms.min(self.duration_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_advances_only_while_playing() {
        let mut clock = PlaybackClock::default();
        clock.load(60_000);
        let t0 = Instant::now();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_secs(1));
        assert_eq!(clock.position_ms(), 0);

        clock.play();
        clock.tick(t0 + Duration::from_secs(3));
        assert_eq!(clock.position_ms(), 2_000);
    }

    #[test]
    fn test_speed_scales_advance_and_end_stops_playback() {
        let mut clock = PlaybackClock::default();
        clock.load(10_000);
        clock.faster();
        clock.faster();
        assert_eq!(clock.speed(), 2.0);

        let t0 = Instant::now();
        clock.play();
        clock.tick(t0);
        clock.tick(t0 + Duration::from_secs(2));
        assert_eq!(clock.position_ms(), 4_000);

        clock.tick(t0 + Duration::from_secs(10));
        assert_eq!(clock.position_ms(), 10_000);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_step_clamps_both_ends() {
        let mut clock = PlaybackClock::default();
        clock.load(20_000);
        clock.step(-5_000);
        assert_eq!(clock.position_ms(), 0);
        clock.step(25_000);
        assert_eq!(clock.position_ms(), 20_000);
        clock.step(-5_000);
        assert_eq!(clock.position_ms(), 15_000);
    }

    #[test]
    fn test_late_duration_keeps_position() {
        let mut clock = PlaybackClock::default();
        clock.seek(90_000);
        clock.set_duration(120_000);
        assert_eq!(clock.position_ms(), 90_000);
        clock.set_duration(60_000);
        assert_eq!(clock.position_ms(), 60_000);
    }

    #[test]
    fn test_speed_ladder_bounds_and_cycle() {
        let mut clock = PlaybackClock::default();
        for _ in 0..20 {
            clock.slower();
        }
        assert_eq!(clock.speed(), 0.25);
        for _ in 0..20 {
            clock.faster();
        }
        assert_eq!(clock.speed(), 8.0);
        clock.cycle_speed();
        assert_eq!(clock.speed(), 0.25);
    }
}
