// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Periodic autosave timing.
//!
//! `AutoSaver` owns no thread. The UI loop polls it once per frame and saves
//! when [`AutoSaver::poll`] says so, then reports back with
//! [`AutoSaver::mark_saved`].

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct AutoSaver {
    interval: Duration,
    dirty: bool,
    enabled: bool,
    last_saved: Instant,
    /// Fingerprint of the state at the last save.
    last_fingerprint: Option<u64>,
}

impl AutoSaver {
    /// A zero interval disables autosave.
    pub fn new(interval_secs: u64, now: Instant) -> Self {
        log::debug!("Autosave every {} s", interval_secs);
        Self {
            interval: Duration::from_secs(interval_secs),
            dirty: false,
            enabled: interval_secs > 0,
            last_saved: now,
            last_fingerprint: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        log::info!("Autosave {}", if enabled { "enabled" } else { "disabled" });
        self.enabled = enabled;
    }

    /// Enabled, dirty and the interval has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled && self.dirty && now.duration_since(self.last_saved) >= self.interval
    }

    /// True when a save should happen now. The fingerprint is only computed
    /// once the timer is due; if nothing changed since the last save the
    /// timer restarts and the dirty flag is cleared.
    pub fn poll(&mut self, now: Instant, fingerprint: impl FnOnce() -> u64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        let current = fingerprint();
        if self.last_fingerprint == Some(current) {
            self.mark_saved(now, current);
            return false;
        }
        true
    }

    /// Record a successful save, manual or automatic.
    pub fn mark_saved(&mut self, now: Instant, fingerprint: u64) {
        self.dirty = false;
        self.last_saved = now;
        self.last_fingerprint = Some(fingerprint);
    }

    /// Push the next attempt out by one interval after a failed save.
    pub fn defer(&mut self, now: Instant) {
        self.last_saved = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_saver_never_fires() {
        let start = Instant::now();
        let mut saver = AutoSaver::new(60, start);
        assert!(!saver.poll(start + Duration::from_secs(3600), || 1));
    }

    #[test]
    fn test_fires_after_interval_when_dirty() {
        let start = Instant::now();
        let mut saver = AutoSaver::new(60, start);
        saver.mark_dirty();
        assert!(!saver.poll(start + Duration::from_secs(30), || 1));
        assert!(saver.poll(start + Duration::from_secs(60), || 1));

        saver.mark_saved(start + Duration::from_secs(60), 1);
        assert!(!saver.is_dirty());
        assert!(!saver.poll(start + Duration::from_secs(200), || 2));
    }

    #[test]
    fn test_unchanged_fingerprint_skips_the_save() {
        let start = Instant::now();
        let mut saver = AutoSaver::new(10, start);
        saver.mark_saved(start, 42);
        saver.mark_dirty();
        let later = start + Duration::from_secs(10);
        assert!(!saver.poll(later, || 42));
        assert!(!saver.is_dirty());

        saver.mark_dirty();
        assert!(saver.poll(later + Duration::from_secs(10), || 43));
    }

    #[test]
    fn test_zero_interval_disables() {
        let start = Instant::now();
        let mut saver = AutoSaver::new(0, start);
        saver.mark_dirty();
        assert!(!saver.poll(start + Duration::from_secs(1), || 1));
        saver.set_enabled(true);
        assert!(saver.poll(start + Duration::from_secs(1), || 1));
    }

    #[test]
    fn test_defer_restarts_the_timer() {
        let start = Instant::now();
        let mut saver = AutoSaver::new(10, start);
        saver.mark_dirty();
        saver.defer(start + Duration::from_secs(10));
        assert!(!saver.is_due(start + Duration::from_secs(15)));
        assert!(saver.is_due(start + Duration::from_secs(20)));
    }
}
