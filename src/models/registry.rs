// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Clip registry: per-category clip lists plus the armed-cut map.
//!
//! The registry is the single source of truth for cut state. Button presses,
//! hotkeys and the global mark-start/mark-end keys all go through
//! [`ClipRegistry::press`], and the timeline segments are a projection that
//! is kept in step with every mutation.

use super::button::{ButtonDefinition, CutType};
use super::clip::{Clip, TimelineMark, TimelineSegment};
use super::cut::{CutState, Transition};
use crate::error::CutError;
use std::collections::{BTreeSet, HashMap};

/// A button together with the clips it produced, in creation order.
#[derive(Debug, Clone)]
pub struct CategoryClips {
    pub button: ButtonDefinition,
    pub clips: Vec<Clip>,
}

/// Result of a successful press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutOutcome {
    Armed { category: String, start_ms: u64 },
    Created(Clip),
}

#[derive(Debug, Clone, Default)]
pub struct ClipRegistry {
    categories: Vec<CategoryClips>,
    armed: HashMap<String, u64>,
    segments: Vec<TimelineSegment>,
}

impl ClipRegistry {
    pub fn new(buttons: Vec<ButtonDefinition>) -> Self {
        Self {
            categories: buttons
                .into_iter()
                .map(|button| CategoryClips {
                    button,
                    clips: Vec::new(),
                })
                .collect(),
            armed: HashMap::new(),
            segments: Vec::new(),
        }
    }

    pub fn categories(&self) -> &[CategoryClips] {
        &self.categories
    }

    pub fn buttons(&self) -> Vec<ButtonDefinition> {
        self.categories.iter().map(|c| c.button.clone()).collect()
    }

    pub fn button(&self, category: &str) -> Option<&ButtonDefinition> {
        self.category(category).map(|c| &c.button)
    }

    pub fn button_for_hotkey(&self, key: char) -> Option<&ButtonDefinition> {
        let key = key.to_ascii_uppercase();
        self.categories
            .iter()
            .map(|c| &c.button)
            .find(|b| b.hotkey.to_ascii_uppercase() == key)
    }

    pub fn clips(&self, category: &str) -> &[Clip] {
        self.category(category)
            .map(|c| c.clips.as_slice())
            .unwrap_or(&[])
    }

    /// Every clip, category by category in button order.
    pub fn all_clips(&self) -> Vec<Clip> {
        self.categories
            .iter()
            .flat_map(|c| c.clips.iter().cloned())
            .collect()
    }

    pub fn total_clips(&self) -> usize {
        self.categories.iter().map(|c| c.clips.len()).sum()
    }

    /// Clip count per category, in button order.
    pub fn stats(&self) -> Vec<(String, usize)> {
        self.categories
            .iter()
            .map(|c| (c.button.name.clone(), c.clips.len()))
            .collect()
    }

    pub fn state(&self, category: &str) -> CutState {
        match self.armed.get(category) {
            Some(&start_ms) => CutState::Armed { start_ms },
            None => CutState::Idle,
        }
    }

    pub fn is_armed(&self, category: &str) -> bool {
        self.armed.contains_key(category)
    }

    pub fn segments(&self) -> &[TimelineSegment] {
        &self.segments
    }

    /// Start positions of pending manual cuts, in button order.
    pub fn marks(&self) -> Vec<TimelineMark> {
        self.categories
            .iter()
            .filter_map(|c| {
                self.armed.get(&c.button.name).map(|&position_ms| TimelineMark {
                    position_ms,
                    color: c.button.fill_color.clone(),
                })
            })
            .collect()
    }

    /// Apply one button press at `position_ms`.
    pub fn press(&mut self, category: &str, position_ms: u64) -> Result<CutOutcome, CutError> {
        let button = self
            .button(category)
            .ok_or_else(|| CutError::UnknownCategory(category.to_string()))?;
        let transition = button
            .cut_type
            .press(self.state(category), position_ms, button.auto_duration_ms);

        // Any armed start is consumed by this press whatever the outcome.
        self.armed.remove(category);

        match transition {
            Transition::Arm { start_ms } => {
                self.armed.insert(category.to_string(), start_ms);
                log::info!("Armed cut for {} at {} ms", category, start_ms);
                Ok(CutOutcome::Armed {
                    category: category.to_string(),
                    start_ms,
                })
            }
            Transition::Emit { start_ms, end_ms } => {
                let clip = self.record(category, start_ms, end_ms)?;
                Ok(CutOutcome::Created(clip))
            }
            Transition::Reject { start_ms, end_ms } => {
                log::warn!(
                    "Rejected cut for {}: end {} ms is not after start {} ms",
                    category,
                    end_ms,
                    start_ms
                );
                Err(CutError::InvalidRange {
                    category: category.to_string(),
                    start_ms,
                    end_ms,
                })
            }
        }
    }

    /// Arm the first idle manual category.
    pub fn mark_start(&mut self, position_ms: u64) -> Result<CutOutcome, CutError> {
        let category = self
            .categories
            .iter()
            .map(|c| &c.button)
            .find(|b| b.cut_type == CutType::Manual && !self.armed.contains_key(&b.name))
            .map(|b| b.name.clone())
            .ok_or(CutError::NothingToArm)?;
        self.press(&category, position_ms)
    }

    /// Complete the first armed manual category.
    pub fn mark_end(&mut self, position_ms: u64) -> Result<CutOutcome, CutError> {
        let category = self
            .categories
            .iter()
            .map(|c| &c.button)
            .find(|b| self.armed.contains_key(&b.name))
            .map(|b| b.name.clone())
            .ok_or(CutError::NothingArmed)?;
        self.press(&category, position_ms)
    }

    /// Current list index of a clip, found by its sequence number.
    pub fn position(&self, category: &str, sequence_number: u32) -> Option<usize> {
        self.clips(category)
            .iter()
            .position(|c| c.sequence_number == sequence_number)
    }

    /// Name, notes and tags of the clip with `sequence_number`, wherever it
    /// sits in its list now.
    pub fn update_clip(
        &mut self,
        category: &str,
        sequence_number: u32,
        name: &str,
        notes: &str,
        tag_ids: BTreeSet<u32>,
    ) -> Result<(), CutError> {
        let index = self
            .position(category, sequence_number)
            .ok_or_else(|| CutError::ClipGone {
                category: category.to_string(),
                sequence_number,
            })?;
        let clip = self.clip_mut(category, index)?;
        clip.name = name.trim().to_string();
        clip.notes = notes.to_string();
        clip.tag_ids = tag_ids;
        self.rebuild_from_registry();
        Ok(())
    }

    pub fn remove(&mut self, category: &str, index: usize) -> Result<Clip, CutError> {
        let list = self
            .categories
            .iter_mut()
            .find(|c| c.button.name == category)
            .map(|c| &mut c.clips)
            .ok_or_else(|| CutError::UnknownCategory(category.to_string()))?;
        if index >= list.len() {
            return Err(CutError::NoSuchClip {
                category: category.to_string(),
                index,
            });
        }
        let clip = list.remove(index);
        log::info!("Deleted clip {} from {}", clip.name, category);
        self.rebuild_from_registry();
        Ok(clip)
    }

    /// Load previously saved clips. Clips of unknown categories and clips
    /// that do not end after they start are dropped and counted in the
    /// return value.
    pub fn restore(&mut self, clips: Vec<Clip>) -> usize {
        let mut dropped = 0;
        for clip in clips {
            if clip.end_ms <= clip.start_ms {
                log::warn!(
                    "Skipping clip {} of {}: [{} ms, {} ms) is empty",
                    clip.name,
                    clip.category,
                    clip.start_ms,
                    clip.end_ms
                );
                dropped += 1;
                continue;
            }
            match self
                .categories
                .iter_mut()
                .find(|c| c.button.name == clip.category)
            {
                Some(category) => category.clips.push(clip),
                None => {
                    log::warn!("Skipping clip {} of unknown category {}", clip.name, clip.category);
                    dropped += 1;
                }
            }
        }
        self.rebuild_from_registry();
        dropped
    }

    /// Swap in a new button bank, keeping clips of categories that survive.
    pub fn reconfigure(&mut self, buttons: Vec<ButtonDefinition>) -> usize {
        let previous = std::mem::take(&mut self.categories);
        self.categories = buttons
            .into_iter()
            .map(|button| CategoryClips {
                button,
                clips: Vec::new(),
            })
            .collect();
        self.armed.clear();
        let clips = previous.into_iter().flat_map(|c| c.clips).collect();
        self.restore(clips)
    }

    /// Forget every clip and pending cut, keeping the buttons.
    pub fn clear(&mut self) {
        for category in &mut self.categories {
            category.clips.clear();
        }
        self.armed.clear();
        self.segments.clear();
    }

    /// Recompute the timeline projection after bulk changes.
    pub fn rebuild_from_registry(&mut self) {
        self.segments = self
            .categories
            .iter()
            .flat_map(|c| c.clips.iter().map(TimelineSegment::from))
            .collect();
    }

    fn record(&mut self, category: &str, start_ms: u64, end_ms: u64) -> Result<Clip, CutError> {
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.button.name == category)
            .ok_or_else(|| CutError::UnknownCategory(category.to_string()))?;

        let sequence_number = entry
            .clips
            .iter()
            .map(|c| c.sequence_number)
            .max()
            .unwrap_or(0)
            + 1;
        let clip = Clip {
            start_ms,
            end_ms,
            category: category.to_string(),
            sequence_number,
            name: format!("{} {}", entry.button.clip_base_name(), sequence_number),
            color: entry.button.fill_color.clone(),
            tag_ids: entry.button.tag_ids.clone(),
            notes: String::new(),
        };
        entry.clips.push(clip.clone());
        self.segments.push(TimelineSegment::from(&clip));
        log::info!(
            "Created clip {} [{} ms, {} ms)",
            clip.name,
            clip.start_ms,
            clip.end_ms
        );
        Ok(clip)
    }

    fn category(&self, name: &str) -> Option<&CategoryClips> {
        self.categories.iter().find(|c| c.button.name == name)
    }

    fn clip_mut(&mut self, category: &str, index: usize) -> Result<&mut Clip, CutError> {
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.button.name == category)
            .ok_or_else(|| CutError::UnknownCategory(category.to_string()))?;
        entry.clips.get_mut(index).ok_or_else(|| CutError::NoSuchClip {
            category: category.to_string(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::button::default_buttons;

    fn registry() -> ClipRegistry {
        ClipRegistry::new(default_buttons())
    }

    #[test]
    fn test_manual_scenario_creates_one_clip() {
        let mut reg = registry();
        let first = reg.press("SALIDA", 5_000).unwrap();
        assert!(matches!(first, CutOutcome::Armed { start_ms: 5_000, .. }));
        assert_eq!(reg.state("SALIDA"), CutState::Armed { start_ms: 5_000 });

        let CutOutcome::Created(clip) = reg.press("SALIDA", 12_000).unwrap() else {
            panic!("expected a clip");
        };
        assert_eq!((clip.start_ms, clip.end_ms), (5_000, 12_000));
        assert_eq!(clip.sequence_number, 1);
        assert_eq!(clip.name, "SALIDA 1");
        assert_eq!(reg.state("SALIDA"), CutState::Idle);
        assert_eq!(reg.segments().len(), 1);
    }

    #[test]
    fn test_auto_scenario_creates_clip_immediately() {
        let mut reg = registry();
        let CutOutcome::Created(clip) = reg.press("TRANSICIÓN", 45_000).unwrap() else {
            panic!("expected a clip");
        };
        assert_eq!((clip.start_ms, clip.end_ms), (35_000, 45_000));
        assert_eq!(clip.color, "#2980b9");
        assert_eq!(reg.state("TRANSICIÓN"), CutState::Idle);
        assert!(reg.marks().is_empty());
    }

    #[test]
    fn test_only_valid_even_presses_create_clips() {
        // (position, clip expected on this press)
        let presses = [
            (1_000, false),
            (4_000, true),
            (9_000, false),
            (8_000, false),
            (10_000, false),
            (10_000, false),
            (20_000, false),
            (21_000, true),
        ];
        let mut reg = registry();
        for (i, (position, expect_clip)) in presses.iter().enumerate() {
            let result = reg.press("DESARROLLO", *position);
            let created = matches!(result, Ok(CutOutcome::Created(_)));
            assert_eq!(created, *expect_clip, "press {}", i + 1);
            if i % 2 == 1 {
                assert_eq!(reg.state("DESARROLLO"), CutState::Idle);
            }
        }
        assert_eq!(reg.clips("DESARROLLO").len(), 2);
        assert_eq!(reg.clips("DESARROLLO")[1].sequence_number, 2);
    }

    #[test]
    fn test_rejected_end_discards_armed_start() {
        let mut reg = registry();
        reg.press("SALIDA", 30_000).unwrap();
        let err = reg.press("SALIDA", 20_000).unwrap_err();
        assert_eq!(
            err,
            CutError::InvalidRange {
                category: "SALIDA".into(),
                start_ms: 30_000,
                end_ms: 20_000
            }
        );
        assert_eq!(reg.state("SALIDA"), CutState::Idle);
        assert_eq!(reg.total_clips(), 0);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut reg = registry();
        assert_eq!(
            reg.press("CÓRNER", 1_000).unwrap_err(),
            CutError::UnknownCategory("CÓRNER".into())
        );
    }

    #[test]
    fn test_mark_start_and_end_share_state_with_buttons() {
        let mut reg = registry();
        reg.press("SALIDA", 1_000).unwrap();

        // SALIDA is armed, so mark_start picks the next idle manual button.
        let outcome = reg.mark_start(2_000).unwrap();
        assert_eq!(
            outcome,
            CutOutcome::Armed {
                category: "DESARROLLO".into(),
                start_ms: 2_000
            }
        );
        assert_eq!(reg.marks().len(), 2);

        // mark_end completes the first armed category in button order.
        let CutOutcome::Created(clip) = reg.mark_end(6_000).unwrap() else {
            panic!("expected a clip");
        };
        assert_eq!(clip.category, "SALIDA");
        assert!(reg.is_armed("DESARROLLO"));
    }

    #[test]
    fn test_mark_end_without_armed_cut() {
        let mut reg = registry();
        assert_eq!(reg.mark_end(1_000).unwrap_err(), CutError::NothingArmed);
    }

    #[test]
    fn test_mark_start_when_all_manual_armed() {
        let mut reg = registry();
        for _ in 0..4 {
            reg.mark_start(1_000).unwrap();
        }
        assert_eq!(reg.mark_start(1_000).unwrap_err(), CutError::NothingToArm);
    }

    #[test]
    fn test_hotkey_lookup_is_case_insensitive() {
        let mut buttons = default_buttons();
        buttons[0].hotkey = 'Q';
        let reg = ClipRegistry::new(buttons);
        assert_eq!(reg.button_for_hotkey('q').unwrap().name, "SALIDA");
        assert!(reg.button_for_hotkey('z').is_none());
    }

    #[test]
    fn test_update_renames_segment_and_remove_rebuilds() {
        let mut reg = registry();
        reg.press("TRANSICIÓN", 20_000).unwrap();
        reg.press("TRANSICIÓN", 40_000).unwrap();
        reg.update_clip("TRANSICIÓN", 1, "Counter attack", "", BTreeSet::new())
            .unwrap();
        assert_eq!(reg.segments()[0].name, "Counter attack");

        reg.remove("TRANSICIÓN", 0).unwrap();
        assert_eq!(reg.segments().len(), 1);
        assert_eq!(reg.segments()[0].start_ms, 30_000);

        // Numbering continues after a deletion instead of reusing 2.
        let CutOutcome::Created(clip) = reg.press("TRANSICIÓN", 60_000).unwrap() else {
            panic!("expected a clip");
        };
        assert_eq!(clip.sequence_number, 3);
        assert_eq!(
            reg.remove("TRANSICIÓN", 9).unwrap_err(),
            CutError::NoSuchClip {
                category: "TRANSICIÓN".into(),
                index: 9
            }
        );
    }

    #[test]
    fn test_notes_and_tags_edit_in_place() {
        let mut reg = registry();
        reg.press("FINALIZACIÓN", 50_000).unwrap();
        reg.update_clip(
            "FINALIZACIÓN",
            1,
            " Near post ",
            "far post",
            [1, 2].into_iter().collect(),
        )
        .unwrap();
        let clip = &reg.clips("FINALIZACIÓN")[0];
        assert_eq!(clip.name, "Near post");
        assert_eq!(clip.notes, "far post");
        assert_eq!(clip.tag_ids.len(), 2);
    }

    #[test]
    fn test_edits_follow_the_clip_after_an_earlier_removal() {
        let mut reg = registry();
        for position in [20_000, 40_000, 60_000] {
            reg.press("TRANSICIÓN", position).unwrap();
        }
        assert_eq!(reg.position("TRANSICIÓN", 2), Some(1));

        reg.remove("TRANSICIÓN", 0).unwrap();
        assert_eq!(reg.position("TRANSICIÓN", 2), Some(0));
        reg.update_clip("TRANSICIÓN", 2, "Second", "edited", BTreeSet::new())
            .unwrap();

        let clips = reg.clips("TRANSICIÓN");
        assert_eq!(clips[0].name, "Second");
        assert_eq!(clips[0].notes, "edited");
        assert_eq!(clips[1].name, "TRANSICIÓN 3");
        assert!(clips[1].notes.is_empty());

        assert_eq!(
            reg.update_clip("TRANSICIÓN", 1, "Gone", "", BTreeSet::new())
                .unwrap_err(),
            CutError::ClipGone {
                category: "TRANSICIÓN".into(),
                sequence_number: 1
            }
        );
        assert!(reg.position("TRANSICIÓN", 1).is_none());
    }

    #[test]
    fn test_button_tags_are_copied_onto_new_clips() {
        let mut buttons = default_buttons();
        buttons[2].tag_ids = [4].into_iter().collect();
        let mut reg = ClipRegistry::new(buttons);
        let CutOutcome::Created(clip) = reg.press("TRANSICIÓN", 15_000).unwrap() else {
            panic!("expected a clip");
        };
        assert!(clip.tag_ids.contains(&4));
    }

    #[test]
    fn test_reconfigure_keeps_surviving_categories() {
        let mut reg = registry();
        reg.press("TRANSICIÓN", 20_000).unwrap();
        reg.press("FINALIZACIÓN", 30_000).unwrap();
        reg.press("SALIDA", 1_000).unwrap();

        let mut buttons = default_buttons();
        buttons.retain(|b| b.name != "FINALIZACIÓN");
        buttons.reverse();
        let dropped = reg.reconfigure(buttons);

        assert_eq!(dropped, 1);
        assert_eq!(reg.total_clips(), 1);
        assert!(!reg.is_armed("SALIDA"));
        assert_eq!(reg.categories()[0].button.name, "FINALIZACIÓN RIVAL");
        assert_eq!(reg.segments().len(), 1);
    }

    #[test]
    fn test_restore_then_clear() {
        let mut source = registry();
        source.press("TRANSICIÓN", 20_000).unwrap();
        source.press("TRANSICIÓN RIVAL", 25_000).unwrap();

        let mut reg = registry();
        assert_eq!(reg.restore(source.all_clips()), 0);
        assert_eq!(reg.stats()[2], ("TRANSICIÓN".to_string(), 1));
        assert_eq!(reg.segments().len(), 2);

        reg.clear();
        assert_eq!(reg.total_clips(), 0);
        assert!(reg.segments().is_empty());
    }

    #[test]
    fn test_restore_drops_empty_and_reversed_ranges() {
        let mut source = registry();
        source.press("TRANSICIÓN", 20_000).unwrap();
        let valid = source.all_clips().remove(0);

        let mut empty = valid.clone();
        empty.sequence_number = 2;
        (empty.start_ms, empty.end_ms) = (0, 0);
        let mut reversed = valid.clone();
        reversed.sequence_number = 3;
        (reversed.start_ms, reversed.end_ms) = (9_000, 3_000);

        let mut reg = registry();
        assert_eq!(reg.restore(vec![empty, valid, reversed]), 2);
        assert_eq!(reg.total_clips(), 1);
        assert_eq!(reg.segments().len(), 1);
        assert!(reg.all_clips().iter().all(|c| c.end_ms > c.start_ms));
    }
}
