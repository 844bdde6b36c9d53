// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recorded clips and their timeline projection.

use crate::util::time::format_time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One recorded `[start_ms, end_ms)` range, filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clip {
    pub start_ms: u64,
    pub end_ms: u64,
    pub category: String,
    pub sequence_number: u32,
    pub name: String,
    /// Copied from the button's fill color when the clip was cut.
    pub color: String,
    #[serde(default)]
    pub tag_ids: BTreeSet<u32>,
    #[serde(default)]
    pub notes: String,
}

impl Clip {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// `[MM:SS] NAME` as shown in the clip lists.
    pub fn list_label(&self) -> String {
        format!("[{}] {}", format_time(self.start_ms), self.name)
    }

    /// True when the clip carries any of `filter`; an empty filter matches all.
    pub fn matches_tags(&self, filter: &BTreeSet<u32>) -> bool {
        filter.is_empty() || !self.tag_ids.is_disjoint(filter)
    }
}

/// Rendering projection of a clip. Always rebuildable from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub color: String,
    pub name: String,
}

impl From<&Clip> for TimelineSegment {
    fn from(clip: &Clip) -> Self {
        Self {
            start_ms: clip.start_ms,
            end_ms: clip.end_ms,
            color: clip.color.clone(),
            name: clip.name.clone(),
        }
    }
}

/// A single-point marker on the timeline, e.g. a pending cut start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineMark {
    pub position_ms: u64,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(tags: &[u32]) -> Clip {
        Clip {
            start_ms: 65_000,
            end_ms: 75_000,
            category: "TRANSICIÓN".into(),
            sequence_number: 1,
            name: "TRANSICIÓN 1".into(),
            color: "#2980b9".into(),
            tag_ids: tags.iter().copied().collect(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_label_and_duration() {
        let c = clip(&[]);
        assert_eq!(c.list_label(), "[01:05] TRANSICIÓN 1");
        assert_eq!(c.duration_ms(), 10_000);
    }

    #[test]
    fn test_tag_filter_matches_any() {
        let c = clip(&[2, 5]);
        assert!(c.matches_tags(&BTreeSet::new()));
        assert!(c.matches_tags(&[5, 9].into_iter().collect()));
        assert!(!c.matches_tags(&[1].into_iter().collect()));
    }

    #[test]
    fn test_legacy_fields_default() {
        let c: Clip = serde_json::from_str(
            r##"{"start_ms": 1, "end_ms": 2, "category": "A", "sequence_number": 1,
                 "name": "A 1", "color": "#000000"}"##,
        )
        .unwrap();
        assert!(c.tag_ids.is_empty());
        assert!(c.notes.is_empty());
    }
}
