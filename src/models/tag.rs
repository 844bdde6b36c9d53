// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Global tag catalog.
//!
//! Buttons and clips refer to tags by id only, so renaming or recoloring a
//! tag never touches the clips that carry it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub id: u32,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub category: String,
}

/// Tag store contents. Ids are never reused, even after removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalog {
    next_id: u32,
    tags: Vec<TagDefinition>,
}

impl Default for TagCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for (name, color, category) in [
            ("Goal", "#27ae60", "Outcome"),
            ("Shot", "#f39c12", "Outcome"),
            ("Turnover", "#c0392b", "Possession"),
            ("Recovery", "#2980b9", "Possession"),
            ("High press", "#8e44ad", "Pressing"),
            ("Set piece", "#16a085", "Phase"),
        ] {
            catalog.add(name, color, category);
        }
        catalog
    }
}

impl TagCatalog {
    pub fn empty() -> Self {
        Self {
            next_id: 1,
            tags: Vec::new(),
        }
    }

    pub fn tags(&self) -> &[TagDefinition] {
        &self.tags
    }

    pub fn get(&self, id: u32) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, name: &str, color: &str, category: &str) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.tags.push(TagDefinition {
            id,
            name: name.trim().to_string(),
            color: color.to_string(),
            category: category.trim().to_string(),
        });
        id
    }

    pub fn rename(&mut self, id: u32, name: &str) -> bool {
        self.update(id, |tag| tag.name = name.trim().to_string())
    }

    pub fn recolor(&mut self, id: u32, color: &str) -> bool {
        self.update(id, |tag| tag.color = color.to_string())
    }

    pub fn remove(&mut self, id: u32) -> Option<TagDefinition> {
        let index = self.tags.iter().position(|t| t.id == id)?;
        Some(self.tags.remove(index))
    }

    /// Display names for a set of ids, skipping ids no longer in the catalog.
    pub fn names<'a>(&'a self, ids: impl IntoIterator<Item = &'a u32>) -> Vec<&'a str> {
        ids.into_iter()
            .filter_map(|id| self.get(*id))
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Repair a catalog loaded from disk whose counter fell behind its ids.
    pub fn normalize(&mut self) {
        let max_id = self.tags.iter().map(|t| t.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }

    fn update(&mut self, id: u32, f: impl FnOnce(&mut TagDefinition)) -> bool {
        match self.tags.iter_mut().find(|t| t.id == id) {
            Some(tag) => {
                f(tag);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut catalog = TagCatalog::empty();
        let a = catalog.add("Goal", "#27ae60", "Outcome");
        let b = catalog.add("Shot", "#f39c12", "Outcome");
        assert_eq!((a, b), (1, 2));

        catalog.remove(b);
        let c = catalog.add("Corner", "#16a085", "Phase");
        assert_eq!(c, 3);
    }

    #[test]
    fn test_rename_and_recolor_in_place() {
        let mut catalog = TagCatalog::default();
        assert!(catalog.rename(1, "  Gol "));
        assert!(catalog.recolor(1, "#000000"));
        let tag = catalog.get(1).unwrap();
        assert_eq!(tag.name, "Gol");
        assert_eq!(tag.color, "#000000");
        assert!(!catalog.rename(999, "nope"));
    }

    #[test]
    fn test_names_skip_dangling_ids() {
        let catalog = TagCatalog::default();
        let ids = [1, 42, 3];
        assert_eq!(catalog.names(ids.iter()), vec!["Goal", "Turnover"]);
    }

    #[test]
    fn test_normalize_advances_counter() {
        let mut catalog: TagCatalog = serde_json::from_str(
            r##"{"next_id": 1, "tags": [{"id": 7, "name": "x", "color": "#fff"}]}"##,
        )
        .unwrap();
        catalog.normalize();
        assert_eq!(catalog.add("y", "#000", ""), 8);
    }
}
