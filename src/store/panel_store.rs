// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Panel, PanelId, PanelMode, Ref};

/// Tunables that panel transitions consult.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRules {
    pub recent_filter_cap: usize,
    pub font_scale_step: f64,
}

impl Default for PanelRules {
    fn default() -> Self {
        Self {
            recent_filter_cap: 5,
            font_scale_step: 1.15,
        }
    }
}

/// An immutable snapshot of the open panels, left to right.
///
/// Transitions never edit a snapshot in place: `ops::apply_ops` clones, mutates the
/// clone and hands it back, so the previous snapshot stays valid for dirty-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStore {
    multi_panel: bool,
    rules: PanelRules,
    panels: Vec<Panel>,
    next_id: PanelId,
}

impl PanelStore {
    pub fn new(multi_panel: bool, rules: PanelRules) -> Self {
        Self {
            multi_panel,
            rules,
            panels: Vec::new(),
            next_id: PanelId::new(1),
        }
    }

    /// Rebuilds a store from panel records (history restore, tests).
    ///
    /// Single-panel layouts keep only the first record. Fresh ids are allocated above
    /// every id already present.
    pub fn from_panels(multi_panel: bool, rules: PanelRules, mut panels: Vec<Panel>) -> Self {
        if !multi_panel {
            panels.truncate(1);
        }
        let next_id = panels
            .iter()
            .map(|panel| panel.id)
            .max()
            .map_or(PanelId::new(1), PanelId::next);
        Self {
            multi_panel,
            rules,
            panels,
            next_id,
        }
    }

    /// Same layout and rules, different panels.
    pub fn with_panels(&self, panels: Vec<Panel>) -> Self {
        let mut restored = Self::from_panels(self.multi_panel, self.rules, panels);
        restored.next_id = restored.next_id.max(self.next_id);
        restored
    }

    pub fn multi_panel(&self) -> bool {
        self.multi_panel
    }

    pub fn rules(&self) -> &PanelRules {
        &self.rules
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn into_panels(self) -> Vec<Panel> {
        self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    pub fn index_of(&self, id: PanelId) -> Option<usize> {
        self.panels.iter().position(|panel| panel.id == id)
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    /// The refs panel `index` should render as highlighted.
    ///
    /// A panel followed by a connections panel is driven by that panel's anchor. A panel
    /// followed by anything else shows no highlight. The rightmost panel has no driver
    /// and keeps its own highlight set.
    pub fn effective_highlight(&self, index: usize) -> &[Ref] {
        let Some(panel) = self.panels.get(index) else {
            return &[];
        };
        match self.panels.get(index + 1) {
            Some(next) if next.mode == PanelMode::Connections => &next.refs,
            Some(_) => &[],
            None => &panel.highlighted_refs,
        }
    }

    pub(crate) fn panels_mut(&mut self) -> &mut Vec<Panel> {
        &mut self.panels
    }

    pub(crate) fn allocate_id(&mut self) -> PanelId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{PanelRules, PanelStore};
    use crate::model::fixtures::{connections_panel, r, text_panel};
    use crate::model::PanelId;

    #[rstest]
    fn following_connections_panel_drives_the_highlight() {
        let store = PanelStore::from_panels(
            true,
            PanelRules::default(),
            vec![text_panel(1, "Genesis 1"), connections_panel(2, "Genesis 1:4", &[])],
        );
        assert_eq!(store.effective_highlight(0), &[r("Genesis 1:4")]);
        assert!(store.effective_highlight(1).is_empty());
        assert!(store.effective_highlight(9).is_empty());
    }

    #[rstest]
    fn following_text_panel_clears_the_highlight() {
        let mut first = text_panel(1, "Genesis 1");
        first.highlighted_refs = vec![r("Genesis 1:2")];
        let store = PanelStore::from_panels(
            true,
            PanelRules::default(),
            vec![first, text_panel(2, "Exodus 1")],
        );
        assert!(store.effective_highlight(0).is_empty());
    }

    #[rstest]
    fn ids_are_allocated_above_restored_ones() {
        let mut store = PanelStore::from_panels(
            true,
            PanelRules::default(),
            vec![text_panel(4, "Genesis 1"), text_panel(2, "Exodus 1")],
        );
        assert_eq!(store.allocate_id(), PanelId::new(5));
        assert_eq!(store.allocate_id(), PanelId::new(6));
        assert_eq!(store.index_of(PanelId::new(2)), Some(1));
    }

    #[rstest]
    fn single_panel_layout_keeps_one_panel() {
        let store = PanelStore::from_panels(
            false,
            PanelRules::default(),
            vec![text_panel(1, "Genesis 1"), text_panel(2, "Exodus 1")],
        );
        assert_eq!(store.len(), 1);
    }
}
