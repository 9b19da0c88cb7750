// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Panel store transitions.
//!
//! Operations address panels by position and are applied to a copy of the store, so the
//! caller always holds both the previous and the next snapshot. An operation whose index
//! no longer exists (the panel was closed while an async update was in flight) is skipped
//! rather than rejected.

use std::collections::HashSet;

use crate::model::{DisplayOption, MenuKind, Panel, PanelId, PanelMode, Ref};
use crate::store::PanelStore;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelOp {
    /// Insert a new `Text` panel on `reference` right after `index`.
    OpenPanelAfter { index: usize, reference: Ref },
    /// Turn the panel at `index` into a connections list anchored at `refs`, creating it
    /// when `index` is one past the end.
    OpenConnectionsAt { index: usize, refs: Vec<Ref> },
    /// Forward `refs` to the connections panel following `index`, if there is one.
    SetHighlightForFollowing { index: usize, refs: Vec<Ref> },
    /// Replace the record at `index` wholesale (its id is kept).
    UpdatePanel { index: usize, panel: Box<Panel> },
    ClosePanel { index: usize },
    Edit { index: usize, edit: PanelEdit },
}

impl PanelOp {
    pub fn index(&self) -> usize {
        match self {
            Self::OpenPanelAfter { index, .. }
            | Self::OpenConnectionsAt { index, .. }
            | Self::SetHighlightForFollowing { index, .. }
            | Self::UpdatePanel { index, .. }
            | Self::ClosePanel { index }
            | Self::Edit { index, .. } => *index,
        }
    }

    /// Opens, closes or replaces a text, as opposed to refining the panel in place.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::OpenPanelAfter { .. }
                | Self::OpenConnectionsAt { .. }
                | Self::ClosePanel { .. }
                | Self::Edit {
                    edit: PanelEdit::ShowBaseText(_),
                    ..
                }
        )
    }
}

/// A transition confined to a single panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEdit {
    ShowBaseText(Ref),
    OpenConnectionsInPanel(Vec<Ref>),
    CloseConnectionsInPanel,
    OpenMenu(MenuKind),
    CloseMenus,
    SetNavigationCategories(Vec<String>),
    SetSheetTag(Option<String>),
    SetSearchQuery(Option<String>),
    OpenSearch(Option<String>),
    SetFilter {
        filter: Option<String>,
        update_recent: bool,
    },
    SetOption {
        option: DisplayOption,
        category: Option<String>,
    },
    OpenDisplaySettings,
    CloseDisplaySettings,
    SetHighlight(Vec<Ref>),
    /// Replace the loaded section list (infinite scroll).
    SetSections(Vec<Ref>),
    /// Swap one displayed ref for another spelling of it (text normalization).
    ReplaceRef { from: Ref, to: Ref },
    MarkComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResult {
    pub store: PanelStore,
    pub applied: usize,
    pub delta: Delta,
}

/// Which panels changed as the result of applying ops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<PanelId>,
    pub removed: Vec<PanelId>,
    pub updated: Vec<PanelId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<PanelId>,
    removed: HashSet<PanelId>,
    updated: HashSet<PanelId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: PanelId) {
        self.removed.remove(&id);
        self.updated.remove(&id);
        self.added.insert(id);
    }

    fn record_removed(&mut self, id: PanelId) {
        // Opened and closed within one batch: never visible outside.
        if self.added.remove(&id) {
            return;
        }
        self.updated.remove(&id);
        self.removed.insert(id);
    }

    fn record_updated(&mut self, id: PanelId) {
        if self.added.contains(&id) || self.removed.contains(&id) {
            return;
        }
        self.updated.insert(id);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();
        added.sort_unstable();
        removed.sort_unstable();
        updated.sort_unstable();
        Delta {
            added,
            removed,
            updated,
        }
    }
}

/// Applies `ops` in order to a copy of `store`.
///
/// Each op sees the result of the ones before it, so a driving panel's change is fully
/// in place before a dependent panel's derived change is computed.
pub fn apply_ops(store: &PanelStore, ops: &[PanelOp]) -> ApplyResult {
    let mut next = store.clone();
    let mut delta = DeltaBuilder::default();
    let mut applied = 0usize;

    for op in ops {
        if apply_op(&mut next, op, &mut delta) {
            applied += 1;
        } else {
            tracing::debug!(index = op.index(), panels = next.len(), ?op, "panel op skipped");
        }
    }

    ApplyResult {
        store: next,
        applied,
        delta: delta.finish(),
    }
}

// Extracted per-op transition logic.
include!("ops_impl.rs");
