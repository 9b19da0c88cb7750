// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Panel store <-> navigable history.
//!
//! A [`HistorySnapshot`] is a pure function of the panel list: the codec decides whether a
//! transition deserves a history write at all ([`should_update`]) and synthesizes the URL
//! and document title for it ([`HistoryCodec::make_snapshot`]).

pub mod dirty;
pub mod url;

use serde::{Deserialize, Serialize};

use crate::model::Panel;

pub use dirty::should_update;
pub use url::{FragmentKind, HistoryCodec, PanelFragment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub panels: Vec<Panel>,
    pub url: String,
    pub title: String,
}

impl HistorySnapshot {
    /// The state object handed to the history host; restores without loss.
    pub fn to_state_json(&self) -> Result<String, HistoryStateError> {
        serde_json::to_string(self).map_err(|err| HistoryStateError::Encode(err.to_string()))
    }

    pub fn from_state_json(raw: &str) -> Result<Self, HistoryStateError> {
        let snapshot: Self =
            serde_json::from_str(raw).map_err(|err| HistoryStateError::Decode(err.to_string()))?;
        if snapshot.panels.is_empty() {
            return Err(HistoryStateError::NoPanels);
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryStateError {
    #[error("failed to encode history state: {0}")]
    Encode(String),
    #[error("failed to decode history state: {0}")]
    Decode(String),
    #[error("history state has no panels")]
    NoPanels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryWrite {
    /// New back-button stop.
    Push,
    /// Overwrite the current entry.
    Replace,
}

/// The host's navigable history (a browser `history`, or [`MemoryHistory`]).
pub trait NavigableHistory {
    fn push(&mut self, snapshot: &HistorySnapshot);
    fn replace(&mut self, snapshot: &HistorySnapshot);
    fn set_document_title(&mut self, title: &str);
    /// State of the entry currently shown, if any.
    fn current(&self) -> Option<&HistorySnapshot>;
}

impl HistoryCodec {
    /// Writes `panels` to `history` when the dirty check says the change is worth it.
    ///
    /// Returns the snapshot that was written.
    pub fn update<H: NavigableHistory + ?Sized>(
        &self,
        history: &mut H,
        panels: &[Panel],
        write: HistoryWrite,
    ) -> Option<HistorySnapshot> {
        let previous = history.current().map(|snapshot| snapshot.panels.as_slice());
        if !should_update(previous, panels) {
            tracing::debug!(?write, "history unchanged; skipping write");
            return None;
        }

        let snapshot = self.make_snapshot(panels);
        match write {
            HistoryWrite::Push => history.push(&snapshot),
            HistoryWrite::Replace => history.replace(&snapshot),
        }
        history.set_document_title(&snapshot.title);
        tracing::info!(?write, url = %snapshot.url, title = %snapshot.title, "history written");
        Some(snapshot)
    }
}

/// In-process history with back/forward, for the demo binary and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<HistorySnapshot>,
    cursor: usize,
    document_title: String,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistorySnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn document_title(&self) -> &str {
        &self.document_title
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current().map(|snapshot| snapshot.url.as_str())
    }

    /// Moves one entry back and returns the state a pop event would deliver.
    pub fn back(&mut self) -> Option<HistorySnapshot> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn forward(&mut self) -> Option<HistorySnapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }
}

impl NavigableHistory for MemoryHistory {
    fn push(&mut self, snapshot: &HistorySnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot.clone());
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, snapshot: &HistorySnapshot) {
        match self.entries.get_mut(self.cursor) {
            Some(entry) => *entry = snapshot.clone(),
            None => {
                self.entries.push(snapshot.clone());
                self.cursor = self.entries.len() - 1;
            }
        }
    }

    fn set_document_title(&mut self, title: &str) {
        title.clone_into(&mut self.document_title);
    }

    fn current(&self) -> Option<&HistorySnapshot> {
        self.entries.get(self.cursor)
    }
}

#[cfg(test)]
mod tests;
