// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The text-access collaborator: text, links, table-of-contents HTML and search.
//!
//! The session never calls a [`Library`] itself. It emits effects, the driver runs them
//! against a `Library` and feeds the outcome back as intents.

pub mod connections;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Ref;

pub use connections::{is_single_commentary, top_filters, visible_links};
pub use memory::MemoryLibrary;

/// One fetched section (or span of sections) of a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextData {
    /// The canonical spelling of the requested location.
    pub reference: Ref,
    pub book: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub he: Vec<String>,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub to_sections: Vec<String>,
    pub text_depth: usize,
    pub next: Option<Ref>,
    pub prev: Option<Ref>,
    #[serde(default)]
    pub is_spanning: bool,
    #[serde(default)]
    pub spanning_refs: Vec<Ref>,
}

impl TextData {
    pub fn category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    /// Section refs whose links should be loaded alongside this text.
    pub fn link_sections(&self) -> Vec<Ref> {
        if self.is_spanning && !self.spanning_refs.is_empty() {
            self.spanning_refs.iter().map(Ref::section_ref).collect()
        } else {
            vec![self.reference.section_ref()]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub anchor_ref: Ref,
    pub source_ref: Ref,
    pub category: String,
    pub commentator: String,
    pub anchor_verse: u32,
    #[serde(default)]
    pub commentary_num: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Text,
    Sheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub kind: HitKind,
    /// Ref of a text hit, or the sheet id of a sheet hit.
    pub source: String,
    pub content: String,
    #[serde(default)]
    pub duplicates: Vec<SearchHit>,
}

/// Raw search response: text hits first, sheet hits trailing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    pub total: u64,
    pub text_hits: Vec<SearchHit>,
    pub sheet_hits: Vec<SearchHit>,
}

impl SearchResults {
    /// Folds consecutive hits on the same ref into the first one's `duplicates` and
    /// splits off the trailing sheet hits.
    pub fn from_response(response: SearchResponse) -> Self {
        let mut text_hits: Vec<SearchHit> = Vec::new();
        let mut hits = response.hits.into_iter();
        let mut sheet_hits = Vec::new();

        for hit in hits.by_ref() {
            if hit.kind == HitKind::Sheet {
                sheet_hits.push(hit);
                break;
            }
            match text_hits.last_mut() {
                Some(previous) if previous.source == hit.source => previous.duplicates.push(hit),
                _ => text_hits.push(hit),
            }
        }
        sheet_hits.extend(hits);

        Self {
            total: response.total,
            text_hits,
            sheet_hits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("no text found for '{0}'")]
    NotFound(String),
    #[error("library unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Library: Send + Sync {
    /// Text of `reference`; `with_context` asks for the whole enclosing section.
    async fn fetch_text(&self, reference: &Ref, with_context: bool) -> Result<TextData, FetchError>;

    async fn fetch_links(&self, section: &Ref) -> Result<Vec<Link>, FetchError>;

    async fn fetch_toc_html(&self, book: &str) -> Result<String, FetchError>;

    async fn search(&self, query: &str, size: usize) -> Result<SearchResponse, FetchError>;
}
