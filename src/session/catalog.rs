// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use crate::library::{FetchError, Link, TextData};
use crate::model::{Ref, RequestId};

/// What a fetch was issued for; `key` is the cache slot it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchKind {
    /// Text some panel displays.
    Text { reference: Ref },
    /// Neighbouring text loaded ahead of scrolling.
    Prefetch { reference: Ref },
    Links { section: Ref },
    Toc { book: String },
}

impl FetchKind {
    pub(crate) fn key(&self) -> String {
        match self {
            Self::Text { reference } | Self::Prefetch { reference } => text_key(reference),
            Self::Links { section } => links_key(section),
            Self::Toc { book } => toc_key(book),
        }
    }
}

pub(crate) fn text_key(reference: &Ref) -> String {
    format!("text:{}", reference.normalized())
}

pub(crate) fn links_key(section: &Ref) -> String {
    format!("links:{}", section.normalized())
}

pub(crate) fn toc_key(book: &str) -> String {
    format!("toc:{book}")
}

/// Everything fetched so far, plus failures, plus what is still in flight.
#[derive(Debug, Default)]
pub(crate) struct TextCatalog {
    texts: HashMap<String, TextData>,
    links: HashMap<String, Vec<Link>>,
    tocs: HashMap<String, String>,
    failures: HashMap<String, FetchError>,
    in_flight: HashMap<RequestId, FetchKind>,
}

impl TextCatalog {
    pub(crate) fn text(&self, reference: &Ref) -> Option<&TextData> {
        self.texts.get(&text_key(reference))
    }

    pub(crate) fn links(&self, section: &Ref) -> Option<&[Link]> {
        self.links.get(&links_key(section)).map(Vec::as_slice)
    }

    pub(crate) fn toc(&self, book: &str) -> Option<&str> {
        self.tocs.get(&toc_key(book)).map(String::as_str)
    }

    pub(crate) fn failure(&self, key: &str) -> Option<&FetchError> {
        self.failures.get(key)
    }

    pub(crate) fn is_cached(&self, key: &str) -> bool {
        self.texts.contains_key(key) || self.links.contains_key(key) || self.tocs.contains_key(key)
    }

    /// Whether `key` needs a fetch: not cached, not failed, not already requested.
    pub(crate) fn wants(&self, key: &str) -> bool {
        !self.is_cached(key)
            && !self.failures.contains_key(key)
            && !self.in_flight.values().any(|kind| kind.key() == key)
    }

    pub(crate) fn begin(&mut self, request: RequestId, kind: FetchKind) {
        self.in_flight.insert(request, kind);
    }

    /// Ends the fetch `request`; `None` if it was never issued or already answered.
    pub(crate) fn finish(&mut self, request: RequestId) -> Option<FetchKind> {
        self.in_flight.remove(&request)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Stores `data` under the requested spelling and its canonical one.
    pub(crate) fn store_text(&mut self, requested: &Ref, data: TextData) {
        let canonical = text_key(&data.reference);
        let requested = text_key(requested);
        if canonical != requested {
            self.texts.insert(canonical, data.clone());
        }
        self.texts.insert(requested, data);
    }

    pub(crate) fn store_links(&mut self, section: &Ref, links: Vec<Link>) {
        self.links.insert(links_key(section), links);
    }

    pub(crate) fn store_toc(&mut self, book: &str, html: String) {
        self.tocs.insert(toc_key(book), html);
    }

    pub(crate) fn store_failure(&mut self, kind: &FetchKind, err: FetchError) {
        self.failures.insert(kind.key(), err);
    }

    /// Forgets failures whose key `keep` rejects, making them fetchable again.
    pub(crate) fn retain_failures(&mut self, keep: impl Fn(&str) -> bool) {
        self.failures.retain(|key, _| {
            let kept = keep(key);
            if !kept {
                tracing::debug!(key = %key, "forgetting fetch failure");
            }
            kept
        });
    }
}
