// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use crate::library::{FetchError, SearchResponse, SearchResults};
use crate::model::{Menu, Panel, PanelId, RequestId};

use super::Effect;

/// How a search request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Completed(SearchResponse),
    /// Cancelled before it answered. Not a failure.
    Aborted,
    Failed(FetchError),
}

/// Results and request bookkeeping for one panel's search menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    page: usize,
    issued_page: Option<usize>,
    running: Option<RequestId>,
    results: Option<SearchResults>,
    error: bool,
}

impl SearchState {
    fn new(query: String) -> Self {
        Self {
            query,
            page: 1,
            issued_page: None,
            running: None,
            results: None,
            error: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

/// Every panel's search, keyed by panel so results survive index shifts.
#[derive(Debug, Default)]
pub(crate) struct Searches {
    by_panel: HashMap<PanelId, SearchState>,
}

impl Searches {
    pub(crate) fn get(&self, panel: PanelId) -> Option<&SearchState> {
        self.by_panel.get(&panel)
    }

    pub(crate) fn running(&self) -> usize {
        self.by_panel.values().filter(|state| state.running.is_some()).count()
    }

    /// Asks for `page` pages of results; the next reconcile re-issues the query.
    pub(crate) fn set_page(&mut self, panel: PanelId, page: usize) -> bool {
        match self.by_panel.get_mut(&panel) {
            Some(state) if page >= 1 && state.page != page => {
                state.page = page;
                true
            }
            _ => false,
        }
    }

    /// Brings running queries in line with the panels' search menus.
    ///
    /// A panel whose query (or page) changed aborts its running request before the new
    /// one is issued. Panels that left their search menu abort and forget their state.
    pub(crate) fn reconcile(
        &mut self,
        panels: &[Panel],
        page_size: usize,
        mut allocate: impl FnMut() -> RequestId,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        let wanted = panels
            .iter()
            .filter_map(|panel| match &panel.menu {
                Some(Menu::Search { query: Some(query) }) if !query.trim().is_empty() => {
                    Some((panel.id, query.trim().to_owned()))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        self.by_panel.retain(|panel, state| {
            if wanted.iter().any(|(id, _)| id == panel) {
                return true;
            }
            if let Some(request) = state.running.take() {
                effects.push(Effect::AbortSearch { request });
            }
            false
        });

        for (panel, query) in wanted {
            let state = self
                .by_panel
                .entry(panel)
                .or_insert_with(|| SearchState::new(query.clone()));
            if state.query != query {
                *state = SearchState {
                    running: state.running,
                    ..SearchState::new(query)
                };
            }
            if state.issued_page == Some(state.page) {
                continue;
            }

            if let Some(request) = state.running.take() {
                effects.push(Effect::AbortSearch { request });
            }
            let request = allocate();
            effects.push(Effect::Search {
                request,
                query: state.query.clone(),
                size: state.page * page_size,
            });
            state.running = Some(request);
            state.issued_page = Some(state.page);
        }

        effects
    }

    /// Applies the outcome of `request`; results of superseded requests are dropped.
    pub(crate) fn finish(&mut self, request: RequestId, outcome: SearchOutcome) -> bool {
        let Some(state) = self.by_panel.values_mut().find(|state| state.running == Some(request))
        else {
            tracing::debug!(%request, "discarding outcome of a superseded search");
            return false;
        };
        state.running = None;

        match outcome {
            SearchOutcome::Completed(response) => {
                state.results = Some(SearchResults::from_response(response));
                state.error = false;
            }
            SearchOutcome::Aborted => {
                tracing::debug!(%request, query = %state.query, "search aborted");
                state.issued_page = None;
            }
            SearchOutcome::Failed(err) => {
                tracing::warn!(%request, query = %state.query, %err, "search failed");
                state.error = true;
            }
        }
        true
    }
}
