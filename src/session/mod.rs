// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The session controller: the only writer of the panel store.
//!
//! The host feeds it [`Intent`]s (UI events and fetch completions). Each intent becomes a
//! batch of panel ops, a history write with the right push/replace intent, and a list of
//! [`Effect`]s (fetches, searches, aborts) for the host to run.

mod catalog;
mod search;

use std::collections::HashSet;

use crate::config::ReaderConfig;
use crate::history::{HistoryCodec, HistorySnapshot, HistoryWrite, NavigableHistory};
use crate::library::{self, FetchError, Link, TextData};
use crate::model::{
    DisplayOption, Menu, MenuKind, Panel, PanelId, PanelMode, Ref, RefError, RequestId,
};
use crate::ops::{apply_ops, PanelEdit, PanelOp};
use crate::store::{BootstrapParams, PanelStore};

use catalog::{links_key, text_key, toc_key, FetchKind, TextCatalog};
use search::Searches;

pub use search::{SearchOutcome, SearchState};

/// Something that happened in the host: a UI event or a fetch completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// A segment of a panel's text was clicked.
    SegmentClicked { panel: PanelId, reference: Ref },
    /// A citation inside a text was followed.
    CitationClicked { panel: PanelId, reference: Ref },
    /// An entry of a connections list was followed.
    ConnectionClicked { panel: PanelId, reference: Ref },
    /// The user selected a run of segments.
    TextSelected { panel: PanelId, refs: Vec<Ref> },
    FilterSet {
        panel: PanelId,
        filter: Option<String>,
        update_recent: bool,
    },
    ConnectionsDismissed { panel: PanelId },
    PanelClosed { panel: PanelId },
    MenuOpened { panel: PanelId, menu: MenuKind },
    MenusClosed { panel: PanelId },
    NavigationCategoriesSet {
        panel: PanelId,
        categories: Vec<String>,
    },
    SheetTagSet { panel: PanelId, tag: Option<String> },
    SearchOpened {
        panel: PanelId,
        query: Option<String>,
    },
    SearchQueryChanged {
        panel: PanelId,
        query: Option<String>,
    },
    /// Show `page` pages of results for the panel's current query.
    SearchPageRequested { panel: PanelId, page: usize },
    DisplaySettingsOpened { panel: PanelId },
    DisplaySettingsClosed { panel: PanelId },
    OptionSet {
        panel: PanelId,
        option: DisplayOption,
    },
    /// A panel pushed its whole record up, asking for the given history write.
    PanelReported {
        panel: PanelId,
        state: Box<Panel>,
        write: HistoryWrite,
    },
    /// Infinite scroll changed the loaded section list.
    SectionsChanged { panel: PanelId, refs: Vec<Ref> },
    /// Scrolling moved the highlight to another segment.
    HighlightRetargeted { panel: PanelId, refs: Vec<Ref> },
    /// Back/forward delivered a previously written state.
    HistoryPopped(Box<HistorySnapshot>),
    TextLoaded {
        request: RequestId,
        result: Result<TextData, FetchError>,
    },
    LinksLoaded {
        request: RequestId,
        result: Result<Vec<Link>, FetchError>,
    },
    TocLoaded {
        request: RequestId,
        result: Result<String, FetchError>,
    },
    SearchFinished {
        request: RequestId,
        outcome: SearchOutcome,
    },
}

/// Work the host should perform and report back as an [`Intent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchText {
        request: RequestId,
        reference: Ref,
        with_context: bool,
    },
    FetchLinks { request: RequestId, section: Ref },
    FetchTocHtml { request: RequestId, book: String },
    Search {
        request: RequestId,
        query: String,
        size: usize,
    },
    AbortSearch { request: RequestId },
}

impl Effect {
    pub fn request(&self) -> RequestId {
        match self {
            Self::FetchText { request, .. }
            | Self::FetchLinks { request, .. }
            | Self::FetchTocHtml { request, .. }
            | Self::Search { request, .. }
            | Self::AbortSearch { request } => *request,
        }
    }
}

/// What a panel can currently show. Not part of the history-governed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Unresolved(FetchError),
}

/// Parses a ref coming from the host, logging the rejection.
///
/// A rejected ref never reaches an intent, so the store is left untouched.
pub fn accept_ref(raw: &str) -> Result<Ref, RefError> {
    Ref::new(raw).map_err(|err| {
        tracing::warn!(input = raw, %err, "rejected unparseable ref");
        err
    })
}

pub struct SessionController<H: NavigableHistory> {
    store: PanelStore,
    codec: HistoryCodec,
    history: H,
    search_page_size: usize,
    catalog: TextCatalog,
    searches: Searches,
    next_request: RequestId,
    outbox: Vec<Effect>,
    restoring: bool,
}

impl<H: NavigableHistory> SessionController<H> {
    pub fn new(store: PanelStore, config: &ReaderConfig, history: H) -> Self {
        Self {
            store,
            codec: config.history_codec(),
            history,
            search_page_size: config.search_page_size,
            catalog: TextCatalog::default(),
            searches: Searches::default(),
            next_request: RequestId::new(1),
            outbox: Vec::new(),
            restoring: false,
        }
    }

    pub fn bootstrap(params: &BootstrapParams, config: &ReaderConfig, history: H) -> Self {
        Self::new(PanelStore::bootstrap(params, config.panel_rules()), config, history)
    }

    pub fn store(&self) -> &PanelStore {
        &self.store
    }

    pub fn panels(&self) -> &[Panel] {
        self.store.panels()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn into_history(self) -> H {
        self.history
    }

    /// Fetches and searches issued but not yet answered.
    pub fn pending_requests(&self) -> usize {
        self.catalog.in_flight() + self.searches.running()
    }

    /// Records the bootstrap state as the current history entry and issues its fetches.
    pub fn start(&mut self) -> Vec<Effect> {
        self.write_history(HistoryWrite::Replace);
        self.reconcile();
        std::mem::take(&mut self.outbox)
    }

    pub fn handle(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::SegmentClicked { panel, reference } => self.segment_clicked(panel, reference),
            Intent::CitationClicked { panel, reference }
            | Intent::ConnectionClicked { panel, reference } => self.follow_ref(panel, reference),
            Intent::TextSelected { panel, refs } | Intent::HighlightRetargeted { panel, refs } => {
                self.set_highlight(panel, refs)
            }
            Intent::FilterSet {
                panel,
                filter,
                update_recent,
            } => {
                self.edit(
                    panel,
                    PanelEdit::SetFilter {
                        filter,
                        update_recent,
                    },
                    HistoryWrite::Push,
                )
            }
            Intent::ConnectionsDismissed { panel } => {
                self.edit(panel, PanelEdit::CloseConnectionsInPanel, HistoryWrite::Push)
            }
            Intent::PanelClosed { panel } => {
                if let Some(index) = self.index_of(panel) {
                    self.transition(index, vec![PanelOp::ClosePanel { index }], HistoryWrite::Push);
                }
            }
            Intent::MenuOpened { panel, menu } => {
                self.edit(panel, PanelEdit::OpenMenu(menu), HistoryWrite::Push)
            }
            Intent::MenusClosed { panel } => {
                self.edit(panel, PanelEdit::CloseMenus, HistoryWrite::Push)
            }
            Intent::NavigationCategoriesSet { panel, categories } => self.edit(
                panel,
                PanelEdit::SetNavigationCategories(categories),
                HistoryWrite::Push,
            ),
            Intent::SheetTagSet { panel, tag } => {
                self.edit(panel, PanelEdit::SetSheetTag(tag), HistoryWrite::Push)
            }
            Intent::SearchOpened { panel, query } => {
                self.edit(panel, PanelEdit::OpenSearch(query), HistoryWrite::Push)
            }
            Intent::SearchQueryChanged { panel, query } => {
                self.edit(panel, PanelEdit::SetSearchQuery(query), HistoryWrite::Push)
            }
            Intent::SearchPageRequested { panel, page } => {
                if !self.searches.set_page(panel, page) {
                    tracing::debug!(%panel, page, "search page request ignored");
                }
            }
            Intent::DisplaySettingsOpened { panel } => {
                self.edit(panel, PanelEdit::OpenDisplaySettings, HistoryWrite::Push)
            }
            Intent::DisplaySettingsClosed { panel } => {
                self.edit(panel, PanelEdit::CloseDisplaySettings, HistoryWrite::Push)
            }
            Intent::OptionSet { panel, option } => self.set_option(panel, option),
            Intent::PanelReported {
                panel,
                state,
                write,
            } => self.panel_reported(panel, state, write),
            Intent::SectionsChanged { panel, refs } => {
                self.edit(panel, PanelEdit::SetSections(refs), HistoryWrite::Replace)
            }
            Intent::HistoryPopped(snapshot) => self.restore(*snapshot),
            Intent::TextLoaded { request, result } => self.text_loaded(request, result),
            Intent::LinksLoaded { request, result } => self.links_loaded(request, result),
            Intent::TocLoaded { request, result } => self.toc_loaded(request, result),
            Intent::SearchFinished { request, outcome } => {
                self.searches.finish(request, outcome);
            }
        }

        self.reconcile();
        std::mem::take(&mut self.outbox)
    }

    pub fn load_status(&self, panel: PanelId) -> Option<LoadStatus> {
        self.store.panel(panel).map(|panel| self.status_of(panel))
    }

    pub fn text(&self, reference: &Ref) -> Option<&TextData> {
        self.catalog.text(reference)
    }

    pub fn links(&self, section: &Ref) -> Option<&[Link]> {
        self.catalog.links(section)
    }

    pub fn toc_html(&self, book: &str) -> Option<&str> {
        self.catalog.toc(book)
    }

    pub fn search(&self, panel: PanelId) -> Option<&SearchState> {
        self.searches.get(panel)
    }

    /// The links a connections panel (or the connections half of a combined panel)
    /// lists right now, in display order.
    pub fn visible_links(&self, panel: PanelId) -> Vec<&Link> {
        let Some(panel) = self.store.panel(panel) else {
            return Vec::new();
        };
        let anchors = match panel.mode {
            PanelMode::Connections => panel.refs.as_slice(),
            PanelMode::TextAndConnections => panel.highlighted_refs.as_slice(),
            PanelMode::Text => return Vec::new(),
        };
        let Some(links) = anchors
            .first()
            .and_then(|anchor| self.catalog.links(&anchor.section_ref()))
        else {
            return Vec::new();
        };
        let single = library::is_single_commentary(&panel.filter, links);
        library::visible_links(links, anchors, &panel.filter, single)
    }

    pub fn top_filters(&self, panel: PanelId) -> Vec<String> {
        self.store
            .panel(panel)
            .map(|panel| {
                library::top_filters(
                    &panel.recent_filters,
                    &panel.filter,
                    self.store.rules().recent_filter_cap,
                )
            })
            .unwrap_or_default()
    }

    fn index_of(&self, panel: PanelId) -> Option<usize> {
        let index = self.store.index_of(panel);
        if index.is_none() {
            tracing::debug!(%panel, "intent for a closed panel ignored");
        }
        index
    }

    fn edit(&mut self, panel: PanelId, edit: PanelEdit, write: HistoryWrite) {
        if let Some(index) = self.index_of(panel) {
            self.transition(index, vec![PanelOp::Edit { index, edit }], write);
        }
    }

    /// Applies `ops` on behalf of the panel at `index` and records the result.
    ///
    /// A panel that has not settled yet completes with this change. Refining it in
    /// place replaces the history entry; navigating away from it keeps `write`.
    fn transition(&mut self, index: usize, ops: Vec<PanelOp>, write: HistoryWrite) {
        let mut write = write;
        let mut batch = Vec::with_capacity(ops.len() + 1);
        if self.store.get(index).is_some_and(|panel| !panel.complete_state) {
            batch.push(PanelOp::Edit {
                index,
                edit: PanelEdit::MarkComplete,
            });
            if !ops.iter().any(PanelOp::is_navigation) {
                write = HistoryWrite::Replace;
            }
        }
        batch.extend(ops);
        self.commit(&batch, write);
    }

    fn commit(&mut self, ops: &[PanelOp], write: HistoryWrite) {
        let result = apply_ops(&self.store, ops);
        if result.delta.is_empty() {
            return;
        }
        tracing::debug!(
            applied = result.applied,
            added = result.delta.added.len(),
            removed = result.delta.removed.len(),
            updated = result.delta.updated.len(),
            "panel store updated"
        );
        self.store = result.store;
        self.write_history(write);
    }

    fn write_history(&mut self, write: HistoryWrite) {
        if self.restoring {
            tracing::debug!(?write, "history write suppressed while restoring");
            return;
        }
        self.codec.update(&mut self.history, self.store.panels(), write);
    }

    fn segment_clicked(&mut self, panel: PanelId, reference: Ref) {
        let Some(index) = self.index_of(panel) else {
            return;
        };
        let Some(mode) = self.store.get(index).map(|panel| panel.mode) else {
            return;
        };

        let ops = match (self.store.multi_panel(), mode) {
            (_, PanelMode::Connections) => return,
            (true, _) => vec![
                PanelOp::Edit {
                    index,
                    edit: PanelEdit::SetHighlight(vec![reference.clone()]),
                },
                PanelOp::OpenConnectionsAt {
                    index: index + 1,
                    refs: vec![reference],
                },
            ],
            (false, PanelMode::TextAndConnections) => {
                vec![PanelOp::Edit {
                    index,
                    edit: PanelEdit::CloseConnectionsInPanel,
                }]
            }
            (false, PanelMode::Text) => vec![PanelOp::Edit {
                index,
                edit: PanelEdit::OpenConnectionsInPanel(vec![reference]),
            }],
        };
        self.transition(index, ops, HistoryWrite::Push);
    }

    /// Citations and connection entries open in a new panel, or replace the text when
    /// there is only one.
    fn follow_ref(&mut self, panel: PanelId, reference: Ref) {
        let Some(index) = self.index_of(panel) else {
            return;
        };
        let op = if self.store.multi_panel() {
            PanelOp::OpenPanelAfter { index, reference }
        } else {
            PanelOp::Edit {
                index,
                edit: PanelEdit::ShowBaseText(reference),
            }
        };
        self.transition(index, vec![op], HistoryWrite::Push);
    }

    fn set_highlight(&mut self, panel: PanelId, refs: Vec<Ref>) {
        let Some(index) = self.index_of(panel) else {
            return;
        };
        let mut ops = vec![PanelOp::Edit {
            index,
            edit: PanelEdit::SetHighlight(refs.clone()),
        }];
        if self.store.multi_panel() {
            ops.push(PanelOp::SetHighlightForFollowing { index, refs });
        }
        self.transition(index, ops, HistoryWrite::Replace);
    }

    fn set_option(&mut self, panel: PanelId, option: DisplayOption) {
        let category = self
            .store
            .panel(panel)
            .and_then(Panel::last_ref)
            .and_then(|reference| self.catalog.text(reference))
            .and_then(|data| data.category().map(str::to_owned));
        self.edit(panel, PanelEdit::SetOption { option, category }, HistoryWrite::Push);
    }

    fn panel_reported(&mut self, panel: PanelId, state: Box<Panel>, write: HistoryWrite) {
        let Some(index) = self.index_of(panel) else {
            return;
        };
        let write = if state.complete_state { write } else { HistoryWrite::Replace };
        self.transition(
            index,
            vec![PanelOp::UpdatePanel {
                index,
                panel: state,
            }],
            write,
        );
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        tracing::info!(
            url = %snapshot.url,
            panels = snapshot.panels.len(),
            "restoring history entry"
        );
        if snapshot.panels.is_empty() {
            tracing::warn!(url = %snapshot.url, "history entry without panels ignored");
            return;
        }
        self.restoring = true;
        self.store = self.store.with_panels(snapshot.panels);
        self.normalize_from_cache();
        self.restoring = false;
    }

    fn text_loaded(&mut self, request: RequestId, result: Result<TextData, FetchError>) {
        let Some(kind) = self.catalog.finish(request) else {
            tracing::debug!(%request, "discarding text for an unknown request");
            return;
        };
        let (reference, displayed) = match &kind {
            FetchKind::Text { reference } => (reference.clone(), true),
            FetchKind::Prefetch { reference } => (reference.clone(), false),
            other => {
                tracing::debug!(%request, ?other, "text result for a non-text request dropped");
                return;
            }
        };

        match result {
            Ok(data) => {
                if displayed {
                    self.prefetch_around(&data);
                }
                self.catalog.store_text(&reference, data);
            }
            Err(err) => {
                tracing::warn!(%request, %reference, %err, "text fetch failed");
                self.catalog.store_failure(&kind, err);
            }
        }
    }

    /// Neighbouring sections, the book's table of contents and the links of the loaded
    /// sections, so scrolling and opening connections do not wait.
    fn prefetch_around(&mut self, data: &TextData) {
        for neighbour in data.next.iter().chain(data.prev.iter()) {
            self.issue(FetchKind::Prefetch {
                reference: neighbour.clone(),
            });
        }
        self.issue(FetchKind::Toc {
            book: data.book.clone(),
        });
        for section in data.link_sections() {
            self.issue(FetchKind::Links { section });
        }
    }

    fn links_loaded(&mut self, request: RequestId, result: Result<Vec<Link>, FetchError>) {
        match self.catalog.finish(request) {
            Some(FetchKind::Links { section }) => match result {
                Ok(links) => self.catalog.store_links(&section, links),
                Err(err) => {
                    tracing::warn!(%request, %section, %err, "links fetch failed");
                    self.catalog.store_failure(&FetchKind::Links { section }, err);
                }
            },
            other => tracing::debug!(%request, ?other, "discarding links for an unknown request"),
        }
    }

    fn toc_loaded(&mut self, request: RequestId, result: Result<String, FetchError>) {
        match self.catalog.finish(request) {
            Some(FetchKind::Toc { book }) => match result {
                Ok(html) => self.catalog.store_toc(&book, html),
                Err(err) => {
                    tracing::warn!(%request, book = %book, %err, "table of contents fetch failed");
                    self.catalog.store_failure(&FetchKind::Toc { book }, err);
                }
            },
            other => tracing::debug!(%request, ?other, "discarding toc for an unknown request"),
        }
    }

    fn status_of(&self, panel: &Panel) -> LoadStatus {
        let keys: Vec<String> = match (&panel.menu, panel.mode) {
            (Some(Menu::TextToc), _) => {
                panel.last_ref().map(|reference| toc_key(reference.book())).into_iter().collect()
            }
            (Some(_), _) => Vec::new(),
            (None, PanelMode::Connections) => {
                panel
                    .refs
                    .first()
                    .map(|anchor| links_key(&anchor.section_ref()))
                    .into_iter()
                    .collect()
            }
            (None, _) => panel.refs.iter().map(text_key).collect(),
        };

        if let Some(err) = keys.iter().find_map(|key| self.catalog.failure(key)) {
            return LoadStatus::Unresolved(err.clone());
        }
        if keys.iter().any(|key| !self.catalog.is_cached(key)) {
            return LoadStatus::Loading;
        }
        LoadStatus::Ready
    }

    /// Swaps displayed refs for the canonical spelling their text came back under and
    /// settles panels that have everything they need.
    fn normalize_from_cache(&mut self) {
        let mut ops = Vec::new();
        for (index, panel) in self.store.panels().iter().enumerate() {
            if panel.menu.is_none() && panel.mode != PanelMode::Connections {
                for reference in &panel.refs {
                    let Some(data) = self.catalog.text(reference) else {
                        continue;
                    };
                    if data.reference != *reference {
                        ops.push(PanelOp::Edit {
                            index,
                            edit: PanelEdit::ReplaceRef {
                                from: reference.clone(),
                                to: data.reference.clone(),
                            },
                        });
                    }
                }
            }
            if !panel.complete_state && self.status_of(panel) != LoadStatus::Loading {
                ops.push(PanelOp::Edit {
                    index,
                    edit: PanelEdit::MarkComplete,
                });
            }
        }
        if !ops.is_empty() {
            self.commit(&ops, HistoryWrite::Replace);
        }
    }

    fn reconcile(&mut self) {
        self.normalize_from_cache();

        let mut wanted = Vec::new();
        for panel in self.store.panels() {
            match (&panel.menu, panel.mode) {
                (Some(Menu::TextToc), _) => {
                    if let Some(reference) = panel.last_ref() {
                        wanted.push(FetchKind::Toc {
                            book: reference.book().to_owned(),
                        });
                    }
                }
                (Some(_), _) => {}
                (None, PanelMode::Connections) => {
                    if let Some(anchor) = panel.refs.first() {
                        wanted.push(FetchKind::Links {
                            section: anchor.section_ref(),
                        });
                    }
                }
                (None, mode) => {
                    wanted.extend(
                        panel.refs.iter().map(|reference| FetchKind::Text {
                            reference: reference.clone(),
                        }),
                    );
                    if mode == PanelMode::TextAndConnections {
                        wanted.extend(
                            panel
                                .highlighted_refs
                                .iter()
                                .map(|reference| FetchKind::Links {
                                    section: reference.section_ref(),
                                }),
                        );
                    }
                }
            }
        }
        // A failure is only remembered while something still shows it; coming back
        // later retries.
        let shown: HashSet<String> = wanted.iter().map(FetchKind::key).collect();
        self.catalog.retain_failures(|key| shown.contains(key));
        for kind in wanted {
            self.issue(kind);
        }

        let next_request = &mut self.next_request;
        let effects = self.searches.reconcile(self.store.panels(), self.search_page_size, || {
            let request = *next_request;
            *next_request = request.next();
            request
        });
        self.outbox.extend(effects);
    }

    fn allocate_request(&mut self) -> RequestId {
        let request = self.next_request;
        self.next_request = request.next();
        request
    }

    fn issue(&mut self, kind: FetchKind) {
        if !self.catalog.wants(&kind.key()) {
            return;
        }
        let request = self.allocate_request();
        let effect = match &kind {
            FetchKind::Text { reference } | FetchKind::Prefetch { reference } => Effect::FetchText {
                request,
                reference: reference.clone(),
                with_context: true,
            },
            FetchKind::Links { section } => Effect::FetchLinks {
                request,
                section: section.clone(),
            },
            FetchKind::Toc { book } => Effect::FetchTocHtml {
                request,
                book: book.clone(),
            },
        };
        self.catalog.begin(request, kind);
        self.outbox.push(effect);
    }
}
