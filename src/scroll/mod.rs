// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-panel scroll handling: infinite-scroll pagination and highlight tracking.
//!
//! The coordinator never measures anything itself. The host reports a
//! [`ViewportLayout`] (positions relative to the top of the viewport) and gets back
//! [`ScrollAction`]s; section and highlight changes are forwarded to the session.

pub mod coalesce;

use tokio::time::Instant;

use crate::config::ScrollConfig;
use crate::model::{PanelId, Ref};
use crate::session::Intent;

pub use coalesce::{CoalesceMode, FrameCoalescer};

/// One rendered section of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayout {
    pub reference: Ref,
    pub top: f64,
    pub height: f64,
    /// Still showing the loading indicator.
    pub loading: bool,
    pub next: Option<Ref>,
    pub prev: Option<Ref>,
}

/// One rendered segment (verse, line) of a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    pub reference: Ref,
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportLayout {
    pub scroll_top: f64,
    pub height: f64,
    /// Height taken by a connections list sharing the panel.
    pub companion_height: f64,
    pub sections: Vec<SectionLayout>,
    pub segments: Vec<SegmentLayout>,
}

impl ViewportLayout {
    fn section_refs(&self) -> impl Iterator<Item = &Ref> {
        self.sections.iter().map(|section| &section.reference)
    }

    fn viewport(&self) -> f64 {
        self.height - self.companion_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollAction {
    /// New loaded-section list for the panel.
    SectionsChanged(Vec<Ref>),
    /// Move the viewport to this scroll offset.
    ScrollTo(f64),
    HighlightRetargeted(Ref),
}

impl ScrollAction {
    /// The session intent this action feeds, if any.
    pub fn into_intent(self, panel: PanelId) -> Option<Intent> {
        match self {
            Self::SectionsChanged(refs) => Some(Intent::SectionsChanged { panel, refs }),
            Self::HighlightRetargeted(reference) => {
                Some(Intent::HighlightRetargeted {
                    panel,
                    refs: vec![reference],
                })
            }
            Self::ScrollTo(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollCoordinator {
    config: ScrollConfig,
    multi_panel: bool,
    sections: Vec<Ref>,
    highlight: Vec<Ref>,
    restoring_offset: bool,
    initial_scroll_set: bool,
    scrolled_to_highlight: bool,
    just_scrolled: bool,
    scroll_frame: FrameCoalescer,
    highlight_debounce: FrameCoalescer,
}

impl ScrollCoordinator {
    pub fn new(sections: Vec<Ref>, multi_panel: bool, config: ScrollConfig) -> Self {
        Self {
            multi_panel,
            sections,
            highlight: Vec::new(),
            restoring_offset: false,
            initial_scroll_set: false,
            scrolled_to_highlight: false,
            just_scrolled: false,
            scroll_frame: FrameCoalescer::frame(config.scroll_frame()),
            highlight_debounce: FrameCoalescer::debounce(config.highlight_debounce()),
            config,
        }
    }

    pub fn sections(&self) -> &[Ref] {
        &self.sections
    }

    pub fn highlight(&self) -> &[Ref] {
        &self.highlight
    }

    pub fn is_restoring_offset(&self) -> bool {
        self.restoring_offset
    }

    /// Adopts the panel's section list after a store change.
    ///
    /// A list sharing nothing with the current one is a different text: initial
    /// positioning runs again.
    pub fn sync_sections(&mut self, sections: &[Ref]) {
        if self.sections == sections {
            return;
        }
        let related = sections
            .iter()
            .any(|incoming| self.sections.iter().any(|current| current.same_location(incoming)));
        if !related {
            self.initial_scroll_set = false;
            self.scrolled_to_highlight = false;
            self.restoring_offset = false;
        }
        self.sections = sections.to_vec();
    }

    /// Adopts the panel's effective highlight. A highlight set from outside is
    /// scrolled into view on the next layout.
    pub fn sync_highlight(&mut self, refs: &[Ref]) {
        if self.highlight == refs {
            return;
        }
        self.highlight = refs.to_vec();
        self.scrolled_to_highlight = false;
        if refs.is_empty() {
            self.highlight_debounce.cancel();
        }
    }

    /// Records a scroll event. Scrolls the coordinator caused itself are swallowed.
    pub fn note_scroll(&mut self, now: Instant) {
        if self.just_scrolled {
            self.just_scrolled = false;
            tracing::debug!("ignoring programmatic scroll");
            return;
        }
        self.scroll_frame.trigger(now);
        if !self.highlight.is_empty() {
            self.highlight_debounce.trigger(now);
        }
    }

    /// When the next coalesced recomputation is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scroll_frame.deadline(), self.highlight_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs whichever recomputations are due at `now`.
    pub fn tick(&mut self, now: Instant, layout: &ViewportLayout) -> Vec<ScrollAction> {
        let mut actions = Vec::new();
        if self.scroll_frame.poll(now) {
            actions.extend(self.adjust_infinite_scroll(layout));
        }
        if self.highlight_debounce.poll(now) {
            actions.extend(self.adjust_highlight(layout));
        }
        actions
    }

    /// Called after every render: restores the offset after a prepend, scrolls a new
    /// highlight into view, or applies the initial offset.
    pub fn on_layout(&mut self, layout: &ViewportLayout) -> Vec<ScrollAction> {
        if self.restoring_offset {
            let [first, second, ..] = layout.sections.as_slice() else {
                return Vec::new();
            };
            if first.loading {
                return Vec::new();
            }
            self.restoring_offset = false;
            self.initial_scroll_set = true;
            self.just_scrolled = true;
            let top = second.top + layout.scroll_top - self.config.loading_indicator_height;
            return vec![ScrollAction::ScrollTo(top)];
        }

        if !self.scrolled_to_highlight {
            let highlighted = layout.segments.iter().find(|segment| {
                self.highlight.iter().any(|reference| reference.same_location(&segment.reference))
            });
            if let Some(segment) = highlighted {
                self.scrolled_to_highlight = true;
                self.initial_scroll_set = true;
                self.just_scrolled = true;
                let viewport = layout.viewport();
                let margin = self.config.initial_scroll_top;
                let offset = if segment.height > viewport + margin {
                    margin
                } else {
                    (viewport - segment.height) / 2.0
                };
                return vec![ScrollAction::ScrollTo(segment.top + layout.scroll_top - offset)];
            }
        }

        let first_loaded = layout.sections.first().is_some_and(|section| !section.loading);
        if !self.initial_scroll_set && first_loaded {
            self.initial_scroll_set = true;
            // Leave room above so the user can scroll up into the previous section.
            if layout.scroll_top < self.config.initial_scroll_top {
                self.just_scrolled = true;
                return vec![ScrollAction::ScrollTo(self.config.initial_scroll_top)];
            }
        }
        Vec::new()
    }

    /// Drops, appends or prepends one section depending on where the viewport sits.
    pub fn adjust_infinite_scroll(&mut self, layout: &ViewportLayout) -> Vec<ScrollAction> {
        // A layout of a list we already changed has not caught up yet.
        if !layout.section_refs().eq(self.sections.iter()) {
            tracing::debug!("skipping infinite scroll on a stale layout");
            return Vec::new();
        }
        let (Some(first), Some(last)) = (layout.sections.first(), layout.sections.last()) else {
            return Vec::new();
        };

        let bottom = layout.height;
        if last.top > bottom + self.config.drop_tail_margin && self.sections.len() > 1 {
            self.sections.pop();
            return vec![ScrollAction::SectionsChanged(self.sections.clone())];
        }

        if last.top + last.height < bottom + self.config.append_margin {
            if last.loading {
                return Vec::new();
            }
            return match &last.next {
                Some(next) => {
                    self.sections.push(next.clone());
                    vec![ScrollAction::SectionsChanged(self.sections.clone())]
                }
                None => Vec::new(),
            };
        }

        if layout.scroll_top < self.config.prepend_margin && !first.loading {
            if let Some(prev) = &first.prev {
                self.sections.insert(0, prev.clone());
                self.restoring_offset = true;
                return vec![ScrollAction::SectionsChanged(self.sections.clone())];
            }
        }
        Vec::new()
    }

    /// Moves the highlight to the first segment whose bottom crosses the highlight line.
    pub fn adjust_highlight(&mut self, layout: &ViewportLayout) -> Vec<ScrollAction> {
        if self.highlight.is_empty() {
            return Vec::new();
        }
        let line = if self.multi_panel {
            self.config.multi_panel_highlight_line
        } else {
            layout.viewport() / 2.0
        };
        let Some(segment) = layout
            .segments
            .iter()
            .find(|segment| segment.top + segment.height > line)
        else {
            return Vec::new();
        };
        if let [current] = self.highlight.as_slice() {
            if current.same_location(&segment.reference) {
                return Vec::new();
            }
        }
        self.highlight = vec![segment.reference.clone()];
        vec![ScrollAction::HighlightRetargeted(segment.reference.clone())]
    }
}
