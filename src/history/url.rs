// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Menu, Panel, PanelMode, Ref};

use super::HistorySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Home,
    Navigation,
    TextToc,
    Search,
    Sheets,
    SheetsTag,
    Text,
    Connections,
    TextAndConnections,
}

/// URL fragment and title for one panel, as if it were the only one open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelFragment {
    pub url: String,
    pub title: String,
    pub kind: FragmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCodec {
    site_name: String,
    home_title: String,
    url_prefix: String,
}

impl Default for HistoryCodec {
    fn default() -> Self {
        Self::new("Sefaria", "Sefaria: a Living Library of Jewish Texts Online", "")
    }
}

impl HistoryCodec {
    pub fn new(
        site_name: impl Into<String>,
        home_title: impl Into<String>,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            home_title: home_title.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Menus win over text; a text panel without the ref its mode needs has no fragment.
    pub fn panel_fragment(&self, panel: &Panel) -> Option<PanelFragment> {
        if let Some(menu) = &panel.menu {
            return Some(self.menu_fragment(menu, panel.last_ref()));
        }

        match panel.mode {
            PanelMode::Text => {
                let reference = panel.last_ref()?;
                Some(PanelFragment {
                    url: reference.normalized(),
                    title: reference.to_string(),
                    kind: FragmentKind::Text,
                })
            }
            PanelMode::Connections => {
                let reference = panel.last_ref()?;
                let sources = if panel.filter.is_empty() {
                    None
                } else {
                    Some(panel.filter.join("+"))
                };
                Some(connections_fragment(reference, sources, FragmentKind::Connections))
            }
            PanelMode::TextAndConnections => {
                let reference = panel.last_highlighted_ref()?;
                let sources = panel.filter.first().cloned();
                Some(connections_fragment(reference, sources, FragmentKind::TextAndConnections))
            }
        }
    }

    fn menu_fragment(&self, menu: &Menu, last_ref: Option<&Ref>) -> PanelFragment {
        let site = &self.site_name;
        match menu {
            Menu::Home => PanelFragment {
                url: String::new(),
                title: self.home_title.clone(),
                kind: FragmentKind::Home,
            },
            Menu::Navigation { categories } => match categories.as_deref() {
                Some(categories) if !categories.is_empty() => {
                    let segments: Vec<_> =
                        categories.iter().map(|category| urlencoding::encode(category)).collect();
                    PanelFragment {
                        url: format!("texts/{}", segments.join("/")),
                        title: format!("{} | {site}", categories.join(", ")),
                        kind: FragmentKind::Navigation,
                    }
                }
                _ => PanelFragment {
                    url: "texts".to_owned(),
                    title: format!("Texts | {site}"),
                    kind: FragmentKind::Navigation,
                },
            },
            Menu::TextToc => {
                let book = last_ref.map_or("404", Ref::book);
                PanelFragment {
                    url: book.replace(' ', "_"),
                    title: format!("{book} | {site}"),
                    kind: FragmentKind::TextToc,
                }
            }
            Menu::Search { query } => match query.as_deref().filter(|query| !query.is_empty()) {
                Some(query) => PanelFragment {
                    url: format!("search?q={}", urlencoding::encode(query)),
                    title: format!("{query} | {site} Search"),
                    kind: FragmentKind::Search,
                },
                None => PanelFragment {
                    url: "search".to_owned(),
                    title: format!("{site} Search"),
                    kind: FragmentKind::Search,
                },
            },
            Menu::Sheets { tag } => match tag.as_deref() {
                Some(tag) => PanelFragment {
                    url: format!("sheets/tags/{}", urlencoding::encode(tag)),
                    title: format!("{tag} | {site} Source Sheets"),
                    kind: FragmentKind::SheetsTag,
                },
                None => PanelFragment {
                    url: "sheets".to_owned(),
                    title: format!("{site} Source Sheets"),
                    kind: FragmentKind::Sheets,
                },
            },
        }
    }

    /// Merges per-panel fragments into one URL and title.
    ///
    /// The first slot is the path. A leading `Text` + `Connections` pair shares that
    /// slot under the connections fragment (`/Genesis.1?with=Rashi`). Every later slot
    /// `k` (1-based) is appended as `p<k>=`, with its own parameters suffixed by `k`.
    pub fn make_snapshot(&self, panels: &[Panel]) -> HistorySnapshot {
        let mut slots: Vec<PanelFragment> = Vec::new();
        for fragment in panels.iter().filter_map(|panel| self.panel_fragment(panel)) {
            let pairs_with_first = slots.len() == 1
                && slots[0].kind == FragmentKind::Text
                && fragment.kind == FragmentKind::Connections;
            if pairs_with_first {
                slots[0] = fragment;
            } else {
                slots.push(fragment);
            }
        }

        let mut url = String::from("/");
        let mut title = String::new();
        let mut slot_buf = itoa::Buffer::new();
        for (idx, slot) in slots.iter().enumerate() {
            if idx == 0 {
                url.push_str(&slot.url);
                title.push_str(&slot.title);
                continue;
            }
            let suffix = slot_buf.format(idx + 1);
            let param = format!("&p={}", slot.url.replacen('?', "&", 1));
            url.push_str(&param.replace('=', &format!("{suffix}=")));
            title.push_str(" & ");
            title.push_str(&slot.title);
        }
        if title.is_empty() {
            title.clone_from(&self.site_name);
        }
        if !url.contains('?') {
            url = url.replacen('&', "?", 1);
        }
        if !self.url_prefix.is_empty() {
            url.insert_str(0, &self.url_prefix);
        }

        HistorySnapshot {
            panels: panels.to_vec(),
            url,
            title,
        }
    }
}

fn connections_fragment(
    reference: &Ref,
    sources: Option<String>,
    kind: FragmentKind,
) -> PanelFragment {
    let (url_sources, title_sources) = match sources {
        Some(sources) => (sources.replace(' ', "_"), sources),
        None => ("all".to_owned(), "Connections".to_owned()),
    };
    PanelFragment {
        url: format!("{}?with={url_sources}", reference.normalized()),
        title: format!("{reference} with {title_sources}"),
        kind,
    }
}
