// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Initial panel layout, either from explicit parameters or decoded from a reader URL.

use std::collections::HashMap;

use crate::model::{DisplaySettings, Menu, MenuKind, Panel, PanelMode, Ref, RefError};

use super::panel_store::{PanelRules, PanelStore};

/// A partial panel description used for panels beyond the bootstrap pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSeed {
    pub refs: Vec<Ref>,
    pub mode: PanelMode,
    pub filter: Vec<String>,
    pub menu: Option<Menu>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BootstrapParams {
    pub multi_panel: bool,
    pub initial_refs: Vec<Ref>,
    /// `Some` opens connections for the initial refs; an empty list means "all".
    pub initial_filter: Option<Vec<String>>,
    pub initial_menu: Option<MenuKind>,
    pub initial_query: Option<String>,
    pub initial_sheets_tag: Option<String>,
    pub initial_navigation_categories: Option<Vec<String>>,
    pub initial_settings: Option<DisplaySettings>,
    pub initial_panels: Vec<PanelSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("url parameter '{key}' is not valid utf-8 after decoding")]
    Encoding { key: String },
    #[error("url names an invalid ref: {0}")]
    Ref(#[from] RefError),
}

impl PanelStore {
    /// Builds the first store of a session.
    ///
    /// Every bootstrap panel is partial (`complete_state == false`): its first report
    /// back to the session replaces the initial history entry instead of pushing.
    pub fn bootstrap(params: &BootstrapParams, rules: PanelRules) -> Self {
        let mut store = PanelStore::new(params.multi_panel, rules);
        let settings = params.initial_settings.unwrap_or_default();
        let refs = params.initial_refs.clone();

        let mut panels = Vec::new();
        if params.multi_panel {
            panels.push(Panel::new(store.allocate_id(), refs.clone(), PanelMode::Text));
            if let Some(filter) = &params.initial_filter {
                panels.push(Panel::connections(store.allocate_id(), refs, filter.clone()));
            }
            for seed in &params.initial_panels {
                let mut panel = Panel::new(store.allocate_id(), seed.refs.clone(), seed.mode);
                panel.filter = seed.filter.clone();
                panel.menu = seed.menu.clone();
                panels.push(panel);
            }
        } else {
            let mut panel = Panel::new(store.allocate_id(), refs.clone(), PanelMode::Text);
            if let Some(filter) = &params.initial_filter {
                panel.mode = PanelMode::TextAndConnections;
                panel.filter = filter.clone();
                panel.highlighted_refs = refs;
            }
            panels.push(panel);
        }

        if let Some(first) = panels.first_mut() {
            first.menu = initial_menu(params);
            if first.menu.is_none() && first.refs.is_empty() {
                first.menu = Some(Menu::Home);
            }
        }
        for panel in &mut panels {
            panel.settings = settings;
            panel.complete_state = false;
        }

        *store.panels_mut() = panels;
        store
    }
}

fn initial_menu(params: &BootstrapParams) -> Option<Menu> {
    let kind = params.initial_menu?;
    Some(match kind {
        MenuKind::Navigation => {
            Menu::Navigation {
                categories: params.initial_navigation_categories.clone(),
            }
        }
        MenuKind::Search => Menu::Search {
            query: params.initial_query.clone(),
        },
        MenuKind::Sheets => Menu::Sheets {
            tag: params.initial_sheets_tag.clone(),
        },
        other => Menu::open(other),
    })
}

/// One decoded URL fragment.
#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Home,
    Navigation(Option<Vec<String>>),
    Search(Option<String>),
    Sheets(Option<String>),
    Text {
        reference: Ref,
        filter: Option<Vec<String>>,
    },
}

fn decode_component(key: &str, raw: &str) -> Result<String, UrlError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| UrlError::Encoding {
            key: key.to_owned(),
        })
}

fn decode_filter(raw: &str) -> Vec<String> {
    if raw == "all" || raw.is_empty() {
        return Vec::new();
    }
    raw.split('+').map(|name| name.replace('_', " ")).collect()
}

fn decode_fragment(
    path: &str,
    with: Option<&str>,
    query: Option<&str>,
) -> Result<Fragment, UrlError> {
    let path = path.trim_matches('/');
    let mut segments = path.split('/');
    let head = segments.next().unwrap_or_default();
    let rest = segments.collect::<Vec<_>>();

    let fragment = match head {
        "" => Fragment::Home,
        "texts" => Fragment::Navigation(if rest.is_empty() {
            None
        } else {
            Some(
                rest.iter()
                    .map(|segment| decode_component("texts", segment))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }),
        "search" => Fragment::Search(match query {
            Some(raw) => Some(decode_component("q", raw)?),
            None => None,
        }),
        "sheets" => Fragment::Sheets(match rest.as_slice() {
            ["tags", tag, ..] => Some(decode_component("sheets", tag)?),
            _ => None,
        }),
        _ => Fragment::Text {
            reference: Ref::new(decode_component("ref", path)?)?.canonical(),
            filter: with.map(decode_filter),
        },
    };
    Ok(fragment)
}

fn split_query(query: &str) -> HashMap<&str, &str> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.entry(key).or_insert(value);
    }
    params
}

impl BootstrapParams {
    /// Decodes a reader URL (the inverse of history URL synthesis).
    ///
    /// `/Genesis.1?with=Rashi&p2=Exodus.2&with2=all` opens Genesis 1 with Rashi and a
    /// second slot on Exodus 2 with all connections. `url_prefix` (e.g. `/s2`) is
    /// stripped first when present.
    pub fn from_url(url: &str, multi_panel: bool, url_prefix: &str) -> Result<Self, UrlError> {
        let url = if url_prefix.is_empty() {
            url
        } else {
            url.strip_prefix(url_prefix).unwrap_or(url)
        };
        let url = url.trim_start_matches('/');
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let params = split_query(query);

        let mut bootstrap = BootstrapParams {
            multi_panel,
            ..BootstrapParams::default()
        };
        match decode_fragment(path, params.get("with").copied(), params.get("q").copied())? {
            Fragment::Home => bootstrap.initial_menu = Some(MenuKind::Home),
            Fragment::Navigation(categories) => {
                bootstrap.initial_menu = Some(MenuKind::Navigation);
                bootstrap.initial_navigation_categories = categories;
            }
            Fragment::Search(query) => {
                bootstrap.initial_menu = Some(MenuKind::Search);
                bootstrap.initial_query = query;
            }
            Fragment::Sheets(tag) => {
                bootstrap.initial_menu = Some(MenuKind::Sheets);
                bootstrap.initial_sheets_tag = tag;
            }
            Fragment::Text { reference, filter } => {
                bootstrap.initial_refs = vec![reference];
                bootstrap.initial_filter = filter;
            }
        }

        if !multi_panel {
            return Ok(bootstrap);
        }

        let mut slot = 2usize;
        let mut buf = itoa::Buffer::new();
        loop {
            let suffix = buf.format(slot);
            let Some(path) = params.get(format!("p{suffix}").as_str()).copied() else {
                break;
            };
            let with = params.get(format!("with{suffix}").as_str()).copied();
            let query = params.get(format!("q{suffix}").as_str()).copied();
            let seed = match decode_fragment(path, with, query)? {
                Fragment::Text {
                    reference,
                    filter: Some(filter),
                } => PanelSeed {
                    refs: vec![reference],
                    mode: PanelMode::Connections,
                    filter,
                    menu: None,
                },
                Fragment::Text {
                    reference,
                    filter: None,
                } => PanelSeed {
                    refs: vec![reference],
                    mode: PanelMode::Text,
                    filter: Vec::new(),
                    menu: None,
                },
                Fragment::Home => menu_seed(Menu::Home),
                Fragment::Navigation(categories) => menu_seed(Menu::Navigation { categories }),
                Fragment::Search(query) => menu_seed(Menu::Search { query }),
                Fragment::Sheets(tag) => menu_seed(Menu::Sheets { tag }),
            };
            bootstrap.initial_panels.push(seed);
            slot += 1;
        }
        Ok(bootstrap)
    }
}

fn menu_seed(menu: Menu) -> PanelSeed {
    PanelSeed {
        refs: Vec::new(),
        mode: PanelMode::Text,
        filter: Vec::new(),
        menu: Some(menu),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{BootstrapParams, PanelSeed};
    use crate::model::fixtures::r;
    use crate::model::{Menu, MenuKind, PanelMode};
    use crate::store::{PanelRules, PanelStore};

    #[rstest]
    fn single_panel_with_filter_opens_connections_in_place() {
        let params = BootstrapParams {
            initial_refs: vec![r("Genesis 1")],
            initial_filter: Some(vec!["Rashi".to_owned()]),
            ..BootstrapParams::default()
        };
        let store = PanelStore::bootstrap(&params, PanelRules::default());
        assert_eq!(store.len(), 1);
        let panel = &store.panels()[0];
        assert_eq!(panel.mode, PanelMode::TextAndConnections);
        assert_eq!(panel.highlighted_refs, vec![r("Genesis 1")]);
        assert_eq!(panel.filter, vec!["Rashi"]);
        assert!(!panel.complete_state);
    }

    #[rstest]
    fn multi_panel_with_filter_splits_into_text_and_connections() {
        let params = BootstrapParams {
            multi_panel: true,
            initial_refs: vec![r("Genesis 1")],
            initial_filter: Some(Vec::new()),
            initial_panels: vec![PanelSeed {
                refs: vec![r("Exodus 2")],
                mode: PanelMode::Text,
                filter: Vec::new(),
                menu: None,
            }],
            ..BootstrapParams::default()
        };
        let store = PanelStore::bootstrap(&params, PanelRules::default());
        let modes = store.panels().iter().map(|panel| panel.mode).collect::<Vec<_>>();
        assert_eq!(modes, vec![PanelMode::Text, PanelMode::Connections, PanelMode::Text]);
        assert_eq!(store.effective_highlight(0), &[r("Genesis 1")]);
        let ids = store.panels().iter().map(|panel| panel.id.get()).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    fn menu_state_applies_to_the_first_panel_only() {
        let params = BootstrapParams {
            multi_panel: true,
            initial_refs: vec![r("Genesis 1")],
            initial_filter: Some(Vec::new()),
            initial_menu: Some(MenuKind::Search),
            initial_query: Some("light".to_owned()),
            ..BootstrapParams::default()
        };
        let store = PanelStore::bootstrap(&params, PanelRules::default());
        assert_eq!(
            store.panels()[0].menu,
            Some(Menu::Search {
                query: Some("light".to_owned()),
            })
        );
        assert_eq!(store.panels()[1].menu, None);
    }

    #[rstest]
    fn empty_bootstrap_lands_on_home() {
        let store = PanelStore::bootstrap(&BootstrapParams::default(), PanelRules::default());
        assert_eq!(store.panels()[0].menu, Some(Menu::Home));
    }

    #[rstest]
    #[case("/", Some(MenuKind::Home))]
    #[case("/texts", Some(MenuKind::Navigation))]
    #[case("/sheets", Some(MenuKind::Sheets))]
    #[case("/search?q=light", Some(MenuKind::Search))]
    #[case("/Genesis.1", None)]
    fn url_path_selects_the_menu(#[case] url: &str, #[case] menu: Option<MenuKind>) {
        let params = BootstrapParams::from_url(url, false, "").unwrap();
        assert_eq!(params.initial_menu, menu);
    }

    #[rstest]
    fn url_decodes_menu_sub_state() {
        let nav = BootstrapParams::from_url("/texts/Tanach/Torah", false, "").unwrap();
        assert_eq!(
            nav.initial_navigation_categories,
            Some(vec!["Tanach".to_owned(), "Torah".to_owned()])
        );
        let search =
            BootstrapParams::from_url("/search?q=in%20the%20beginning", false, "").unwrap();
        assert_eq!(search.initial_query.as_deref(), Some("in the beginning"));
        let sheets = BootstrapParams::from_url("/sheets/tags/Shabbat", false, "").unwrap();
        assert_eq!(sheets.initial_sheets_tag.as_deref(), Some("Shabbat"));
    }

    #[rstest]
    fn url_decodes_secondary_slots() {
        let params = BootstrapParams::from_url(
            "/s2/Genesis.1?with=Rashi&p2=Exodus.2&with2=all&p3=search&q3=water",
            true,
            "/s2",
        )
        .unwrap();
        assert_eq!(params.initial_refs, vec![r("Genesis 1")]);
        assert_eq!(params.initial_filter, Some(vec!["Rashi".to_owned()]));
        assert_eq!(params.initial_panels.len(), 2);
        assert_eq!(params.initial_panels[0].mode, PanelMode::Connections);
        assert!(params.initial_panels[0].filter.is_empty());
        assert_eq!(
            params.initial_panels[1].menu,
            Some(Menu::Search {
                query: Some("water".to_owned()),
            })
        );
    }

    #[rstest]
    fn url_with_a_broken_ref_is_rejected() {
        assert!(BootstrapParams::from_url("/Genesis.1:", false, "").is_err());
    }
}
