// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::model::fixtures::{connections_panel, r, text_panel, text_with_commentary};
use crate::model::{Language, Menu, MenuKind, Panel, PanelMode};
use crate::store::{BootstrapParams, PanelRules, PanelStore};

use super::{
    should_update, FragmentKind, HistoryCodec, HistorySnapshot, HistoryWrite, MemoryHistory,
    NavigableHistory,
};

#[fixture]
fn codec() -> HistoryCodec {
    HistoryCodec::default()
}

fn with_menu(mut panel: Panel, menu: Menu) -> Panel {
    panel.menu = Some(menu);
    panel
}

#[rstest]
fn two_panel_commentary_uses_the_short_form(codec: HistoryCodec) {
    let snapshot = codec.make_snapshot(&text_with_commentary());
    assert_eq!(snapshot.url, "/Genesis.1?with=Rashi");
    assert_eq!(snapshot.title, "Genesis 1 with Rashi");
}

#[rstest]
fn third_panel_takes_the_second_slot(codec: HistoryCodec) {
    let mut panels = text_with_commentary();
    panels.push(text_panel(3, "Exodus 2"));
    let snapshot = codec.make_snapshot(&panels);
    assert_eq!(snapshot.url, "/Genesis.1?with=Rashi&p2=Exodus.2");
    assert!(!snapshot.url.contains("p3"));
    assert_eq!(snapshot.title, "Genesis 1 with Rashi & Exodus 2");
}

#[rstest]
fn secondary_connections_parameters_are_numbered(codec: HistoryCodec) {
    let panels = vec![
        text_panel(1, "Genesis 1"),
        text_panel(2, "Exodus 2"),
        connections_panel(3, "Exodus 2:3", &["Rashi", "Ramban"]),
    ];
    let snapshot = codec.make_snapshot(&panels);
    assert_eq!(snapshot.url, "/Genesis.1?p2=Exodus.2&p3=Exodus.2.3&with3=Rashi+Ramban");
    assert_eq!(snapshot.title, "Genesis 1 & Exodus 2 & Exodus 2:3 with Rashi+Ramban");
}

#[rstest]
fn text_and_connections_uses_the_last_highlight_and_first_filter(codec: HistoryCodec) {
    let mut panel = text_panel(1, "Genesis 1");
    panel.open_connections_in_panel(vec![r("Genesis 1:2"), r("Genesis 1:5")]);
    panel.filter = vec!["Rashi".to_owned(), "Sforno".to_owned()];
    let fragment = codec.panel_fragment(&panel).unwrap();
    assert_eq!(fragment.url, "Genesis.1.5?with=Rashi");
    assert_eq!(fragment.title, "Genesis 1:5 with Rashi");
    assert_eq!(fragment.kind, FragmentKind::TextAndConnections);
}

#[rstest]
fn unfiltered_connections_read_all(codec: HistoryCodec) {
    let fragment = codec.panel_fragment(&connections_panel(1, "Genesis 1:1", &[])).unwrap();
    assert_eq!(fragment.url, "Genesis.1.1?with=all");
    assert_eq!(fragment.title, "Genesis 1:1 with Connections");
}

#[rstest]
#[case(Menu::Home, "/", "Sefaria: a Living Library of Jewish Texts Online")]
#[case(Menu::Navigation { categories: None }, "/texts", "Texts | Sefaria")]
#[case(
    Menu::Navigation {
        categories: Some(vec!["Tanach".to_owned(), "Torah".to_owned()]),
    },
    "/texts/Tanach/Torah",
    "Tanach, Torah | Sefaria"
)]
#[case(Menu::TextToc, "/Song_of_Songs", "Song of Songs | Sefaria")]
#[case(Menu::Search { query: None }, "/search", "Sefaria Search")]
#[case(
    Menu::Search {
        query: Some("water".to_owned()),
    },
    "/search?q=water",
    "water | Sefaria Search"
)]
#[case(Menu::Sheets { tag: None }, "/sheets", "Sefaria Source Sheets")]
#[case(
    Menu::Sheets {
        tag: Some("Shabbat".to_owned()),
    },
    "/sheets/tags/Shabbat",
    "Shabbat | Sefaria Source Sheets"
)]
fn menus_have_their_own_fragments(
    codec: HistoryCodec,
    #[case] menu: Menu,
    #[case] url: &str,
    #[case] title: &str,
) {
    let panel = with_menu(text_panel(1, "Song of Songs 2"), menu);
    let snapshot = codec.make_snapshot(&[panel]);
    assert_eq!(snapshot.url, url);
    assert_eq!(snapshot.title, title);
}

#[rstest]
fn search_queries_are_percent_encoded(codec: HistoryCodec) {
    let panel = with_menu(
        text_panel(1, "Genesis 1"),
        Menu::Search {
            query: Some("in the beginning".to_owned()),
        },
    );
    let snapshot = codec.make_snapshot(&[panel]);
    assert_eq!(snapshot.url, "/search?q=in%20the%20beginning");
    assert_eq!(snapshot.title, "in the beginning | Sefaria Search");
}

#[rstest]
fn navigation_categories_are_percent_encoded(codec: HistoryCodec) {
    let categories = vec!["Q&A".to_owned(), "Talmud Bavli".to_owned()];
    let nav = with_menu(
        text_panel(1, "Genesis 1"),
        Menu::Navigation {
            categories: Some(categories.clone()),
        },
    );

    let alone = codec.make_snapshot(std::slice::from_ref(&nav));
    assert_eq!(alone.url, "/texts/Q%26A/Talmud%20Bavli");
    assert_eq!(alone.title, "Q&A, Talmud Bavli | Sefaria");
    let decoded = BootstrapParams::from_url(&alone.url, false, "").unwrap();
    assert_eq!(decoded.initial_navigation_categories, Some(categories));

    let paired = codec.make_snapshot(&[nav, text_panel(2, "Exodus 2")]);
    assert_eq!(paired.url, "/texts/Q%26A/Talmud%20Bavli?p2=Exodus.2");
}

#[rstest]
fn unresolved_panels_are_skipped(codec: HistoryCodec) {
    let empty = Panel::new(crate::model::PanelId::new(1), Vec::new(), PanelMode::Text);
    let snapshot = codec.make_snapshot(&[empty.clone(), text_panel(2, "Exodus 1")]);
    assert_eq!(snapshot.url, "/Exodus.1");

    let nothing = codec.make_snapshot(&[empty]);
    assert_eq!(nothing.url, "/");
    assert_eq!(nothing.title, "Sefaria");
}

#[rstest]
fn url_prefix_is_prepended() {
    let codec = HistoryCodec::new("Sefaria", "Home", "/s2");
    assert_eq!(codec.make_snapshot(&text_with_commentary()).url, "/s2/Genesis.1?with=Rashi");
}

#[rstest]
fn synthesized_urls_decode_back_to_the_same_layout(codec: HistoryCodec) {
    let mut panels = text_with_commentary();
    panels.push(connections_panel(3, "Exodus 2:3", &["Rashi"]));
    let snapshot = codec.make_snapshot(&panels);

    let params = BootstrapParams::from_url(&snapshot.url, true, "").unwrap();
    let rebuilt = PanelStore::bootstrap(&params, PanelRules::default());
    let layout = |panels: &[Panel]| {
        panels
            .iter()
            .map(|panel| (panel.mode, panel.refs.clone(), panel.filter.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(rebuilt.panels()), layout(&panels));
}

#[rstest]
fn identical_states_are_clean() {
    let panels = text_with_commentary();
    assert!(!should_update(Some(&panels), &panels));
    assert!(should_update(None, &panels));
}

#[rstest]
#[case::mode(|panels: &mut Vec<Panel>| panels[0].mode = PanelMode::TextAndConnections)]
#[case::menu(|panels: &mut Vec<Panel>| panels[0].open_menu(MenuKind::TextToc))]
#[case::last_ref(|panels: &mut Vec<Panel>| panels[0].refs.push(r("Genesis 2")))]
#[case::filter(|panels: &mut Vec<Panel>| panels[1].filter = vec!["Ramban".to_owned()])]
#[case::anchor(|panels: &mut Vec<Panel>| panels[1].refs = vec![r("Genesis 1:4")])]
#[case::count(|panels: &mut Vec<Panel>| { panels.pop(); })]
fn governed_changes_are_dirty(#[case] change: fn(&mut Vec<Panel>)) {
    let prev = text_with_commentary();
    let mut next = prev.clone();
    change(&mut next);
    assert!(should_update(Some(&prev), &next));
}

#[rstest]
#[case::settings(|panels: &mut Vec<Panel>| panels[0].settings.language = Language::Hebrew)]
#[case::recent(|panels: &mut Vec<Panel>| panels[1].recent_filters.push("Rashi".to_owned()))]
#[case::earlier_sections(|panels: &mut Vec<Panel>| panels[0].refs.insert(0, r("Genesis 0")))]
#[case::filter_order(|panels: &mut Vec<Panel>| {
    panels[1].filter = vec!["Rashi".to_owned(), "Ramban".to_owned()];
})]
#[case::respelled_anchor(|panels: &mut Vec<Panel>| panels[1].refs = vec![r("Genesis.1")])]
fn ungoverned_changes_are_clean(#[case] change: fn(&mut Vec<Panel>)) {
    let mut prev = text_with_commentary();
    prev[1].filter = vec!["Ramban".to_owned(), "Rashi".to_owned()];
    let mut next = prev.clone();
    change(&mut next);
    assert!(!should_update(Some(&prev), &next));
}

#[rstest]
fn highlight_only_matters_in_text_and_connections_mode() {
    let mut prev = vec![text_panel(1, "Genesis 1")];
    let mut next = prev.clone();
    next[0].highlighted_refs = vec![r("Genesis 1:3")];
    assert!(!should_update(Some(&prev), &next));

    prev[0].mode = PanelMode::TextAndConnections;
    next[0].mode = PanelMode::TextAndConnections;
    assert!(should_update(Some(&prev), &next));
}

#[rstest]
#[case(Some(vec![]), None, true)]
#[case(None, None, false)]
#[case(Some(vec!["Tanach"]), Some(vec!["Tanach"]), false)]
#[case(Some(vec!["Tanach"]), Some(vec!["Talmud"]), true)]
fn navigation_categories_distinguish_absent_from_empty(
    #[case] prev: Option<Vec<&str>>,
    #[case] next: Option<Vec<&str>>,
    #[case] dirty: bool,
) {
    let nav = |categories: Option<Vec<&str>>| {
        vec![with_menu(
            text_panel(1, "Genesis 1"),
            Menu::Navigation {
                categories: categories
                    .map(|list| list.into_iter().map(str::to_owned).collect()),
            },
        )]
    };
    assert_eq!(should_update(Some(&nav(prev)), &nav(next)), dirty);
}

#[rstest]
fn search_query_and_sheet_tag_are_governed() {
    let search = |query: &str| {
        vec![with_menu(
            text_panel(1, "Genesis 1"),
            Menu::Search {
                query: Some(query.to_owned()),
            },
        )]
    };
    assert!(should_update(Some(&search("a")), &search("b")));

    let sheets = |tag: Option<&str>| {
        vec![with_menu(
            text_panel(1, "Genesis 1"),
            Menu::Sheets {
                tag: tag.map(str::to_owned),
            },
        )]
    };
    assert!(should_update(Some(&sheets(None)), &sheets(Some("Shabbat"))));
}

#[rstest]
fn state_json_round_trips_every_panel_field(codec: HistoryCodec) {
    let mut panels = text_with_commentary();
    panels[0].settings.language = Language::Bilingual;
    panels[0].recent_filters = vec!["Rashi".to_owned()];
    panels[1].display_settings_open = true;
    panels[1].complete_state = false;
    let snapshot = codec.make_snapshot(&panels);

    let raw = snapshot.to_state_json().unwrap();
    let back = HistorySnapshot::from_state_json(&raw).unwrap();
    assert_eq!(back, snapshot);

    let store = PanelStore::from_panels(true, PanelRules::default(), panels.clone());
    assert_eq!(store.with_panels(back.panels).panels(), panels.as_slice());
}

#[rstest]
fn state_json_without_panels_is_rejected() {
    let err = HistorySnapshot::from_state_json(r#"{"panels":[],"url":"/","title":"x"}"#);
    assert!(err.is_err());
    assert!(HistorySnapshot::from_state_json("not json").is_err());
}

#[rstest]
fn update_skips_clean_states_and_titles_written_ones(codec: HistoryCodec) {
    let mut history = MemoryHistory::new();
    let panels = text_with_commentary();

    assert!(codec.update(&mut history, &panels, HistoryWrite::Replace).is_some());
    assert_eq!(history.len(), 1);
    assert_eq!(history.document_title(), "Genesis 1 with Rashi");

    assert!(codec.update(&mut history, &panels, HistoryWrite::Push).is_none());
    assert_eq!(history.len(), 1);

    let mut moved = panels.clone();
    moved[1].refs = vec![r("Genesis 1:7")];
    codec.update(&mut history, &moved, HistoryWrite::Push).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.current_url(), Some("/Genesis.1.7?with=Rashi"));
}

#[rstest]
fn memory_history_drops_forward_entries_on_push(codec: HistoryCodec) {
    let mut history = MemoryHistory::new();
    for book in ["Genesis 1", "Exodus 1", "Leviticus 1"] {
        history.push(&codec.make_snapshot(&[text_panel(1, book)]));
    }
    assert_eq!(history.back().unwrap().url, "/Exodus.1");
    assert_eq!(history.back().unwrap().url, "/Genesis.1");
    assert!(history.back().is_none());
    assert_eq!(history.forward().unwrap().url, "/Exodus.1");

    history.push(&codec.make_snapshot(&[text_panel(1, "Numbers 1")]));
    assert_eq!(history.len(), 3);
    assert!(history.forward().is_none());
    assert_eq!(history.current_url(), Some("/Numbers.1"));
}
