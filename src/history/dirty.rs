// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use crate::model::{same_locations, Menu, Panel, PanelMode, Ref};

/// Whether moving from `prev` (the state of the current history entry) to `next` is a
/// change history should record.
///
/// Only fields that show up in the URL or title count. Display settings, recent
/// filters and loaded-but-not-last sections do not.
pub fn should_update(prev: Option<&[Panel]>, next: &[Panel]) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    if prev.len() != next.len() {
        return true;
    }
    prev.iter().zip(next).any(|(prev, next)| panel_changed(prev, next))
}

fn panel_changed(prev: &Panel, next: &Panel) -> bool {
    if prev.mode != next.mode || prev.menu_kind() != next.menu_kind() {
        return true;
    }

    let content_changed = match next.mode {
        PanelMode::Text => !same_ref(prev.last_ref(), next.last_ref()),
        PanelMode::TextAndConnections => {
            !same_ref(prev.last_highlighted_ref(), next.last_highlighted_ref())
        }
        PanelMode::Connections => {
            !same_filter(&prev.filter, &next.filter) || !same_locations(&prev.refs, &next.refs)
        }
    };
    if content_changed {
        return true;
    }

    let (prev_menu, next_menu) = (prev.menu.as_ref(), next.menu.as_ref());
    search_query(prev_menu) != search_query(next_menu)
        || sheet_tag(prev_menu) != sheet_tag(next_menu)
        || navigation_categories(prev_menu) != navigation_categories(next_menu)
}

fn same_ref(prev: Option<&Ref>, next: Option<&Ref>) -> bool {
    match (prev, next) {
        (Some(prev), Some(next)) => prev.same_location(next),
        (None, None) => true,
        _ => false,
    }
}

fn same_filter(prev: &[String], next: &[String]) -> bool {
    let prev = prev.iter().collect::<HashSet<_>>();
    let next = next.iter().collect::<HashSet<_>>();
    prev == next
}

fn search_query(menu: Option<&Menu>) -> Option<&str> {
    menu.and_then(Menu::search_query)
}

fn sheet_tag(menu: Option<&Menu>) -> Option<&str> {
    match menu {
        Some(Menu::Sheets { tag }) => tag.as_deref(),
        _ => None,
    }
}

/// `None` and `Some([])` stay distinct: absent only equals absent.
fn navigation_categories(menu: Option<&Menu>) -> Option<&[String]> {
    match menu {
        Some(Menu::Navigation { categories }) => categories.as_deref(),
        _ => None,
    }
}
