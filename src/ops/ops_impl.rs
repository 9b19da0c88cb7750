// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Per-op transition helpers used by `apply_ops`.
/// Each returns whether the store changed; `false` covers both stale indices and
/// transitions that turned out to be no-ops.
fn apply_op(store: &mut PanelStore, op: &PanelOp, delta: &mut DeltaBuilder) -> bool {
    match op {
        PanelOp::OpenPanelAfter { index, reference } => {
            open_panel_after(store, *index, reference, delta)
        }
        PanelOp::OpenConnectionsAt { index, refs } => {
            open_connections_at(store, *index, refs, delta)
        }
        PanelOp::SetHighlightForFollowing { index, refs } => {
            set_highlight_for_following(store, *index, refs, delta)
        }
        PanelOp::UpdatePanel { index, panel } => update_panel(store, *index, panel, delta),
        PanelOp::ClosePanel { index } => close_panel(store, *index, delta),
        PanelOp::Edit { index, edit } => edit_panel(store, *index, edit, delta),
    }
}

fn record_if_changed(before: &Panel, after: &Panel, delta: &mut DeltaBuilder) -> bool {
    if before == after {
        return false;
    }
    delta.record_updated(after.id);
    true
}

fn open_panel_after(
    store: &mut PanelStore,
    index: usize,
    reference: &Ref,
    delta: &mut DeltaBuilder,
) -> bool {
    if !store.multi_panel() || index >= store.len() {
        return false;
    }
    let settings = store.panels()[index].settings;
    let id = store.allocate_id();
    let mut panel = Panel::text(id, reference.clone());
    panel.settings = settings;
    store.panels_mut().insert(index + 1, panel);
    delta.record_added(id);
    true
}

fn open_connections_at(
    store: &mut PanelStore,
    index: usize,
    refs: &[Ref],
    delta: &mut DeltaBuilder,
) -> bool {
    // A connections panel always has an anchor, and only exists as its own column.
    let Some(anchor) = refs.last() else {
        return false;
    };
    if !store.multi_panel() {
        return false;
    }

    if index == store.len() {
        let settings = store.panels().last().map(|panel| panel.settings).unwrap_or_default();
        let id = store.allocate_id();
        let mut panel = Panel::connections(id, refs.to_vec(), Vec::new());
        panel.settings = settings;
        store.panels_mut().push(panel);
        delta.record_added(id);
        return true;
    }

    let Some(panel) = store.panels_mut().get_mut(index) else {
        return false;
    };
    let before = panel.clone();
    let same_book = panel.refs.last().is_some_and(|previous| previous.book() == anchor.book());
    if !same_book {
        panel.filter.clear();
    }
    panel.refs = refs.to_vec();
    panel.menu = None;
    panel.mode = PanelMode::Connections;
    record_if_changed(&before, panel, delta)
}

fn set_highlight_for_following(
    store: &mut PanelStore,
    index: usize,
    refs: &[Ref],
    delta: &mut DeltaBuilder,
) -> bool {
    let follows = index < store.len()
        && store
            .get(index + 1)
            .is_some_and(|next| next.mode == PanelMode::Connections && !next.has_menu_open());
    if !follows {
        return false;
    }
    open_connections_at(store, index + 1, refs, delta)
}

fn update_panel(
    store: &mut PanelStore,
    index: usize,
    replacement: &Panel,
    delta: &mut DeltaBuilder,
) -> bool {
    let Some(current) = store.panels_mut().get_mut(index) else {
        return false;
    };
    let mut replacement = replacement.clone();
    replacement.id = current.id;
    if *current == replacement {
        return false;
    }

    let language = replacement.settings.language;
    let language_changed = current.settings.language != language;
    *current = replacement;
    delta.record_updated(current.id);

    if language_changed {
        if let Some(next) = store.panels_mut().get_mut(index + 1) {
            if next.mode == PanelMode::Connections && next.settings.language != language {
                next.settings.language = language;
                delta.record_updated(next.id);
            }
        }
    }
    true
}

fn close_panel(store: &mut PanelStore, index: usize, delta: &mut DeltaBuilder) -> bool {
    if index >= store.len() || store.len() == 1 {
        return false;
    }
    let removed = store.panels_mut().remove(index);
    if removed.mode == PanelMode::Connections && index > 0 {
        if let Some(driver) = store.panels_mut().get_mut(index - 1) {
            if !driver.highlighted_refs.is_empty() {
                driver.highlighted_refs.clear();
                delta.record_updated(driver.id);
            }
        }
    }
    delta.record_removed(removed.id);
    true
}

fn edit_panel(
    store: &mut PanelStore,
    index: usize,
    edit: &PanelEdit,
    delta: &mut DeltaBuilder,
) -> bool {
    let rules = *store.rules();
    let Some(panel) = store.panels_mut().get_mut(index) else {
        return false;
    };
    let before = panel.clone();

    match edit {
        PanelEdit::ShowBaseText(reference) => panel.show_base_text(reference.clone()),
        PanelEdit::OpenConnectionsInPanel(refs) => {
            if refs.is_empty() {
                return false;
            }
            panel.open_connections_in_panel(refs.clone());
        }
        PanelEdit::CloseConnectionsInPanel => panel.close_connections_in_panel(),
        PanelEdit::OpenMenu(kind) => panel.open_menu(*kind),
        PanelEdit::CloseMenus => panel.close_menus(),
        PanelEdit::SetNavigationCategories(categories) => {
            panel.set_navigation_categories(categories.clone());
        }
        PanelEdit::SetSheetTag(tag) => panel.set_sheet_tag(tag.clone()),
        PanelEdit::SetSearchQuery(query) => panel.set_search_query(query.clone()),
        PanelEdit::OpenSearch(query) => panel.open_search(query.clone()),
        PanelEdit::SetFilter {
            filter,
            update_recent,
        } => {
            panel.set_filter(filter.clone(), *update_recent, rules.recent_filter_cap);
        }
        PanelEdit::SetOption { option, category } => {
            panel.set_option(*option, category.as_deref(), rules.font_scale_step);
        }
        PanelEdit::OpenDisplaySettings => panel.display_settings_open = true,
        PanelEdit::CloseDisplaySettings => panel.display_settings_open = false,
        PanelEdit::SetHighlight(refs) => panel.highlighted_refs = refs.clone(),
        PanelEdit::SetSections(refs) => {
            if refs.is_empty() {
                return false;
            }
            panel.refs = refs.clone();
        }
        PanelEdit::ReplaceRef { from, to } => {
            for reference in panel.refs.iter_mut().filter(|reference| **reference == *from) {
                *reference = to.clone();
            }
        }
        PanelEdit::MarkComplete => panel.complete_state = true,
    }

    record_if_changed(&before, panel, delta)
}
