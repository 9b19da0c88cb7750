// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::PanelId;
use super::panel::Panel;
use super::reference::Ref;

pub(crate) fn r(text: &str) -> Ref {
    Ref::new(text).expect("fixture ref")
}

pub(crate) fn text_panel(id: u64, reference: &str) -> Panel {
    Panel::text(PanelId::new(id), r(reference))
}

pub(crate) fn connections_panel(id: u64, anchor: &str, filter: &[&str]) -> Panel {
    Panel::connections(
        PanelId::new(id),
        vec![r(anchor)],
        filter.iter().map(|name| (*name).to_owned()).collect(),
    )
}

/// `[Text(Genesis 1), Connections(Genesis 1, [Rashi])]`: the two-panel commentary view.
pub(crate) fn text_with_commentary() -> Vec<Panel> {
    vec![text_panel(1, "Genesis 1"), connections_panel(2, "Genesis 1", &["Rashi"])]
}
