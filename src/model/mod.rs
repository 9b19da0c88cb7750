// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: refs, panel records and stable ids.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod panel;
pub mod reference;

pub use ids::{Id, PanelId, RequestId};
pub use panel::{
    ColorScheme, DisplayOption, DisplaySettings, FontStep, Language, Menu, MenuKind, Panel,
    PanelMode, TextLayout, UnknownMenuError, DEFAULT_FONT_SIZE,
};
pub use reference::{
    last_ref, parse_ref, parse_refs, same_locations, ParsedRef, Ref, RefError, Sections,
};
