// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The ordered list of open panels.
//!
//! A `PanelStore` is a value: the session keeps the current one and swaps it for the
//! snapshot `ops::apply_ops` returns. Bootstrap builds the first one.

pub mod bootstrap;
pub mod panel_store;

pub use bootstrap::{BootstrapParams, PanelSeed, UrlError};
pub use panel_store::{PanelRules, PanelStore};
