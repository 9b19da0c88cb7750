// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folio: the state core of a multi-panel text reader.
//!
//! Panels live in a [`store::PanelStore`] and change only through [`ops::apply_ops`].
//! The [`session::SessionController`] turns UI intents into panel ops, mirrors the
//! panel list into navigable history and asks the host for fetches. The
//! [`scroll::ScrollCoordinator`] handles infinite scroll and highlight tracking for
//! one panel, and [`driver::Driver`] runs fetches against a [`library::Library`] on
//! tokio.

pub mod config;
pub mod driver;
pub mod history;
pub mod library;
pub mod model;
pub mod ops;
pub mod scroll;
pub mod session;
pub mod store;
