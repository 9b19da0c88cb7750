// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::PanelId;
use super::reference::Ref;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelMode {
    Text,
    Connections,
    TextAndConnections,
}

impl PanelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Connections => "Connections",
            Self::TextAndConnections => "TextAndConnections",
        }
    }
}

impl fmt::Display for PanelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which overlay menu is shown; the payload-free half of [`Menu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Home,
    Navigation,
    TextToc,
    Search,
    Sheets,
}

impl MenuKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Navigation => "navigation",
            Self::TextToc => "text toc",
            Self::Search => "search",
            Self::Sheets => "sheets",
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown menu '{0}'")]
pub struct UnknownMenuError(pub String);

impl FromStr for MenuKind {
    type Err = UnknownMenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "navigation" => Ok(Self::Navigation),
            "text toc" => Ok(Self::TextToc),
            "search" => Ok(Self::Search),
            "sheets" => Ok(Self::Sheets),
            other => Err(UnknownMenuError(other.to_owned())),
        }
    }
}

/// An open overlay menu together with the sub-state that only that menu uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Menu {
    Home,
    Navigation {
        #[serde(default)]
        categories: Option<Vec<String>>,
    },
    TextToc,
    Search {
        #[serde(default)]
        query: Option<String>,
    },
    Sheets {
        #[serde(default)]
        tag: Option<String>,
    },
}

impl Menu {
    /// A freshly opened menu of `kind`, with no sub-state carried over.
    pub fn open(kind: MenuKind) -> Self {
        match kind {
            MenuKind::Home => Self::Home,
            MenuKind::Navigation => Self::Navigation { categories: None },
            MenuKind::TextToc => Self::TextToc,
            MenuKind::Search => Self::Search { query: None },
            MenuKind::Sheets => Self::Sheets { tag: None },
        }
    }

    pub fn kind(&self) -> MenuKind {
        match self {
            Self::Home => MenuKind::Home,
            Self::Navigation { .. } => MenuKind::Navigation,
            Self::TextToc => MenuKind::TextToc,
            Self::Search { .. } => MenuKind::Search,
            Self::Sheets { .. } => MenuKind::Sheets,
        }
    }

    pub fn search_query(&self) -> Option<&str> {
        match self {
            Self::Search { query } => query.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hebrew,
    Bilingual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayout {
    #[default]
    Segmented,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Sepia,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStep {
    Smaller,
    Larger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "option", content = "value", rename_all = "snake_case")]
pub enum DisplayOption {
    Language(Language),
    Layout(TextLayout),
    Color(ColorScheme),
    FontSize(FontStep),
}

pub const DEFAULT_FONT_SIZE: f64 = 62.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub language: Language,
    pub layout_default: TextLayout,
    pub layout_tanach: TextLayout,
    pub layout_talmud: TextLayout,
    pub color: ColorScheme,
    /// Percentage of the base font size.
    pub font_size: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            language: Language::English,
            layout_default: TextLayout::Segmented,
            layout_tanach: TextLayout::Segmented,
            layout_talmud: TextLayout::Continuous,
            color: ColorScheme::Light,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl DisplaySettings {
    /// Layout used for a text whose top-level category is `category`.
    pub fn layout_for(&self, category: Option<&str>) -> TextLayout {
        match category {
            Some("Tanach") => self.layout_tanach,
            Some("Talmud") => self.layout_talmud,
            _ => self.layout_default,
        }
    }

    fn layout_slot(&mut self, category: Option<&str>) -> &mut TextLayout {
        match category {
            Some("Tanach") => &mut self.layout_tanach,
            Some("Talmud") => &mut self.layout_talmud,
            _ => &mut self.layout_default,
        }
    }

    pub fn apply(&mut self, option: DisplayOption, category: Option<&str>, font_step: f64) {
        match option {
            DisplayOption::Language(language) => self.language = language,
            DisplayOption::Layout(layout) => *self.layout_slot(category) = layout,
            DisplayOption::Color(color) => self.color = color,
            DisplayOption::FontSize(FontStep::Smaller) => self.font_size /= font_step,
            DisplayOption::FontSize(FontStep::Larger) => self.font_size *= font_step,
        }
    }
}

/// One visible column of the reader.
///
/// The record is what history stores: everything here is restored verbatim on
/// back/forward. Load status and scroll geometry live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub refs: Vec<Ref>,
    pub mode: PanelMode,
    #[serde(default)]
    pub filter: Vec<String>,
    #[serde(default)]
    pub highlighted_refs: Vec<Ref>,
    #[serde(default)]
    pub recent_filters: Vec<String>,
    #[serde(default)]
    pub settings: DisplaySettings,
    #[serde(default)]
    pub menu: Option<Menu>,
    #[serde(default)]
    pub display_settings_open: bool,
    #[serde(default = "complete_by_default")]
    pub complete_state: bool,
}

fn complete_by_default() -> bool {
    true
}

impl Panel {
    pub fn new(id: PanelId, refs: Vec<Ref>, mode: PanelMode) -> Self {
        Self {
            id,
            refs,
            mode,
            filter: Vec::new(),
            highlighted_refs: Vec::new(),
            recent_filters: Vec::new(),
            settings: DisplaySettings::default(),
            menu: None,
            display_settings_open: false,
            complete_state: true,
        }
    }

    pub fn text(id: PanelId, reference: Ref) -> Self {
        Self::new(id, vec![reference], PanelMode::Text)
    }

    pub fn connections(id: PanelId, refs: Vec<Ref>, filter: Vec<String>) -> Self {
        let mut panel = Self::new(id, refs, PanelMode::Connections);
        panel.filter = filter;
        panel
    }

    pub fn last_ref(&self) -> Option<&Ref> {
        self.refs.last()
    }

    pub fn last_highlighted_ref(&self) -> Option<&Ref> {
        self.highlighted_refs.last()
    }

    pub fn menu_kind(&self) -> Option<MenuKind> {
        self.menu.as_ref().map(Menu::kind)
    }

    pub fn has_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Replace the primary text with `reference`, dropping connection state and menus.
    pub fn show_base_text(&mut self, reference: Ref) {
        self.mode = PanelMode::Text;
        self.refs = vec![reference];
        self.filter.clear();
        self.recent_filters.clear();
        self.menu = None;
    }

    pub fn open_connections_in_panel(&mut self, refs: Vec<Ref>) {
        self.highlighted_refs = refs;
        self.mode = PanelMode::TextAndConnections;
    }

    pub fn close_connections_in_panel(&mut self) {
        self.highlighted_refs.clear();
        self.mode = PanelMode::Text;
    }

    pub fn open_menu(&mut self, kind: MenuKind) {
        self.menu = Some(Menu::open(kind));
    }

    /// Close every menu; a panel with nothing to show falls back to the home menu.
    pub fn close_menus(&mut self) {
        self.menu = if self.refs.is_empty() { Some(Menu::Home) } else { None };
    }

    pub fn set_navigation_categories(&mut self, categories: Vec<String>) {
        self.menu = Some(Menu::Navigation {
            categories: Some(categories),
        });
    }

    pub fn set_sheet_tag(&mut self, tag: Option<String>) {
        self.menu = Some(Menu::Sheets { tag });
    }

    pub fn set_search_query(&mut self, query: Option<String>) {
        self.menu = Some(Menu::Search { query });
    }

    pub fn open_search(&mut self, query: Option<String>) {
        self.set_search_query(query);
    }

    /// Select a single connections filter (`None` shows everything).
    ///
    /// With `update_recent`, the filter moves to the front of `recent_filters`, which
    /// never holds duplicates and never grows past `recent_cap`.
    pub fn set_filter(&mut self, filter: Option<String>, update_recent: bool, recent_cap: usize) {
        if update_recent {
            if let Some(name) = &filter {
                self.recent_filters.retain(|recent| recent != name);
                self.recent_filters.insert(0, name.clone());
                self.recent_filters.truncate(recent_cap);
            }
        }
        self.filter = filter.into_iter().collect();
    }

    pub fn set_option(&mut self, option: DisplayOption, category: Option<&str>, font_step: f64) {
        self.settings.apply(option, category, font_step);
        if !matches!(option, DisplayOption::FontSize(_)) {
            self.display_settings_open = false;
        }
    }
}
