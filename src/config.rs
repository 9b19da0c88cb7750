// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reader configuration, loaded from JSON with every field optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::history::HistoryCodec;
use crate::model::DisplaySettings;
use crate::store::PanelRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub multi_panel: bool,
    pub site_name: String,
    pub home_title: String,
    /// Mount point prepended to every history URL (e.g. `/s2`).
    pub url_prefix: String,
    pub recent_filter_cap: usize,
    pub font_scale_step: f64,
    /// Multiplied by the result page number to get the requested hit count.
    pub search_page_size: usize,
    pub settings: DisplaySettings,
    pub scroll: ScrollConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            multi_panel: false,
            site_name: "Sefaria".to_owned(),
            home_title: "Sefaria: a Living Library of Jewish Texts Online".to_owned(),
            url_prefix: String::new(),
            recent_filter_cap: 5,
            font_scale_step: 1.15,
            search_page_size: 100,
            settings: DisplaySettings::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

/// Pixel thresholds and timings for the scroll coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Drop the last section once its top is this far below the viewport bottom.
    pub drop_tail_margin: f64,
    /// Append the next section once the last one's bottom is within this of the viewport bottom.
    pub append_margin: f64,
    /// Prepend the previous section once scrolled within this of the top.
    pub prepend_margin: f64,
    pub multi_panel_highlight_line: f64,
    pub initial_scroll_top: f64,
    pub loading_indicator_height: f64,
    pub highlight_debounce_ms: u64,
    pub scroll_frame_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            drop_tail_margin: 100.0,
            append_margin: 80.0,
            prepend_margin: 20.0,
            multi_panel_highlight_line: 200.0,
            initial_scroll_top: 30.0,
            loading_indicator_height: 118.0,
            highlight_debounce_ms: 100,
            scroll_frame_ms: 16,
        }
    }
}

impl ScrollConfig {
    pub fn highlight_debounce(&self) -> Duration {
        Duration::from_millis(self.highlight_debounce_ms)
    }

    pub fn scroll_frame(&self) -> Duration {
        Duration::from_millis(self.scroll_frame_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("failed to parse config {path}: {message}")]
    Json { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ReaderConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| ConfigError::Json {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_filter_cap == 0 {
            return Err(ConfigError::Invalid("recent_filter_cap must be at least 1".to_owned()));
        }
        if self.font_scale_step.is_nan() || self.font_scale_step <= 1.0 {
            return Err(ConfigError::Invalid("font_scale_step must be greater than 1".to_owned()));
        }
        if self.search_page_size == 0 {
            return Err(ConfigError::Invalid("search_page_size must be at least 1".to_owned()));
        }
        Ok(())
    }

    pub fn panel_rules(&self) -> PanelRules {
        PanelRules {
            recent_filter_cap: self.recent_filter_cap,
            font_scale_step: self.font_scale_step,
        }
    }

    pub fn history_codec(&self) -> HistoryCodec {
        HistoryCodec::new(&*self.site_name, &*self.home_title, &*self.url_prefix)
    }
}
