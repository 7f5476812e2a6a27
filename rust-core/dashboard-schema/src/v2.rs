// SPDX-License-Identifier: PMPL-1.0-or-later
//! v2 dashboard spec.
//!
//! The v2 model separates panel definitions (`elements`, keyed by name) from
//! their placement (`layout`). Element, layout, variable and annotation
//! bodies are kept as raw JSON: their kinds are open-ended and this crate
//! only needs to route them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How panels share the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorSync {
    #[default]
    Off,
    Crosshair,
    Tooltip,
}

impl CursorSync {
    /// The legacy `graphTooltip` number for this mode.
    pub fn graph_tooltip(self) -> i64 {
        match self {
            CursorSync::Off => 0,
            CursorSync::Crosshair => 1,
            CursorSync::Tooltip => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSettingsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub from: String,
    pub to: String,
    /// Refresh interval, empty when auto refresh is off.
    #[serde(default)]
    pub auto_refresh: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_refresh_intervals: Vec<String>,
    #[serde(default)]
    pub hide_timepicker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    #[serde(default)]
    pub fiscal_year_start_month: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_delay: Option<String>,
}

impl Default for TimeSettingsSpec {
    fn default() -> Self {
        Self {
            timezone: Some("browser".to_string()),
            from: "now-6h".to_string(),
            to: "now".to_string(),
            auto_refresh: String::new(),
            auto_refresh_intervals: Vec::new(),
            hide_timepicker: false,
            week_start: None,
            fiscal_year_start_month: 0,
            now_delay: None,
        }
    }
}

/// The v2 dashboard spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardV2Spec {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub cursor_sync: CursorSync,
    #[serde(default)]
    pub live_now: bool,
    #[serde(default)]
    pub preload: bool,
    #[serde(default)]
    pub links: Vec<Value>,
    #[serde(default)]
    pub time_settings: TimeSettingsSpec,
    #[serde(default)]
    pub variables: Vec<Value>,
    /// Panel and library-panel definitions keyed by element name.
    #[serde(default)]
    pub elements: BTreeMap<String, Value>,
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default)]
    pub layout: Value,
}

fn default_true() -> bool {
    true
}
