// SPDX-License-Identifier: PMPL-1.0-or-later
//! Legacy dashboard model.
//!
//! The classic dashboard JSON document (also the `spec` of a `v1`
//! resource) and the `dashboard + meta` envelope returned by the legacy
//! REST API. Fields the model does not know about are kept in
//! [`Dashboard::extra`] so a document survives a read/modify/write cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::k8s::{AnnotationPermission, ObjectMeta};

/// Dashboard time range (`now-6h` .. `now` style expressions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            from: "now-6h".to_string(),
            to: "now".to_string(),
        }
    }
}

/// A legacy / v1 dashboard document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Numeric database id. Absent for dashboards that were never saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    /// 0 = shared nothing, 1 = shared crosshair, 2 = shared tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_tooltip: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Value>,
    /// `{ "list": [...] }` wrapper of template variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<Value>,
    /// `{ "list": [...] }` wrapper of annotation queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
    /// Everything else the document carries.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    /// Create an empty dashboard with a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Metadata returned next to a dashboard by the legacy read endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_url: Option<String>,
    #[serde(default)]
    pub can_save: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_admin: bool,
    #[serde(default)]
    pub can_star: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub provisioned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations_permissions: Option<AnnotationPermission>,
    /// Raw resource metadata, set only for reads served by a resource API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s: Option<ObjectMeta>,
}

/// The legacy `dashboard + meta` read shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDto {
    pub dashboard: Dashboard,
    #[serde(default)]
    pub meta: DashboardMeta,
}
