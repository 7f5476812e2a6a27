// SPDX-License-Identifier: PMPL-1.0-or-later
//! Kubernetes-style resource envelope used by the `v1` and `v2` dashboard APIs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API group serving dashboard resources.
pub const DASHBOARD_GROUP: &str = "dashboard.grafana.app";
/// Resource kind of a dashboard object.
pub const DASHBOARD_KIND: &str = "Dashboard";

/// Annotation holding the uid of the parent folder.
pub const ANNO_KEY_FOLDER: &str = "grafana.app/folder";
/// Annotation holding the commit message of the last save.
pub const ANNO_KEY_MESSAGE: &str = "grafana.app/message";
pub const ANNO_KEY_CREATED_BY: &str = "grafana.app/createdBy";
pub const ANNO_KEY_UPDATED_BY: &str = "grafana.app/updatedBy";
pub const ANNO_KEY_UPDATED_TIMESTAMP: &str = "grafana.app/updatedTimestamp";
/// Label carrying the numeric id a dashboard had in the legacy store.
pub const LABEL_DEPRECATED_INTERNAL_ID: &str = "grafana.app/deprecatedInternalID";

/// Object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Look up an annotation, treating empty values as absent.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The legacy numeric id, if the object still carries one.
    pub fn deprecated_internal_id(&self) -> Option<i64> {
        self.labels
            .get(LABEL_DEPRECATED_INTERNAL_ID)
            .and_then(|v| v.parse().ok())
    }

    /// Time of the last update, falling back to the creation time.
    pub fn updated_timestamp(&self) -> Option<DateTime<Utc>> {
        self.annotation(ANNO_KEY_UPDATED_TIMESTAMP)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|t| t.with_timezone(&Utc))
            .or(self.creation_timestamp)
    }
}

/// List metadata (pagination).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
}

/// Outcome of converting a stored dashboard to the requested API version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStatus {
    #[serde(default)]
    pub failed: bool,
    /// API version the dashboard is stored as (e.g. `v2alpha1`).
    #[serde(default)]
    pub stored_version: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionStatus>,
}

impl DashboardStatus {
    /// The conversion status, but only when the conversion failed.
    pub fn failed_conversion(&self) -> Option<&ConversionStatus> {
        self.conversion.as_ref().filter(|c| c.failed)
    }
}

/// A typed resource: envelope plus `spec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource<T> {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DashboardStatus>,
}

impl<T> Resource<T> {
    /// Build a dashboard resource for `api_version` (e.g. `v1beta1`).
    pub fn dashboard(api_version: &str, metadata: ObjectMeta, spec: T) -> Self {
        Self {
            api_version: format!("{DASHBOARD_GROUP}/{api_version}"),
            kind: DASHBOARD_KIND.to_string(),
            metadata,
            spec,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationActions {
    #[serde(default)]
    pub can_add: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPermission {
    #[serde(default)]
    pub dashboard: AnnotationActions,
    #[serde(default)]
    pub organization: AnnotationActions,
}

/// What the requesting user may do with a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAccess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations_permissions: Option<AnnotationPermission>,
}

/// Resource envelope returned by the `/dto` subresource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWithAccessInfo<T> {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DashboardStatus>,
    #[serde(default)]
    pub access: DashboardAccess,
}

impl<T> DashboardWithAccessInfo<T> {
    /// The failed conversion, if the server could not convert the stored object.
    pub fn failed_conversion(&self) -> Option<&ConversionStatus> {
        self.status.as_ref().and_then(DashboardStatus::failed_conversion)
    }
}
