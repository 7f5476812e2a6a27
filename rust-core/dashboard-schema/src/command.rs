// SPDX-License-Identifier: PMPL-1.0-or-later
//! Save and delete commands.

use serde::{Deserialize, Serialize};

use crate::k8s::ObjectMeta;

/// Request to save a dashboard of model `T`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDashboardCommand<T> {
    pub dashboard: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uid: Option<String>,
    /// Save even if the stored version moved on since it was read.
    #[serde(default)]
    pub overwrite: bool,
    /// Resource metadata of the dashboard being updated, for resource APIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s: Option<ObjectMeta>,
}

impl<T> SaveDashboardCommand<T> {
    pub fn new(dashboard: T) -> Self {
        Self {
            dashboard,
            message: None,
            folder_uid: None,
            overwrite: false,
            k8s: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn in_folder(mut self, folder_uid: impl Into<String>) -> Self {
        self.folder_uid = Some(folder_uid.into());
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_k8s(mut self, meta: ObjectMeta) -> Self {
        self.k8s = Some(meta);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDashboardResponse {
    #[serde(default)]
    pub id: i64,
    pub uid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDashboardResponse {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub title: String,
}
