// SPDX-License-Identifier: PMPL-1.0-or-later
//! Dashboard version history.

use serde::{Deserialize, Serialize};

use crate::k8s::ListMeta;

/// One saved version of a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVersionInfo {
    pub version: i64,
    #[serde(default)]
    pub parent_version: i64,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardVersionList {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<DashboardVersionInfo>,
}

/// Pagination for version history requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionsQuery {
    pub limit: Option<u32>,
    pub continue_token: Option<String>,
}

impl VersionsQuery {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            continue_token: None,
        }
    }

    /// Query string pairs, using `continue_key` as the name of the token
    /// parameter (the APIs disagree on it).
    pub fn to_params(&self, continue_key: &str) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(token) = self.continue_token.as_ref().filter(|t| !t.is_empty()) {
            params.push((continue_key.to_string(), token.clone()));
        }
        params
    }
}
