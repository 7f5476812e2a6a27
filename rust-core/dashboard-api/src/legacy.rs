// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client for the legacy `/api/dashboards` REST endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use dashboard_schema::{
    Dashboard, DashboardDto, DashboardVersionInfo, DashboardVersionList, DeleteDashboardResponse,
    ListMeta, SaveDashboardCommand, SaveDashboardResponse, VersionsQuery,
};

use crate::api::{DashboardApi, UrlQueryMap};
use crate::error::Result;
use crate::k8s::validate_name;
use crate::transport::HttpTransport;
use crate::version::ApiVersion;

/// Body of `POST /api/dashboards/db`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDashboardRequest<'a> {
    dashboard: &'a Dashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_uid: Option<&'a str>,
    overwrite: bool,
}

/// Version history as served by the REST API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyVersionsResponse {
    #[serde(default)]
    continue_token: Option<String>,
    #[serde(default)]
    versions: Vec<LegacyVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyVersion {
    version: i64,
    #[serde(default)]
    parent_version: i64,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    message: String,
}

impl From<LegacyVersionsResponse> for DashboardVersionList {
    fn from(response: LegacyVersionsResponse) -> Self {
        DashboardVersionList {
            metadata: ListMeta {
                resource_version: None,
                continue_token: response.continue_token.filter(|t| !t.is_empty()),
            },
            items: response
                .versions
                .into_iter()
                .map(|v| DashboardVersionInfo {
                    version: v.version,
                    parent_version: v.parent_version,
                    created: v.created.map(|t| t.timestamp_millis()).unwrap_or(0),
                    message: v.message,
                })
                .collect(),
        }
    }
}

pub struct LegacyDashboardApi {
    transport: Arc<HttpTransport>,
}

impl LegacyDashboardApi {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DashboardApi<DashboardDto, Dashboard> for LegacyDashboardApi {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::Legacy
    }

    async fn get_dashboard_dto(&self, uid: &str, params: &UrlQueryMap) -> Result<DashboardDto> {
        validate_name(uid)?;
        self.transport
            .get(&format!("api/dashboards/uid/{uid}"), params)
            .await
    }

    async fn save_dashboard(
        &self,
        command: SaveDashboardCommand<Dashboard>,
    ) -> Result<SaveDashboardResponse> {
        let request = SaveDashboardRequest {
            dashboard: &command.dashboard,
            message: command.message.as_deref().filter(|m| !m.is_empty()),
            folder_uid: command.folder_uid.as_deref(),
            overwrite: command.overwrite,
        };
        self.transport.post("api/dashboards/db", &request).await
    }

    async fn delete_dashboard(
        &self,
        uid: &str,
        show_success_alert: bool,
    ) -> Result<DeleteDashboardResponse> {
        validate_name(uid)?;
        let response: DeleteDashboardResponse = self
            .transport
            .delete(&format!("api/dashboards/uid/{uid}"))
            .await?;
        if show_success_alert {
            info!(uid = %uid, title = %response.title, "Dashboard deleted");
        }
        Ok(response)
    }

    async fn list_versions(&self, uid: &str, query: &VersionsQuery) -> Result<DashboardVersionList> {
        validate_name(uid)?;
        let response: LegacyVersionsResponse = self
            .transport
            .get(
                &format!("api/dashboards/uid/{uid}/versions"),
                &query.to_params("start"),
            )
            .await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_versions_conversion() {
        let response: LegacyVersionsResponse = serde_json::from_value(json!({
            "continueToken": "",
            "versions": [
                {"id": 7, "version": 3, "parentVersion": 2, "created": "2025-03-01T10:00:00Z", "message": "tweak"},
                {"id": 6, "version": 2, "parentVersion": 1, "created": null}
            ]
        }))
        .unwrap();

        let list: DashboardVersionList = response.into();
        assert_eq!(list.metadata.continue_token, None);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].created, 1_740_823_200_000);
        assert_eq!(list.items[0].message, "tweak");
        assert_eq!(list.items[1].created, 0);
    }

    #[test]
    fn test_save_request_shape() {
        let dashboard = Dashboard::titled("Ops");
        let request = SaveDashboardRequest {
            dashboard: &dashboard,
            message: None,
            folder_uid: Some("f1"),
            overwrite: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["folderUid"], "f1");
        assert_eq!(value["overwrite"], true);
        assert!(value.get("message").is_none());
    }
}
