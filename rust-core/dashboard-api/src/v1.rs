// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client for the `v1beta1` resource API serving the classic dashboard model.

use std::sync::Arc;

use async_trait::async_trait;

use dashboard_schema::{
    Dashboard, DashboardDto, DashboardVersionList, DashboardWithAccessInfo, DeleteDashboardResponse,
    Resource, SaveDashboardCommand, SaveDashboardResponse, VersionsQuery,
};

use crate::api::{DashboardApi, UrlQueryMap};
use crate::error::{DashboardApiError, Result};
use crate::k8s::{dto_meta, prepare_metadata, save_response, ResourceClient};
use crate::transport::HttpTransport;
use crate::version::ApiVersion;

pub const V1_RESOURCE_VERSION: &str = "v1beta1";

pub struct K8sDashboardApi {
    client: ResourceClient,
}

impl K8sDashboardApi {
    pub fn new(transport: Arc<HttpTransport>, namespace: &str) -> Self {
        Self {
            client: ResourceClient::new(transport, V1_RESOURCE_VERSION, namespace),
        }
    }
}

/// Map a resource read to the legacy `dashboard + meta` shape.
///
/// A dashboard stored in the v2 schema that the server failed to convert
/// is rejected instead of returned half-empty.
pub(crate) fn into_dto(resource: DashboardWithAccessInfo<Dashboard>) -> Result<DashboardDto> {
    if let Some(conversion) = resource.failed_conversion() {
        if conversion.stored_version.starts_with("v2") {
            return Err(DashboardApiError::Conversion {
                stored_version: conversion.stored_version.clone(),
                message: conversion.error.clone(),
            });
        }
    }

    let meta = dto_meta(&resource.metadata, &resource.access, &resource.spec.title);
    let mut dashboard = resource.spec;
    dashboard.uid = Some(resource.metadata.name.clone());
    dashboard.version = resource.metadata.generation;

    Ok(DashboardDto { dashboard, meta })
}

#[async_trait]
impl DashboardApi<DashboardDto, Dashboard> for K8sDashboardApi {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V1
    }

    async fn get_dashboard_dto(&self, uid: &str, params: &UrlQueryMap) -> Result<DashboardDto> {
        let resource = self.client.get_with_access::<Dashboard>(uid, params).await?;
        into_dto(resource)
    }

    async fn save_dashboard(
        &self,
        command: SaveDashboardCommand<Dashboard>,
    ) -> Result<SaveDashboardResponse> {
        let SaveDashboardCommand {
            mut dashboard,
            message,
            folder_uid,
            overwrite,
            k8s,
        } = command;

        let mut metadata = prepare_metadata(k8s, message, folder_uid);
        if let Some(uid) = dashboard.uid.as_ref().filter(|u| !u.is_empty()) {
            metadata.name = uid.clone();
        }
        // The stored generation is authoritative, never the client's copy.
        dashboard.version = None;
        dashboard.uid = (!metadata.name.is_empty()).then(|| metadata.name.clone());

        let resource = Resource::dashboard(self.client.version(), metadata, dashboard);
        let saved = self.client.save(resource, overwrite).await?;
        Ok(save_response(&saved.metadata, &saved.spec.title, saved.spec.id))
    }

    async fn delete_dashboard(
        &self,
        uid: &str,
        show_success_alert: bool,
    ) -> Result<DeleteDashboardResponse> {
        self.client.delete(uid, show_success_alert).await
    }

    async fn list_versions(&self, uid: &str, query: &VersionsQuery) -> Result<DashboardVersionList> {
        self.client.versions(uid, query).await
    }
}
