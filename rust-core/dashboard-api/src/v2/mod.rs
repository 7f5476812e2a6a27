// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client for the `v2alpha1` resource API.
//!
//! One client type serves both read shapes. With `convert_to_v1` set, reads
//! are downconverted (see [`convert`]) so legacy-shaped consumers can use a
//! v2 backend; without it the stored v2 resource is returned as is.

pub mod convert;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use dashboard_schema::{
    DashboardV2Spec, DashboardVersionList, DeleteDashboardResponse, Resource, SaveDashboardCommand,
    SaveDashboardResponse, VersionsQuery,
};

use crate::api::{DashboardApi, DashboardV2Response, UrlQueryMap};
use crate::error::{DashboardApiError, Result};
use crate::k8s::{prepare_metadata, save_response, ResourceClient};
use crate::transport::HttpTransport;
use crate::version::ApiVersion;

pub use convert::ensure_v1_response;

pub const V2_RESOURCE_VERSION: &str = "v2alpha1";

pub struct K8sDashboardV2Api {
    client: ResourceClient,
    convert_to_v1: bool,
}

impl K8sDashboardV2Api {
    pub fn new(transport: Arc<HttpTransport>, namespace: &str, convert_to_v1: bool) -> Self {
        Self {
            client: ResourceClient::new(transport, V2_RESOURCE_VERSION, namespace),
            convert_to_v1,
        }
    }

    /// Whether reads are downconverted to the legacy shape.
    pub fn converts_to_v1(&self) -> bool {
        self.convert_to_v1
    }
}

#[async_trait]
impl DashboardApi<DashboardV2Response, DashboardV2Spec> for K8sDashboardV2Api {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    async fn get_dashboard_dto(&self, uid: &str, params: &UrlQueryMap) -> Result<DashboardV2Response> {
        let resource = self
            .client
            .get_with_access::<DashboardV2Spec>(uid, params)
            .await?;

        // A classic dashboard the server could not lift into the v2 schema.
        if let Some(conversion) = resource.failed_conversion() {
            if !conversion.stored_version.starts_with("v2") {
                return Err(DashboardApiError::Conversion {
                    stored_version: conversion.stored_version.clone(),
                    message: conversion.error.clone(),
                });
            }
        }

        if self.convert_to_v1 {
            debug!(uid = %uid, "Downconverting v2 dashboard to legacy shape");
            Ok(DashboardV2Response::V1(ensure_v1_response(resource)))
        } else {
            Ok(DashboardV2Response::V2(resource))
        }
    }

    async fn save_dashboard(
        &self,
        command: SaveDashboardCommand<DashboardV2Spec>,
    ) -> Result<SaveDashboardResponse> {
        let SaveDashboardCommand {
            dashboard,
            message,
            folder_uid,
            overwrite,
            k8s,
        } = command;

        let metadata = prepare_metadata(k8s, message, folder_uid);
        let resource = Resource::dashboard(self.client.version(), metadata, dashboard);
        let saved = self.client.save(resource, overwrite).await?;
        Ok(save_response(&saved.metadata, &saved.spec.title, None))
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
