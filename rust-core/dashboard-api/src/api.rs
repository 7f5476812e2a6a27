// SPDX-License-Identifier: PMPL-1.0-or-later
//! The client contract every API generation implements.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dashboard_schema::{
    Dashboard, DashboardDto, DashboardV2Spec, DashboardVersionList, DashboardWithAccessInfo,
    DeleteDashboardResponse, SaveDashboardCommand, SaveDashboardResponse, VersionsQuery,
};

use crate::error::Result;
use crate::version::ApiVersion;

/// Extra query parameters forwarded on dashboard reads.
pub type UrlQueryMap = Vec<(String, String)>;

/// Read/write operations against one dashboard API generation.
///
/// `G` is the read shape returned by [`DashboardApi::get_dashboard_dto`],
/// `T` the dashboard model accepted by [`DashboardApi::save_dashboard`].
#[async_trait]
pub trait DashboardApi<G, T>: Send + Sync
where
    G: Send + 'static,
    T: Send + 'static,
{
    /// Which generation this client talks to.
    fn api_version(&self) -> ApiVersion;

    /// Load a dashboard with the requesting user's access information.
    async fn get_dashboard_dto(&self, uid: &str, params: &UrlQueryMap) -> Result<G>;

    async fn save_dashboard(&self, command: SaveDashboardCommand<T>) -> Result<SaveDashboardResponse>;

    /// Delete a dashboard. `show_success_alert` reports the deletion to the user.
    async fn delete_dashboard(
        &self,
        uid: &str,
        show_success_alert: bool,
    ) -> Result<DeleteDashboardResponse>;

    async fn list_versions(&self, uid: &str, query: &VersionsQuery) -> Result<DashboardVersionList>;
}

/// Read shape of the v2 client: downconverted or native.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashboardV2Response {
    /// Downconverted to the legacy `dashboard + meta` shape.
    V1(DashboardDto),
    /// The v2 resource as stored.
    V2(DashboardWithAccessInfo<DashboardV2Spec>),
}

impl DashboardV2Response {
    pub fn is_v2(&self) -> bool {
        matches!(self, DashboardV2Response::V2(_))
    }
}

/// A client producing legacy-shaped reads (legacy and v1 generations).
pub type LegacyShapeClient = Arc<dyn DashboardApi<DashboardDto, Dashboard>>;

/// A v2 client; its read shape depends on how it was configured.
pub type V2ShapeClient = Arc<dyn DashboardApi<DashboardV2Response, DashboardV2Spec>>;

/// URL-friendly slug of a dashboard title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Frontend URL of a dashboard.
pub fn dashboard_url(uid: &str, title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("/d/{uid}")
    } else {
        format!("/d/{uid}/{slug}")
    }
}
