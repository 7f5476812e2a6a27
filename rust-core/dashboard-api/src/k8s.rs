// SPDX-License-Identifier: PMPL-1.0-or-later
//! Resource API plumbing shared by the `v1` and `v2` clients.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use dashboard_schema::k8s::{
    ANNO_KEY_CREATED_BY, ANNO_KEY_FOLDER, ANNO_KEY_MESSAGE, ANNO_KEY_UPDATED_BY, DASHBOARD_GROUP,
};
use dashboard_schema::{
    DashboardAccess, DashboardMeta, DashboardVersionList, DashboardWithAccessInfo,
    DeleteDashboardResponse, ObjectMeta, Resource, SaveDashboardResponse, VersionsQuery,
};

use crate::api::{dashboard_url, slugify};
use crate::error::{DashboardApiError, Result};
use crate::transport::HttpTransport;

/// Typed access to the `dashboards` resource of one API version.
pub(crate) struct ResourceClient {
    transport: Arc<HttpTransport>,
    /// Resource API version, e.g. `v1beta1`.
    version: &'static str,
    namespace: String,
}

impl ResourceClient {
    pub(crate) fn new(transport: Arc<HttpTransport>, version: &'static str, namespace: &str) -> Self {
        Self {
            transport,
            version,
            namespace: namespace.to_string(),
        }
    }

    pub(crate) fn version(&self) -> &'static str {
        self.version
    }

    fn collection_path(&self) -> Result<String> {
        validate_namespace(&self.namespace)?;
        Ok(format!(
            "apis/{DASHBOARD_GROUP}/{}/namespaces/{}/dashboards",
            self.version, self.namespace
        ))
    }

    fn item_path(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        Ok(format!("{}/{name}", self.collection_path()?))
    }

    /// GET the `/dto` subresource: spec plus access information.
    pub(crate) async fn get_with_access<T: DeserializeOwned>(
        &self,
        name: &str,
        params: &[(String, String)],
    ) -> Result<DashboardWithAccessInfo<T>> {
        let path = format!("{}/dto", self.item_path(name)?);
        self.transport.get(&path, params).await
    }

    pub(crate) async fn create<T: Serialize + DeserializeOwned>(
        &self,
        resource: &Resource<T>,
    ) -> Result<Resource<T>> {
        self.transport.post(&self.collection_path()?, resource).await
    }

    pub(crate) async fn update<T: Serialize + DeserializeOwned>(
        &self,
        resource: &Resource<T>,
    ) -> Result<Resource<T>> {
        let path = self.item_path(&resource.metadata.name)?;
        self.transport.put(&path, resource).await
    }

    /// Create or update depending on whether `metadata.name` is known.
    pub(crate) async fn save<T: Serialize + DeserializeOwned>(
        &self,
        mut resource: Resource<T>,
        overwrite: bool,
    ) -> Result<Resource<T>> {
        if resource.metadata.name.is_empty() {
            resource.metadata.resource_version = None;
            resource
                .metadata
                .generate_name
                .get_or_insert_with(|| "d".to_string());
            debug!(version = self.version, "Creating dashboard resource");
            self.create(&resource).await
        } else {
            if overwrite {
                resource.metadata.resource_version = None;
            }
            debug!(version = self.version, name = %resource.metadata.name, "Updating dashboard resource");
            self.update(&resource).await
        }
    }

    pub(crate) async fn delete(&self, name: &str, show_success_alert: bool) -> Result<DeleteDashboardResponse> {
        let path = self.item_path(name)?;
        let _: serde_json::Value = self.transport.delete(&path).await?;
        if show_success_alert {
            info!(uid = %name, "Dashboard deleted");
        }
        Ok(DeleteDashboardResponse {
            id: 0,
            message: format!("Dashboard {name} deleted"),
            title: String::new(),
        })
    }

    pub(crate) async fn versions(&self, name: &str, query: &VersionsQuery) -> Result<DashboardVersionList> {
        let path = format!("{}/versions", self.item_path(name)?);
        self.transport.get(&path, &query.to_params("continue")).await
    }
}

/// Reject names that would escape the resource path.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    validate_segment("dashboard uid", name)
}

pub(crate) fn validate_namespace(namespace: &str) -> Result<()> {
    validate_segment("namespace", namespace)
}

fn validate_segment(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DashboardApiError::Validation(format!("{what} must not be empty")));
    }
    if value.contains(['/', '?', '#']) || value == "." || value == ".." {
        return Err(DashboardApiError::Validation(format!("invalid {what}: {value}")));
    }
    Ok(())
}

/// Fold the save message and target folder of a command into annotations.
pub(crate) fn prepare_metadata(
    k8s: Option<ObjectMeta>,
    message: Option<String>,
    folder_uid: Option<String>,
) -> ObjectMeta {
    let mut metadata = k8s.unwrap_or_default();
    match message.filter(|m| !m.is_empty()) {
        Some(message) => {
            metadata.annotations.insert(ANNO_KEY_MESSAGE.to_string(), message);
        }
        None => {
            metadata.annotations.remove(ANNO_KEY_MESSAGE);
        }
    }
    if let Some(folder_uid) = folder_uid {
        metadata.annotations.insert(ANNO_KEY_FOLDER.to_string(), folder_uid);
    }
    metadata
}

/// Legacy meta for a dashboard served by the resource API.
pub(crate) fn dto_meta(metadata: &ObjectMeta, access: &DashboardAccess, title: &str) -> DashboardMeta {
    let url = access
        .url
        .clone()
        .unwrap_or_else(|| dashboard_url(&metadata.name, title));
    DashboardMeta {
        slug: Some(access.slug.clone().unwrap_or_else(|| slugify(title))),
        url: Some(url),
        folder_uid: metadata.annotation(ANNO_KEY_FOLDER).map(str::to_string),
        can_save: access.can_save,
        can_edit: access.can_edit,
        can_admin: access.can_admin,
        can_star: access.can_star,
        can_delete: access.can_delete,
        is_public: access.is_public,
        is_new: false,
        is_folder: false,
        created: metadata.creation_timestamp,
        updated: metadata.updated_timestamp(),
        created_by: metadata.annotation(ANNO_KEY_CREATED_BY).map(str::to_string),
        updated_by: metadata.annotation(ANNO_KEY_UPDATED_BY).map(str::to_string),
        version: metadata.generation,
        annotations_permissions: access.annotations_permissions,
        k8s: Some(metadata.clone()),
        ..Default::default()
    }
}

/// Save response for a stored resource.
pub(crate) fn save_response(metadata: &ObjectMeta, title: &str, spec_id: Option<i64>) -> SaveDashboardResponse {
    SaveDashboardResponse {
        id: metadata.deprecated_internal_id().or(spec_id).unwrap_or(0),
        uid: metadata.name.clone(),
        url: dashboard_url(&metadata.name, title),
        status: "success".to_string(),
        version: metadata.generation.unwrap_or(0),
        slug: slugify(title),
        folder_uid: metadata.annotation(ANNO_KEY_FOLDER).map(str::to_string),
    }
}
