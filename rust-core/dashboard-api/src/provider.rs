// SPDX-License-Identifier: PMPL-1.0-or-later
//! Version dispatch.
//!
//! [`DashboardApiProvider`] owns the client registry for one backend and hands
//! out the client matching the active API version. The registry is built on
//! first use and reused afterwards; in the test environment it can be
//! replaced wholesale with [`DashboardApiProvider::set_override`].
//!
//! ```rust,no_run
//! use dashboard_api::{DashboardApiConfig, DashboardApiProvider};
//!
//! # #[tokio::main]
//! # async fn main() -> dashboard_api::Result<()> {
//! let provider = DashboardApiProvider::new(DashboardApiConfig::from_env())?;
//! let dto = provider.dashboard_api()?.get_dashboard_dto("abc", &Vec::new()).await?;
//! println!("{}", dto.dashboard.title);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use dashboard_schema::{
    DashboardDto, DashboardVersionList, DeleteDashboardResponse, VersionsQuery,
};

use crate::api::{DashboardV2Response, LegacyShapeClient, UrlQueryMap, V2ShapeClient};
use crate::config::DashboardApiConfig;
use crate::error::{DashboardApiError, Result};
use crate::legacy::LegacyDashboardApi;
use crate::transport::HttpTransport;
use crate::v1::K8sDashboardApi;
use crate::v2::{ensure_v1_response, K8sDashboardV2Api};
use crate::version::{ApiVersion, FeatureToggleResolver, VersionResolver};

/// Client registry. Entries may be missing in a test override.
#[derive(Clone, Default)]
pub struct DashboardApiClients {
    pub legacy: Option<LegacyShapeClient>,
    pub v1: Option<LegacyShapeClient>,
    pub v2: Option<V2ShapeClient>,
}

impl DashboardApiClients {
    /// The default registry: every generation over one transport, with the
    /// v2 client downconverting so all entries read in the legacy shape.
    pub fn with_transport(transport: Arc<HttpTransport>, namespace: &str) -> Self {
        Self {
            legacy: Some(Arc::new(LegacyDashboardApi::new(Arc::clone(&transport)))),
            v1: Some(Arc::new(K8sDashboardApi::new(Arc::clone(&transport), namespace))),
            v2: Some(Arc::new(K8sDashboardV2Api::new(transport, namespace, true))),
        }
    }

    /// Select the entry for `version`.
    pub fn select(&self, version: ApiVersion) -> Option<DashboardApiClient> {
        match version {
            ApiVersion::Legacy => self.legacy.clone().map(DashboardApiClient::Legacy),
            ApiVersion::V1 => self.v1.clone().map(DashboardApiClient::V1),
            ApiVersion::V2 => self.v2.clone().map(DashboardApiClient::V2),
        }
    }
}

impl std::fmt::Debug for DashboardApiClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardApiClients")
            .field("legacy", &self.legacy.is_some())
            .field("v1", &self.v1.is_some())
            .field("v2", &self.v2.is_some())
            .finish()
    }
}

/// The client picked for the configured version.
#[derive(Clone)]
pub enum DashboardApiClient {
    Legacy(LegacyShapeClient),
    V1(LegacyShapeClient),
    V2(V2ShapeClient),
}

impl DashboardApiClient {
    pub fn api_version(&self) -> ApiVersion {
        match self {
            DashboardApiClient::Legacy(_) => ApiVersion::Legacy,
            DashboardApiClient::V1(_) => ApiVersion::V1,
            DashboardApiClient::V2(_) => ApiVersion::V2,
        }
    }

    /// The client, if it reads and writes the legacy model.
    pub fn as_legacy_shape(&self) -> Option<&LegacyShapeClient> {
        match self {
            DashboardApiClient::Legacy(client) | DashboardApiClient::V1(client) => Some(client),
            DashboardApiClient::V2(_) => None,
        }
    }

    pub fn as_v2(&self) -> Option<&V2ShapeClient> {
        match self {
            DashboardApiClient::V2(client) => Some(client),
            _ => None,
        }
    }

    /// Load a dashboard in the legacy shape, whichever generation serves it.
    pub async fn get_dashboard_dto(&self, uid: &str, params: &UrlQueryMap) -> Result<DashboardDto> {
        match self {
            DashboardApiClient::Legacy(client) | DashboardApiClient::V1(client) => {
                client.get_dashboard_dto(uid, params).await
            }
            DashboardApiClient::V2(client) => match client.get_dashboard_dto(uid, params).await? {
                DashboardV2Response::V1(dto) => Ok(dto),
                DashboardV2Response::V2(resource) => Ok(ensure_v1_response(resource)),
            },
        }
    }

    pub async fn delete_dashboard(
        &self,
        uid: &str,
        show_success_alert: bool,
    ) -> Result<DeleteDashboardResponse> {
        match self {
            DashboardApiClient::Legacy(client) | DashboardApiClient::V1(client) => {
                client.delete_dashboard(uid, show_success_alert).await
            }
            DashboardApiClient::V2(client) => client.delete_dashboard(uid, show_success_alert).await,
        }
    }

    pub async fn list_versions(&self, uid: &str, query: &VersionsQuery) -> Result<DashboardVersionList> {
        match self {
            DashboardApiClient::Legacy(client) | DashboardApiClient::V1(client) => {
                client.list_versions(uid, query).await
            }
            DashboardApiClient::V2(client) => client.list_versions(uid, query).await,
        }
    }
}

impl std::fmt::Debug for DashboardApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DashboardApiClient")
            .field(&self.api_version())
            .finish()
    }
}

/// Hands out the dashboard API client for the active version.
pub struct DashboardApiProvider {
    config: DashboardApiConfig,
    transport: Arc<HttpTransport>,
    resolver: Arc<dyn VersionResolver>,
    clients: RwLock<Option<DashboardApiClients>>,
}

impl DashboardApiProvider {
    /// Provider resolving the version from `config`'s tag and feature toggles.
    ///
    /// # Errors
    ///
    /// Fails if the transport cannot be built from `config`.
    pub fn new(config: DashboardApiConfig) -> Result<Self> {
        let resolver = Arc::new(FeatureToggleResolver::new(&config));
        Self::with_resolver(config, resolver)
    }

    /// Provider with a custom version resolver.
    pub fn with_resolver(config: DashboardApiConfig, resolver: Arc<dyn VersionResolver>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self {
            config,
            transport,
            resolver,
            clients: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &DashboardApiConfig {
        &self.config
    }

    /// The active API version according to the resolver.
    pub fn api_version(&self) -> Result<ApiVersion> {
        self.resolver.resolve()
    }

    /// The client for the configured version, reading in the legacy shape.
    ///
    /// # Errors
    ///
    /// [`DashboardApiError::UnknownApiVersion`] if the configured version
    /// cannot be resolved or the registry has no client for it.
    pub fn dashboard_api(&self) -> Result<DashboardApiClient> {
        let version = self.resolver.resolve()?;
        self.ensure_clients();

        let selected = self.read_clients().as_ref().and_then(|c| c.select(version));
        match selected {
            Some(client) => {
                debug!(version = %version, "Dispatching dashboard API client");
                Ok(client)
            }
            None => Err(DashboardApiError::UnknownApiVersion(version.to_string())),
        }
    }

    /// A v2 client returning dashboards in the native v2 shape, whichever
    /// known version is configured.
    ///
    /// # Errors
    ///
    /// [`DashboardApiError::UnknownApiVersion`] if the configured version
    /// cannot be resolved.
    pub fn dashboard_api_v2(&self) -> Result<V2ShapeClient> {
        let version = self.resolver.resolve()?;
        self.ensure_clients();
        debug!(version = %version, "Dispatching native v2 dashboard API client");
        Ok(Arc::new(K8sDashboardV2Api::new(
            Arc::clone(&self.transport),
            &self.config.namespace,
            false,
        )))
    }

    /// Replace the registry, or clear it with `None` so the next call builds
    /// the default one again.
    ///
    /// # Errors
    ///
    /// [`DashboardApiError::OverrideOutsideTest`] unless the configured
    /// environment is `test`.
    pub fn set_override(&self, clients: Option<DashboardApiClients>) -> Result<()> {
        if !self.config.is_test() {
            warn!(environment = %self.config.environment, "Rejected dashboard API client override");
            return Err(DashboardApiError::OverrideOutsideTest);
        }
        debug!(clients = ?clients, "Overriding dashboard API clients");
        *self.write_clients() = clients;
        Ok(())
    }

    fn ensure_clients(&self) {
        if self.read_clients().is_some() {
            return;
        }
        let mut clients = self.write_clients();
        if clients.is_none() {
            info!(
                base_url = %self.transport.base_url(),
                namespace = %self.config.namespace,
                "Creating dashboard API clients"
            );
            *clients = Some(DashboardApiClients::with_transport(
                Arc::clone(&self.transport),
                &self.config.namespace,
            ));
        }
    }

    // The registry is replaced wholesale, so a poisoned lock still holds a
    // consistent value.
    fn read_clients(&self) -> RwLockReadGuard<'_, Option<DashboardApiClients>> {
        self.clients.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_clients(&self) -> RwLockWriteGuard<'_, Option<DashboardApiClients>> {
        self.clients.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashboard_schema::{
        Dashboard, DashboardV2Spec, SaveDashboardCommand, SaveDashboardResponse,
    };

    use crate::api::DashboardApi;

    /// Answers every read with a dashboard titled after the client.
    struct StubApi {
        name: &'static str,
        version: ApiVersion,
    }

    #[async_trait]
    impl DashboardApi<DashboardDto, Dashboard> for StubApi {
        fn api_version(&self) -> ApiVersion {
            self.version
        }

        async fn get_dashboard_dto(&self, _uid: &str, _params: &UrlQueryMap) -> Result<DashboardDto> {
            Ok(DashboardDto {
                dashboard: Dashboard::titled(self.name),
                meta: Default::default(),
            })
        }

        async fn save_dashboard(
            &self,
            _command: SaveDashboardCommand<Dashboard>,
        ) -> Result<SaveDashboardResponse> {
            Ok(SaveDashboardResponse::default())
        }

        async fn delete_dashboard(&self, uid: &str, _show: bool) -> Result<DeleteDashboardResponse> {
            Ok(DeleteDashboardResponse {
                id: 0,
                message: format!("{} deleted {uid}", self.name),
                title: String::new(),
            })
        }

        async fn list_versions(&self, _uid: &str, _query: &VersionsQuery) -> Result<DashboardVersionList> {
            Ok(DashboardVersionList::default())
        }
    }

    /// Returns a native v2 resource so the provider has to downconvert.
    struct StubV2Api;

    #[async_trait]
    impl DashboardApi<DashboardV2Response, DashboardV2Spec> for StubV2Api {
        fn api_version(&self) -> ApiVersion {
            ApiVersion::V2
        }

        async fn get_dashboard_dto(&self, uid: &str, _params: &UrlQueryMap) -> Result<DashboardV2Response> {
            let resource = serde_json::from_value(serde_json::json!({
                "metadata": {"name": uid},
                "spec": {"title": "native v2"},
                "access": {}
            }))?;
            Ok(DashboardV2Response::V2(resource))
        }

        async fn save_dashboard(
            &self,
            _command: SaveDashboardCommand<DashboardV2Spec>,
        ) -> Result<SaveDashboardResponse> {
            Ok(SaveDashboardResponse::default())
        }

        async fn delete_dashboard(&self, _uid: &str, _show: bool) -> Result<DeleteDashboardResponse> {
            Ok(DeleteDashboardResponse::default())
        }

        async fn list_versions(&self, _uid: &str, _query: &VersionsQuery) -> Result<DashboardVersionList> {
            Ok(DashboardVersionList::default())
        }
    }

    fn stub(name: &'static str, version: ApiVersion) -> LegacyShapeClient {
        Arc::new(StubApi { name, version })
    }

    fn provider(config: DashboardApiConfig, version: &'static str) -> DashboardApiProvider {
        let resolver = Arc::new(move || version.parse::<ApiVersion>());
        DashboardApiProvider::with_resolver(config, resolver).unwrap()
    }

    fn same_client<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
        Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
    }

    #[test]
    fn test_override_rejected_outside_test() {
        for config in [
            DashboardApiConfig::new("http://localhost:3000"),
            DashboardApiConfig {
                environment: crate::config::Environment::Development,
                ..DashboardApiConfig::default()
            },
        ] {
            let provider = provider(config, "legacy");
            let err = provider.set_override(Some(DashboardApiClients::default())).unwrap_err();
            assert!(matches!(err, DashboardApiError::OverrideOutsideTest));

            let err = provider.set_override(None).unwrap_err();
            assert!(matches!(err, DashboardApiError::OverrideOutsideTest));
        }
    }

    #[test]
    fn test_rejected_override_keeps_registry() {
        let provider = provider(DashboardApiConfig::new("http://localhost:3000"), "v1");
        let before = provider.dashboard_api().unwrap();
        let _ = provider.set_override(Some(DashboardApiClients::default()));
        let after = provider.dashboard_api().unwrap();

        assert!(same_client(
            before.as_legacy_shape().unwrap(),
            after.as_legacy_shape().unwrap()
        ));
    }

    #[test]
    fn test_registry_is_built_once() {
        let provider = provider(DashboardApiConfig::new("http://localhost:3000"), "legacy");
        let first = provider.dashboard_api().unwrap();
        let second = provider.dashboard_api().unwrap();

        assert_eq!(first.api_version(), ApiVersion::Legacy);
        assert!(same_client(
            first.as_legacy_shape().unwrap(),
            second.as_legacy_shape().unwrap()
        ));
    }

    #[test]
    fn test_default_registry_matches_version() {
        for version in ApiVersion::ALL {
            let provider = provider(DashboardApiConfig::new("http://localhost:3000"), version.as_str());
            let client = provider.dashboard_api().unwrap();
            assert_eq!(client.api_version(), version);
            assert_eq!(client.as_v2().is_some(), version == ApiVersion::V2);
        }
    }

    #[tokio::test]
    async fn test_override_returns_overridden_entries() {
        let provider = provider(DashboardApiConfig::for_tests("http://localhost:3000"), "v1");
        let legacy = stub("legacy-stub", ApiVersion::Legacy);
        let v1 = stub("v1-stub", ApiVersion::V1);

        provider
            .set_override(Some(DashboardApiClients {
                legacy: Some(Arc::clone(&legacy)),
                v1: Some(Arc::clone(&v1)),
                v2: None,
            }))
            .unwrap();

        let client = provider.dashboard_api().unwrap();
        assert_eq!(client.api_version(), ApiVersion::V1);
        assert!(same_client(client.as_legacy_shape().unwrap(), &v1));

        let dto = client.get_dashboard_dto("abc", &Vec::new()).await.unwrap();
        assert_eq!(dto.dashboard.title, "v1-stub");
    }

    #[test]
    fn test_partial_override_missing_entry_is_unknown_version() {
        let provider = provider(DashboardApiConfig::for_tests("http://localhost:3000"), "v2");
        provider
            .set_override(Some(DashboardApiClients {
                legacy: Some(stub("legacy-stub", ApiVersion::Legacy)),
                ..Default::default()
            }))
            .unwrap();

        let err = provider.dashboard_api().unwrap_err();
        assert!(matches!(err, DashboardApiError::UnknownApiVersion(ref tag) if tag == "v2"));
    }

    #[test]
    fn test_clearing_override_rebuilds_defaults() {
        let provider = provider(DashboardApiConfig::for_tests("http://localhost:3000"), "legacy");
        let legacy = stub("legacy-stub", ApiVersion::Legacy);
        provider
            .set_override(Some(DashboardApiClients {
                legacy: Some(Arc::clone(&legacy)),
                ..Default::default()
            }))
            .unwrap();
        assert!(same_client(
            provider.dashboard_api().unwrap().as_legacy_shape().unwrap(),
            &legacy
        ));

        provider.set_override(None).unwrap();
        let rebuilt = provider.dashboard_api().unwrap();
        assert!(!same_client(rebuilt.as_legacy_shape().unwrap(), &legacy));
    }

    #[test]
    fn test_unresolvable_version_fails() {
        let provider = provider(DashboardApiConfig::new("http://localhost:3000"), "v3");
        let err = provider.dashboard_api().unwrap_err();
        assert!(matches!(err, DashboardApiError::UnknownApiVersion(ref tag) if tag == "v3"));
    }

    #[test]
    fn test_v2_shape_ignores_configured_version() {
        for tag in ["legacy", "v1", "v2"] {
            let provider = provider(DashboardApiConfig::new("http://localhost:3000"), tag);
            let client = provider.dashboard_api_v2().unwrap();
            assert_eq!(client.api_version(), ApiVersion::V2);
            // The registry is still created on first use.
            assert!(provider.read_clients().is_some());
        }
    }

    #[test]
    fn test_v2_shape_unresolvable_version_fails() {
        let provider = provider(DashboardApiConfig::new("http://localhost:3000"), "v3");
        let err = provider.dashboard_api_v2().err().unwrap();
        assert!(matches!(err, DashboardApiError::UnknownApiVersion(ref tag) if tag == "v3"));
        assert!(provider.read_clients().is_none());
    }

    #[tokio::test]
    async fn test_native_v2_override_is_downconverted() {
        let provider = provider(DashboardApiConfig::for_tests("http://localhost:3000"), "v2");
        provider
            .set_override(Some(DashboardApiClients {
                v2: Some(Arc::new(StubV2Api)),
                ..Default::default()
            }))
            .unwrap();

        let client = provider.dashboard_api().unwrap();
        let dto = client.get_dashboard_dto("abc", &Vec::new()).await.unwrap();
        assert_eq!(dto.dashboard.title, "native v2");
        assert_eq!(dto.dashboard.uid.as_deref(), Some("abc"));

        let deleted = client.delete_dashboard("abc", false).await.unwrap();
        assert_eq!(deleted, DeleteDashboardResponse::default());
    }
}
