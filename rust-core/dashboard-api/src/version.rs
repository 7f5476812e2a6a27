// SPDX-License-Identifier: PMPL-1.0-or-later
//! Dashboard API version tags and their resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DashboardApiConfig, FeatureToggles};
use crate::error::{DashboardApiError, Result};

/// The dashboard API generations a client exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// `/api/dashboards` REST endpoints.
    Legacy,
    /// Resource API serving the classic dashboard model.
    V1,
    /// Resource API serving the v2 (elements + layout) model.
    V2,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 3] = [ApiVersion::Legacy, ApiVersion::V1, ApiVersion::V2];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::Legacy => "legacy",
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = DashboardApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "legacy" => Ok(ApiVersion::Legacy),
            "v1" => Ok(ApiVersion::V1),
            "v2" => Ok(ApiVersion::V2),
            other => Err(DashboardApiError::UnknownApiVersion(other.to_string())),
        }
    }
}

/// Decides which API version is active. Consulted on every dispatch.
pub trait VersionResolver: Send + Sync {
    fn resolve(&self) -> Result<ApiVersion>;
}

impl<F> VersionResolver for F
where
    F: Fn() -> Result<ApiVersion> + Send + Sync,
{
    fn resolve(&self) -> Result<ApiVersion> {
        self()
    }
}

/// Resolves the version from configuration: an explicit tag wins, otherwise
/// the feature toggles decide.
#[derive(Debug, Clone)]
pub struct FeatureToggleResolver {
    api_version: Option<String>,
    toggles: FeatureToggles,
    force_legacy_architecture: bool,
}

impl FeatureToggleResolver {
    pub fn new(config: &DashboardApiConfig) -> Self {
        Self {
            api_version: config.api_version.clone(),
            toggles: config.feature_toggles.clone(),
            force_legacy_architecture: config.force_legacy_architecture,
        }
    }
}

impl VersionResolver for FeatureToggleResolver {
    fn resolve(&self) -> Result<ApiVersion> {
        if let Some(tag) = &self.api_version {
            return tag.parse();
        }
        let version = version_from_toggles(&self.toggles, self.force_legacy_architecture);
        debug!(version = %version, "Resolved dashboard API version from feature toggles");
        Ok(version)
    }
}

/// Pick the API generation implied by the feature toggles.
///
/// The pre-scenes architecture never reads v2 dashboards, so it only chooses
/// between the resource API and the REST API.
pub fn version_from_toggles(toggles: &FeatureToggles, force_legacy_architecture: bool) -> ApiVersion {
    let classic = if toggles.kubernetes_dashboards {
        ApiVersion::V1
    } else {
        ApiVersion::Legacy
    };

    if !toggles.dashboard_scene || force_legacy_architecture {
        return classic;
    }
    if toggles.use_v2_dashboards_api {
        return ApiVersion::V2;
    }
    classic
}
