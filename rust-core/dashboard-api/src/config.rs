// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client configuration.
//!
//! [`DashboardApiConfig`] has sensible defaults and can be loaded from
//! `DASHBOARD_API_*` environment variables with [`DashboardApiConfig::from_env`].
//! Malformed entries are logged and ignored rather than rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which kind of process is running the clients.
///
/// Only [`Environment::Test`] allows overriding the client registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Test,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

/// Authentication method for the dashboard backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    /// Service account or API token, sent as `Authorization: Bearer <token>`.
    Bearer(String),
    Basic {
        username: String,
        password: String,
    },
}

/// Feature flags that decide which dashboard API generation is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggles {
    /// The scenes-based dashboard architecture.
    pub dashboard_scene: bool,
    /// Serve dashboards through the resource (`/apis`) API.
    pub kubernetes_dashboards: bool,
    /// Use the v2 dashboard schema.
    #[serde(rename = "useV2DashboardsAPI")]
    pub use_v2_dashboards_api: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            dashboard_scene: true,
            kubernetes_dashboards: false,
            use_v2_dashboards_api: false,
        }
    }
}

impl FeatureToggles {
    /// Apply a comma-separated toggle list such as
    /// `dashboardScene,-kubernetesDashboards`. A leading `-` disables.
    pub fn apply_list(&mut self, list: &str) {
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, enabled) = match entry.strip_prefix('-') {
                Some(name) => (name, false),
                None => (entry, true),
            };
            match name {
                "dashboardScene" => self.dashboard_scene = enabled,
                "kubernetesDashboards" => self.kubernetes_dashboards = enabled,
                "useV2DashboardsAPI" => self.use_v2_dashboards_api = enabled,
                _ => warn!(toggle = %name, "Ignoring unknown feature toggle"),
            }
        }
    }
}

/// Connection and dispatch settings shared by every client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardApiConfig {
    /// Base URL of the backend (e.g. `http://localhost:3000`).
    pub base_url: String,
    /// Namespace for resource API paths.
    pub namespace: String,
    pub auth: Auth,
    pub environment: Environment,
    /// Explicit version tag; overrides the feature toggles when set.
    pub api_version: Option<String>,
    pub feature_toggles: FeatureToggles,
    /// Resolve versions as the pre-scenes architecture does: never `v2`.
    pub force_legacy_architecture: bool,
    pub timeout_secs: u64,
}

impl Default for DashboardApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            namespace: "default".to_string(),
            auth: Auth::None,
            environment: Environment::Production,
            api_version: None,
            feature_toggles: FeatureToggles::default(),
            force_legacy_architecture: false,
            timeout_secs: 30,
        }
    }
}

impl DashboardApiConfig {
    /// Defaults pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Defaults pointed at `base_url` with the registry override enabled.
    pub fn for_tests(base_url: impl Into<String>) -> Self {
        Self {
            environment: Environment::Test,
            ..Self::new(base_url)
        }
    }

    /// Load from the process environment.
    ///
    /// | Variable                            | Meaning                                   |
    /// |-------------------------------------|-------------------------------------------|
    /// | `DASHBOARD_API_URL`                 | backend base URL                          |
    /// | `DASHBOARD_API_NAMESPACE`           | resource namespace                        |
    /// | `DASHBOARD_API_TOKEN`               | bearer token                              |
    /// | `DASHBOARD_API_USER` / `_PASSWORD`  | basic auth (ignored when a token is set)  |
    /// | `DASHBOARD_API_ENV`                 | `production`, `development` or `test`     |
    /// | `DASHBOARD_API_VERSION`             | explicit version tag                      |
    /// | `DASHBOARD_API_TIMEOUT_SECS`        | per-request timeout                       |
    /// | `DASHBOARD_API_FEATURE_TOGGLES`     | comma-separated toggle list               |
    /// | `DASHBOARD_API_FORCE_LEGACY_ARCH`   | `true` to force the old architecture      |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DASHBOARD_API_URL") {
            config.base_url = url;
        }
        if let Some(namespace) = get("DASHBOARD_API_NAMESPACE") {
            config.namespace = namespace;
        }

        config.auth = match (
            get("DASHBOARD_API_TOKEN"),
            get("DASHBOARD_API_USER"),
            get("DASHBOARD_API_PASSWORD"),
        ) {
            (Some(token), _, _) => Auth::Bearer(token),
            (None, Some(username), password) => Auth::Basic {
                username,
                password: password.unwrap_or_default(),
            },
            (None, None, _) => Auth::None,
        };

        if let Some(env) = get("DASHBOARD_API_ENV") {
            match env.parse() {
                Ok(environment) => config.environment = environment,
                Err(e) => warn!(value = %env, error = %e, "Invalid DASHBOARD_API_ENV"),
            }
        }

        config.api_version = get("DASHBOARD_API_VERSION");

        if let Some(timeout) = get("DASHBOARD_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!(value = %timeout, "Invalid DASHBOARD_API_TIMEOUT_SECS"),
            }
        }

        if let Some(toggles) = get("DASHBOARD_API_FEATURE_TOGGLES") {
            config.feature_toggles.apply_list(&toggles);
        }

        if let Some(force) = get("DASHBOARD_API_FORCE_LEGACY_ARCH") {
            match force.parse::<bool>() {
                Ok(value) => config.force_legacy_architecture = value,
                Err(_) => warn!(value = %force, "Invalid DASHBOARD_API_FORCE_LEGACY_ARCH"),
            }
        }

        config
    }

    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DashboardApiConfig::default());
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.is_test());
    }

    #[test]
    fn test_full_environment() {
        let config = DashboardApiConfig::from_lookup(lookup(&[
            ("DASHBOARD_API_URL", "https://grafana.example.com/"),
            ("DASHBOARD_API_NAMESPACE", "org-2"),
            ("DASHBOARD_API_TOKEN", "glsa_123"),
            ("DASHBOARD_API_USER", "admin"),
            ("DASHBOARD_API_ENV", "test"),
            ("DASHBOARD_API_VERSION", "v2"),
            ("DASHBOARD_API_TIMEOUT_SECS", "5"),
            ("DASHBOARD_API_FEATURE_TOGGLES", "kubernetesDashboards, -dashboardScene"),
            ("DASHBOARD_API_FORCE_LEGACY_ARCH", "true"),
        ]));

        assert_eq!(config.base_url, "https://grafana.example.com/");
        assert_eq!(config.namespace, "org-2");
        assert_eq!(config.auth, Auth::Bearer("glsa_123".to_string()));
        assert!(config.is_test());
        assert_eq!(config.api_version.as_deref(), Some("v2"));
        assert_eq!(config.timeout_secs, 5);
        assert!(config.feature_toggles.kubernetes_dashboards);
        assert!(!config.feature_toggles.dashboard_scene);
        assert!(config.force_legacy_architecture);
    }

    #[test]
    fn test_basic_auth_and_invalid_entries() {
        let config = DashboardApiConfig::from_lookup(lookup(&[
            ("DASHBOARD_API_USER", "admin"),
            ("DASHBOARD_API_PASSWORD", "secret"),
            ("DASHBOARD_API_ENV", "staging"),
            ("DASHBOARD_API_TIMEOUT_SECS", "0"),
            ("DASHBOARD_API_VERSION", "   "),
            ("DASHBOARD_API_FORCE_LEGACY_ARCH", "maybe"),
        ]));

        assert_eq!(
            config.auth,
            Auth::Basic {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }
        );
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.api_version, None);
        assert!(!config.force_legacy_architecture);
    }

    #[test]
    fn test_toggle_list_ignores_unknown() {
        let mut toggles = FeatureToggles::default();
        toggles.apply_list("useV2DashboardsAPI,,somethingElse");
        assert!(toggles.use_v2_dashboards_api);
        assert!(toggles.dashboard_scene);
        assert!(!toggles.kubernetes_dashboards);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert!("qa".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
