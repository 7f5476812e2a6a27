// SPDX-License-Identifier: PMPL-1.0-or-later
//! # Dashboard API
//!
//! Clients for the three dashboard API generations and the provider that
//! picks one at runtime:
//!
//! - [`legacy`]: `/api/dashboards` REST endpoints.
//! - [`v1`]: resource API serving the classic dashboard model.
//! - [`v2`]: resource API serving the v2 model, optionally downconverted.
//! - [`provider`]: version dispatch over a lazily-built client registry.
//! - [`version`]: version tags and how the active one is resolved.
//! - [`config`], [`transport`], [`error`]: settings, HTTP plumbing, errors.

pub mod api;
pub mod config;
pub mod error;
mod k8s;
pub mod legacy;
pub mod provider;
pub mod transport;
pub mod v1;
pub mod v2;
pub mod version;

pub use api::{DashboardApi, DashboardV2Response, LegacyShapeClient, UrlQueryMap, V2ShapeClient};
pub use config::{Auth, DashboardApiConfig, Environment, FeatureToggles};
pub use error::{DashboardApiError, Result};
pub use provider::{DashboardApiClient, DashboardApiClients, DashboardApiProvider};
pub use version::{ApiVersion, FeatureToggleResolver, VersionResolver};

pub use dashboard_schema as schema;
