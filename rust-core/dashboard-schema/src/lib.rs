// SPDX-License-Identifier: PMPL-1.0-or-later
//! Dashboard schema
//!
//! Serde data model shared by every dashboard API generation:
//!
//! - [`legacy`]: the classic dashboard JSON model and the `dashboard + meta`
//!   read shape returned by `/api/dashboards`.
//! - [`k8s`]: the Kubernetes-style resource envelope (`ObjectMeta`,
//!   `Resource<T>`, status, access info) used by the `v1` and `v2` APIs.
//! - [`v2`]: the v2 dashboard spec (elements + layout).
//! - [`versions`]: dashboard version history.
//! - [`command`]: save/delete commands and their responses.

pub mod command;
pub mod k8s;
pub mod legacy;
pub mod v2;
pub mod versions;

pub use command::{DeleteDashboardResponse, SaveDashboardCommand, SaveDashboardResponse};
pub use k8s::{
    AnnotationActions, AnnotationPermission, ConversionStatus, DashboardAccess, DashboardStatus,
    DashboardWithAccessInfo, ListMeta, ObjectMeta, Resource,
};
pub use legacy::{Dashboard, DashboardDto, DashboardMeta, TimeRange};
pub use v2::{CursorSync, DashboardV2Spec, TimeSettingsSpec};
pub use versions::{DashboardVersionInfo, DashboardVersionList, VersionsQuery};
