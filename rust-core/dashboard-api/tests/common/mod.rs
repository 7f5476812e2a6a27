// SPDX-License-Identifier: PMPL-1.0-or-later
//! Shared fixtures for the HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::MockServer;

use dashboard_api::transport::HttpTransport;
use dashboard_api::{Auth, DashboardApiConfig};

pub const NAMESPACE: &str = "default";

pub fn v1_path(suffix: &str) -> String {
    format!("/apis/dashboard.grafana.app/v1beta1/namespaces/{NAMESPACE}/dashboards{suffix}")
}

pub fn v2_path(suffix: &str) -> String {
    format!("/apis/dashboard.grafana.app/v2alpha1/namespaces/{NAMESPACE}/dashboards{suffix}")
}

pub fn test_config(server: &MockServer) -> DashboardApiConfig {
    DashboardApiConfig {
        auth: Auth::Bearer("test-token".to_string()),
        ..DashboardApiConfig::for_tests(server.uri())
    }
}

pub fn transport(server: &MockServer) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(&test_config(server)).expect("transport"))
}

/// `/dto` body of a classic dashboard.
pub fn v1_dto_body(uid: &str, title: &str) -> Value {
    json!({
        "apiVersion": "dashboard.grafana.app/v1beta1",
        "kind": "Dashboard",
        "metadata": {
            "name": uid,
            "namespace": NAMESPACE,
            "resourceVersion": "101",
            "generation": 3,
            "creationTimestamp": "2025-01-10T08:00:00Z",
            "annotations": {"grafana.app/folder": "team-a"}
        },
        "spec": {"title": title, "schemaVersion": 41, "panels": [{"id": 1, "type": "stat"}]},
        "access": {"canSave": true, "canEdit": true, "canStar": true}
    })
}

/// `/dto` body of a v2 dashboard.
pub fn v2_dto_body(uid: &str, title: &str) -> Value {
    json!({
        "apiVersion": "dashboard.grafana.app/v2alpha1",
        "kind": "Dashboard",
        "metadata": {"name": uid, "namespace": NAMESPACE, "generation": 2},
        "spec": {
            "title": title,
            "cursorSync": "Tooltip",
            "elements": {
                "panel-1": {"kind": "Panel", "spec": {"id": 1, "title": "CPU", "vizConfig": {"kind": "gauge", "spec": {}}}}
            },
            "layout": {"kind": "GridLayout", "spec": {"items": [
                {"kind": "GridLayoutItem", "spec": {"x": 0, "y": 0, "width": 24, "height": 6, "element": {"kind": "ElementReference", "name": "panel-1"}}}
            ]}}
        },
        "access": {"canSave": false, "canEdit": true}
    })
}
