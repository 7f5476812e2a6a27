// SPDX-License-Identifier: PMPL-1.0-or-later
//! Downconversion of v2 dashboards to the legacy `dashboard + meta` shape.
//!
//! Panels are rebuilt from `elements`; grid positions come from a
//! `GridLayout` when there is one. Other layouts keep element order and
//! leave positions to the consumer.

use serde_json::{json, Map, Value};

use dashboard_schema::{
    Dashboard, DashboardDto, DashboardV2Spec, DashboardWithAccessInfo, TimeRange,
};

use crate::k8s::dto_meta;

/// Legacy schema version produced by the conversion.
pub const LEGACY_SCHEMA_VERSION: i64 = 41;

/// Present a v2 dashboard in the legacy shape.
pub fn ensure_v1_response(resource: DashboardWithAccessInfo<DashboardV2Spec>) -> DashboardDto {
    let meta = dto_meta(&resource.metadata, &resource.access, &resource.spec.title);
    let spec = resource.spec;

    let mut extra = Map::new();
    extra.insert("preload".to_string(), json!(spec.preload));
    extra.insert(
        "fiscalYearStartMonth".to_string(),
        json!(spec.time_settings.fiscal_year_start_month),
    );
    if let Some(week_start) = &spec.time_settings.week_start {
        extra.insert("weekStart".to_string(), json!(week_start));
    }
    let mut timepicker = Map::new();
    timepicker.insert("hidden".to_string(), json!(spec.time_settings.hide_timepicker));
    if !spec.time_settings.auto_refresh_intervals.is_empty() {
        timepicker.insert(
            "refresh_intervals".to_string(),
            json!(spec.time_settings.auto_refresh_intervals),
        );
    }
    if let Some(now_delay) = &spec.time_settings.now_delay {
        timepicker.insert("nowDelay".to_string(), json!(now_delay));
    }
    extra.insert("timepicker".to_string(), Value::Object(timepicker));

    let dashboard = Dashboard {
        id: resource.metadata.deprecated_internal_id(),
        uid: Some(resource.metadata.name.clone()),
        title: spec.title.clone(),
        description: spec.description.clone(),
        tags: spec.tags.clone(),
        editable: Some(spec.editable),
        graph_tooltip: Some(spec.cursor_sync.graph_tooltip()),
        live_now: Some(spec.live_now),
        timezone: spec.time_settings.timezone.clone(),
        refresh: Some(spec.time_settings.auto_refresh.clone()),
        time: Some(TimeRange {
            from: spec.time_settings.from.clone(),
            to: spec.time_settings.to.clone(),
        }),
        schema_version: Some(LEGACY_SCHEMA_VERSION),
        version: resource.metadata.generation,
        panels: panels(&spec),
        links: spec.links.clone(),
        templating: Some(json!({ "list": spec.variables.iter().map(variable).collect::<Vec<_>>() })),
        annotations: Some(json!({ "list": spec.annotations.iter().map(spec_of).collect::<Vec<_>>() })),
        extra,
    };

    DashboardDto { dashboard, meta }
}

fn spec_of(item: &Value) -> Value {
    item.get("spec").cloned().unwrap_or_else(|| json!({}))
}

/// `QueryVariable` -> `query`; `TextVariable` is `textbox` in the old model.
fn variable(item: &Value) -> Value {
    let mut spec = spec_of(item);
    let kind = item.get("kind").and_then(Value::as_str).unwrap_or_default();
    let legacy_type = match kind {
        "TextVariable" => "textbox".to_string(),
        other => other.trim_end_matches("Variable").to_ascii_lowercase(),
    };
    if let (Some(obj), false) = (spec.as_object_mut(), legacy_type.is_empty()) {
        obj.insert("type".to_string(), json!(legacy_type));
    }
    spec
}

/// Grid placement of an element: `(name, gridPos)`.
fn grid_items(layout: &Value) -> Option<Vec<(String, Value)>> {
    if layout.get("kind").and_then(Value::as_str) != Some("GridLayout") {
        return None;
    }
    let items = layout.pointer("/spec/items")?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| {
                let spec = item.get("spec")?;
                let name = spec.pointer("/element/name")?.as_str()?.to_string();
                let number = |key: &str| spec.get(key).and_then(Value::as_i64).unwrap_or(0);
                let pos = json!({
                    "x": number("x"),
                    "y": number("y"),
                    "w": number("width"),
                    "h": number("height"),
                });
                Some((name, pos))
            })
            .collect(),
    )
}

fn panels(spec: &DashboardV2Spec) -> Vec<Value> {
    match grid_items(&spec.layout) {
        Some(items) => {
            let mut out: Vec<Value> = items
                .iter()
                .filter_map(|(name, pos)| {
                    let element = spec.elements.get(name)?;
                    let mut panel = panel(element);
                    if let Some(obj) = panel.as_object_mut() {
                        obj.insert("gridPos".to_string(), pos.clone());
                    }
                    Some(panel)
                })
                .collect();
            // Elements the layout does not place still belong to the dashboard.
            out.extend(
                spec.elements
                    .iter()
                    .filter(|(name, _)| !items.iter().any(|(placed, _)| placed == *name))
                    .map(|(_, element)| panel(element)),
            );
            out
        }
        None => spec.elements.values().map(panel).collect(),
    }
}

fn panel(element: &Value) -> Value {
    let spec = spec_of(element);
    let field = |key: &str| spec.get(key).cloned();

    let mut panel = Map::new();
    for key in ["id", "title", "description", "links", "transparent"] {
        if let Some(value) = field(key) {
            panel.insert(key.to_string(), value);
        }
    }

    if element.get("kind").and_then(Value::as_str) == Some("LibraryPanel") {
        if let Some(library) = field("libraryPanel") {
            panel.insert("libraryPanel".to_string(), library);
        }
        return Value::Object(panel);
    }

    if let Some(viz) = spec.get("vizConfig") {
        if let Some(kind) = viz.get("kind") {
            panel.insert("type".to_string(), kind.clone());
        }
        for key in ["options", "fieldConfig"] {
            if let Some(value) = viz.pointer(&format!("/spec/{key}")) {
                panel.insert(key.to_string(), value.clone());
            }
        }
        if let Some(version) = viz.pointer("/spec/pluginVersion") {
            panel.insert("pluginVersion".to_string(), version.clone());
        }
    }

    if let Some(data) = spec.get("data").map(spec_of) {
        let targets: Vec<Value> = data
            .get("queries")
            .and_then(Value::as_array)
            .map(|queries| queries.iter().map(target).collect())
            .unwrap_or_default();
        panel.insert("targets".to_string(), Value::Array(targets));
        if let Some(options) = data.get("queryOptions").and_then(Value::as_object) {
            for (key, value) in options {
                panel.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(panel)
}

fn target(query: &Value) -> Value {
    let spec = spec_of(query);
    let mut target = spec
        .pointer("/query/spec")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(ref_id) = spec.get("refId") {
        target.insert("refId".to_string(), ref_id.clone());
    }
    if spec.get("hidden").and_then(Value::as_bool) == Some(true) {
        target.insert("hide".to_string(), json!(true));
    }
    let mut datasource = spec
        .get("datasource")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(kind) = spec.pointer("/query/kind") {
        datasource.entry("type").or_insert_with(|| kind.clone());
    }
    if !datasource.is_empty() {
        target.insert("datasource".to_string(), Value::Object(datasource));
    }

    Value::Object(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DashboardWithAccessInfo<DashboardV2Spec> {
        serde_json::from_value(json!({
            "apiVersion": "dashboard.grafana.app/v2alpha1",
            "kind": "Dashboard",
            "metadata": {"name": "svc", "generation": 7},
            "spec": {
                "title": "Service Health",
                "tags": ["prod"],
                "cursorSync": "Crosshair",
                "timeSettings": {"from": "now-1h", "to": "now", "autoRefresh": "30s", "timezone": "utc"},
                "variables": [
                    {"kind": "QueryVariable", "spec": {"name": "job"}},
                    {"kind": "TextVariable", "spec": {"name": "filter"}}
                ],
                "annotations": [{"kind": "AnnotationQuery", "spec": {"name": "Deploys", "enable": true}}],
                "elements": {
                    "panel-1": {
                        "kind": "Panel",
                        "spec": {
                            "id": 1,
                            "title": "Requests",
                            "data": {"kind": "QueryGroup", "spec": {
                                "queries": [{"kind": "PanelQuery", "spec": {
                                    "refId": "A",
                                    "hidden": false,
                                    "query": {"kind": "prometheus", "spec": {"expr": "rate(http_requests_total[5m])"}}
                                }}],
                                "queryOptions": {"maxDataPoints": 500}
                            }},
                            "vizConfig": {"kind": "timeseries", "spec": {"options": {"legend": {}}, "fieldConfig": {"defaults": {}}}}
                        }
                    },
                    "panel-2": {"kind": "LibraryPanel", "spec": {"id": 2, "title": "Shared", "libraryPanel": {"uid": "lib-1", "name": "Shared"}}},
                    "panel-3": {"kind": "Panel", "spec": {"id": 3, "title": "Unplaced"}}
                },
                "layout": {"kind": "GridLayout", "spec": {"items": [
                    {"kind": "GridLayoutItem", "spec": {"x": 12, "y": 0, "width": 12, "height": 8, "element": {"kind": "ElementReference", "name": "panel-2"}}},
                    {"kind": "GridLayoutItem", "spec": {"x": 0, "y": 0, "width": 12, "height": 8, "element": {"kind": "ElementReference", "name": "panel-1"}}}
                ]}}
            },
            "access": {"canEdit": true, "url": "/d/svc/service-health"}
        }))
        .unwrap()
    }

    #[test]
    fn test_dashboard_fields() {
        let dto = ensure_v1_response(sample());
        let dashboard = &dto.dashboard;

        assert_eq!(dashboard.uid.as_deref(), Some("svc"));
        assert_eq!(dashboard.title, "Service Health");
        assert_eq!(dashboard.version, Some(7));
        assert_eq!(dashboard.graph_tooltip, Some(1));
        assert_eq!(dashboard.refresh.as_deref(), Some("30s"));
        assert_eq!(dashboard.timezone.as_deref(), Some("utc"));
        assert_eq!(dashboard.time.as_ref().map(|t| t.from.as_str()), Some("now-1h"));
        assert_eq!(dashboard.schema_version, Some(LEGACY_SCHEMA_VERSION));
        assert!(dto.meta.can_edit);
        assert_eq!(dto.meta.url.as_deref(), Some("/d/svc/service-health"));
    }

    #[test]
    fn test_panels_follow_grid_layout() {
        let dto = ensure_v1_response(sample());
        let panels = &dto.dashboard.panels;

        assert_eq!(panels.len(), 3);
        assert_eq!(panels[0]["title"], "Shared");
        assert_eq!(panels[0]["libraryPanel"]["uid"], "lib-1");
        assert_eq!(panels[0]["gridPos"], json!({"x": 12, "y": 0, "w": 12, "h": 8}));

        assert_eq!(panels[1]["type"], "timeseries");
        assert_eq!(panels[1]["maxDataPoints"], 500);
        assert_eq!(panels[1]["targets"][0]["refId"], "A");
        assert_eq!(panels[1]["targets"][0]["expr"], "rate(http_requests_total[5m])");
        assert_eq!(panels[1]["targets"][0]["datasource"]["type"], "prometheus");
        assert!(panels[1]["targets"][0].get("hide").is_none());

        assert_eq!(panels[2]["title"], "Unplaced");
        assert!(panels[2].get("gridPos").is_none());
    }

    #[test]
    fn test_variables_and_annotations() {
        let dto = ensure_v1_response(sample());
        let templating = dto.dashboard.templating.unwrap();
        assert_eq!(templating["list"][0]["type"], "query");
        assert_eq!(templating["list"][1]["type"], "textbox");

        let annotations = dto.dashboard.annotations.unwrap();
        assert_eq!(annotations["list"][0]["name"], "Deploys");
    }

    #[test]
    fn test_non_grid_layout_keeps_element_order() {
        let mut resource = sample();
        resource.spec.layout = json!({"kind": "RowsLayout", "spec": {"rows": []}});

        let dto = ensure_v1_response(resource);
        let titles: Vec<&str> = dto
            .dashboard
            .panels
            .iter()
            .filter_map(|p| p["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["Requests", "Shared", "Unplaced"]);
    }
}
