mod common;

use actix_web::{test, App};
use org_directory_server::configure_api;
use org_directory_server::org_chart::{department_color, CategoryToken};
use serde_json::Value;

use common::{app_state, directory, employee, ORG_ID};
use org_directory_server::db::directory::{DirectorySeed, OrganizationDirectory};
use org_directory_server::db::InMemoryDirectory;
use std::sync::Arc;

#[cfg(test)]
mod org_chart_route_tests {
    use super::*;

    async fn get_json(uri: &str) -> (u16, Value) {
        let app = test::init_service(
            App::new()
                .app_data(app_state(directory()))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn node_ids(nodes: &Value) -> Vec<String> {
        nodes
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["node_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_web::test]
    async fn test_grouped_chart_by_default() {
        let (status, body) = get_json(&format!("/api/organizations/{}/org-chart", ORG_ID)).await;

        assert_eq!(status, 200);
        assert_eq!(body["layout"], "grouped");
        assert_eq!(
            node_ids(&body["nodes"]),
            vec!["department:eng", "department:sales", "unassigned"]
        );

        let eng = &body["nodes"][0];
        assert_eq!(eng["node_type"], "department");
        assert_eq!(eng["department_name"], "Engineering");
        assert_eq!(eng["employee_count"], 3);
        assert_eq!(node_ids(&eng["direct_reports"]), vec!["employee:e-1"]);
        assert_eq!(
            node_ids(&eng["direct_reports"][0]["direct_reports"]),
            vec!["employee:e-2"]
        );

        let unassigned = &body["nodes"][2];
        assert_eq!(unassigned["department_id"], Value::Null);
        assert_eq!(node_ids(&unassigned["direct_reports"]), vec!["employee:e-6"]);
    }

    #[actix_web::test]
    async fn test_chart_carries_default_expansion() {
        let (_, body) = get_json(&format!("/api/organizations/{}/org-chart", ORG_ID)).await;

        let expanded: Vec<&str> = body["expanded_ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            expanded,
            vec![
                "employee:e-1",
                "employee:e-4",
                "employee:e-6",
                "department:eng",
                "department:sales",
                "unassigned",
            ]
        );
    }

    #[actix_web::test]
    async fn test_chart_carries_department_colors() {
        let (_, body) = get_json(&format!("/api/organizations/{}/org-chart", ORG_ID)).await;

        let colors = &body["department_colors"];
        assert_eq!(
            colors["department:eng"],
            serde_json::to_value(department_color("eng")).unwrap()
        );
        assert_eq!(
            colors["department:sales"],
            serde_json::to_value(department_color("sales")).unwrap()
        );
        assert_eq!(
            colors["unassigned"],
            serde_json::to_value(CategoryToken::Slate).unwrap()
        );
    }

    #[actix_web::test]
    async fn test_flat_layout() {
        let (status, body) =
            get_json(&format!("/api/organizations/{}/org-chart?layout=flat", ORG_ID)).await;

        assert_eq!(status, 200);
        assert_eq!(body["layout"], "flat");
        assert_eq!(
            node_ids(&body["nodes"]),
            vec!["employee:e-1", "employee:e-4"]
        );
        assert_eq!(
            node_ids(&body["nodes"][0]["direct_reports"]),
            vec!["employee:e-2", "employee:e-6"]
        );
        assert_eq!(body["anomalies"]["skipped_inactive"], 0);
    }

    #[actix_web::test]
    async fn test_department_filter() {
        let (status, body) = get_json(&format!(
            "/api/organizations/{}/org-chart?department=sales",
            ORG_ID
        ))
        .await;

        assert_eq!(status, 200);
        assert_eq!(node_ids(&body["nodes"]), vec!["department:sales"]);
        assert_eq!(body["nodes"][0]["employee_count"], 2);
    }

    #[actix_web::test]
    async fn test_unknown_department_is_not_found() {
        let (status, body) = get_json(&format!(
            "/api/organizations/{}/org-chart?department=legal",
            ORG_ID
        ))
        .await;

        assert_eq!(status, 404);
        assert_eq!(body["error"], "NotFound");
        assert!(body["message"].as_str().unwrap().contains("legal"));
    }

    #[actix_web::test]
    async fn test_unknown_organization_is_not_found() {
        let (status, body) = get_json("/api/organizations/nobody/org-chart").await;

        assert_eq!(status, 404);
        assert_eq!(body["error"], "NotFound");
    }

    #[actix_web::test]
    async fn test_manager_loop_is_reported_not_fatal() {
        let (status, body) = get_json("/api/organizations/loop/org-chart").await;

        assert_eq!(status, 200);
        assert_eq!(node_ids(&body["nodes"]), vec!["employee:a", "employee:b"]);
        assert_eq!(
            body["anomalies"]["cycle_broken_ids"],
            serde_json::json!(["a", "b"])
        );
    }

    #[actix_web::test]
    async fn test_deep_management_chain_is_served() {
        let depth = 10_000;
        let employees = (0..depth)
            .map(|i| {
                let manager = (i > 0).then(|| format!("e{:05}", i - 1));
                employee(&format!("e{:05}", i), "Staff", manager.as_deref(), Some("eng"))
            })
            .collect();
        let seed = DirectorySeed {
            organizations: vec![OrganizationDirectory {
                id: "deep".to_string(),
                name: "Deep".to_string(),
                departments: vec![],
                employees,
            }],
        };
        let app = test::init_service(
            App::new()
                .app_data(app_state(Arc::new(InMemoryDirectory::new(seed))))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/organizations/deep/org-chart")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 200);
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert_eq!(text.matches(r#""node_type":"employee""#).count(), depth);
    }
}
