use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use crate::org_chart::color::{department_colors, CategoryToken};
use crate::org_chart::model::{forest_to_json, NodeId};
use crate::org_chart::tree::TreeAnomalies;
use crate::org_chart::view_state::{ChartLayout, ChartView, DepartmentFilter};
use crate::{directory_error_response, AppState, ErrorResponse};

#[derive(Deserialize, Debug, Default)]
pub struct OrgChartQuery {
    #[serde(default)]
    pub layout: ChartLayout,
    /// Department id, `unassigned`, or `all`.
    pub department: Option<String>,
}

/// Everything the rendering layer needs to draw a fresh chart.
#[derive(Serialize, Debug, ToSchema)]
pub struct OrgChartResponse {
    pub layout: ChartLayout,
    /// Root nodes; each node carries `node_type`, `node_id` and `direct_reports`.
    #[schema(value_type = Vec<Object>)]
    pub nodes: Box<RawValue>,
    /// Node ids expanded by default, e.g. `department:eng`, `employee:e-1`.
    #[schema(value_type = Vec<String>)]
    pub expanded_ids: Vec<NodeId>,
    /// Keyed by department node id, e.g. `department:eng` or `unassigned`.
    #[schema(value_type = Object)]
    pub department_colors: BTreeMap<NodeId, CategoryToken>,
    pub anomalies: TreeAnomalies,
}

impl OrgChartResponse {
    pub fn from_view(view: &ChartView) -> serde_json::Result<Self> {
        Ok(Self {
            layout: view.layout(),
            nodes: RawValue::from_string(forest_to_json(view.nodes())?)?,
            expanded_ids: view.state().expanded_ids(),
            department_colors: department_colors(view.nodes()),
            anomalies: view.anomalies().clone(),
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/org-chart",
    tag = "Org Chart",
    params(
        ("org_id" = String, Path, description = "Organization ID"),
        ("layout" = Option<ChartLayout>, Query, description = "`grouped` (default) or `flat`"),
        ("department" = Option<String>, Query, description = "Department id, `unassigned` or `all`")
    ),
    responses(
        (status = 200, description = "Org chart tree with its default expansion", body = OrgChartResponse),
        (status = 404, description = "Organization or department not found", body = ErrorResponse)
    )
)]
pub async fn get_org_chart(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OrgChartQuery>,
) -> impl Responder {
    let org_id = path.into_inner();
    let query = query.into_inner();

    let employees = match state.get_active_employees(&org_id).await {
        Ok(employees) => employees,
        Err(e) => return directory_error_response(&e),
    };
    let departments = match state.get_departments(&org_id).await {
        Ok(departments) => departments,
        Err(e) => return directory_error_response(&e),
    };

    let filter = DepartmentFilter::from_query(query.department.as_deref());
    if let DepartmentFilter::Department(id) = &filter {
        let known = departments.iter().any(|d| &d.id == id)
            || employees.iter().any(|e| e.department_key() == Some(id.as_str()));
        if !known {
            return HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Department '{}' not found",
                id
            )));
        }
    }

    let department_names: HashMap<String, String> = departments
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let view = ChartView::with_department_names(employees, department_names, filter, query.layout);
    log::info!(
        "Org chart for {} built ({} roots, {:?} layout)",
        org_id,
        view.nodes().len(),
        view.layout()
    );

    match OrgChartResponse::from_view(&view) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::error!("Failed to serialize org chart for {}: {}", org_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to serialize org chart"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/organizations/{org_id}/org-chart").route(web::get().to(get_org_chart)),
    );
}
