use actix_web::{web, HttpResponse, Responder};

use crate::employee::model::{Department, EmployeeListing, ListingQuery, StatusFilter};
use crate::{directory_error_response, AppState};

#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/employees",
    tag = "Directory",
    params(
        ("org_id" = String, Path, description = "Organization ID"),
        ("status" = Option<StatusFilter>, Query, description = "`active` (default) or `all`")
    ),
    responses(
        (status = 200, description = "Employee listing of the organization", body = EmployeeListing),
        (status = 404, description = "Organization not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_employees(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListingQuery>,
) -> impl Responder {
    let org_id = path.into_inner();
    let result = match query.status {
        StatusFilter::Active => state.get_active_employees(&org_id).await,
        StatusFilter::All => state.get_employees(&org_id).await,
    };

    match result {
        Ok(employees) => HttpResponse::Ok().json(EmployeeListing { employees }),
        Err(e) => directory_error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/departments",
    tag = "Directory",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Departments of the organization", body = Vec<Department>),
        (status = 404, description = "Organization not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_departments(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let org_id = path.into_inner();
    match state.get_departments(&org_id).await {
        Ok(departments) => HttpResponse::Ok().json(departments),
        Err(e) => directory_error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/employees/refresh",
    tag = "Directory",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Listing reloaded from the directory", body = EmployeeListing),
        (status = 404, description = "Organization not found", body = crate::ErrorResponse)
    )
)]
pub async fn refresh_employees(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let org_id = path.into_inner();
    state.invalidate_listing(&org_id).await;

    match state.get_employees(&org_id).await {
        Ok(employees) => HttpResponse::Ok().json(EmployeeListing { employees }),
        Err(e) => directory_error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/organizations/{org_id}/employees").route(web::get().to(get_employees)),
    )
    .service(
        web::resource("/organizations/{org_id}/employees/refresh")
            .route(web::post().to(refresh_employees)),
    )
    .service(
        web::resource("/organizations/{org_id}/departments").route(web::get().to(get_departments)),
    );
}
