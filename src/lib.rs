use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod employee;
pub mod org_chart;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

use crate::db::DirectoryError;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Maps a directory failure to its JSON error response.
pub fn directory_error_response(err: &DirectoryError) -> HttpResponse {
    match err {
        DirectoryError::OrganizationNotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
        }
        DirectoryError::Backend(_) => {
            log::error!("Directory read failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::employee::routes::get_employees,
        crate::employee::routes::get_departments,
        crate::employee::routes::refresh_employees,
        crate::org_chart::routes::get_org_chart
    ),
    components(
        schemas(
            employee::model::Employee,
            employee::model::EmployeeStatus,
            employee::model::DepartmentRef,
            employee::model::Department,
            employee::model::EmployeeListing,
            employee::model::StatusFilter,
            org_chart::routes::OrgChartResponse,
            org_chart::color::CategoryToken,
            org_chart::view_state::ChartLayout,
            org_chart::tree::TreeAnomalies,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Directory", description = "Employee and department listings."),
        (name = "Org Chart", description = "Organization chart endpoints.")
    )
)]
pub struct ApiDoc;

/// Registers every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(employee::routes::config)
            .configure(org_chart::routes::config),
    );
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::new_with_config(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to load the directory. Please check DIRECTORY_SEED_PATH in .env. Error: {:#}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = match PrometheusMetricsBuilder::new("org_directory_server")
        .endpoint("/metrics")
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(e) => {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::process::exit(1);
        }
    };

    let bind = (config.bind_address.clone(), config.port);
    let allowed_origins = config.allowed_origins.clone();
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)?
    .run()
    .await
}
