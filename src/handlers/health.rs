//! Health check endpoint handler.

use crate::{config::ServerConfig, models::HealthResponse, services::SharedCatalog};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Not subject to the request budget. With `HEALTH_CHECK_DATABASE=true` the
/// query catalog is probed as well.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API in JSON format.",
    tags("Operations"),
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Analytics store unreachable")
    )
)]
pub async fn health(req: HttpRequest) -> Result<HttpResponse, Error> {
    let probe_database = req
        .app_data::<web::Data<ServerConfig>>()
        .is_some_and(|config| config.health_check_database);

    if probe_database
        && let Some(catalog) = req.app_data::<web::Data<SharedCatalog>>()
        && let Err(e) = catalog.health_check().await
    {
        tracing::warn!(error = %e, "Health check failed");
        return Ok(HttpResponse::ServiceUnavailable().json(HealthResponse::unhealthy()));
    }

    Ok(HttpResponse::Ok().json(HealthResponse::healthy()))
}
