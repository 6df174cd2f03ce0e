//! Analytics endpoints backed by the query catalog.
//!
//! Every handler maps its route to a [`CatalogQuery`] and returns the rows as
//! a JSON array. The request budget is enforced by
//! [`BudgetMiddleware`](crate::middleware::BudgetMiddleware) before any of
//! these run.

use crate::{
    error::ApiError,
    models::{DailyEventsQuery, PoiPath},
    services::{AppMetrics, CatalogQuery, SharedCatalog},
};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result};
use paperclip::actix::api_v2_operation;
use std::time::Instant;

/// Run `query` through the catalog and render the rows.
async fn respond_with_rows(req: &HttpRequest, query: CatalogQuery) -> Result<HttpResponse, Error> {
    let catalog = req
        .app_data::<web::Data<SharedCatalog>>()
        .ok_or(ApiError::Unavailable("query catalog"))?;

    let started = Instant::now();
    let result = catalog.fetch(&query).await;
    if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
        metrics.record_query(query.name(), result.is_ok(), started.elapsed());
    }

    let rows = result.map_err(ApiError::from)?;
    tracing::debug!(query = query.name(), rows = rows.len(), "Serving analytics rows");
    Ok(HttpResponse::Ok().json(rows))
}

#[api_v2_operation(
    summary = "Hourly Events",
    description = "Hourly event counts, first 168 rows ordered by date and hour.",
    tags("Events"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn hourly_events(req: HttpRequest) -> Result<HttpResponse, Error> {
    respond_with_rows(&req, CatalogQuery::HourlyEvents).await
}

#[api_v2_operation(
    summary = "Daily Events",
    description = "Daily event totals, first 7 days. With by_poi=true the totals are split by point of interest.",
    tags("Events"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn daily_events(
    req: HttpRequest,
    params: web::Query<DailyEventsQuery>,
) -> Result<HttpResponse, Error> {
    let query = if params.split_by_poi() {
        CatalogQuery::DailyEventsPerPoi
    } else {
        CatalogQuery::DailyEvents
    };
    respond_with_rows(&req, query).await
}

#[api_v2_operation(
    summary = "Daily Events for a Point of Interest",
    description = "Daily event totals for one point of interest, first 7 days.",
    tags("Events"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 400, description = "poi_id is not an integer"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn daily_events_for_poi(
    req: HttpRequest,
    path: web::Path<PoiPath>,
) -> Result<HttpResponse, Error> {
    let poi_id = path.parse_id().map_err(|e| ApiError::InvalidParameter {
        name: "poi_id",
        reason: e.to_string(),
    })?;
    respond_with_rows(&req, CatalogQuery::DailyEventsForPoi(poi_id)).await
}

#[api_v2_operation(
    summary = "Hourly Stats",
    description = "Hourly impressions, clicks and revenue, first 168 rows ordered by date and hour.",
    tags("Stats"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn hourly_stats(req: HttpRequest) -> Result<HttpResponse, Error> {
    respond_with_rows(&req, CatalogQuery::HourlyStats).await
}

#[api_v2_operation(
    summary = "Daily Stats",
    description = "Daily totals of impressions, clicks and revenue, first 7 days.",
    tags("Stats"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn daily_stats(req: HttpRequest) -> Result<HttpResponse, Error> {
    respond_with_rows(&req, CatalogQuery::DailyStats).await
}

#[api_v2_operation(
    summary = "Points of Interest",
    description = "The full point-of-interest table.",
    tags("POI"),
    responses(
        (status = 200, description = "JSON array of rows, or the request limit message"),
        (status = 500, description = "Query failed"),
        (status = 503, description = "Analytics store unavailable")
    )
)]
pub async fn poi(req: HttpRequest) -> Result<HttpResponse, Error> {
    respond_with_rows(&req, CatalogQuery::Poi).await
}
