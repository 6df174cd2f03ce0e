//! OpenAPI specification generation and app factory.

use crate::{
    app_state::AppState,
    handlers::{
        daily_events, daily_events_for_poi, daily_stats, get_metrics, health, hourly_events,
        hourly_stats, poi, version, welcome,
    },
    middleware::{BudgetMiddleware, MetricsMiddleware, RequestIdMiddleware},
};
use actix_web::App;
use paperclip::actix::{web, OpenApiExt};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the OpenAPI specification served at `/api/spec/v2`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "POI Analytics API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Read-only analytics over hourly events, hourly stats and points of interest.\n\n\
                ## Request budget\n\
                Every `GET` on the data routes counts against a request budget. When the budget is \
                spent the API answers with the plain-text body `Request limit reached!!` and runs \
                no query.\n\
                \n\
                **Per-client mode** (`BUDGET_MODE=cookie`, default): the remaining allowance \
                travels in a cookie (`rate` by default). A first visit is granted \
                `BUDGET_INITIAL_GRANT` requests; the cookie is refreshed on every successful \
                response and expires after `BUDGET_TTL_SECONDS` of inactivity.\n\
                \n\
                **Pool mode** (`BUDGET_MODE=pool`): one allowance shared by every client, \
                refilled by one request every `BUDGET_REPLENISH_SECONDS` up to \
                `BUDGET_POOL_CEILING`.\n\
                \n\
                Denials use status 200 unless `BUDGET_DENY_STATUS=429`.\n\
                \n\
                ## Operational routes\n\
                `/api/health`, `/api/version`, `/api/metrics` and this document are never \
                counted."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the application with every route, middleware and piece of state
///
/// Used by `main` for each worker and by the integration tests.
pub fn create_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(BudgetMiddleware::new(state.budget.clone()))
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::new(state.server))
        .app_data(web::Data::new(state.budget))
        .app_data(web::Data::new(state.catalog))
        .app_data(web::Data::new(state.metrics_config))
        .app_data(web::Data::new(state.metrics))
        .service(web::resource("/").route(web::get().to(welcome)))
        .service(web::resource("/events/hourly").route(web::get().to(hourly_events)))
        .service(web::resource("/events/daily").route(web::get().to(daily_events)))
        .service(web::resource("/events/daily/{poi_id}").route(web::get().to(daily_events_for_poi)))
        .service(web::resource("/stats/hourly").route(web::get().to(hourly_stats)))
        .service(web::resource("/stats/daily").route(web::get().to(daily_stats)))
        .service(web::resource("/poi").route(web::get().to(poi)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
