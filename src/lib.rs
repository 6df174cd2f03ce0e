//! POI Analytics API - read-only analytics over a PostgreSQL store, guarded
//! by a request budget
//!
//! Every public route is accounted against a budget before it runs. The
//! budget is either carried per client in a cookie or held as a single
//! replenishing token pool for the whole process.
//!
//! ## Architecture
//!
//! - `config/` - Configuration structures and environment loading
//! - `services/budget/` - Admission decision, cookie store, token pool and
//!   its replenisher
//! - `services/catalog` - Route-to-SQL catalog and its PostgreSQL backend
//! - `middleware/` - Budget enforcement, request IDs, metrics
//! - `handlers/` - HTTP handlers and the app factory
//! - `telemetry` - Logging setup and fatal panic handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use poi_analytics_api::{
//!     create_app, AppState, BudgetConfig, DatabaseConfig, PostgresCatalog, RequestBudget,
//!     ServerConfig,
//! };
//! use std::sync::Arc;
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(PostgresCatalog::new(&DatabaseConfig::from_env())?);
//!     let budget = RequestBudget::from_config(&BudgetConfig::from_env());
//!     let state = AppState::new(ServerConfig::from_env(), budget, catalog)?;
//!     let _app = create_app(state);
//!     Ok(())
//! }
//! ```

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use app_state::AppState;
pub use config::{
    BudgetConfig, BudgetMode, ConfigError, DatabaseConfig, MetricsConfig, ServerConfig,
};
pub use error::ApiError;
pub use handlers::{create_app, create_openapi_spec};
pub use middleware::{BudgetMiddleware, MetricsMiddleware, RequestIdMiddleware};
pub use models::{DailyEventsQuery, HealthResponse, PoiPath, VersionResponse};
pub use services::{
    Admission, AppMetrics, CatalogError, CatalogQuery, CookieBudgetStore, JsonRow,
    PostgresCatalog, QueryCatalog, RequestBudget, SharedCatalog, TokenPool,
    LIMIT_REACHED_MESSAGE,
};
pub use telemetry::{LoggingConfig, init_tracing, install_fatal_panic_hook};
