use actix_web::HttpServer;
use poi_analytics_api::{
    create_app, init_tracing, install_fatal_panic_hook, AppState, BudgetConfig, DatabaseConfig,
    LoggingConfig, MetricsConfig, PostgresCatalog, RequestBudget, ServerConfig,
};
use std::{io, sync::Arc};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let logging = LoggingConfig::from_env();
    if let Err(e) = init_tracing(&logging) {
        eprintln!("failed to initialize logging: {e}");
    }
    install_fatal_panic_hook();

    let server_config = ServerConfig::from_env();
    let budget_config = BudgetConfig::from_env();
    let database_config = DatabaseConfig::from_env();

    tracing::info!(
        database = %database_config.describe(),
        pool_size = database_config.max_pool_size,
        "Configuring analytics store"
    );
    let catalog = PostgresCatalog::new(&database_config).map_err(io::Error::other)?;

    let budget = RequestBudget::from_config(&budget_config);
    tracing::info!(
        mode = %budget.mode(),
        initial_grant = budget_config.initial_grant,
        ttl_secs = budget_config.ttl_seconds,
        pool_ceiling = budget_config.pool_ceiling,
        replenish_secs = budget_config.replenish_seconds,
        "Request budget configured"
    );
    // Lives for the whole process; dropping the handle does not stop the task
    let _replenisher = budget.spawn_replenisher();

    let state = AppState::new(server_config.clone(), budget, Arc::new(catalog))
        .map_err(io::Error::other)?
        .with_metrics_config(MetricsConfig::from_env());

    let (host, port) = server_config.bind_address();
    tracing::info!(%host, port, "Running on {host}:{port}");

    HttpServer::new(move || create_app(state.clone()))
        .bind((host.as_str(), port))?
        .run()
        .await
}
