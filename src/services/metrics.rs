//! Metrics collection and Prometheus integration service.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub app_uptime_seconds: Gauge,
    pub app_info: CounterVec,
    pub budget_decisions_total: CounterVec,
    pub budget_pool_available: IntGauge,
    pub catalog_queries_total: CounterVec,
    pub catalog_query_duration_seconds: HistogramVec,
    pub start_time: Instant,
}

impl AppMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "status", "route"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?;

        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        let app_info = CounterVec::new(
            Opts::new("app_info", "Application information"),
            &["version", "commit", "build_time"],
        )?;

        let budget_decisions_total = CounterVec::new(
            Opts::new(
                "budget_decisions_total",
                "Admission decisions taken by the request budget",
            ),
            &["mode", "outcome"],
        )?;

        let budget_pool_available = IntGauge::new(
            "budget_pool_available",
            "Tokens currently available in the shared request pool",
        )?;

        let catalog_queries_total = CounterVec::new(
            Opts::new("catalog_queries_total", "Analytics queries run against the store"),
            &["query", "outcome"],
        )?;

        let catalog_query_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "catalog_query_duration_seconds",
                "Analytics query duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["query"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;
        registry.register(Box::new(app_info.clone()))?;
        registry.register(Box::new(budget_decisions_total.clone()))?;
        registry.register(Box::new(budget_pool_available.clone()))?;
        registry.register(Box::new(catalog_queries_total.clone()))?;
        registry.register(Box::new(catalog_query_duration_seconds.clone()))?;

        let build = crate::handlers::version::BuildInfo::current();
        app_info
            .with_label_values(&[build.version, build.commit, build.build_time])
            .inc();

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            app_uptime_seconds,
            app_info,
            budget_decisions_total,
            budget_pool_available,
            catalog_queries_total,
            catalog_query_duration_seconds,
            start_time: Instant::now(),
        })
    }

    /// Record an HTTP request with method, route, status, and duration
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if route == "/api/metrics" {
            // Scrapes would otherwise dominate the request counters
            return;
        }

        self.http_requests_total
            .with_label_values(&[method, &status.to_string(), route])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_admission(&self, mode: &str, admitted: bool) {
        let outcome = if admitted { "admitted" } else { "denied" };
        self.budget_decisions_total
            .with_label_values(&[mode, outcome])
            .inc();
    }

    pub fn set_pool_available(&self, available: u32) {
        self.budget_pool_available.set(i64::from(available));
    }

    pub fn record_query(&self, query: &str, success: bool, duration: Duration) {
        let outcome = if success { "ok" } else { "error" };
        self.catalog_queries_total
            .with_label_values(&[query, outcome])
            .inc();
        self.catalog_query_duration_seconds
            .with_label_values(&[query])
            .observe(duration.as_secs_f64());
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        let uptime = self.start_time.elapsed().as_secs_f64();
        self.app_uptime_seconds.set(uptime);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
