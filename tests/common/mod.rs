//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use poi_analytics_api::{
    AppState, CatalogError, CatalogQuery, CookieBudgetStore, JsonRow, QueryCatalog,
    RequestBudget, ServerConfig, TokenPool,
};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// What the test double answers with
pub enum Behavior {
    Rows(Vec<JsonRow>),
    QueryFails,
    PoolFails,
}

/// Query catalog that records every call it receives
pub struct RecordingCatalog {
    behavior: Behavior,
    calls: Mutex<Vec<CatalogQuery>>,
}

impl RecordingCatalog {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn with_fixture() -> Arc<Self> {
        Self::new(Behavior::Rows(event_rows()))
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Behavior::Rows(Vec::new()))
    }

    pub fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryCatalog for RecordingCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<JsonRow>, CatalogError> {
        self.calls.lock().unwrap().push(*query);
        match &self.behavior {
            Behavior::Rows(rows) => Ok(match query {
                CatalogQuery::DailyEventsForPoi(poi_id) => rows
                    .iter()
                    .filter(|row| row.get("poi_id").and_then(|v| v.as_i64()) == Some(*poi_id))
                    .cloned()
                    .collect(),
                _ => rows.clone(),
            }),
            Behavior::QueryFails => Err(CatalogError::Query {
                query: query.name(),
                message: "relation does not exist".to_string(),
            }),
            Behavior::PoolFails => Err(CatalogError::Pool("connection refused".to_string())),
        }
    }

    async fn health_check(&self) -> Result<(), CatalogError> {
        match self.behavior {
            Behavior::PoolFails => Err(CatalogError::Pool("connection refused".to_string())),
            _ => Ok(()),
        }
    }
}

fn row(date: &str, poi_id: i64, events: i64) -> JsonRow {
    match json!({ "date": date, "poi_id": poi_id, "events": events }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Daily event totals for three points of interest.
pub fn event_rows() -> Vec<JsonRow> {
    vec![
        row("2017-01-01", 1, 10),
        row("2017-01-01", 42, 5),
        row("2017-01-02", 42, 8),
        row("2017-01-02", 7, 3),
    ]
}

pub fn cookie_budget(grant: u32, ttl_secs: u64) -> RequestBudget {
    RequestBudget::per_client(
        CookieBudgetStore::new("rate", Duration::from_secs(ttl_secs)),
        grant,
    )
}

pub fn pool_budget(initial: u32, ceiling: u32) -> RequestBudget {
    RequestBudget::pool(
        Arc::new(TokenPool::new(initial, ceiling)),
        Duration::from_secs(10),
    )
}

pub fn state(budget: RequestBudget, catalog: Arc<RecordingCatalog>) -> AppState {
    AppState::new(ServerConfig::default(), budget, catalog).expect("metrics registry")
}
