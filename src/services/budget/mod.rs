//! Request budget: how many more requests a principal may make.
//!
//! Two mechanisms share one admission policy:
//! - per-client: each client carries its allowance in a cookie that the
//!   server re-issues on every successful response
//! - pool: one counter for the whole process, refilled by a background task

pub mod cookie;
pub mod decision;
pub mod pool;
pub mod replenish;

pub use cookie::CookieBudgetStore;
pub use decision::{decide, decide_shared, Admission};
pub use pool::TokenPool;
pub use replenish::{run_replenisher, spawn_replenisher};

use crate::config::{BudgetConfig, BudgetMode};
use actix_web::{http::StatusCode, HttpRequest, HttpResponse};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

/// Body sent when a request is refused for lack of allowance.
pub const LIMIT_REACHED_MESSAGE: &str = "Request limit reached!!";

#[derive(Clone, Debug)]
enum Mechanism {
    PerClient {
        store: CookieBudgetStore,
        initial_grant: u32,
    },
    Pool {
        pool: Arc<TokenPool>,
        period: Duration,
    },
}

/// The budget applied to every accounted route
#[derive(Clone, Debug)]
pub struct RequestBudget {
    mechanism: Mechanism,
    deny_status: StatusCode,
}

impl RequestBudget {
    pub fn per_client(store: CookieBudgetStore, initial_grant: u32) -> Self {
        Self {
            mechanism: Mechanism::PerClient {
                store,
                initial_grant,
            },
            deny_status: StatusCode::OK,
        }
    }

    pub fn pool(pool: Arc<TokenPool>, period: Duration) -> Self {
        Self {
            mechanism: Mechanism::Pool { pool, period },
            deny_status: StatusCode::OK,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        let budget = match config.mode {
            BudgetMode::PerClient => Self::per_client(
                CookieBudgetStore::new(config.cookie_name.clone(), config.ttl()),
                config.initial_grant,
            ),
            BudgetMode::Pool => Self::pool(
                Arc::new(TokenPool::new(config.pool_initial, config.pool_ceiling)),
                config.replenish_period(),
            ),
        };
        budget.with_deny_status(config.deny_status_code())
    }

    pub fn with_deny_status(mut self, status: StatusCode) -> Self {
        self.deny_status = status;
        self
    }

    pub fn mode(&self) -> BudgetMode {
        match self.mechanism {
            Mechanism::PerClient { .. } => BudgetMode::PerClient,
            Mechanism::Pool { .. } => BudgetMode::Pool,
        }
    }

    /// The shared pool, when running in pool mode.
    pub fn token_pool(&self) -> Option<&Arc<TokenPool>> {
        match &self.mechanism {
            Mechanism::Pool { pool, .. } => Some(pool),
            Mechanism::PerClient { .. } => None,
        }
    }

    /// Read the principal's allowance and decide. In pool mode an admitted
    /// request has already spent its token when this returns.
    pub fn admit(&self, req: &HttpRequest) -> Admission {
        match &self.mechanism {
            Mechanism::PerClient {
                store,
                initial_grant,
            } => decide(store.read(req), *initial_grant),
            Mechanism::Pool { pool, .. } => pool.try_acquire(),
        }
    }

    /// Persist the allowance after the downstream handler ran.
    ///
    /// Per-client allowance is only spent when the response succeeded; on
    /// failure the client keeps the cookie it sent. Pool tokens are spent at
    /// admission and never refunded.
    pub fn settle(&self, admission: Admission, res: &mut HttpResponse) {
        let Mechanism::PerClient { store, .. } = &self.mechanism else {
            return;
        };
        if !admission.admitted || !res.status().is_success() {
            return;
        }
        if let Err(e) = store.write(res, admission.next) {
            tracing::warn!(error = %e, "Failed to attach budget cookie");
        }
    }

    pub fn denied_response(&self) -> HttpResponse {
        HttpResponse::build(self.deny_status)
            .content_type("text/plain; charset=utf-8")
            .body(LIMIT_REACHED_MESSAGE)
    }

    /// Start the replenisher in pool mode. The handle must be kept alive for
    /// the lifetime of the process.
    pub fn spawn_replenisher(&self) -> Option<JoinHandle<()>> {
        match &self.mechanism {
            Mechanism::Pool { pool, period } => Some(spawn_replenisher(Arc::clone(pool), *period)),
            Mechanism::PerClient { .. } => None,
        }
    }
}
