//! Request-budget configuration.

use super::parse_or;
use actix_web::http::StatusCode;
use std::{env, fmt, str::FromStr, time::Duration};

/// Which budget mechanism guards the accounted routes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BudgetMode {
    /// Remaining-request count carried by each client in a cookie.
    PerClient,
    /// One replenishing counter shared by every client of the process.
    Pool,
}

impl BudgetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetMode::PerClient => "cookie",
            BudgetMode::Pool => "pool",
        }
    }
}

impl fmt::Display for BudgetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" | "client" | "per-client" => Ok(BudgetMode::PerClient),
            "pool" | "shared" => Ok(BudgetMode::Pool),
            other => Err(format!("unknown budget mode '{other}'")),
        }
    }
}

/// Configuration for the request budget applied to every accounted route
#[derive(Clone, Debug)]
pub struct BudgetConfig {
    pub mode: BudgetMode,
    /// Allowance handed to a client on its first visit.
    pub initial_grant: u32,
    pub cookie_name: String,
    /// Lifetime of a client-held allowance after its last refresh.
    pub ttl_seconds: u64,
    pub pool_initial: u32,
    pub pool_ceiling: u32,
    pub replenish_seconds: u64,
    /// Status sent with the "limit reached" body: 200 or 429.
    pub deny_status: u16,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            mode: BudgetMode::PerClient,
            initial_grant: 2,
            cookie_name: "rate".to_string(),
            ttl_seconds: 10,
            pool_initial: 10,
            pool_ceiling: 10,
            replenish_seconds: 10,
            deny_status: 200,
        }
    }
}

impl BudgetConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mode = parse_or(&lookup, "BUDGET_MODE", defaults.mode);
        let initial_grant = parse_or(&lookup, "BUDGET_INITIAL_GRANT", defaults.initial_grant);
        let cookie_name = lookup("BUDGET_COOKIE_NAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.cookie_name);
        // A zero TTL would expire every cookie as it is issued and re-grant forever
        let ttl_seconds = match parse_or(&lookup, "BUDGET_TTL_SECONDS", defaults.ttl_seconds) {
            0 => {
                tracing::warn!("BUDGET_TTL_SECONDS must be at least 1, using 1");
                1
            }
            ttl => ttl,
        };
        let pool_ceiling = parse_or(&lookup, "BUDGET_POOL_CEILING", defaults.pool_ceiling);
        let pool_initial = parse_or(&lookup, "BUDGET_POOL_INITIAL", defaults.pool_initial);
        // A zero period would spin the replenisher
        let replenish_seconds =
            parse_or(&lookup, "BUDGET_REPLENISH_SECONDS", defaults.replenish_seconds).max(1);

        let deny_status = match parse_or(&lookup, "BUDGET_DENY_STATUS", defaults.deny_status) {
            status @ (200 | 429) => status,
            other => {
                tracing::warn!(status = other, "BUDGET_DENY_STATUS must be 200 or 429, using 200");
                200
            }
        };

        Self {
            mode,
            initial_grant,
            cookie_name,
            ttl_seconds,
            pool_initial: pool_initial.min(pool_ceiling),
            pool_ceiling,
            replenish_seconds,
            deny_status,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn replenish_period(&self) -> Duration {
        Duration::from_secs(self.replenish_seconds)
    }

    pub fn deny_status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.deny_status).unwrap_or(StatusCode::OK)
    }
}
