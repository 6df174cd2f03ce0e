//! Periodic replenishment of the shared token pool.

use super::pool::TokenPool;
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

/// Grant one token back to `pool` every `period`, for as long as the task runs.
///
/// The first grant happens one full period after start.
pub async fn run_replenisher(pool: Arc<TokenPool>, period: Duration) {
    tracing::info!(
        period_secs = period.as_secs_f64(),
        ceiling = pool.ceiling(),
        "Starting token pool replenisher"
    );

    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        if pool.replenish() {
            tracing::debug!(available = pool.available(), "Replenished token pool");
        } else {
            tracing::trace!("Token pool already at ceiling");
        }
    }
}

/// Spawn [`run_replenisher`] on the current tokio runtime.
pub fn spawn_replenisher(pool: Arc<TokenPool>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(run_replenisher(pool, period))
}
