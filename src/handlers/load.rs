use std::hint::black_box;
use std::time::Instant;

use axum::{extract::State, http::Uri, Json};
use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Fixed fan-out for the synthetic CPU burn.
pub const WORKERS: usize = 4;
pub const ITERATIONS: u64 = 1_000_000;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerResult {
    pub worker: usize,
    pub result: u64,
    /// Wall-clock seconds spent in the burn loop.
    pub duration: f64,
}

/// Σ i² for i in 0..n. Kept as a real loop so each worker actually burns CPU.
pub fn sum_of_squares(n: u64) -> u64 {
    let mut total: u64 = 0;
    for i in 0..n {
        let i = black_box(i);
        total += i * i;
    }
    total
}

fn burn(worker: usize) -> WorkerResult {
    let start = Instant::now();
    let result = sum_of_squares(ITERATIONS);
    WorkerResult {
        worker,
        result,
        duration: start.elapsed().as_secs_f64(),
    }
}

// ── GET /load-test ───────────────────────────────────────────────────────────

/// Runs [`WORKERS`] burns on the blocking pool and waits for all of them.
/// No timeout and no cancellation: the response is held until every worker returns.
#[utoipa::path(
    get,
    path = "/load-test",
    tag = "drills",
    responses((status = 200, description = "Every worker finished; one WorkerResult per worker", body = Object))
)]
pub async fn load_test(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let total_start = Instant::now();
    let mut join_set: JoinSet<WorkerResult> = JoinSet::new();

    for worker in 0..WORKERS {
        join_set.spawn_blocking(move || burn(worker));
    }

    let mut results = Vec::with_capacity(WORKERS);
    while let Some(joined) = join_set.join_next().await {
        results.push(joined?);
    }

    info!(
        workers = results.len(),
        elapsed_ms = total_start.elapsed().as_millis(),
        "Load test complete"
    );

    Ok(Json(serde_json::json!({
        "message": "Load test completed",
        "results": results,
        "server_id": state.metadata.server_id().await,
        "timestamp": Utc::now(),
    })))
}

// ── GET /error-test ──────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/error-test",
    tag = "drills",
    responses((status = 500, description = "Always fails, for alerting drills", body = Object))
)]
pub async fn error_test(uri: Uri) -> AppResult<()> {
    Err(AppError::TestError {
        path: super::request_path(&uri),
    })
}
