use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::json;

use crate::{probe::EnvironmentVariables, AppState};

// ── GET /aws-info ────────────────────────────────────────────────────────────

/// Queries instance metadata again on every call; off-cloud this answers with the local fallback.
#[utoipa::path(
    get,
    path = "/aws-info",
    tag = "info",
    responses((status = 200, description = "Instance metadata and deployment variables", body = Object,
        example = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "ec2_metadata": { "instance_id": "local-development", "note": "Not running on EC2" },
            "environment_variables": { "AWS_REGION": "not-set", "AWS_AVAILABILITY_ZONE": "not-set", "ENV": "development" }
        })))
)]
pub async fn aws_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let metadata = state.metadata.fetch().await;

    Json(json!({
        "timestamp": Utc::now(),
        "ec2_metadata": metadata,
        "environment_variables": EnvironmentVariables::from_env(),
    }))
}

// ── GET /system-info ─────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/system-info",
    tag = "info",
    responses((status = 200, description = "Host facts and this process's resource usage", body = Object))
)]
pub async fn system_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let system = state.system.system_info().await;
    let process = state.system.process_info();

    Json(json!({
        "timestamp": Utc::now(),
        "system": system,
        "process_info": process,
    }))
}
