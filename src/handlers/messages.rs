use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::CreateMessage,
    AppState,
};

// ── POST /messages ───────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/messages",
    tag = "messages",
    request_body = CreateMessage,
    responses(
        (status = 200, description = "Message stored; `data` holds the created Message", body = Object),
        (status = 400, description = "Body is not valid JSON", body = Object),
        (status = 422, description = "Missing or ill-typed fields, or empty name", body = Object),
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessage>, JsonRejection>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(payload) = payload?;
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }

    let server_id = state.metadata.server_id().await;
    let message = state.messages.append(payload.stamp(server_id)).await;

    info!(id = message.id, name = %message.name, "Created message");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "success",
            "message": "Message created successfully",
            "data": message,
        })),
    ))
}

// ── GET /messages ────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/messages",
    tag = "messages",
    responses((status = 200, description = "All messages in id order", body = Object))
)]
pub async fn list_messages(State(state): State<AppState>) -> Json<serde_json::Value> {
    let messages = state.messages.list().await;
    let server_id = state.metadata.server_id().await;

    Json(serde_json::json!({
        "total": messages.len(),
        "messages": messages,
        "server_id": server_id,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tokio::task::JoinSet;

    use crate::testing::{get, post_json, send, test_app};

    fn payload(n: usize) -> serde_json::Value {
        json!({
            "name": format!("Visitor {n}"),
            "email": format!("visitor{n}@example.com"),
            "message": format!("Hello #{n}"),
        })
    }

    #[tokio::test]
    async fn create_returns_stamped_record() {
        let resp = send(test_app(), post_json("/messages", &payload(1))).await;
        assert_eq!(resp.status, StatusCode::OK);

        let body = resp.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Message created successfully");
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["name"], "Visitor 1");
        assert_eq!(body["data"]["server_id"], "local-development");
        assert!(body["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn ids_follow_call_order_and_list_matches() {
        let app = test_app();
        for n in 1..=5 {
            let resp = send(app.clone(), post_json("/messages", &payload(n))).await;
            assert_eq!(resp.json()["data"]["id"], json!(n));
        }

        let body = send(app, get("/messages")).await.json();
        assert_eq!(body["total"], 5);
        assert_eq!(body["server_id"], "local-development");
        let listed = body["messages"].as_array().unwrap();
        for (i, msg) in listed.iter().enumerate() {
            assert_eq!(msg["id"], json!(i + 1));
            assert_eq!(msg["message"], format!("Hello #{}", i + 1));
        }
    }

    #[tokio::test]
    async fn list_is_empty_initially() {
        let body = send(test_app(), get("/messages")).await.json();
        assert_eq!(body["total"], 0);
        assert_eq!(body["messages"], json!([]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_creates_get_unique_ids() {
        let app = test_app();
        let mut join_set = JoinSet::new();
        for n in 0..32 {
            let app = app.clone();
            join_set.spawn(async move {
                let resp = send(app, post_json("/messages", &payload(n))).await;
                resp.json()["data"]["id"].as_u64().unwrap()
            });
        }

        let mut ids = Vec::new();
        while let Some(id) = join_set.join_next().await {
            ids.push(id.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());

        let body = send(app, get("/messages")).await.json();
        assert_eq!(body["total"], 32);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let app = test_app();
        let resp = send(
            app.clone(),
            post_json("/messages", &json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp.json()["message"], "Validation failed");

        let body = send(app, get("/messages")).await.json();
        assert_eq!(body["total"], 0, "rejected payloads are not stored");
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let resp = send(
            test_app(),
            post_json(
                "/messages",
                &json!({ "name": "  ", "email": "a@b.c", "message": "hi" }),
            ),
        )
        .await;
        assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp.text.contains("name must not be empty"));
    }

    #[tokio::test]
    async fn malformed_json_is_client_error() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let resp = send(test_app(), req).await;
        assert!(resp.status.is_client_error());
        assert_eq!(resp.json()["message"], "Validation failed");
    }
}
