//! OpenAPI document served at `/openapi.json` and rendered by Swagger UI at `/docs`.

use utoipa::OpenApi;

use crate::{
    handlers,
    models::{CreateMessage, HealthCheck, Message},
    probe::SystemInfo,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cloud Demo Service",
        description = "Health, host and instance facts, an in-memory message board, and load/error drills."
    ),
    paths(
        handlers::root,
        handlers::health,
        handlers::ping,
        handlers::info::aws_info,
        handlers::info::system_info,
        handlers::messages::create_message,
        handlers::messages::list_messages,
        handlers::load::load_test,
        handlers::load::error_test,
    ),
    components(schemas(Message, CreateMessage, HealthCheck, SystemInfo, handlers::load::WorkerResult)),
    tags(
        (name = "pages", description = "Human-facing pages"),
        (name = "health", description = "Liveness checks for load balancers"),
        (name = "info", description = "Host and cloud instance facts"),
        (name = "messages", description = "In-memory message board"),
        (name = "drills", description = "Synthetic load and failure endpoints"),
    )
)]
pub struct ApiDoc;
