use utoipa::OpenApi;

use crate::handlers::stream;
use crate::routes::{chat, cleanup, diagnose, health, insights, profile};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Curable API",
        description = "Health companion chat backed by a hosted assistant and patient records"
    ),
    paths(
        health::root,
        health::health_check,
        chat::chat,
        stream::chat_stream,
        cleanup::cleanup,
        profile::get_profile,
        insights::get_insights,
        diagnose::diagnose,
    ),
    components(schemas(
        health::RootResponse,
        health::HealthResponse,
        chat::ChatRequest,
        chat::ChatResponse,
        cleanup::CleanupResponse,
        profile::ProfileResponse,
        insights::InsightsResponse,
        diagnose::DiagnoseRequest,
        diagnose::DiagnoseResponse,
        diagnose::AssessmentResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "chat", description = "Conversations with the assistant"),
        (name = "profile", description = "Patient profiles"),
        (name = "insights", description = "Insights derived from check-ins"),
        (name = "diagnosis", description = "AI symptom assessment")
    )
)]
pub struct ApiDoc;
