use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{response::ApiResponse, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Liveness plus database reachability", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database_up = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach the database");
            false
        }
    };

    let data = HealthData {
        status: if database_up { "ok" } else { "degraded" }.to_string(),
        database: if database_up { "up" } else { "down" }.to_string(),
    };

    Json(ApiResponse::success("Health check", data, None))
}
