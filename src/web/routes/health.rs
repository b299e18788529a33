use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};

use crate::{web::types::HealthResponse, AppState};

pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: format!("{} is running", app_state.service_name),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
