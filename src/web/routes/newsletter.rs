use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use tracing::info;

use crate::{
    subscription::SubscribeError,
    web::{
        types::{SubscribeRequest, SubscribeResponse},
        WebResult,
    },
    AppState,
};

/// Registers an email address for the newsletter.
///
/// The body is read as raw bytes so that an empty or non-JSON body is answered with
/// the same validation messages as a JSON body with a bad email.
#[tracing::instrument(name = "Adding a new subscriber", skip(headers, app_state, body))]
pub async fn subscribe(
    headers: HeaderMap,
    State(app_state): State<AppState>,
    body: Bytes,
) -> WebResult<Json<SubscribeResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok());
    let request = SubscribeRequest::from_content(content_type, &body)
        .map_err(SubscribeError::InvalidFormat)?;

    let outcome = app_state
        .subscription_svc
        .subscribe(request.email.as_deref())
        .await?;
    info!("Subscribe request handled: {outcome:?}");

    Ok(Json(SubscribeResponse {
        success: true,
        message: outcome.message(),
    }))
}
