use axum::{extract::State, http::HeaderMap, Json};
use tracing::info;

use crate::{
    subscription::SubscriberListing,
    web::{auth::Credentials, WebResult},
    AppState,
};

/// Lists all active subscribers, newest first. Requires the admin's Basic credentials.
#[tracing::instrument(name = "Listing subscribers", skip(headers, app_state))]
pub async fn list_subscribers(
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> WebResult<Json<Vec<SubscriberListing>>> {
    Credentials::from_basic_auth_header(&headers)?
        .authenticate(&app_state.admin_config)
        .await?;

    let subscribers = app_state.subscription_svc.list_active_subscribers().await?;
    info!("Listed {} active subscribers", subscribers.len());

    Ok(Json(subscribers))
}
