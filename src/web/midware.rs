use std::sync::Arc;

use axum::{
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::web::{log, Error, REQUEST_ID_HEADER};

/// Replaces the body of every response carrying a `web::Error` with the matching client error body
/// and logs the request.
/// Headers set on the original response (request id, retry-after, ...) are kept.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    let req_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let web_error = resp.extensions().get::<Arc<Error>>().cloned();
    let client_status_and_error = web_error
        .as_deref()
        .map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error
        .as_ref()
        .map(|(status, client_error)| {
            let mut err_resp = (*status, Json(client_error.body())).into_response();
            for (name, value) in resp.headers() {
                if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
                    err_resp.headers_mut().append(name.clone(), value.clone());
                }
            }
            err_resp
        });

    log::log_request(
        req_id,
        req_method,
        uri,
        resp.status(),
        web_error.as_deref(),
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
