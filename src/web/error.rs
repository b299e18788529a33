use std::{net::IpAddr, sync::Arc};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use strum_macros::AsRefStr;

use crate::{
    subscription::{StoreError, SubscribeError},
    web::{auth::AuthError, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER},
};

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("rate limit of {limit} requests exceeded for {source_ip}, retry after {retry_after_secs}s")]
    RateLimited {
        source_ip: IpAddr,
        limit: u32,
        retry_after_secs: u64,
    },
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Subscribe(SubscribeError::MissingEmail) => {
                (StatusCode::BAD_REQUEST, EmailRequired)
            }
            Error::Subscribe(SubscribeError::InvalidFormat(_)) => {
                (StatusCode::BAD_REQUEST, EmailInvalid)
            }
            Error::Subscribe(SubscribeError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SubscriptionFailed)
            }
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, DatabaseError),
            Error::Auth(auth_er) => auth_er.status_code_and_client_error(),
            Error::RateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, TooManySubscriptionAttempts)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response, the body is built by the response mapper.
        let (status, _) = self.status_code_and_client_error();
        let mut res = status.into_response();

        let headers = res.headers_mut();
        match &self {
            Error::RateLimited {
                limit,
                retry_after_secs,
                ..
            } => {
                headers.insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
                headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(*limit));
                headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(0u32));
            }
            Error::Auth(_) => {
                headers.insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(r#"Basic realm="admin", charset="UTF-8""#),
                );
            }
            _ => {}
        }

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see. Never carries internal detail.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Email address is required.")]
    EmailRequired,
    #[display("Please provide a valid email address.")]
    EmailInvalid,
    #[display("Subscription failed. Please try again.")]
    SubscriptionFailed,
    #[display("Too many subscription attempts, please try again later.")]
    TooManySubscriptionAttempts,
    #[display("Database error")]
    DatabaseError,
    #[display("Unauthorized")]
    Unauthorized,
}

impl ClientError {
    /// The newsletter routes answer with `{ success, message }`, the admin routes with `{ error }`.
    pub fn body(&self) -> Value {
        match self {
            ClientError::DatabaseError | ClientError::Unauthorized => {
                json!({ "error": self.to_string() })
            }
            _ => json!({ "success": false, "message": self.to_string() }),
        }
    }
}
