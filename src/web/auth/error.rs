use axum::http::StatusCode;

use crate::web::error::ClientError;

pub type Result<T> = core::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no admin password hash configured, admin routes are closed")]
    AdminLocked,
    #[error("unknown username: {username}")]
    UsernameNotFound { username: String },
    #[error("username too long")]
    UsernameTooLong,
    #[error("invalid password - doesn't match the admin password hash")]
    PasswordInvalid,
    #[error("password too long")]
    PasswordTooLong,

    #[error("error parsing the salt: {0}")]
    Salting(String),
    #[error("hashing error: {0}")]
    Hashing(String),

    #[error("header 'Authorization' is missing from the request")]
    MissingAuthHeader,
    #[error("got invalid utf-8 in 'Authorization' header: {0}")]
    InvalidUtf(String),
    #[error("missing colon in 'Authorization' header - can't split username and password")]
    MissingColon,
    #[error("received the wrong authentication schema. expected: {schema}")]
    WrongAuthSchema { schema: String },

    #[error("password_hash error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("base64 decoding error: {0}")]
    Base64Decode(#[from] crate::utils::UtilsError),
    #[error("tokio join error: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
}

impl AuthError {
    /// Every auth failure looks the same to the client.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        (StatusCode::UNAUTHORIZED, ClientError::Unauthorized)
    }
}
