//! Contains the `Credentials` data structure, its implementations and tests for them.
//! `Credentials` are parsed from an `Authorization: Basic ...` header and authenticated
//! against the administrator configured in `AdminConfig`.

use axum::http::{header, HeaderMap};
use secrecy::SecretString;
use unicode_segmentation::UnicodeSegmentation;

use crate::{config::AdminConfig, utils::b64_decode_to_string};

use super::{password, AuthError, Result};

/// Verified instead of the real hash when the username doesn't match,
/// so unknown usernames cost the same time as wrong passwords.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$DqfdT4sWTiKO8R19hTTtyg$DWeO60WYNYRhAdju0/dzYNhrtmb0jZ6+/ceCHyNKNfk";

const MAX_FIELD_GRAPHEMES: usize = 256;

/// Admin credentials
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: String, password: SecretString) -> Self {
        Credentials { username, password }
    }

    /// Try to parse credentials from the `Authorization` header using the Basic schema.
    pub fn from_basic_auth_header(header_map: &HeaderMap) -> Result<Self> {
        let header_val = header_map
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|e| AuthError::InvalidUtf(e.to_string()))?;
        let b64_encoded_seg =
            header_val
                .strip_prefix("Basic ")
                .ok_or(AuthError::WrongAuthSchema {
                    schema: "Basic".to_string(),
                })?;
        let decoded_creds = b64_decode_to_string(b64_encoded_seg.trim())?;
        let Some((uname, pass)) = decoded_creds.split_once(':') else {
            return Err(AuthError::MissingColon);
        };
        if uname.graphemes(true).count() > MAX_FIELD_GRAPHEMES {
            return Err(AuthError::UsernameTooLong);
        }
        if pass.graphemes(true).count() > MAX_FIELD_GRAPHEMES {
            return Err(AuthError::PasswordTooLong);
        }

        Ok(Credentials::new(uname.into(), pass.to_string().into()))
    }

    /// Try to authenticate against the configured administrator.
    pub async fn authenticate(self, admin: &AdminConfig) -> Result<()> {
        let Some(admin_hash) = &admin.password_hash else {
            return Err(AuthError::AdminLocked);
        };

        let known_user = self.username == admin.username;
        let hash = if known_user {
            admin_hash.clone()
        } else {
            SecretString::from(DUMMY_HASH)
        };
        password::validate_async(self.password, hash).await?;
        // Only reachable if the password happened to match the dummy hash.
        if !known_user {
            return Err(AuthError::UsernameNotFound {
                username: self.username,
            });
        }
        tracing::info!("Successful admin authentication!");

        Ok(())
    }
}
