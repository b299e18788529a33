//! Request and response bodies of the `web` module and the validated `ValidEmail`,
//! with their parsing implementations and tests for those.

use lazy_regex::regex_is_match;
use serde::Serialize;
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

// ###################################
// ->   STRUCTS
// ###################################
/// Subscription request.
/// `email` can be missing, `null` or invalid, validation happens in the service.
#[derive(Debug, Default)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

impl SubscribeRequest {
    /// Bodies that aren't declared as JSON are not parsed and count as a request without an email.
    pub fn from_content(content_type: Option<&str>, body: &[u8]) -> Result<Self, DataParsingError> {
        let is_json = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|essence| essence.trim().to_ascii_lowercase())
            .is_some_and(|essence| essence == "application/json" || essence.ends_with("+json"));

        if !is_json {
            return Ok(Self::default());
        }
        Self::from_body(body)
    }

    /// An empty body, or a JSON value that isn't an object, counts as a request without an email.
    pub fn from_body(body: &[u8]) -> Result<Self, DataParsingError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|er| DataParsingError::BodyMalformed(er.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Ok(Self::default());
        };

        match fields.remove("email") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(email)) => Ok(Self { email: Some(email) }),
            Some(other) => Err(DataParsingError::BodyMalformed(format!(
                "email must be a string, got: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub timestamp: String,
}

/// Validated Subscriber Email, kept exactly as it was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub const MAX_LENGTH: usize = 254;

    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > Self::MAX_LENGTH {
            return Err(DataParsingError::EmailTooLong);
        }

        if !value.validate_email() {
            return Err(DataParsingError::EmailInvalid);
        }

        // `validate_email` accepts single label domains and IP literals.
        let Some((_, domain)) = value.rsplit_once('@') else {
            return Err(DataParsingError::EmailInvalid);
        };
        if domain.starts_with('[') {
            return Err(DataParsingError::EmailDomainNotQualified);
        }
        match domain.rsplit_once('.') {
            Some((_, tld)) if is_valid_tld(tld) => Ok(ValidEmail(value.to_owned())),
            _ => Err(DataParsingError::EmailDomainNotQualified),
        }
    }
}

fn is_valid_tld(tld: &str) -> bool {
    regex_is_match!(r"^(?:[a-zA-Z\x{00a1}-\x{ffff}]{2,}|xn--[a-zA-Z0-9-]{2,})$", tld)
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email invalid")]
    EmailInvalid,
    #[error("email too long")]
    EmailTooLong,
    #[error("email domain is not a fully qualified domain name")]
    EmailDomainNotQualified,

    #[error("malformed request body: {0}")]
    BodyMalformed(String),
}
