use base64::{engine::general_purpose::STANDARD, Engine};

// ###################################
// ->   Base64 utils
// ###################################
pub fn b64_encode(v: impl AsRef<[u8]>) -> String {
    STANDARD.encode(v)
}

pub fn b64_decode(v: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(v)
        .map_err(|er| UtilsError::B64Decode(er.to_string()))
}

pub fn b64_decode_to_string(v: &str) -> Result<String> {
    String::from_utf8(b64_decode(v)?).map_err(|er| UtilsError::B64Decode(er.to_string()))
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, UtilsError>;

#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    #[error("base64 decoding error: {0}")]
    B64Decode(String),
}
