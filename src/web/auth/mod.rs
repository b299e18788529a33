//! HTTP Basic authentication of the administrator configured in `AdminConfig`.

mod credentials;
mod error;
pub mod password;

pub use credentials::Credentials;
pub use error::{AuthError, Result};
