//! Credential headers for the data API.

use std::fmt;

use reqwest::RequestBuilder;

const HEADER_KEY_ID: &str = "APCA-API-KEY-ID";
const HEADER_SECRET_KEY: &str = "APCA-API-SECRET-KEY";

/// How requests are authenticated.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Send no credentials.
    #[default]
    None,
    /// API key id and secret, sent as `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY`.
    KeyPair {
        key_id: String,
        secret_key: String,
    },
    /// OAuth access token, sent as `Authorization: Bearer`.
    OAuth(String),
}

impl Credentials {
    pub(crate) fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => req,
            Self::KeyPair { key_id, secret_key } => req
                .header(HEADER_KEY_ID, key_id)
                .header(HEADER_SECRET_KEY, secret_key),
            Self::OAuth(token) => req.bearer_auth(token),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::KeyPair { key_id, .. } => f
                .debug_struct("KeyPair")
                .field("key_id", key_id)
                .field("secret_key", &"***")
                .finish(),
            Self::OAuth(_) => f.write_str("OAuth(***)"),
        }
    }
}
