// src/check/error.rs
use reqwest::StatusCode;

/// Everything that can make a probe fail.
///
/// All variants end in the same terminal `failed` state; the variant only
/// matters for logging and for the login rejection message, which is the one
/// error shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not parse configuration from {url}: {source}")]
    ConfigSyntax {
        url: String,
        #[source]
        source: json5::Error,
    },

    #[error("Response from {url} is missing `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("Invalid country configuration: {0}")]
    InvalidConfig(String),

    #[error("No locations found")]
    NoLocations,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CheckError {
    /// Message meant for the dashboard rather than the log.
    ///
    /// Only the auth service's own rejection is worth showing; anything else
    /// is replaced by the check's remediation hint.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            CheckError::Unauthorized(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
