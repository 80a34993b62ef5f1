use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmartPingError>;

#[derive(Debug, Error)]
pub enum SmartPingError {
    /// One of the three credentials is empty; no request was sent.
    #[error("SmartPing credentials missing: {0} is not configured")]
    MissingCredential(&'static str),

    #[error("Failed to reach SmartPing API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SmartPing API request {endpoint} failed with status {status}")]
    HttpStatus { endpoint: String, status: u16 },

    /// HTTP 200 carrying an error marker in the payload.
    #[error("SmartPing API returned an error for {endpoint}: {message}")]
    Remote { endpoint: String, message: String },

    #[error("SmartPing response from {endpoint} is missing {field}")]
    MissingField { endpoint: String, field: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SmartPingError {
    pub fn remote(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn missing_field(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            endpoint: endpoint.into(),
            field: field.into(),
        }
    }

    /// True when the failure happened before any network activity.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_) | Self::Config(_))
    }
}
