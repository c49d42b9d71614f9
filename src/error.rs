use crate::domain::transaction::TransactionResponse;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PesaError>;

/// Failure to obtain any HTTP response from the gateway.
///
/// Covers connection, DNS, TLS and timeout errors raised by the transport.
#[derive(Error, Debug)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug)]
pub enum PesaError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Gateway returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("Could not decode gateway response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Session response did not contain output_SessionID")]
    MissingSession,
}

impl PesaError {
    /// HTTP status attached to the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            PesaError::Gateway { status, .. } | PesaError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best-effort parse of a gateway error body into the standard response fields.
    pub fn gateway_response(&self) -> Option<TransactionResponse> {
        match self {
            PesaError::Gateway { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}
