use crate::domain::field::{FieldValue, take_field};
use crate::error::{PesaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Opaque session identifier issued by the gateway.
///
/// The gateway may send a number or a string; whichever it sent is kept,
/// including numbers outside the `i64` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    Number(Number),
    Text(String),
}

impl SessionId {
    pub fn is_empty(&self) -> bool {
        match self {
            SessionId::Number(_) => false,
            SessionId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionId::Number(n) => write!(f, "{n}"),
            SessionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SessionId {
    fn from(value: i64) -> Self {
        SessionId::Number(value.into())
    }
}

impl From<Number> for SessionId {
    fn from(value: Number) -> Self {
        SessionId::Number(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId::Text(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId::Text(value)
    }
}

/// Body of a `getSession/` reply.
///
/// A documented field that is null or of an unexpected shape stays in `extra`
/// under its wire name, so the record always serializes back to what was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct SessionResponse {
    #[serde(rename = "output_ResponseCode", skip_serializing_if = "Option::is_none")]
    pub response_code: Option<FieldValue>,
    #[serde(rename = "output_ResponseDesc", skip_serializing_if = "Option::is_none")]
    pub response_desc: Option<FieldValue>,
    #[serde(rename = "output_SessionID", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Fields outside the documented contract, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for SessionResponse {
    fn from(mut fields: Map<String, Value>) -> Self {
        SessionResponse {
            response_code: take_field(&mut fields, "output_ResponseCode"),
            response_desc: take_field(&mut fields, "output_ResponseDesc"),
            session_id: take_field(&mut fields, "output_SessionID"),
            extra: fields,
        }
    }
}

impl SessionResponse {
    /// The issued session, or `MissingSession` when the gateway sent none.
    pub fn session_id(&self) -> Result<SessionId> {
        self.session_id.clone().ok_or(PesaError::MissingSession)
    }

    /// Text form of `output_ResponseCode`.
    pub fn code(&self) -> Option<&str> {
        self.response_code.as_ref().and_then(FieldValue::as_str)
    }

    /// True for an empty-bodied reply.
    pub fn is_empty(&self) -> bool {
        self.response_code.is_none()
            && self.response_desc.is_none()
            && self.session_id.is_none()
            && self.extra.is_empty()
    }
}
