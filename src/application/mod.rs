//! Application layer: the gateway client.
//!
//! `Pesa` resolves the base URL at construction, obtains sessions from the
//! encrypted API key, and dispatches transactions under a caller-supplied
//! session. All network access goes through the `HttpTransport` port.

pub mod client;
