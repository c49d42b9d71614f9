//! Transport adapters for the `HttpTransport` port.

pub mod reqwest;
pub mod scripted;
