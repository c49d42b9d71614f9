//! Gateway vocabulary: environments and markets, sessions, transaction kinds
//! and their payloads, the credential helper, and the transport port.

pub mod credentials;
pub mod environment;
pub mod field;
pub mod ports;
pub mod session;
pub mod transaction;
