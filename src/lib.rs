//! Client SDK for the M-Pesa OpenAPI payment gateway.
//!
//! ```rust,no_run
//! use pesa::{Environment, Pesa, PesaConfig};
//! use serde_json::json;
//!
//! # async fn run() -> pesa::Result<()> {
//! let config = PesaConfig::new("api-key", "-----BEGIN PUBLIC KEY-----\n...")
//!     .with_env(Environment::Sandbox);
//! let pesa = Pesa::new(config)?;
//!
//! let session = pesa.get_session().await?.session_id()?;
//! let result = pesa
//!     .c2b(
//!         &json!({
//!             "input_Amount": "10",
//!             "input_CustomerMSISDN": "000000000001",
//!             "input_Country": "TZN",
//!             "input_Currency": "TZS",
//!             "input_ServiceProviderCode": "000000",
//!             "input_TransactionReference": "T12344C",
//!             "input_ThirdPartyConversationID": "1e9b774d1da34af78412a498cbc28f5e",
//!             "input_PurchasedItemsDesc": "Test Item"
//!         }),
//!         &session,
//!     )
//!     .await?;
//! println!("{:?}", result.conversation_id);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod observability;

pub use application::client::Pesa;
pub use config::{ClientOptions, PesaConfig};
pub use domain::environment::{Environment, Market};
pub use domain::field::FieldValue;
pub use domain::session::{SessionId, SessionResponse};
pub use domain::transaction::{TransactionKind, TransactionResponse};
pub use error::{PesaError, Result, TransportError};
