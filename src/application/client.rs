use crate::config::PesaConfig;
use crate::domain::credentials::{encrypt_credential, parse_public_key};
use crate::domain::environment::Market;
use crate::domain::field::FieldValue;
use crate::domain::ports::{GatewayRequest, HttpMethod, TransportBox};
use crate::domain::session::{SessionId, SessionResponse};
use crate::domain::transaction::{SESSION_PATH, TransactionKind, TransactionResponse};
use crate::error::{PesaError, Result};
use crate::infrastructure::reqwest::ReqwestTransport;
use rsa::RsaPublicKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

/// Client for the M-Pesa OpenAPI gateway.
///
/// `Pesa` obtains sessions and dispatches the seven transaction kinds. It keeps
/// no state between calls: every session call re-encrypts the API key, and
/// every transaction call re-encrypts the session identifier it is given.
pub struct Pesa {
    config: PesaConfig,
    public_key: RsaPublicKey,
    base_url: Url,
    transport: TransportBox,
}

impl Pesa {
    /// Creates a client backed by the default HTTP transport.
    ///
    /// Fails with `PesaError::Configuration` before any network activity when
    /// `api_key` or `public_key` is missing or the key cannot be parsed.
    pub fn new(config: PesaConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.client_options)?;
        Self::with_transport(config, Box::new(transport))
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(config: PesaConfig, transport: TransportBox) -> Result<Self> {
        config.validate()?;
        let public_key = parse_public_key(&config.public_key)?;
        let base_url = config.resolved_base_url()?;

        tracing::debug!(env = %config.env, market = %config.market, base_url = %base_url, "Pesa client ready");

        Ok(Self {
            config,
            public_key,
            base_url,
            transport,
        })
    }

    /// Configuration the client was built from.
    pub fn config(&self) -> &PesaConfig {
        &self.config
    }

    /// Resolved base URL, ending with `/`; endpoint paths are joined onto it.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Market the client targets, for filling `input_Country` and `input_Currency`.
    pub fn market(&self) -> Market {
        self.config.market
    }

    /// Full URL of a transaction endpoint.
    pub fn endpoint(&self, kind: TransactionKind) -> Result<Url> {
        self.join(kind.path())
    }

    /// Requests a new session by presenting the encrypted API key.
    pub async fn get_session(&self) -> Result<SessionResponse> {
        let token = encrypt_credential(&self.config.api_key, &self.public_key)?;
        let request = GatewayRequest {
            method: HttpMethod::Get,
            url: self.join(SESSION_PATH)?.to_string(),
            headers: vec![bearer(token)],
            query: Vec::new(),
            body: None,
        };

        let response: SessionResponse = self.dispatch("session", request).await?;
        tracing::debug!(
            response_code = %shown(response.response_code.as_ref()),
            "Session response received"
        );
        Ok(response)
    }

    /// Customer-to-business payment (`c2bPayment/singleStage/`, POST).
    pub async fn c2b<P>(&self, payload: &P, session: &SessionId) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::C2b, payload, session).await
    }

    /// Business-to-business payment (`b2bPayment/`, POST).
    pub async fn b2b<P>(&self, payload: &P, session: &SessionId) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::B2b, payload, session).await
    }

    /// Business-to-customer payment (`b2cPayment/`, POST).
    pub async fn b2c<P>(&self, payload: &P, session: &SessionId) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::B2c, payload, session).await
    }

    /// Reverses an earlier transaction (`reversal/`, PUT).
    pub async fn reverse<P>(&self, payload: &P, session: &SessionId) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::Reverse, payload, session).await
    }

    /// Transaction status lookup (`queryTransactionStatus/`, GET). The payload
    /// is sent as query parameters.
    pub async fn query<P>(&self, payload: &P, session: &SessionId) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::Query, payload, session).await
    }

    /// Creates a direct-debit mandate (`directDebitCreation/`, POST).
    pub async fn debit_create<P>(
        &self,
        payload: &P,
        session: &SessionId,
    ) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::DebitCreate, payload, session).await
    }

    /// Collects a payment against a direct-debit mandate (`directDebitPayment/`, POST).
    pub async fn debit_payment<P>(
        &self,
        payload: &P,
        session: &SessionId,
    ) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.transact(TransactionKind::DebitPayment, payload, session).await
    }

    /// Sends one transaction of `kind` under `session`.
    ///
    /// A 2xx reply is returned as parsed, whatever its `output_ResponseCode`.
    pub async fn transact<P>(
        &self,
        kind: TransactionKind,
        payload: &P,
        session: &SessionId,
    ) -> Result<TransactionResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        if session.is_empty() {
            return Err(PesaError::InvalidRequest(
                "session identifier is empty".to_string(),
            ));
        }
        let fields = match serde_json::to_value(payload) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(PesaError::InvalidRequest(
                    "payload must serialize to a JSON object".to_string(),
                ));
            }
            Err(e) => {
                return Err(PesaError::InvalidRequest(format!(
                    "payload could not be serialized: {e}"
                )));
            }
        };

        let token = encrypt_credential(&session.to_string(), &self.public_key)?;
        let method = kind.method();
        let (query, body) = match method {
            HttpMethod::Get => (query_pairs(&fields), None),
            HttpMethod::Post | HttpMethod::Put => (Vec::new(), Some(Value::Object(fields))),
        };
        let request = GatewayRequest {
            method,
            url: self.endpoint(kind)?.to_string(),
            headers: vec![bearer(token)],
            query,
            body,
        };

        let response: TransactionResponse = self.dispatch(kind.description(), request).await?;
        tracing::debug!(
            kind = %kind,
            response_code = %shown(response.response_code.as_ref()),
            conversation_id = %shown(response.conversation_id.as_ref()),
            "Transaction response received"
        );
        Ok(response)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PesaError::Configuration(format!("cannot build endpoint {path}: {e}")))
    }

    async fn dispatch<T>(&self, operation: &str, request: GatewayRequest) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        tracing::info!(operation, method = %request.method, url = %request.url, "Calling gateway");

        let reply = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(operation, error = %e, "Gateway unreachable");
            PesaError::from(e)
        })?;

        if !reply.is_success() {
            tracing::warn!(operation, status = reply.status, "Gateway rejected request");
            return Err(PesaError::Gateway {
                status: reply.status,
                body: reply.body,
            });
        }

        tracing::debug!(operation, status = reply.status, bytes = reply.body.len(), "Gateway replied");
        if reply.body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&reply.body).map_err(|source| PesaError::Decode {
            status: reply.status,
            source,
        })
    }
}

fn shown(field: Option<&FieldValue>) -> String {
    field.map_or_else(|| "-".to_string(), ToString::to_string)
}

fn bearer(token: String) -> (String, String) {
    ("Authorization".to_string(), format!("Bearer {token}"))
}

fn query_pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
