use crate::domain::environment::{Environment, Market, normalize_base_url, resolve_base_url};
use crate::error::{PesaError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use url::Url;

/// Settings handed to the HTTP client. All optional.
///
/// Unknown keys are rejected so a misspelt option fails loudly instead of
/// being ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientOptions {
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Proxy URL used for every request, e.g. `http://proxy.internal:3128`.
    pub proxy: Option<String>,
    /// Skips TLS certificate verification. For test gateways only.
    pub danger_accept_invalid_certs: Option<bool>,
}

/// Client configuration. Validated when a client is built from it.
#[derive(Clone, Default, Deserialize)]
pub struct PesaConfig {
    #[serde(default)]
    pub api_key: String,
    /// PEM, or the bare base64 key body from the developer portal.
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub client_options: ClientOptions,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub market: Market,
    /// Replaces the URL derived from `env` and `market`.
    #[serde(default)]
    pub base_url: Option<Url>,
}

impl PesaConfig {
    pub fn new(api_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            public_key: public_key.into(),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn with_market(mut self, market: Market) -> Self {
        self.market = market;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_client_options(mut self, options: ClientOptions) -> Self {
        self.client_options = options;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PesaError::Configuration(format!("invalid configuration: {e}")))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PesaError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks the required fields. Runs before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(PesaError::Configuration("api_key is required".to_string()));
        }
        if self.public_key.trim().is_empty() {
            return Err(PesaError::Configuration(
                "public_key is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL every endpoint is joined onto; always ends with `/`.
    pub fn resolved_base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(normalize_base_url(url.clone())),
            None => resolve_base_url(self.env, self.market),
        }
    }
}

impl fmt::Debug for PesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PesaConfig")
            .field("api_key", &"<redacted>")
            .field("public_key", &format!("<{} bytes>", self.public_key.len()))
            .field("client_options", &self.client_options)
            .field("env", &self.env)
            .field("market", &self.market)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        let config = PesaConfig::new("", "-----BEGIN PUBLIC KEY-----");
        assert!(matches!(
            config.validate(),
            Err(PesaError::Configuration(msg)) if msg.contains("api_key")
        ));
    }

    #[test]
    fn test_missing_public_key() {
        let config = PesaConfig::new("K", "  ");
        assert!(matches!(
            config.validate(),
            Err(PesaError::Configuration(msg)) if msg.contains("public_key")
        ));
    }

    #[test]
    fn test_from_toml() {
        let config = PesaConfig::from_toml_str(
            r#"
            api_key = "K"
            public_key = "MIIB"
            env = "sandbox"
            market = "vodacomLES"

            [client_options]
            timeout_secs = 30
            headers = { "X-Trace" = "abc" }
            "#,
        )
        .unwrap();

        assert_eq!(config.env, Environment::Sandbox);
        assert_eq!(config.market, Market::VodacomLesotho);
        assert_eq!(config.client_options.timeout_secs, Some(30));
        assert_eq!(config.client_options.headers["X-Trace"], "abc");
        assert_eq!(
            config.resolved_base_url().unwrap().as_str(),
            "https://openapi.m-pesa.com/sandbox/ipg/v2/vodacomLES/"
        );
    }

    #[test]
    fn test_toml_defaults_to_production() {
        let config = PesaConfig::from_toml_str("api_key = \"K\"\npublic_key = \"P\"").unwrap();
        assert_eq!(config.env, Environment::Production);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_env_and_market_ignore_case() {
        let config =
            PesaConfig::from_toml_str("env = \"Sandbox\"\nmarket = \"VODACOMMOZ\"").unwrap();
        assert_eq!(config.env, Environment::Sandbox);
        assert_eq!(config.market, Market::VodacomMozambique);
    }

    #[test]
    fn test_toml_client_options_pass_through() {
        let config = PesaConfig::from_toml_str(
            r#"
            [client_options]
            proxy = "http://proxy.internal:3128"
            danger_accept_invalid_certs = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.client_options.proxy.as_deref(),
            Some("http://proxy.internal:3128")
        );
        assert_eq!(config.client_options.danger_accept_invalid_certs, Some(true));
        assert!(PesaConfig::from_toml_str("[client_options]\nproxi = \"x\"").is_err());
    }

    #[test]
    fn test_toml_rejects_unknown_env() {
        assert!(matches!(
            PesaConfig::from_toml_str("env = \"staging\""),
            Err(PesaError::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_override_wins() {
        let config = PesaConfig::new("K", "P")
            .with_env(Environment::Sandbox)
            .with_base_url(Url::parse("http://127.0.0.1:9000/ipg").unwrap());
        assert_eq!(
            config.resolved_base_url().unwrap().as_str(),
            "http://127.0.0.1:9000/ipg/"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = PesaConfig::new("super-secret", "P");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
