use crate::application::client::Pesa;
use crate::config::PesaConfig;
use crate::domain::environment::{Environment, Market};
use crate::domain::session::SessionId;
use crate::domain::transaction::TransactionKind;
use crate::error::{PesaError, Result};
use clap::{ArgAction, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "M-Pesa OpenAPI client", long_about = None)]
pub struct Cli {
    /// TOML configuration file. Flags and environment variables override its values.
    #[arg(long, short, env = "PESA_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PESA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gateway public key, PEM or bare base64.
    #[arg(long, env = "PESA_PUBLIC_KEY", hide_env_values = true)]
    pub public_key: Option<String>,

    /// File holding the gateway public key. Ignored when --public-key is set.
    #[arg(long, env = "PESA_PUBLIC_KEY_FILE")]
    pub public_key_file: Option<PathBuf>,

    /// sandbox or production
    #[arg(long, env = "PESA_ENV")]
    pub env: Option<Environment>,

    /// Market path segment, e.g. vodacomTZN
    #[arg(long, env = "PESA_MARKET")]
    pub market: Option<Market>,

    /// Overrides the base URL derived from env and market.
    #[arg(long, env = "PESA_BASE_URL")]
    pub base_url: Option<Url>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Obtain a session and print the gateway's reply.
    Session,
    /// Run one transaction and print the gateway's reply.
    Transact {
        /// c2b, b2b, b2c, reverse, query, debit-create or debit-payment
        kind: TransactionKind,
        /// JSON file with the gateway fields, or - for stdin.
        payload: PathBuf,
        /// Session to use. A new one is requested when omitted.
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the base URL, or the endpoint URL of a transaction kind. No network access.
    Endpoint { kind: Option<TransactionKind> },
}

impl Cli {
    /// Layers flags and environment over the optional config file.
    pub fn load_config(&self) -> Result<PesaConfig> {
        let mut config = match &self.config {
            Some(path) => PesaConfig::from_toml_file(path)?,
            None => PesaConfig::default(),
        };

        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(public_key) = &self.public_key {
            config.public_key = public_key.clone();
        } else if let Some(path) = &self.public_key_file {
            config.public_key = read_text(path)?;
        }
        if let Some(env) = self.env {
            config.env = env;
        }
        if let Some(market) = self.market {
            config.market = market;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }

        Ok(config)
    }
}

pub async fn run(cli: Cli) -> miette::Result<()> {
    let config = cli.load_config().into_diagnostic()?;

    match cli.command {
        Command::Endpoint { kind } => {
            let base = config.resolved_base_url().into_diagnostic()?;
            let url = match kind {
                Some(kind) => base.join(kind.path()).into_diagnostic()?,
                None => base,
            };
            println!("{url}");
        }
        Command::Session => {
            let pesa = Pesa::new(config).into_diagnostic()?;
            let response = pesa.get_session().await.into_diagnostic()?;
            print_json(&response)?;
        }
        Command::Transact {
            kind,
            payload,
            session,
        } => {
            let pesa = Pesa::new(config).into_diagnostic()?;
            let payload = read_payload(&payload).into_diagnostic()?;
            let session = match session {
                Some(raw) => parse_session(&raw),
                None => pesa
                    .get_session()
                    .await
                    .and_then(|response| response.session_id())
                    .into_diagnostic()?,
            };
            let response = pesa
                .transact(kind, &payload, &session)
                .await
                .into_diagnostic()?;
            print_json(&response)?;
        }
    }

    Ok(())
}

/// Numeric sessions stay numbers, as the gateway issued them.
pub fn parse_session(raw: &str) -> SessionId {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return SessionId::from(n);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return SessionId::Number(n.into());
    }
    SessionId::from(raw)
}

fn read_payload(path: &Path) -> Result<Value> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| PesaError::InvalidRequest(format!("cannot read stdin: {e}")))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            PesaError::InvalidRequest(format!("cannot read {}: {e}", path.display()))
        })?
    };
    serde_json::from_str(&content)
        .map_err(|e| PesaError::InvalidRequest(format!("payload is not valid JSON: {e}")))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| PesaError::Configuration(format!("cannot read {}: {e}", path.display())))
}

fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_keeps_numbers() {
        assert_eq!(parse_session("1"), SessionId::from(1));
        assert_eq!(
            parse_session("18446744073709551615"),
            SessionId::Number(u64::MAX.into())
        );
        assert_eq!(parse_session("abc123"), SessionId::from("abc123"));
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"api_key = \"from-file\"\npublic_key = \"P\"\nenv = \"production\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "pesa",
            "--config",
            file.path().to_str().unwrap(),
            "--api-key",
            "from-flag",
            "--env",
            "sandbox",
            "endpoint",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();

        assert_eq!(config.api_key, "from-flag");
        assert_eq!(config.public_key, "P");
        assert_eq!(config.env, Environment::Sandbox);
    }

    #[test]
    fn test_transact_kind_parses() {
        let cli = Cli::try_parse_from(["pesa", "transact", "debit-create", "payload.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Transact {
                kind: TransactionKind::DebitCreate,
                ..
            }
        ));
    }
}
