use crate::error::PesaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const GATEWAY_HOST: &str = "https://openapi.m-pesa.com";

/// Gateway deployment the client talks to.
///
/// Deserializes through [`FromStr`], so config files accept the same
/// spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Environment {
    Sandbox,
    #[default]
    Production,
}

impl Environment {
    /// Path segment the gateway uses for this environment.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "openapi",
        }
    }
}

impl FromStr for Environment {
    type Err = PesaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" | "openapi" | "live" => Ok(Environment::Production),
            other => Err(PesaError::Configuration(format!(
                "unknown environment '{other}', expected 'sandbox' or 'production'"
            ))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = PesaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Country deployment of the gateway, the last segment of the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Market {
    #[default]
    #[serde(rename = "vodacomTZN")]
    VodacomTanzania,
    #[serde(rename = "vodafoneGHA")]
    VodafoneGhana,
    #[serde(rename = "vodacomLES")]
    VodacomLesotho,
    #[serde(rename = "vodacomDRC")]
    VodacomDrc,
    #[serde(rename = "vodacomMOZ")]
    VodacomMozambique,
}

impl Market {
    pub const ALL: [Market; 5] = [
        Market::VodacomTanzania,
        Market::VodafoneGhana,
        Market::VodacomLesotho,
        Market::VodacomDrc,
        Market::VodacomMozambique,
    ];

    pub fn path_segment(&self) -> &'static str {
        match self {
            Market::VodacomTanzania => "vodacomTZN",
            Market::VodafoneGhana => "vodafoneGHA",
            Market::VodacomLesotho => "vodacomLES",
            Market::VodacomDrc => "vodacomDRC",
            Market::VodacomMozambique => "vodacomMOZ",
        }
    }

    /// Value the gateway expects in `input_Country`.
    pub fn country(&self) -> &'static str {
        match self {
            Market::VodacomTanzania => "TZN",
            Market::VodafoneGhana => "GHA",
            Market::VodacomLesotho => "LES",
            Market::VodacomDrc => "DRC",
            Market::VodacomMozambique => "MOZ",
        }
    }

    /// Value the gateway expects in `input_Currency`.
    pub fn currency(&self) -> &'static str {
        match self {
            Market::VodacomTanzania => "TZS",
            Market::VodafoneGhana => "GHS",
            Market::VodacomLesotho => "LSL",
            Market::VodacomDrc => "USD",
            Market::VodacomMozambique => "MZN",
        }
    }
}

impl FromStr for Market {
    type Err = PesaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Market::ALL
            .into_iter()
            .find(|m| {
                m.path_segment().eq_ignore_ascii_case(wanted) || m.country().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| PesaError::Configuration(format!("unknown market '{wanted}'")))
    }
}

impl TryFrom<String> for Market {
    type Error = PesaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Resolves the gateway base URL for an environment and market.
///
/// The result always ends with `/` so endpoint suffixes can be joined onto it.
pub fn resolve_base_url(env: Environment, market: Market) -> Result<Url, PesaError> {
    let raw = format!(
        "{GATEWAY_HOST}/{}/ipg/v2/{}/",
        env.path_segment(),
        market.path_segment()
    );
    Url::parse(&raw).map_err(|e| PesaError::Configuration(format!("invalid base url {raw}: {e}")))
}

/// Ensures a caller-supplied base URL ends with a slash.
pub fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
