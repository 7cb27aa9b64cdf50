//! Client configuration from the environment

use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// The history endpoint rejects page sizes outside 1..=100
const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Settings for talking to the query API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    /// Bearer token attached to every request
    pub auth_token: Option<String>,
    /// Page size for history listings
    pub history_limit: u32,
    /// Restrict asks to these document ids
    pub document_ids: Option<Vec<String>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_token: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            document_ids: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("DOCUCHAT_API_URL")
            .filter(|url| !url.trim().is_empty())
            .map_or(defaults.api_url, |url| url.trim_end_matches('/').to_string());

        let timeout = match lookup("DOCUCHAT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("DOCUCHAT_TIMEOUT_SECS", &raw)?),
            None => defaults.timeout,
        };

        let history_limit = match lookup("DOCUCHAT_HISTORY_LIMIT") {
            Some(raw) => {
                let limit = parse_positive("DOCUCHAT_HISTORY_LIMIT", &raw)?;
                u32::try_from(limit.min(u64::from(MAX_HISTORY_LIMIT))).unwrap_or(MAX_HISTORY_LIMIT)
            }
            None => defaults.history_limit,
        };

        Ok(Self {
            api_url,
            timeout,
            auth_token: lookup("DOCUCHAT_TOKEN").filter(|t| !t.is_empty()),
            history_limit,
            document_ids: lookup("DOCUCHAT_DOCUMENTS").and_then(|raw| parse_list(&raw)),
        })
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
}

/// Comma separated ids; `None` when nothing is left after trimming
fn parse_list(raw: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    (!ids.is_empty()).then_some(ids)
}
