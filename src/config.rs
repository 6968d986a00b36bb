// src/config.rs
use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1/";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub bind_addr: SocketAddr,
    pub upstream_timeout: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("bind_addr", &self.bind_addr)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GROQ_API_KEY").ok_or(ConfigError::Missing("GROQ_API_KEY"))?;
        let api_base = get("GROQ_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid { name: "BIND_ADDR", reason: e.to_string() })?;

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid { name: "UPSTREAM_TIMEOUT_SECS", reason: e.to_string() }
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self { api_key, api_base, bind_addr, upstream_timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GROQ_API_KEY")));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[("GROQ_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert!(cfg.upstream_timeout.is_none());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GROQ_API_KEY", "k"),
            ("UPSTREAM_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "UPSTREAM_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn debug_hides_api_key() {
        let cfg = Config::from_lookup(lookup(&[("GROQ_API_KEY", "very-secret")])).unwrap();
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
