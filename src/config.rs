//! Service configuration, read from the environment (and `.env` via dotenvy).

use std::str::FromStr;

use crate::{Result, StorefrontError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upper bound on items in one batch or cart request.
    pub max_batch_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8083, max_batch_items: 100 }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let max_batch_items = parse_or(&lookup, "MAX_BATCH_ITEMS", defaults.max_batch_items)?;
        if max_batch_items == 0 {
            return Err(StorefrontError::Config("MAX_BATCH_ITEMS must be positive".to_string()));
        }
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            max_batch_items,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StorefrontError::Config(format!("{} is not valid: {:?}", key, raw))),
    }
}
