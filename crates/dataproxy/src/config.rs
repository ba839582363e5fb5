//! Proxy configuration.
//!
//! Values resolve in order: environment variable if set, then the
//! built-in default.

use std::fmt;
use std::str::FromStr;

use dataproxy_core::ThresholdPolicy;

use crate::error::{ProxyError, Result};

pub const ENV_THRESHOLD: &str = "PRE_THRESHOLD";
pub const ENV_SHARES: &str = "PRE_SHARES";
pub const ENV_TOKEN_BURN_REQUIRED: &str = "TOKEN_BURN_REQUIRED";
pub const ENV_TOKEN_CONTRACT_ADDRESS: &str = "TOKEN_CONTRACT_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    ///
    /// `tracing` has no level above error, so `Critical` maps to error.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(ProxyError::Config(format!("unknown log level: {}", other))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Configuration for the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Minimum number of key fragments needed to decrypt.
    pub threshold: u16,
    /// Number of key fragments issued per delegation.
    pub shares: u16,
    /// Whether the token gate must authorize every consumption.
    pub token_burn_required: bool,
    /// Contract the token gate checks against. Empty when unused.
    pub token_contract_address: String,
    /// Log verbosity.
    pub log_level: LogLevel,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            threshold: 2,
            shares: 3,
            token_burn_required: false,
            token_contract_address: String::new(),
            log_level: LogLevel::Info,
        }
    }
}

impl ProxyConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.merge_with_env()?;
        Ok(config)
    }

    /// Override fields from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup.
    pub fn merge_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_THRESHOLD) {
            self.threshold = parse_count(ENV_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENV_SHARES) {
            self.shares = parse_count(ENV_SHARES, &v)?;
        }
        if let Some(v) = lookup(ENV_TOKEN_BURN_REQUIRED) {
            self.token_burn_required = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup(ENV_TOKEN_CONTRACT_ADDRESS) {
            self.token_contract_address = v;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v.parse()?;
        }
        Ok(())
    }

    /// Check that the threshold policy is well formed.
    pub fn validate(&self) -> Result<()> {
        self.policy().map(|_| ())
    }

    /// The threshold policy new delegations are issued under.
    pub fn policy(&self) -> Result<ThresholdPolicy> {
        Ok(ThresholdPolicy::new(self.threshold, self.shares)?)
    }
}

fn parse_count(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| ProxyError::Config(format!("{}: {}", key, e)))
}
