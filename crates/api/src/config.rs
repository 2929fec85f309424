//! Configuration loaded from environment variables.
//!
//! Both structs are built through a lookup function so tests can supply
//! values without touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use healthwatch_core::access::AccessPolicy;
use healthwatch_core::rate_limit::DEFAULT_COMMAND_COOLDOWN_SECS;
use healthwatch_core::types::DbId;
use healthwatch_monitor::{ScheduleError, SchedulerConfig};

/// A configuration value that is missing or malformed. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Parse `var` if present, else use `default`.
fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Non-empty value of `var`, if any.
fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite connection URL, e.g. `sqlite://healthwatch.db`.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `1101`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `DATABASE_URL`         | required                   |
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `1101`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            non_empty(&lookup, "DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = non_empty(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 1101)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            database_url,
            host,
            port,
            cors_origins,
            request_timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// MonitorConfig
// ---------------------------------------------------------------------------

/// Monitoring, access control and alert delivery settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
    pub probe_concurrency: usize,
    pub stale_after: Duration,
    pub command_cooldown: Duration,
    /// Owners allowed to manage targets; empty admits everyone.
    pub allowed_owner_ids: Vec<DbId>,
    pub telegram_bot_token: Option<String>,
    /// Operator chat for GPU and host alerts.
    pub alert_chat_id: Option<DbId>,
    pub alert_webhook_url: Option<String>,
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `PROBE_INTERVAL_SECS`   | `30`    |
    /// | `PROBE_TIMEOUT_SECS`    | `5`     |
    /// | `PROBE_CONCURRENCY`     | `32`    |
    /// | `STALE_AFTER_SECS`      | `300`   |
    /// | `COMMAND_COOLDOWN_SECS` | `60`    |
    /// | `ALLOWED_OWNER_IDS`     | empty   |
    /// | `TELEGRAM_BOT_TOKEN`    | unset   |
    /// | `ALERT_CHAT_ID`         | unset   |
    /// | `ALERT_WEBHOOK_URL`     | unset   |
    ///
    /// The probe timeout must be shorter than the probe interval.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let probe_interval_secs: u64 = parse_or(&lookup, "PROBE_INTERVAL_SECS", 30)?;
        let probe_timeout_secs: u64 = parse_or(&lookup, "PROBE_TIMEOUT_SECS", 5)?;
        let probe_concurrency: usize = parse_or(&lookup, "PROBE_CONCURRENCY", 32)?;
        let stale_after_secs: u64 = parse_or(&lookup, "STALE_AFTER_SECS", 300)?;
        let command_cooldown_secs: u64 = parse_or(
            &lookup,
            "COMMAND_COOLDOWN_SECS",
            DEFAULT_COMMAND_COOLDOWN_SECS,
        )?;

        let allowed_owner_ids = lookup("ALLOWED_OWNER_IDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<DbId>().map_err(|e| ConfigError::Invalid {
                    var: "ALLOWED_OWNER_IDS",
                    value: s.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let alert_chat_id = match non_empty(&lookup, "ALERT_CHAT_ID") {
            None => None,
            Some(raw) => Some(raw.parse::<DbId>().map_err(|e| ConfigError::Invalid {
                var: "ALERT_CHAT_ID",
                value: raw.clone(),
                reason: e.to_string(),
            })?),
        };

        let config = Self {
            probe_interval: Duration::from_secs(probe_interval_secs),
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            probe_concurrency,
            stale_after: Duration::from_secs(stale_after_secs),
            command_cooldown: Duration::from_secs(command_cooldown_secs),
            allowed_owner_ids,
            telegram_bot_token: non_empty(&lookup, "TELEGRAM_BOT_TOKEN"),
            alert_chat_id,
            alert_webhook_url: non_empty(&lookup, "ALERT_WEBHOOK_URL"),
        };
        config.scheduler_config().validate()?;
        Ok(config)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.probe_interval,
            probe_timeout: self.probe_timeout,
            concurrency: self.probe_concurrency,
            stale_after: self.stale_after_chrono(),
        }
    }

    pub fn stale_after_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.stale_after).unwrap_or(chrono::Duration::MAX)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.allowed_owner_ids.iter().copied())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            probe_interval: scheduler.interval,
            probe_timeout: scheduler.probe_timeout,
            probe_concurrency: scheduler.concurrency,
            stale_after: Duration::from_secs(300),
            command_cooldown: Duration::from_secs(DEFAULT_COMMAND_COOLDOWN_SECS),
            allowed_owner_ids: Vec::new(),
            telegram_bot_token: None,
            alert_chat_id: None,
            alert_webhook_url: None,
        }
    }
}
