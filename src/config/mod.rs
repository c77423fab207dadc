//! Configuration management for Folio Core
//!
//! Settings are layered: built-in defaults, then `FOLIO_*` environment
//! variables (`FOLIO_APP__PORT=8080` sets `app.port`). The typed [`Config`]
//! is deserialized once; feature builders and manifest factories read
//! individual keys through [`Configure::get`].

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listener
    pub app: AppConfig,
    /// REST surface
    pub api: ApiConfig,
    /// JWT verification
    pub jwt: JwtConfig,
    /// Content feature options
    pub content: ContentConfig,
    /// Search index options
    pub search: SearchConfig,
    /// Logging and metrics
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Whether the restful feature is registered at all
    pub enabled: bool,
    /// Path prefix for every derived route, e.g. `/api`
    pub prefix: String,
    /// Serve the generated OpenAPI document
    pub docs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

/// Which post body formats the public post endpoints accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostTypeOption {
    Markdown,
    Html,
    All,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    pub post_type: PostTypeOption,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// `text` or `json`
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Config {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

/// Keyed view over the layered settings plus the typed [`Config`].
#[derive(Debug, Clone)]
pub struct Configure {
    settings: config::Config,
    typed: Arc<Config>,
}

impl Configure {
    /// Load defaults and `FOLIO_*` environment variables.
    pub fn load() -> Result<Self> {
        let builder = defaults()?.add_source(
            config::Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        Self::from_builder(builder)
    }

    /// Defaults with explicit overrides, no environment. Used by tests and tooling.
    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<config::Value>,
    {
        let mut builder = defaults()?;
        for (key, value) in overrides {
            builder = builder
                .set_override(key.as_ref(), value)
                .with_context(|| format!("Invalid override for {}", key.as_ref()))?;
        }
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder.build().context("Failed to build configuration")?;
        let typed: Config = settings
            .clone()
            .try_deserialize()
            .context("Invalid configuration (is FOLIO_JWT__SECRET set?)")?;
        Ok(Self {
            settings,
            typed: Arc::new(typed),
        })
    }

    /// Typed configuration
    pub fn config(&self) -> &Config {
        &self.typed
    }

    /// Read `key`, falling back to `default` when it is absent or malformed.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.settings.get::<T>(key) {
            Ok(value) => value,
            Err(config::ConfigError::NotFound(_)) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed configuration value");
                default
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.settings.get::<config::Value>(key).is_ok()
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("app.host", "127.0.0.1")?
        .set_default("app.port", 3100_i64)?
        .set_default("api.enabled", true)?
        .set_default("api.prefix", "/api")?
        .set_default("api.docs", true)?
        .set_default("jwt.issuer", "folio")?
        .set_default("jwt.access_token_ttl_secs", 3600_i64)?
        .set_default("content.post_type", "all")?
        .set_default("search.enabled", false)?
        .set_default("telemetry.log_format", "text")?
        .set_default("telemetry.metrics_enabled", false)?)
}
