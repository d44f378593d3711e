//! Application configuration
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `NUTRILINK` prefix and
//! `__` between nested keys.
//!
//! ```no_run
//! use nutrilink::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod database;
mod engagement;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use engagement::EngagementConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub payment: PaymentConfig,

    #[serde(default)]
    pub engagement: EngagementConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// A `.env` file is read first when present (development).
    ///
    /// - `NUTRILINK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `NUTRILINK__DATABASE__URL=...` -> `database.url = ...`
    /// - `NUTRILINK__ENGAGEMENT__REASSIGNMENT=disabled` -> `engagement.reassignment`
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NUTRILINK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.engagement.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engagement::ReassignmentPolicy;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "NUTRILINK__DATABASE__URL",
        "NUTRILINK__PAYMENT__STRIPE_API_KEY",
        "NUTRILINK__PAYMENT__STRIPE_WEBHOOK_SECRET",
        "NUTRILINK__SERVER__PORT",
        "NUTRILINK__SERVER__ENVIRONMENT",
        "NUTRILINK__SERVER__LOG_FORMAT",
        "NUTRILINK__ENGAGEMENT__REASSIGNMENT",
        "NUTRILINK__ENGAGEMENT__CANCELLATION_WINDOW_DAYS",
        "NUTRILINK__ENGAGEMENT__SWEEP_ON_READ",
    ];

    fn set_minimal_env() {
        env::set_var("NUTRILINK__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("NUTRILINK__PAYMENT__STRIPE_API_KEY", "sk_test_xxx");
        env::set_var("NUTRILINK__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert!(config.payment.is_test_mode());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_apply() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.engagement.cancellation_window_days, 7);
        assert_eq!(
            config.engagement.reassignment,
            ReassignmentPolicy::RequireActiveContract
        );
    }

    #[test]
    fn test_overrides() {
        let config = load_with(&[
            ("NUTRILINK__SERVER__PORT", "3000"),
            ("NUTRILINK__SERVER__ENVIRONMENT", "production"),
            ("NUTRILINK__SERVER__LOG_FORMAT", "json"),
            ("NUTRILINK__ENGAGEMENT__REASSIGNMENT", "disabled"),
            ("NUTRILINK__ENGAGEMENT__CANCELLATION_WINDOW_DAYS", "14"),
            ("NUTRILINK__ENGAGEMENT__SWEEP_ON_READ", "false"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.engagement.reassignment, ReassignmentPolicy::Disabled);
        assert_eq!(config.engagement.cancellation_window_days, 14);
        assert!(!config.engagement.sweep_on_read);
    }
}
