//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Period closeout configuration.
    #[serde(default)]
    pub closeout: CloseoutConfig,
    /// Elevated-credential token configuration.
    pub elevation: ElevationConfig,
}

/// Period closeout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseoutConfig {
    /// Calendar months after closure before a period locks permanently.
    #[serde(default = "default_lock_after_months")]
    pub lock_after_months: u32,
    /// Days past period end before closing counts as late filing.
    #[serde(default = "default_legal_deadline_days")]
    pub legal_deadline_days: i64,
}

impl Default for CloseoutConfig {
    fn default() -> Self {
        Self {
            lock_after_months: default_lock_after_months(),
            legal_deadline_days: default_legal_deadline_days(),
        }
    }
}

fn default_lock_after_months() -> u32 {
    3
}

fn default_legal_deadline_days() -> i64 {
    10
}

/// Elevated-credential token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ElevationConfig {
    /// Secret key for signing and verifying elevation tokens.
    pub secret: String,
    /// Elevation token expiration in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    900 // 15 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CLAUSURA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
