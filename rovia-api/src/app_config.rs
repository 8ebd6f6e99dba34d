use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Claim lifetime. Deliberately a named parameter, not a constant.
    pub claim_ttl_minutes: u64,
    pub invitation_validity_days: u64,
    #[serde(default = "default_sweep_seconds")]
    pub sweep_interval_seconds: u64,
    pub default_deposit_dollars: i32,
}

fn default_sweep_seconds() -> u64 {
    60
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            claim_ttl_minutes: 30,
            invitation_validity_days: 7,
            sweep_interval_seconds: 60,
            default_deposit_dollars: 250,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of ROVIA)
            .add_source(config::Environment::with_prefix("ROVIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
