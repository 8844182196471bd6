//! Configuration management for the proof generation service
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::keys::KeyStrategy;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API server host
    pub api_host: String,

    /// API server port
    pub api_port: u16,

    /// `generated` or `persisted`
    pub key_strategy: String,

    /// Proving key blob, read when the strategy is `persisted`
    pub proving_key_path: PathBuf,

    /// Verification key document, read when the strategy is `persisted`
    pub verification_key_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            api_host: var("PROVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            api_port: var("PROVER_PORT")
                .unwrap_or_else(|| "8888".to_string())
                .parse()
                .context("Invalid PROVER_PORT")?,

            key_strategy: var("KEY_STRATEGY")
                .unwrap_or_else(|| "generated".to_string())
                .to_lowercase(),

            proving_key_path: var("PROVING_KEY_PATH")
                .unwrap_or_else(|| "./keys/proving.key".to_string())
                .into(),

            verification_key_path: var("VERIFICATION_KEY_PATH")
                .unwrap_or_else(|| "./keys/verification.key".to_string())
                .into(),
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            anyhow::bail!("PROVER_PORT must be greater than 0");
        }

        self.key_strategy()?;

        Ok(())
    }

    /// Get the API server address
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn key_strategy(&self) -> Result<KeyStrategy> {
        match self.key_strategy.as_str() {
            "generated" => Ok(KeyStrategy::Generated),
            "persisted" => Ok(KeyStrategy::Persisted {
                proving_key: self.proving_key_path.clone(),
                verification_key: self.verification_key_path.clone(),
            }),
            other => anyhow::bail!(
                "Invalid KEY_STRATEGY '{}' (expected generated/persisted)",
                other
            ),
        }
    }
}
