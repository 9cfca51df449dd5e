use anyhow::{anyhow, ensure, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::service_api::DEFAULT_API_BASE_URL;

pub const API_URL_ENV: &str = "KLARA_SYNC_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub live_mode_on_start: bool,
    /// VAT rate in percent, only used for labels
    pub vat_rate: Decimal,
    pub ledger_accounts: LedgerAccounts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            live_mode_on_start: true,
            vat_rate: Decimal::new(81, 1),
            ledger_accounts: LedgerAccounts::default(),
        }
    }
}

/// Accounts the remote service books daily totals on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerAccounts {
    pub revenue: u32,
    pub vat: u32,
    pub voucher_liabilities: u32,
    pub card_receivables: u32,
}

impl Default for LedgerAccounts {
    fn default() -> Self {
        Self {
            revenue: 3000,
            vat: 2200,
            voucher_liabilities: 2030,
            card_receivables: 1101,
        }
    }
}

impl Config {
    /// Load from a YAML file, or use the defaults if no file is given
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::info!("No config file given, using defaults");
            return Ok(Self::default());
        };
        log::info!("Loading config from {}...", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| anyhow!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| anyhow!("Error in config file {}", path.display()))?;
        log::info!("Loading config from {}...done", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url_override(self, api_base_url: Option<String>) -> Self {
        match api_base_url {
            Some(api_base_url) if !api_base_url.is_empty() => {
                log::info!("Using API URL from {API_URL_ENV}");
                Self {
                    api_base_url,
                    ..self
                }
            }
            _ => self,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"),
            "api_base_url must start with http:// or https:// but is {:?}",
            self.api_base_url
        );
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be at least 1"
        );
        ensure!(
            !self.vat_rate.is_sign_negative(),
            "vat_rate can't be negative"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
