//! Payment provider configuration
//!
//! One section per supported processor plus the selection priority used by
//! the orchestrator when no provider override is given. Credentials are held
//! as [`SecretString`] so they never appear in Debug output or logs.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Provider selection priority, comma-separated (first match wins
    /// when no provider override is supplied)
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Per-call timeout for payment creation, in seconds
    #[serde(default = "default_create_timeout")]
    pub create_timeout_secs: u64,

    /// Per-call timeout for status polls, in seconds
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// PayFast configuration
    #[serde(default)]
    pub payfast: PayfastConfig,

    /// Yoco configuration
    #[serde(default)]
    pub yoco: YocoConfig,

    /// Mock provider configuration (development and tests)
    #[serde(default)]
    pub mock: MockProviderConfig,
}

/// PayFast merchant credentials
#[derive(Debug, Clone, Deserialize)]
pub struct PayfastConfig {
    /// Whether the PayFast adapter is registered
    #[serde(default)]
    pub enabled: bool,

    /// Numeric merchant ID issued by PayFast
    #[serde(default)]
    pub merchant_id: String,

    /// Merchant key issued by PayFast
    #[serde(default = "empty_secret")]
    pub merchant_key: SecretString,

    /// ITN signing passphrase configured on the merchant account
    #[serde(default = "empty_secret")]
    pub passphrase: SecretString,

    /// Use the PayFast sandbox environment
    #[serde(default = "default_true")]
    pub sandbox: bool,
}

/// Yoco API credentials
#[derive(Debug, Clone, Deserialize)]
pub struct YocoConfig {
    /// Whether the Yoco adapter is registered
    #[serde(default)]
    pub enabled: bool,

    /// Secret API key (`sk_test_...` or `sk_live_...`)
    #[serde(default = "empty_secret")]
    pub secret_key: SecretString,

    /// Webhook signing secret (`whsec_...`)
    #[serde(default = "empty_secret")]
    pub webhook_secret: SecretString,
}

/// Mock provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct MockProviderConfig {
    /// Whether the mock adapter is registered
    #[serde(default)]
    pub enabled: bool,

    /// Shared secret used to sign simulated webhooks
    #[serde(default = "default_mock_secret")]
    pub webhook_secret: SecretString,
}

impl ProvidersConfig {
    /// Provider priority as an ordered list of names
    pub fn priority_list(&self) -> Vec<String> {
        self.priority
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.payfast.enabled && !self.yoco.enabled && !self.mock.enabled {
            return Err(ValidationError::NoProviderEnabled);
        }
        if !(1..=120).contains(&self.create_timeout_secs)
            || !(1..=120).contains(&self.status_timeout_secs)
        {
            return Err(ValidationError::InvalidProviderTimeout);
        }
        if self.payfast.enabled {
            self.payfast.validate()?;
        }
        if self.yoco.enabled {
            self.yoco.validate()?;
        }
        Ok(())
    }
}

impl PayfastConfig {
    /// Validate PayFast credentials
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYFAST_MERCHANT_ID"));
        }
        if !self.merchant_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPayfastMerchantId);
        }
        if self.merchant_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYFAST_MERCHANT_KEY"));
        }
        if self.passphrase.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYFAST_PASSPHRASE"));
        }
        Ok(())
    }
}

impl YocoConfig {
    /// Check if using Yoco test mode
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Validate Yoco credentials
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("YOCO_SECRET_KEY"));
        }
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidYocoSecretKey);
        }
        let webhook = self.webhook_secret.expose_secret();
        if webhook.is_empty() {
            return Err(ValidationError::MissingRequired("YOCO_WEBHOOK_SECRET"));
        }
        if !webhook.starts_with("whsec_") {
            return Err(ValidationError::InvalidYocoWebhookSecret);
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            create_timeout_secs: default_create_timeout(),
            status_timeout_secs: default_status_timeout(),
            payfast: PayfastConfig::default(),
            yoco: YocoConfig::default(),
            mock: MockProviderConfig::default(),
        }
    }
}

impl Default for PayfastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            merchant_id: String::new(),
            merchant_key: empty_secret(),
            passphrase: empty_secret(),
            sandbox: true,
        }
    }
}

impl Default for YocoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret_key: empty_secret(),
            webhook_secret: empty_secret(),
        }
    }
}

impl Default for MockProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_secret: default_mock_secret(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_mock_secret() -> SecretString {
    SecretString::new("mock-webhook-secret".to_string())
}

fn default_priority() -> String {
    "payfast,yoco".to_string()
}

fn default_create_timeout() -> u64 {
    15
}

fn default_status_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
