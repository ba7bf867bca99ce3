//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Public base URL must be a valid http(s) URL")]
    InvalidPublicBaseUrl,

    #[error("Public base URL must use HTTPS in production")]
    PublicBaseUrlMustBeHttps,

    #[error("No payment provider enabled")]
    NoProviderEnabled,

    #[error("Invalid PayFast merchant ID (must be numeric)")]
    InvalidPayfastMerchantId,

    #[error("Invalid Yoco secret key format")]
    InvalidYocoSecretKey,

    #[error("Invalid Yoco webhook secret format")]
    InvalidYocoWebhookSecret,

    #[error("Provider timeout out of range (1-120 seconds)")]
    InvalidProviderTimeout,

    #[error("Unknown provider in priority list: {0}")]
    UnknownPriorityProvider(String),
}
