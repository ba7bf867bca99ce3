//! Payment-specific error types.
//!
//! The taxonomy every orchestrator operation reports through. Adapter-level
//! failures are folded into these variants at the manager boundary; provider
//! message text is sanitized before it gets here.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | Authentication | 401 |
//! | ProviderUnavailable | 503 |
//! | UnknownProvider | 400 |
//! | SignatureVerificationFailed | 400 |
//! | ProviderApi | 502 |
//! | NotFound | 404 |
//! | Internal | 500 |

/// Payment orchestration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Request failed validation.
    Validation {
        field: String,
        message: String,
    },

    /// Caller has no authenticated identity.
    Authentication(String),

    /// No configured provider matches the request constraints.
    ProviderUnavailable(String),

    /// The named provider is not configured.
    UnknownProvider(String),

    /// Webhook signature verification failed (always fail-closed).
    SignatureVerificationFailed {
        provider: String,
    },

    /// The upstream provider API failed.
    ProviderApi {
        provider: String,
        message: String,
        retryable: bool,
    },

    /// The payment id is unknown.
    NotFound(String),

    /// Unexpected internal failure.
    Internal(String),
}

impl PaymentError {
    // Constructor functions for cleaner error creation

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        PaymentError::Authentication(message.into())
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        PaymentError::ProviderUnavailable(message.into())
    }

    pub fn unknown_provider(name: impl Into<String>) -> Self {
        PaymentError::UnknownProvider(name.into())
    }

    pub fn signature_verification_failed(provider: impl Into<String>) -> Self {
        PaymentError::SignatureVerificationFailed {
            provider: provider.into(),
        }
    }

    pub fn provider_api(
        provider: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        PaymentError::ProviderApi {
            provider: provider.into(),
            message: message.into(),
            retryable,
        }
    }

    pub fn not_found(payment_id: impl Into<String>) -> Self {
        PaymentError::NotFound(payment_id.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PaymentError::Internal(message.into())
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Validation { .. } => "VALIDATION_ERROR",
            PaymentError::Authentication(_) => "AUTHENTICATION_ERROR",
            PaymentError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            PaymentError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            PaymentError::SignatureVerificationFailed { .. } => "SIGNATURE_VERIFICATION_FAILED",
            PaymentError::ProviderApi { .. } => "PROVIDER_API_ERROR",
            PaymentError::NotFound(_) => "NOT_FOUND",
            PaymentError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PaymentError::Authentication(msg) => format!("Authentication required: {}", msg),
            PaymentError::ProviderUnavailable(msg) => {
                format!("No payment provider available: {}", msg)
            }
            PaymentError::UnknownProvider(name) => format!("Unknown payment provider: {}", name),
            PaymentError::SignatureVerificationFailed { provider } => {
                format!("Webhook signature verification failed for {}", provider)
            }
            PaymentError::ProviderApi {
                provider, message, ..
            } => format!("Provider {} error: {}", provider, message),
            PaymentError::NotFound(payment_id) => format!("Payment not found: {}", payment_id),
            PaymentError::Internal(msg) => format!("Internal error: {}", msg),
        }
    }

    /// Returns true if retrying the operation could succeed.
    ///
    /// A retried create must carry a fresh reference; the retryable flag only
    /// says the failure was transient, not that the same reference is safe.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::ProviderApi { retryable, .. } => *retryable,
            PaymentError::ProviderUnavailable(_) | PaymentError::Internal(_) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PaymentError {}
