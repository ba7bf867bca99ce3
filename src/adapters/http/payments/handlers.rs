//! HTTP handlers for the payments API.
//!
//! Handlers translate between the wire contract and [`PaymentManager`]
//! operations. Creation always answers with the uniform payment response;
//! the other endpoints map the error taxonomy onto HTTP statuses.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::{PaymentManager, WebhookDecision};
use crate::domain::payment::{PaymentError, PaymentResponse, ProviderId};

use super::dto::{
    CreatePaymentBody, ErrorResponse, PaymentRecordResponse, ProviderListResponse,
    ProviderResponse, StatusQuery, WebhookQuery,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payments API.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub manager: Arc<PaymentManager>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Caller Identity
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated caller context extracted from the request.
///
/// Identity is established by the fronting gateway, which forwards the
/// customer id in the `X-Customer-Id` header. A request without one has no
/// business creating payments.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    pub customer_id: String,
}

/// Rejection type for [`AuthenticatedCustomer`] extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = PaymentError::authentication("missing X-Customer-Id header");
        let body = ErrorResponse::new(error.code(), error.message());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let customer_id = parts
                .headers
                .get("X-Customer-Id")
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedCustomer { customer_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payment Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Create a payment.
///
/// Always answers with the uniform payment response; the HTTP status mirrors
/// the embedded error code on failure.
pub async fn create_payment(
    State(state): State<PaymentsAppState>,
    customer: AuthenticatedCustomer,
    headers: HeaderMap,
    Json(body): Json<CreatePaymentBody>,
) -> impl IntoResponse {
    let provider_override = match body.provider.as_deref() {
        None => None,
        Some(name) => match name.parse::<ProviderId>() {
            Ok(id) => Some(id),
            Err(_) => {
                let error = PaymentError::unknown_provider(name);
                let response = PaymentResponse::failed(None, &error);
                return (StatusCode::BAD_REQUEST, Json(response));
            }
        },
    };

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request = body.into_request(customer.customer_id, user_agent);

    let response = state.manager.create_payment(request, provider_override).await;
    let status = if response.success {
        StatusCode::CREATED
    } else {
        response
            .error
            .as_ref()
            .map(|e| status_for_code(&e.code))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    };
    (status, Json(response))
}

/// GET /api/payments/status?provider=..&payment_id=.. - Current payment state.
pub async fn get_payment_status(
    State(state): State<PaymentsAppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<PaymentRecordResponse>, PaymentApiError> {
    let provider: ProviderId = query
        .provider
        .parse()
        .map_err(|_| PaymentError::unknown_provider(&query.provider))?;

    let record = state
        .manager
        .get_payment_status(provider, &query.payment_id)
        .await?;
    Ok(Json(PaymentRecordResponse::from(record)))
}

/// GET /api/payments/providers - Configured providers and their capabilities.
pub async fn list_providers(State(state): State<PaymentsAppState>) -> Json<ProviderListResponse> {
    let providers = state
        .manager
        .available_providers()
        .into_iter()
        .map(ProviderResponse::from)
        .collect();
    Json(ProviderListResponse { providers })
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks?provider=.. - Receive a provider notification.
///
/// An acknowledged delivery answers 200 with the provider's expected ack
/// body; a refused delivery answers 400 carrying the refusal's taxonomy
/// code so the provider redelivers nothing it should not. Internal
/// failures answer 5xx, inviting a retry.
pub async fn receive_webhook(
    State(state): State<PaymentsAppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let provider = match resolve_webhook_provider(&query) {
        Ok(provider) => provider,
        Err(response) => return response,
    };

    match state.manager.process_webhook(provider, &body, &headers).await {
        Ok(WebhookDecision::Acknowledged) => {
            let ack = state.manager.handshake_ack(provider).unwrap_or("OK");
            (StatusCode::OK, ack.to_string()).into_response()
        }
        Ok(WebhookDecision::Refused(error)) => PaymentApiError::from(error).into_response(),
        Err(error) => PaymentApiError::from(error).into_response(),
    }
}

/// GET /api/webhooks?provider=.. - Endpoint validation handshake.
///
/// Some providers probe the notify URL before enabling deliveries; the
/// expected ack body is a per-provider fact.
pub async fn webhook_handshake(
    State(state): State<PaymentsAppState>,
    Query(query): Query<WebhookQuery>,
) -> axum::response::Response {
    let provider = match resolve_webhook_provider(&query) {
        Ok(provider) => provider,
        Err(response) => return response,
    };
    match state.manager.handshake_ack(provider) {
        Some(ack) => (StatusCode::OK, ack.to_string()).into_response(),
        None => PaymentApiError::from(PaymentError::unknown_provider(provider.as_str()))
            .into_response(),
    }
}

fn resolve_webhook_provider(query: &WebhookQuery) -> Result<ProviderId, axum::response::Response> {
    let name = query.provider.as_deref().unwrap_or("");
    if name.is_empty() {
        let error = PaymentError::validation("provider", "provider query parameter is required");
        return Err(PaymentApiError::from(error).into_response());
    }
    name.parse::<ProviderId>()
        .map_err(|_| PaymentApiError::from(PaymentError::unknown_provider(name)).into_response())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that maps the payment error taxonomy onto HTTP statuses.
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(error: PaymentError) -> Self {
        Self(error)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for_code(self.0.code());
        let body = ErrorResponse::new(self.0.code(), self.0.message());
        (status, Json(body)).into_response()
    }
}

fn status_for_code(code: &str) -> StatusCode {
    match code {
        "VALIDATION_ERROR" | "UNKNOWN_PROVIDER" | "SIGNATURE_VERIFICATION_FAILED" => {
            StatusCode::BAD_REQUEST
        }
        "AUTHENTICATION_ERROR" => StatusCode::UNAUTHORIZED,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "PROVIDER_API_ERROR" => StatusCode::BAD_GATEWAY,
        "PROVIDER_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_expected_statuses() {
        assert_eq!(status_for_code("VALIDATION_ERROR"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_code("UNKNOWN_PROVIDER"), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for_code("AUTHENTICATION_ERROR"),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for_code("NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_code("PROVIDER_API_ERROR"), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for_code("PROVIDER_UNAVAILABLE"),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for_code("INTERNAL_ERROR"),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_renders_code_and_status() {
        let response =
            PaymentApiError::from(PaymentError::not_found("mock_404")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn authentication_rejection_is_401() {
        let response = AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
