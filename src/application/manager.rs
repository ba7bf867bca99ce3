//! Payment orchestration.
//!
//! [`PaymentManager`] is the single entry point for payment operations:
//! it selects a provider, normalizes every outcome into the uniform
//! response contract, and keeps the canonical record store consistent
//! with what providers report. Construction wires in everything it
//! needs; a constructed manager is ready, there is no separate
//! initialization step.

use std::sync::Arc;

use http::HeaderMap;

use crate::adapters::registry::ProviderGateway;
use crate::domain::payment::{
    PaymentError, PaymentRecord, PaymentRequest, PaymentResponse, ProviderId,
    StateMachine, TransitionOutcome,
};
use crate::ports::{PaymentGateway, PaymentStore, ProviderCapabilities, StoreError};

use super::webhook::{WebhookDecision, WebhookProcessor};

/// Orchestrates payment operations across the configured providers.
pub struct PaymentManager {
    /// Configured gateways in selection-priority order.
    gateways: Vec<ProviderGateway>,

    store: Arc<dyn PaymentStore>,

    /// Base for default return/cancel/notify links, when configured.
    public_base_url: Option<String>,
}

impl PaymentManager {
    pub fn new(
        gateways: Vec<ProviderGateway>,
        store: Arc<dyn PaymentStore>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            gateways,
            store,
            public_base_url,
        }
    }

    /// Capabilities of every configured provider, in priority order.
    pub fn available_providers(&self) -> Vec<ProviderCapabilities> {
        self.gateways.iter().map(|g| g.capabilities()).collect()
    }

    /// The handshake acknowledgement body for a provider's GET probe.
    pub fn handshake_ack(&self, provider: ProviderId) -> Option<&'static str> {
        self.gateway(provider).map(|g| g.capabilities().handshake_ack)
    }

    fn gateway(&self, provider: ProviderId) -> Option<&ProviderGateway> {
        self.gateways.iter().find(|g| g.provider_id() == provider)
    }

    /// Pick the gateway for a request.
    ///
    /// An explicit override must name a configured provider that covers
    /// the request; otherwise the first covering provider in priority
    /// order wins.
    fn select_gateway(
        &self,
        request: &PaymentRequest,
        provider_override: Option<ProviderId>,
    ) -> Result<&ProviderGateway, PaymentError> {
        match provider_override {
            Some(provider) => {
                let gateway = self
                    .gateway(provider)
                    .ok_or_else(|| PaymentError::unknown_provider(provider.as_str()))?;
                if !gateway.capabilities().covers(request) {
                    return Err(PaymentError::provider_unavailable(format!(
                        "{} does not support this request",
                        provider
                    )));
                }
                Ok(gateway)
            }
            None => self
                .gateways
                .iter()
                .find(|g| g.capabilities().covers(request))
                .ok_or_else(|| {
                    PaymentError::provider_unavailable(
                        "no configured provider supports this request",
                    )
                }),
        }
    }

    /// Fill in default callback links for fields the caller left empty.
    ///
    /// The notify link carries the chosen provider, so it can only be
    /// built after selection.
    fn fill_default_urls(&self, request: &mut PaymentRequest, provider: ProviderId) {
        let Some(base) = &self.public_base_url else {
            return;
        };
        let base = base.trim_end_matches('/');
        if request.return_url.is_empty() {
            request.return_url = format!("{}/payments/return", base);
        }
        if request.cancel_url.is_empty() {
            request.cancel_url = format!("{}/payments/cancel", base);
        }
        if request.notify_url.is_empty() {
            request.notify_url = format!("{}/api/webhooks?provider={}", base, provider);
        }
    }

    /// Create a payment.
    ///
    /// Never returns an error: every failure is folded into the uniform
    /// response contract with its stable code and retryability.
    pub async fn create_payment(
        &self,
        mut request: PaymentRequest,
        provider_override: Option<ProviderId>,
    ) -> PaymentResponse {
        let gateway = match self.select_gateway(&request, provider_override) {
            Ok(gateway) => gateway,
            Err(e) => {
                tracing::warn!(error = %e, "payment creation failed before provider selection");
                return PaymentResponse::failed(provider_override, &e);
            }
        };
        let provider = gateway.provider_id();

        self.fill_default_urls(&mut request, provider);
        if let Err(e) = request.validate() {
            tracing::warn!(provider = %provider, error = %e, "payment request failed validation");
            return PaymentResponse::failed(Some(provider), &e);
        }

        // The reference is the idempotency boundary: refuse reuse before
        // the provider sees the request.
        match self.store.find_by_reference(provider, &request.reference).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                let e = PaymentError::validation(
                    "reference",
                    format!("reference '{}' was already used", request.reference),
                );
                return PaymentResponse::failed(Some(provider), &e);
            }
            Err(e) => {
                let e = PaymentError::from(e);
                tracing::error!(provider = %provider, error = %e, "reference lookup failed");
                return PaymentResponse::failed(Some(provider), &e);
            }
        }

        let created = match gateway.create_payment(&request).await {
            Ok(created) => created,
            Err(e) => {
                let e = e.into_payment_error(provider);
                tracing::warn!(provider = %provider, error = %e, "provider rejected payment creation");
                return PaymentResponse::failed(Some(provider), &e);
            }
        };

        let record = PaymentRecord::new(
            &created.payment_id,
            provider,
            &request.metadata.order_id,
            &request.reference,
            request.amount,
        );
        if let Err(e) = self.store.insert(record).await {
            let e = PaymentError::from(e);
            tracing::error!(
                provider = %provider,
                payment_id = %created.payment_id,
                error = %e,
                "payment created at provider but record insert failed"
            );
            return PaymentResponse::failed(Some(provider), &e);
        }

        tracing::info!(
            provider = %provider,
            payment_id = %created.payment_id,
            order_id = %request.metadata.order_id,
            amount = %request.amount,
            "payment created"
        );
        PaymentResponse::succeeded(provider, created.payment_id, created.payment_url, request.amount)
    }

    /// Current canonical state of a payment, refreshed from the provider.
    ///
    /// Polled statuses pass through the same monotonic transition rule as
    /// webhooks. When the provider cannot be reached the stored record is
    /// returned as-is; a status poll degrades, it does not fail.
    pub async fn get_payment_status(
        &self,
        provider: ProviderId,
        payment_id: &str,
    ) -> Result<PaymentRecord, PaymentError> {
        let record = match self.store.get(provider, payment_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => return Err(PaymentError::not_found(payment_id)),
            Err(e) => return Err(e.into()),
        };

        if record.status.is_terminal() {
            return Ok(record);
        }
        let Some(gateway) = self.gateway(provider) else {
            tracing::warn!(provider = %provider, "provider no longer configured; serving stored status");
            return Ok(record);
        };

        let notification = match gateway.get_status(payment_id).await {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(
                    provider = %provider,
                    payment_id = payment_id,
                    error = %e,
                    "status poll failed; serving stored status"
                );
                return Ok(record);
            }
        };

        let Some(target) = notification.status else {
            return Ok(record);
        };
        let outcome = self
            .store
            .apply_transition(
                provider,
                payment_id,
                target,
                &notification.native_status,
                notification.event_id.as_deref(),
                None,
            )
            .await
            .map_err(PaymentError::from)?;
        if let TransitionOutcome::Applied { from, to } = outcome {
            tracing::info!(
                provider = %provider,
                payment_id = payment_id,
                from = %from,
                to = %to,
                "status poll applied transition"
            );
        }

        self.store
            .get(provider, payment_id)
            .await
            .map_err(PaymentError::from)
    }

    /// Process a webhook delivery for a provider.
    ///
    /// An acknowledged decision tells the provider to stop retrying, a
    /// refused one carries the taxonomy error the transport answers with,
    /// and `Err` is an internal failure the provider should retry against.
    pub async fn process_webhook(
        &self,
        provider: ProviderId,
        raw_body: &[u8],
        headers: &HeaderMap,
    ) -> Result<WebhookDecision, PaymentError> {
        let gateway = self
            .gateway(provider)
            .ok_or_else(|| PaymentError::unknown_provider(provider.as_str()))?;
        WebhookProcessor::new(gateway, self.store.as_ref())
            .process(raw_body, headers)
            .await
    }
}
