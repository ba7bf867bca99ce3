//! Webhook processing pipeline.
//!
//! Every delivery runs the same gauntlet: authenticate the raw body
//! first, parse second, locate the record, cross-check the amount, then
//! feed the transition through the monotonic apply rule. The return
//! value is the acknowledgement decision: [`WebhookDecision::Acknowledged`]
//! tells the provider to stop retrying, [`WebhookDecision::Refused`]
//! carries the taxonomy error the transport answers with, and `Err` is
//! an internal failure the provider should retry against.

use http::HeaderMap;

use crate::adapters::registry::ProviderGateway;
use crate::domain::payment::{
    PaymentError, PaymentRecord, ProviderId, TransitionOutcome, WebhookNotification,
};
use crate::ports::{PaymentGateway, PaymentStore, StoreError};

/// Acknowledgement decision for one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDecision {
    /// The delivery landed (or was safely ignorable); answer the
    /// provider's expected acknowledgement.
    Acknowledged,

    /// The delivery was refused without mutation; the error says why.
    Refused(PaymentError),
}

impl WebhookDecision {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, WebhookDecision::Acknowledged)
    }
}

/// Runs verified webhook notifications against the payment store.
pub struct WebhookProcessor<'a> {
    gateway: &'a ProviderGateway,
    store: &'a dyn PaymentStore,
}

impl<'a> WebhookProcessor<'a> {
    pub fn new(gateway: &'a ProviderGateway, store: &'a dyn PaymentStore) -> Self {
        Self { gateway, store }
    }

    /// Process one delivery from its raw body.
    pub async fn process(
        &self,
        raw_body: &[u8],
        headers: &HeaderMap,
    ) -> Result<WebhookDecision, PaymentError> {
        let provider = self.gateway.provider_id();

        // Signature location is a per-provider fact, not something to
        // sniff from whatever headers happen to be present.
        let signature = match provider.signature_header() {
            None => None,
            Some(header_name) => match headers.get(header_name).and_then(|v| v.to_str().ok()) {
                Some(value) => Some(value),
                None => {
                    tracing::warn!(
                        provider = %provider,
                        header = header_name,
                        "webhook rejected: declared signature header absent"
                    );
                    return Ok(WebhookDecision::Refused(
                        PaymentError::signature_verification_failed(provider.as_str()),
                    ));
                }
            },
        };

        if !self.gateway.verify_signature(raw_body, signature, headers) {
            tracing::warn!(provider = %provider, "webhook rejected: signature verification failed");
            return Ok(WebhookDecision::Refused(
                PaymentError::signature_verification_failed(provider.as_str()),
            ));
        }

        let notification = match self.gateway.parse_payload(raw_body) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "webhook rejected: verified body failed to parse");
                return Ok(WebhookDecision::Refused(PaymentError::validation(
                    "payload",
                    "verified body failed to parse",
                )));
            }
        };

        let Some(target) = notification.status else {
            tracing::debug!(
                provider = %provider,
                native_status = %notification.native_status,
                "webhook acknowledged: event carries no payment transition"
            );
            return Ok(WebhookDecision::Acknowledged);
        };

        let Some(record) = self.locate_record(provider, &notification).await? else {
            // Out-of-band notification: no record to mutate, but refusing
            // would only make the provider redeliver forever.
            tracing::warn!(
                provider = %provider,
                external_payment_id = %notification.external_payment_id,
                "webhook acknowledged: no matching payment record"
            );
            return Ok(WebhookDecision::Acknowledged);
        };

        if let Some(amount) = notification.amount {
            if amount != record.amount {
                tracing::warn!(
                    provider = %provider,
                    payment_id = %record.payment_id,
                    expected = %record.amount,
                    reported = %amount,
                    "webhook rejected: amount mismatch"
                );
                return Ok(WebhookDecision::Refused(PaymentError::validation(
                    "amount",
                    "reported amount does not match the payment record",
                )));
            }
        }

        let outcome = self
            .store
            .apply_transition(
                provider,
                &record.payment_id,
                target,
                &notification.native_status,
                notification.event_id.as_deref(),
                Some(notification.raw),
            )
            .await
            .map_err(PaymentError::from)?;

        log_outcome(provider, &record.payment_id, target, outcome);
        Ok(WebhookDecision::Acknowledged)
    }

    /// Find the record a notification refers to.
    ///
    /// Providers that report under their own payment id (PayFast's ITN
    /// carries `pf_payment_id`, not the checkout uuid the record is keyed
    /// by) are resolved through the merchant reference instead.
    async fn locate_record(
        &self,
        provider: ProviderId,
        notification: &WebhookNotification,
    ) -> Result<Option<PaymentRecord>, PaymentError> {
        match self
            .store
            .get(provider, &notification.external_payment_id)
            .await
        {
            Ok(record) => return Ok(Some(record)),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        match &notification.reference {
            Some(reference) => self
                .store
                .find_by_reference(provider, reference)
                .await
                .map_err(PaymentError::from),
            None => Ok(None),
        }
    }
}

fn log_outcome(
    provider: ProviderId,
    payment_id: &str,
    target: crate::domain::payment::PaymentStatus,
    outcome: TransitionOutcome,
) {
    match outcome {
        TransitionOutcome::Applied { from, to } => {
            tracing::info!(
                provider = %provider,
                payment_id = payment_id,
                from = %from,
                to = %to,
                "payment status transition applied"
            );
        }
        TransitionOutcome::Duplicate => {
            tracing::debug!(
                provider = %provider,
                payment_id = payment_id,
                status = %target,
                "duplicate webhook delivery ignored"
            );
        }
        TransitionOutcome::Stale => {
            tracing::debug!(
                provider = %provider,
                payment_id = payment_id,
                target = %target,
                "stale webhook delivery dropped"
            );
        }
        TransitionOutcome::Conflict => {
            tracing::warn!(
                provider = %provider,
                payment_id = payment_id,
                target = %target,
                "conflicting settlement status dropped"
            );
        }
        TransitionOutcome::Illegal => {
            tracing::warn!(
                provider = %provider,
                payment_id = payment_id,
                target = %target,
                "illegal status transition dropped"
            );
        }
    }
}
