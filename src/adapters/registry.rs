//! Gateway registry.
//!
//! [`ProviderGateway`] is a closed enum over the configured adapters, so
//! provider dispatch is an exhaustive match rather than a string-keyed
//! lookup: adding a provider will not compile until every dispatch site
//! handles it. [`build_gateways`] assembles the enabled adapters in
//! selection-priority order from configuration.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::mock::MockAdapter;
use crate::adapters::payfast::PayfastAdapter;
use crate::adapters::yoco::YocoAdapter;
use crate::config::{AppConfig, ValidationError};
use crate::domain::payment::{PaymentRequest, ProviderId, WebhookNotification};
use crate::ports::{CreatedPayment, GatewayError, PaymentGateway, ProviderCapabilities};

/// One configured payment gateway.
pub enum ProviderGateway {
    Payfast(PayfastAdapter),
    Yoco(YocoAdapter),
    Mock(MockAdapter),
}

#[async_trait]
impl PaymentGateway for ProviderGateway {
    fn provider_id(&self) -> ProviderId {
        match self {
            ProviderGateway::Payfast(g) => g.provider_id(),
            ProviderGateway::Yoco(g) => g.provider_id(),
            ProviderGateway::Mock(g) => g.provider_id(),
        }
    }

    fn capabilities(&self) -> ProviderCapabilities {
        match self {
            ProviderGateway::Payfast(g) => g.capabilities(),
            ProviderGateway::Yoco(g) => g.capabilities(),
            ProviderGateway::Mock(g) => g.capabilities(),
        }
    }

    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        match self {
            ProviderGateway::Payfast(g) => g.create_payment(request).await,
            ProviderGateway::Yoco(g) => g.create_payment(request).await,
            ProviderGateway::Mock(g) => g.create_payment(request).await,
        }
    }

    async fn get_status(&self, payment_id: &str) -> Result<WebhookNotification, GatewayError> {
        match self {
            ProviderGateway::Payfast(g) => g.get_status(payment_id).await,
            ProviderGateway::Yoco(g) => g.get_status(payment_id).await,
            ProviderGateway::Mock(g) => g.get_status(payment_id).await,
        }
    }

    fn verify_signature(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        headers: &http::HeaderMap,
    ) -> bool {
        match self {
            ProviderGateway::Payfast(g) => g.verify_signature(raw_body, signature, headers),
            ProviderGateway::Yoco(g) => g.verify_signature(raw_body, signature, headers),
            ProviderGateway::Mock(g) => g.verify_signature(raw_body, signature, headers),
        }
    }

    fn parse_payload(&self, raw_body: &[u8]) -> Result<WebhookNotification, GatewayError> {
        match self {
            ProviderGateway::Payfast(g) => g.parse_payload(raw_body),
            ProviderGateway::Yoco(g) => g.parse_payload(raw_body),
            ProviderGateway::Mock(g) => g.parse_payload(raw_body),
        }
    }
}

/// Build the enabled gateways in selection-priority order.
///
/// Providers named in the priority list come first, in list order;
/// enabled providers the list omits follow in declaration order. A
/// priority entry that names no known provider is a configuration error,
/// surfaced at startup rather than at request time.
pub fn build_gateways(config: &AppConfig) -> Result<Vec<ProviderGateway>, ValidationError> {
    let providers = &config.providers;
    let create_timeout = Duration::from_secs(providers.create_timeout_secs);
    let status_timeout = Duration::from_secs(providers.status_timeout_secs);

    let build = |id: ProviderId| -> Option<ProviderGateway> {
        match id {
            ProviderId::Payfast if providers.payfast.enabled => Some(ProviderGateway::Payfast(
                PayfastAdapter::new(providers.payfast.clone(), create_timeout, status_timeout),
            )),
            ProviderId::Yoco if providers.yoco.enabled => Some(ProviderGateway::Yoco(
                YocoAdapter::new(providers.yoco.clone(), create_timeout, status_timeout),
            )),
            ProviderId::Mock if providers.mock.enabled => {
                Some(ProviderGateway::Mock(MockAdapter::new(providers.mock.clone())))
            }
            _ => None,
        }
    };

    let mut ordered: Vec<ProviderId> = Vec::new();
    for name in providers.priority_list() {
        let id: ProviderId = name
            .parse()
            .map_err(|_| ValidationError::UnknownPriorityProvider(name.clone()))?;
        if !ordered.contains(&id) {
            ordered.push(id);
        }
    }
    for id in ProviderId::ALL {
        if !ordered.contains(&id) {
            ordered.push(id);
        }
    }

    let gateways: Vec<ProviderGateway> = ordered.into_iter().filter_map(build).collect();
    if gateways.is_empty() {
        return Err(ValidationError::NoProviderEnabled);
    }
    Ok(gateways)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_only_config() -> AppConfig {
        let mut config = base_config();
        config.providers.mock.enabled = true;
        config
    }

    fn base_config() -> AppConfig {
        // Defaults everywhere; individual tests enable providers.
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[test]
    fn disabled_providers_are_not_registered() {
        let gateways = build_gateways(&mock_only_config()).unwrap();
        assert_eq!(gateways.len(), 1);
        assert_eq!(gateways[0].provider_id(), ProviderId::Mock);
    }

    #[test]
    fn no_enabled_provider_is_an_error() {
        assert!(matches!(
            build_gateways(&base_config()),
            Err(ValidationError::NoProviderEnabled)
        ));
    }

    #[test]
    fn priority_orders_the_gateways() {
        let mut config = mock_only_config();
        config.providers.yoco.enabled = true;
        config.providers.yoco.secret_key = secrecy::SecretString::new("sk_test_x".to_string());
        config.providers.yoco.webhook_secret =
            secrecy::SecretString::new("whsec_dGVzdA==".to_string());
        config.providers.priority = "mock,yoco".to_string();

        let gateways = build_gateways(&config).unwrap();
        let ids: Vec<ProviderId> = gateways.iter().map(|g| g.provider_id()).collect();
        assert_eq!(ids, vec![ProviderId::Mock, ProviderId::Yoco]);
    }

    #[test]
    fn enabled_provider_missing_from_priority_still_registers() {
        // Default priority is "payfast,yoco"; mock is appended.
        let config = mock_only_config();
        let gateways = build_gateways(&config).unwrap();
        assert_eq!(gateways.len(), 1);
        assert_eq!(gateways[0].provider_id(), ProviderId::Mock);
    }

    #[test]
    fn unknown_priority_entry_is_an_error() {
        let mut config = mock_only_config();
        config.providers.priority = "paypal".to_string();
        assert!(matches!(
            build_gateways(&config),
            Err(ValidationError::UnknownPriorityProvider(name)) if name == "paypal"
        ));
    }
}
