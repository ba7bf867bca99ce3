//! PayFast gateway adapter.
//!
//! Creates payments through the onsite checkout endpoint, polls the
//! merchant API for status, and verifies ITN webhooks via the embedded
//! MD5 parameter-hash signature.
//!
//! # Security
//!
//! - ITN signatures verified from the raw body before any parsing
//! - Constant-time signature comparison
//! - Credentials held via `secrecy::SecretString`

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::ExposeSecret;

use crate::config::PayfastConfig;
use crate::domain::payment::money::Currency;
use crate::domain::payment::request::PaymentMethod;
use crate::domain::payment::{
    Money, PaymentRequest, PaymentStatus, ProviderId, WebhookNotification,
};
use crate::ports::{
    CreatedPayment, GatewayError, PaymentGateway, ProcessingFee, ProviderCapabilities,
};

use super::signature::{form_urlencoded_pairs, sign_alphabetical, sign_ordered, verify_itn};
use super::types::{map_status, ItnPayload, OnsiteResponse, QueryResponse};

const LIVE_CHECKOUT_URL: &str = "https://www.payfast.co.za";
const SANDBOX_CHECKOUT_URL: &str = "https://sandbox.payfast.co.za";
const API_URL: &str = "https://api.payfast.co.za";

/// PayFast payment gateway adapter.
pub struct PayfastAdapter {
    config: PayfastConfig,
    http_client: reqwest::Client,
    checkout_base_url: String,
    api_base_url: String,
    create_timeout: Duration,
    status_timeout: Duration,
}

impl PayfastAdapter {
    pub fn new(config: PayfastConfig, create_timeout: Duration, status_timeout: Duration) -> Self {
        let checkout_base_url = if config.sandbox {
            SANDBOX_CHECKOUT_URL.to_string()
        } else {
            LIVE_CHECKOUT_URL.to_string()
        };
        Self {
            config,
            http_client: reqwest::Client::new(),
            checkout_base_url,
            api_base_url: API_URL.to_string(),
            create_timeout,
            status_timeout,
        }
    }

    /// Point at different endpoints (for testing).
    pub fn with_base_urls(
        mut self,
        checkout: impl Into<String>,
        api: impl Into<String>,
    ) -> Self {
        self.checkout_base_url = checkout.into();
        self.api_base_url = api.into();
        self
    }

    /// The checkout request body, in signing order.
    fn checkout_fields(&self, request: &PaymentRequest) -> Vec<(String, String)> {
        let mut fields = vec![
            ("merchant_id".to_string(), self.config.merchant_id.clone()),
            (
                "merchant_key".to_string(),
                self.config.merchant_key.expose_secret().to_string(),
            ),
            ("return_url".to_string(), request.return_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("notify_url".to_string(), request.notify_url.clone()),
            ("name_first".to_string(), request.customer.name.clone()),
            ("email_address".to_string(), request.customer.email.clone()),
        ];
        if let Some(phone) = &request.customer.phone {
            fields.push(("cell_number".to_string(), phone.clone()));
        }
        fields.push(("m_payment_id".to_string(), request.reference.clone()));
        fields.push(("amount".to_string(), request.amount.value().to_string()));
        fields.push(("item_name".to_string(), request.description.clone()));
        fields
    }
}

#[async_trait]
impl PaymentGateway for PayfastAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Payfast
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            provider: ProviderId::Payfast,
            currencies: vec![Currency::Zar],
            methods: vec![PaymentMethod::Card, PaymentMethod::Eft],
            min_amount: dec!(5.00),
            max_amount: dec!(1_000_000.00),
            fee: ProcessingFee {
                rate: dec!(0.032),
                fixed: dec!(2.00),
            },
            handshake_ack: "OK",
        }
    }

    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        let mut fields = self.checkout_fields(request);
        let signature = sign_ordered(&fields, self.config.passphrase.expose_secret());
        fields.push(("signature".to_string(), signature));

        let response = self
            .http_client
            .post(format!("{}/onsite/process", self.checkout_base_url))
            .timeout(self.create_timeout)
            .form(&fields)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "PayFast checkout request rejected");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let onsite: OnsiteResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if onsite.uuid.is_empty() {
            return Err(GatewayError::InvalidResponse(
                "checkout response carried an empty uuid".to_string(),
            ));
        }

        Ok(CreatedPayment {
            payment_url: format!("{}/onsite/engine/{}", self.checkout_base_url, onsite.uuid),
            payment_id: onsite.uuid,
            status: PaymentStatus::Pending,
        })
    }

    async fn get_status(&self, payment_id: &str) -> Result<WebhookNotification, GatewayError> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let header_params = vec![
            ("merchant-id".to_string(), self.config.merchant_id.clone()),
            ("version".to_string(), "v1".to_string()),
            ("timestamp".to_string(), timestamp.clone()),
        ];
        let signature = sign_alphabetical(&header_params, self.config.passphrase.expose_secret());

        let mut url = format!("{}/process/query/{}", self.api_base_url, payment_id);
        if self.config.sandbox {
            url.push_str("?testing=true");
        }

        let response = self
            .http_client
            .get(url)
            .timeout(self.status_timeout)
            .header("merchant-id", &self.config.merchant_id)
            .header("version", "v1")
            .header("timestamp", timestamp)
            .header("signature", signature)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let transaction = query.data.response;

        let amount = transaction
            .amount_gross
            .as_deref()
            .and_then(|a| Decimal::from_str(a).ok())
            .and_then(|value| Money::new(value, Currency::Zar).ok());

        Ok(WebhookNotification {
            external_payment_id: transaction
                .pf_payment_id
                .unwrap_or_else(|| payment_id.to_string()),
            reference: transaction.m_payment_id,
            status: map_status(&transaction.status),
            native_status: transaction.status,
            amount,
            event_id: None,
            raw: serde_json::json!({}),
        })
    }

    fn verify_signature(
        &self,
        raw_body: &[u8],
        _signature: Option<&str>,
        _headers: &http::HeaderMap,
    ) -> bool {
        // The ITN signature rides inside the form body, not a header.
        verify_itn(raw_body, self.config.passphrase.expose_secret())
    }

    fn parse_payload(&self, raw_body: &[u8]) -> Result<WebhookNotification, GatewayError> {
        let pairs = form_urlencoded_pairs(raw_body);
        let payload = ItnPayload::from_pairs(pairs).ok_or_else(|| {
            GatewayError::MalformedPayload("ITN body has no payment_status".to_string())
        })?;

        let external_payment_id = payload
            .pf_payment_id
            .clone()
            .or_else(|| payload.m_payment_id.clone())
            .ok_or_else(|| {
                GatewayError::MalformedPayload("ITN body carries no payment identifier".to_string())
            })?;

        let amount = payload
            .amount_gross
            .as_deref()
            .and_then(|a| Decimal::from_str(a).ok())
            .and_then(|value| Money::new(value, Currency::Zar).ok());

        Ok(WebhookNotification {
            external_payment_id,
            reference: payload.m_payment_id.clone(),
            status: map_status(&payload.payment_status),
            native_status: payload.payment_status.clone(),
            amount,
            event_id: None,
            raw: serde_json::to_value(&payload.fields)
                .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?,
        })
    }
}
