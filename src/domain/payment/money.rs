//! Exact decimal money amounts.
//!
//! Amounts are normalized to two decimal places with half-up rounding at
//! construction, so `149.995` becomes `150.00` before it ever reaches an
//! adapter. Conversion to integer minor units (cents) happens only inside
//! adapters whose providers require it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::errors::PaymentError;

/// Largest amount the orchestrator accepts, in major units.
///
/// Keeps minor-unit conversion safely inside `i64` and catches fat-finger
/// inputs before they reach a provider.
const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Supported settlement currencies.
///
/// A closed set: adapters declare which subset they accept, and requests in
/// any other currency are rejected at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Zar,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// ISO 4217 alphabetic code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Zar => "ZAR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Number of decimal places in the minor unit (cents).
    pub fn minor_unit_exponent(&self) -> u32 {
        2
    }
}

impl std::str::FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ZAR" => Ok(Currency::Zar),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(PaymentError::validation(
                "currency",
                format!("unsupported currency '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary amount in a specific currency.
///
/// Construction is the validation boundary: the value must be positive,
/// within bounds, and is normalized to exactly two decimal places with
/// half-up rounding. Fractional cents therefore cannot exist past this
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    value: Decimal,
    currency: Currency,
}

/// Wire shape accepted when deserializing a `Money`.
///
/// A `formatted` field is tolerated on input (round-tripped payloads carry
/// one) but ignored; the canonical rendering is always recomputed.
#[derive(Deserialize)]
struct RawMoney {
    value: Decimal,
    currency: Currency,
    #[serde(default)]
    #[allow(dead_code)]
    formatted: Option<String>,
}

impl TryFrom<RawMoney> for Money {
    type Error = PaymentError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.value, raw.currency)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Money", 3)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("currency", &self.currency)?;
        s.serialize_field("formatted", &self.formatted())?;
        s.end()
    }
}

impl Money {
    /// Create a normalized amount.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is zero, negative, or above
    /// the orchestrator's maximum.
    pub fn new(value: Decimal, currency: Currency) -> Result<Self, PaymentError> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::validation(
                "amount",
                "amount must be greater than zero",
            ));
        }
        // Rounding only ever reduces scale; rescale pads low-scale inputs
        // so the stored value is always exactly two decimal places.
        let mut normalized =
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(2);
        if normalized > MAX_AMOUNT {
            return Err(PaymentError::validation(
                "amount",
                format!("amount exceeds maximum of {}", MAX_AMOUNT),
            ));
        }
        if normalized <= Decimal::ZERO {
            // e.g. 0.001 rounds to 0.00
            return Err(PaymentError::validation(
                "amount",
                "amount rounds to zero",
            ));
        }
        Ok(Self {
            value: normalized,
            currency,
        })
    }

    /// The normalized decimal value (always two decimal places).
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Amount in integer minor units (cents).
    ///
    /// Cannot lose precision: values are normalized to two decimal places
    /// and bounded at construction.
    pub fn minor_units(&self) -> i64 {
        (self.value * Decimal::ONE_HUNDRED)
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Canonical rendering, e.g. `ZAR 100.00`.
    pub fn formatted(&self) -> String {
        format!("{} {:.2}", self.currency.code(), self.value)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}
