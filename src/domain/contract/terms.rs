//! Contract terms value objects.
//!
//! Money is always integer minor units (cents); floats never reach the domain.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// ISO 4217 currency code, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter currency code",
            ));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn usd() -> Self {
        Self("usd".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contract length in 30-day months, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DurationMonths(u8);

impl DurationMonths {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 12;

    pub fn new(months: i64) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&months) {
            return Err(ValidationError::out_of_range(
                "duration_months",
                Self::MIN,
                Self::MAX,
                months,
            ));
        }
        Ok(Self(months as u8))
    }

    pub fn months(&self) -> i64 {
        i64::from(self.0)
    }

    pub fn days(&self) -> i64 {
        self.months() * 30
    }
}

impl TryFrom<i64> for DurationMonths {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DurationMonths> for i64 {
    fn from(value: DurationMonths) -> Self {
        value.months()
    }
}

/// Configured bounds applied when a client proposes terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermsLimits {
    pub min_amount: Money,
    pub max_amount: Money,
}

impl Default for TermsLimits {
    fn default() -> Self {
        Self {
            min_amount: Money::from_cents(1_000),
            max_amount: Money::from_cents(50_000),
        }
    }
}

/// Validated commercial terms of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub amount: Money,
    pub currency: Currency,
    pub duration: DurationMonths,
    pub description: String,
}

impl ContractTerms {
    pub const DESCRIPTION_MIN_CHARS: usize = 10;
    pub const DESCRIPTION_MAX_CHARS: usize = 500;

    /// Validates raw terms against the configured limits.
    pub fn new(
        amount_cents: i64,
        currency: &str,
        duration_months: i64,
        description: &str,
        limits: &TermsLimits,
    ) -> Result<Self, ValidationError> {
        let (min, max) = (limits.min_amount.cents(), limits.max_amount.cents());
        if amount_cents <= 0 || amount_cents < min || amount_cents > max {
            return Err(ValidationError::out_of_range("amount", min, max, amount_cents));
        }
        let currency = Currency::new(currency)?;
        let duration = DurationMonths::new(duration_months)?;

        let description = description.trim();
        let chars = description.chars().count();
        if chars == 0 {
            return Err(ValidationError::empty_field("description"));
        }
        if !(Self::DESCRIPTION_MIN_CHARS..=Self::DESCRIPTION_MAX_CHARS).contains(&chars) {
            return Err(ValidationError::out_of_range(
                "description",
                Self::DESCRIPTION_MIN_CHARS as i64,
                Self::DESCRIPTION_MAX_CHARS as i64,
                chars as i64,
            ));
        }

        Ok(Self {
            amount: Money::from_cents(amount_cents),
            currency,
            duration,
            description: description.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DESCRIPTION: &str = "Monthly nutrition follow-up";

    #[test]
    fn accepts_terms_inside_limits() {
        let terms = ContractTerms::new(5_000, "USD", 1, DESCRIPTION, &TermsLimits::default())
            .unwrap();
        assert_eq!(terms.amount.cents(), 5_000);
        assert_eq!(terms.currency.as_str(), "usd");
        assert_eq!(terms.duration.days(), 30);
    }

    #[test]
    fn rejects_amount_below_minimum() {
        let err = ContractTerms::new(999, "usd", 1, DESCRIPTION, &TermsLimits::default())
            .unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn rejects_short_description_after_trimming() {
        let err = ContractTerms::new(5_000, "usd", 1, "   too short  ", &TermsLimits::default())
            .unwrap_err();
        assert_eq!(err.field(), "description");
    }

    #[test]
    fn rejects_malformed_currency() {
        assert!(Currency::new("us").is_err());
        assert!(Currency::new("u$d").is_err());
    }

    #[test]
    fn money_displays_two_decimals() {
        assert_eq!(Money::from_cents(5_005).to_string(), "50.05");
        assert_eq!(Money::from_cents(-120).to_string(), "-1.20");
    }

    #[test]
    fn duration_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<DurationMonths>("13").is_err());
        assert_eq!(
            serde_json::from_str::<DurationMonths>("6").unwrap().months(),
            6
        );
    }

    proptest! {
        #[test]
        fn duration_accepts_exactly_one_through_twelve(months in -50i64..50) {
            prop_assert_eq!(DurationMonths::new(months).is_ok(), (1..=12).contains(&months));
        }

        #[test]
        fn amount_accepted_iff_within_limits(cents in -10_000i64..100_000) {
            let limits = TermsLimits::default();
            let ok = ContractTerms::new(cents, "usd", 3, DESCRIPTION, &limits).is_ok();
            prop_assert_eq!(ok, (1_000..=50_000).contains(&cents));
        }
    }
}
