//! Conversion of amounts into the base currency
//!
//! Rates come from `Settings::exchange_rates`; each rate converts one unit of
//! the foreign currency into the base currency.

use std::collections::BTreeMap;

use crate::config::Settings;
use crate::error::SpendwiseResult;
use crate::models::Money;

/// Converts amounts into the configured base currency
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    base: String,
    rates: BTreeMap<String, f64>,
}

impl CurrencyConverter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base: settings.base_currency.trim().to_uppercase(),
            rates: settings
                .exchange_rates
                .iter()
                .map(|(code, rate)| (code.trim().to_uppercase(), *rate))
                .collect(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base
    }

    /// Rate into the base currency; 1 for the base currency itself
    pub fn rate(&self, currency: &str) -> SpendwiseResult<f64> {
        let code = currency.trim().to_uppercase();
        if code.is_empty() || code == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(&code)
            .copied()
            .ok_or(crate::error::SpendwiseError::UnknownCurrency(code))
    }

    pub fn to_base(&self, amount: Money, currency: &str) -> SpendwiseResult<Money> {
        let rate = self.rate(currency)?;
        if rate == 1.0 {
            return Ok(amount);
        }
        Ok(amount.convert(rate))
    }

    /// Sum `(amount, currency)` pairs in the base currency
    pub fn sum<'a, I>(&self, items: I) -> SpendwiseResult<Money>
    where
        I: IntoIterator<Item = (Money, &'a str)>,
    {
        let mut total = Money::zero();
        for (amount, currency) in items {
            total += self.to_base(amount, currency)?;
        }
        Ok(total)
    }
}
