//! Parsing of the budget list endpoint's query parameters into filter
//! predicates.
//!
//! Each request builds its own [BudgetFilter] from the raw query string and
//! drops it when the request completes; no filter state is shared between
//! requests.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use common::{Budget, Currency};

/// The raw query parameters accepted by the budget list endpoint.
///
/// All parameters are optional and an empty string is treated the same as an
/// absent parameter.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetListParams {
    /// Exact balance to filter by, e.g. `200.00`.
    pub balance: Option<String>,
    /// Inclusive balance range `min,max`; either bound may be omitted but
    /// not both.
    pub balance_range: Option<String>,
    /// Comma separated list of currency codes, matched case-insensitively.
    pub currencies: Option<String>,
}

/// Errors from malformed filter parameters.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("\"{0}\" is not a valid decimal number")]
    InvalidDecimal(String),

    #[error("range must contain exactly two values")]
    InvalidRange,

    #[error("\"{0}\" is not a supported currency code")]
    UnknownCurrency(String),
}

/// An inclusive balance range with at least one bound.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceRange {
    /// Both bounds: `min,max`.
    Between(Decimal, Decimal),
    /// Lower bound only: `min,` or a bare `min`.
    AtLeast(Decimal),
    /// Upper bound only: `,max`.
    AtMost(Decimal),
}

impl BalanceRange {
    /// Parse a comma separated `min,max` string.
    ///
    /// ```
    /// use backend::filter::BalanceRange;
    /// use rust_decimal::Decimal;
    ///
    /// let range = BalanceRange::parse("150,250").unwrap();
    ///
    /// assert!(range.contains(Decimal::new(200, 0)));
    /// assert!(!range.contains(Decimal::new(300, 0)));
    /// ```
    ///
    /// # Errors
    ///
    /// This function will return an error if neither bound is present, or if
    /// a bound is not a valid decimal number.
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let bounds: Vec<&str> = text.split(',').map(str::trim).collect();

        if bounds.len() == 2 && !bounds.contains(&"") {
            return Ok(Self::Between(
                parse_decimal(bounds[0])?,
                parse_decimal(bounds[1])?,
            ));
        }

        if !bounds[0].is_empty() {
            return Ok(Self::AtLeast(parse_decimal(bounds[0])?));
        }

        if let Some(max) = bounds.get(1).filter(|max| !max.is_empty()) {
            return Ok(Self::AtMost(parse_decimal(max)?));
        }

        Err(FilterError::InvalidRange)
    }

    /// Whether `balance` falls within the range. Bounds are inclusive.
    pub fn contains(&self, balance: Decimal) -> bool {
        match self {
            Self::Between(min, max) => *min <= balance && balance <= *max,
            Self::AtLeast(min) => balance >= *min,
            Self::AtMost(max) => balance <= *max,
        }
    }
}

/// The filter predicates of a single budget list request, combined with
/// logical AND. An absent predicate places no constraint on the result.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetFilter {
    balance: Option<Decimal>,
    balance_range: Option<BalanceRange>,
    currencies: Option<Vec<Currency>>,
}

impl BudgetFilter {
    /// Build a filter from the raw query parameters.
    ///
    /// # Errors
    ///
    /// This function will return an error if any parameter holds a malformed
    /// decimal, a range without bounds, or an unknown currency code.
    pub fn parse(params: &BudgetListParams) -> Result<Self, FilterError> {
        let balance = match present(&params.balance) {
            Some(text) => Some(parse_decimal(text.trim())?),
            None => None,
        };

        let balance_range = match present(&params.balance_range) {
            Some(text) => Some(BalanceRange::parse(text)?),
            None => None,
        };

        let currencies = match present(&params.currencies) {
            Some(text) => Some(parse_currency_list(text)?),
            None => None,
        };

        Ok(Self {
            balance,
            balance_range,
            currencies,
        })
    }

    /// Whether `budget` satisfies every predicate in the filter.
    pub fn matches(&self, budget: &Budget) -> bool {
        if let Some(balance) = self.balance {
            if budget.balance() != balance {
                return false;
            }
        }

        if let Some(range) = &self.balance_range {
            if !range.contains(budget.balance()) {
                return false;
            }
        }

        if let Some(currencies) = &self.currencies {
            if !currencies.contains(&budget.currency()) {
                return false;
            }
        }

        true
    }
}

fn present(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|text| !text.is_empty())
}

fn parse_decimal(text: &str) -> Result<Decimal, FilterError> {
    Decimal::from_str(text).map_err(|_| FilterError::InvalidDecimal(text.to_string()))
}

fn parse_currency_list(text: &str) -> Result<Vec<Currency>, FilterError> {
    text.split(',')
        .map(|code| {
            let code = code.trim();

            Currency::from_str(code).map_err(|_| FilterError::UnknownCurrency(code.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod balance_range_tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{BalanceRange, FilterError};

    fn decimal(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn parse_both_bounds() {
        let range = BalanceRange::parse("150,250").unwrap();

        assert_eq!(range, BalanceRange::Between(decimal("150"), decimal("250")));
    }

    #[test]
    fn parse_min_only() {
        let range = BalanceRange::parse("150,").unwrap();

        assert_eq!(range, BalanceRange::AtLeast(decimal("150")));
    }

    #[test]
    fn parse_max_only() {
        let range = BalanceRange::parse(",250").unwrap();

        assert_eq!(range, BalanceRange::AtMost(decimal("250")));
    }

    #[test]
    fn parse_lone_comma_fails() {
        assert_eq!(BalanceRange::parse(","), Err(FilterError::InvalidRange));
    }

    #[test]
    fn parse_malformed_decimal_fails() {
        assert_eq!(
            BalanceRange::parse("abc,250"),
            Err(FilterError::InvalidDecimal("abc".to_string()))
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = BalanceRange::parse("150,250").unwrap();

        assert!(range.contains(decimal("150")));
        assert!(range.contains(decimal("250")));
        assert!(!range.contains(decimal("149.99")));
        assert!(!range.contains(decimal("250.01")));
    }
}

#[cfg(test)]
mod budget_filter_tests {
    use std::str::FromStr;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use common::{Budget, Currency, UserID};

    use super::{BudgetFilter, BudgetListParams, FilterError};

    fn budget(balance: &str, currency: Currency) -> Budget {
        Budget::new(
            1,
            currency,
            Decimal::from_str(balance).unwrap(),
            UserID::new(1),
            Utc::now(),
        )
    }

    fn params(
        balance: Option<&str>,
        balance_range: Option<&str>,
        currencies: Option<&str>,
    ) -> BudgetListParams {
        BudgetListParams {
            balance: balance.map(str::to_string),
            balance_range: balance_range.map(str::to_string),
            currencies: currencies.map(str::to_string),
        }
    }

    #[test]
    fn empty_params_match_everything() {
        let filter = BudgetFilter::parse(&BudgetListParams::default()).unwrap();

        assert!(filter.matches(&budget("100.00", Currency::UAH)));
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let filter = BudgetFilter::parse(&params(Some(""), Some(""), Some(""))).unwrap();

        assert!(filter.matches(&budget("100.00", Currency::UAH)));
    }

    #[test]
    fn exact_balance_filter_compares_numerically() {
        let filter = BudgetFilter::parse(&params(Some("200.00"), None, None)).unwrap();

        // "200" and "200.00" are the same number.
        assert!(filter.matches(&budget("200", Currency::UAH)));
        assert!(!filter.matches(&budget("100.00", Currency::UAH)));
        assert!(!filter.matches(&budget("300.00", Currency::UAH)));
    }

    #[test]
    fn exact_balance_filter_rejects_malformed_decimal() {
        let result = BudgetFilter::parse(&params(Some("two hundred"), None, None));

        assert_eq!(
            result,
            Err(FilterError::InvalidDecimal("two hundred".to_string()))
        );
    }

    #[test]
    fn range_filter_min_only() {
        let filter = BudgetFilter::parse(&params(None, Some("150,"), None)).unwrap();

        assert!(!filter.matches(&budget("100", Currency::UAH)));
        assert!(filter.matches(&budget("200", Currency::UAH)));
        assert!(filter.matches(&budget("300", Currency::UAH)));
    }

    #[test]
    fn range_filter_max_only() {
        let filter = BudgetFilter::parse(&params(None, Some(",250"), None)).unwrap();

        assert!(filter.matches(&budget("100", Currency::UAH)));
        assert!(filter.matches(&budget("200", Currency::UAH)));
        assert!(!filter.matches(&budget("300", Currency::UAH)));
    }

    #[test]
    fn range_filter_both_bounds() {
        let filter = BudgetFilter::parse(&params(None, Some("150,250"), None)).unwrap();

        assert!(!filter.matches(&budget("100", Currency::UAH)));
        assert!(filter.matches(&budget("200", Currency::UAH)));
        assert!(!filter.matches(&budget("300", Currency::UAH)));
    }

    #[test]
    fn currency_filter_is_case_insensitive() {
        let filter = BudgetFilter::parse(&params(None, None, Some("usd,eur"))).unwrap();

        assert!(filter.matches(&budget("100", Currency::USD)));
        assert!(filter.matches(&budget("100", Currency::EUR)));
        assert!(!filter.matches(&budget("100", Currency::UAH)));
    }

    #[test]
    fn currency_filter_rejects_unknown_code() {
        let result = BudgetFilter::parse(&params(None, None, Some("usd,doge")));

        assert_eq!(result, Err(FilterError::UnknownCurrency("doge".to_string())));
    }

    #[test]
    fn filters_combine_with_logical_and() {
        let filter =
            BudgetFilter::parse(&params(None, Some("150,"), Some("usd"))).unwrap();

        assert!(filter.matches(&budget("200", Currency::USD)));
        assert!(!filter.matches(&budget("200", Currency::EUR)));
        assert!(!filter.matches(&budget("100", Currency::USD)));
    }
}
