//! Product filters applied between extraction and persistence.
//!
//! A product survives the chain only when every configured filter includes
//! it. Filters only ever narrow the set — an absent or non-matching filter
//! includes everything.

use regex::Regex;

use crate::config::{FiltersConfig, RangeConfig};
use crate::error::ConfigError;
use crate::product::{Currency, Product};

/// Default currency for range filters that do not name one.
const DEFAULT_RANGE_CURRENCY: Currency = Currency::Eur;

pub trait Filter: Send + Sync {
    /// Returns `true` when the product should be kept.
    fn include(&self, product: &Product) -> bool;
}

/// Keeps products whose name matches the regex.
pub struct IncludeFilter {
    regex: Regex,
}

impl IncludeFilter {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFilterRegex`] when the pattern does not
    /// compile.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            regex: compile(pattern)?,
        })
    }
}

impl Filter for IncludeFilter {
    fn include(&self, product: &Product) -> bool {
        if self.regex.is_match(&product.name) {
            return true;
        }
        tracing::debug!(
            name = %product.name,
            "product excluded: name does not match the include regex"
        );
        false
    }
}

/// Drops products whose name matches the regex.
pub struct ExcludeFilter {
    regex: Regex,
}

impl ExcludeFilter {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFilterRegex`] when the pattern does not
    /// compile.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            regex: compile(pattern)?,
        })
    }
}

impl Filter for ExcludeFilter {
    fn include(&self, product: &Product) -> bool {
        if self.regex.is_match(&product.name) {
            tracing::debug!(
                name = %product.name,
                "product excluded: name matches the exclude regex"
            );
            return false;
        }
        true
    }
}

/// Keeps products matching `model` only when their price lies inside
/// `[min, max]`; `max == 0` is unbounded above. Products whose name does not
/// match the model are always kept.
pub struct RangeFilter {
    model: Regex,
    min: f64,
    max: f64,
    currency: Currency,
}

impl RangeFilter {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFilterRegex`] when the model pattern
    /// does not compile.
    pub fn new(
        model: &str,
        min: f64,
        max: f64,
        currency: Option<Currency>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            model: compile(model)?,
            min,
            max,
            currency: currency.unwrap_or(DEFAULT_RANGE_CURRENCY),
        })
    }
}

impl Filter for RangeFilter {
    fn include(&self, product: &Product) -> bool {
        if !self.model.is_match(&product.name) {
            return true;
        }

        // No live rate conversion: a price in another currency cannot be
        // compared against the bounds, so the product is kept.
        if product.currency != self.currency {
            tracing::warn!(
                name = %product.name,
                price_currency = %product.currency,
                filter_currency = %self.currency,
                "range filter skipped: currencies differ"
            );
            return true;
        }

        if self.max == 0.0 && self.min <= product.price {
            return true;
        }
        if self.min <= product.price && product.price <= self.max {
            return true;
        }

        tracing::debug!(
            name = %product.name,
            price = product.price,
            "product excluded: price outside the configured range"
        );
        false
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidFilterRegex {
        pattern: pattern.to_owned(),
        source,
    })
}

/// Builds the filter chain declared in the shops file.
///
/// # Errors
///
/// Returns `ConfigError` when a regex fails to compile or a range names an
/// unknown currency code.
pub fn build_filters(config: &FiltersConfig) -> Result<Vec<Box<dyn Filter>>, ConfigError> {
    let mut filters: Vec<Box<dyn Filter>> = Vec::new();

    if let Some(pattern) = &config.include {
        filters.push(Box::new(IncludeFilter::new(pattern)?));
    }
    if let Some(pattern) = &config.exclude {
        filters.push(Box::new(ExcludeFilter::new(pattern)?));
    }
    for range in &config.ranges {
        filters.push(Box::new(range_filter_from(range)?));
    }

    Ok(filters)
}

fn range_filter_from(range: &RangeConfig) -> Result<RangeFilter, ConfigError> {
    let currency = match &range.currency {
        Some(code) => Some(code.parse::<Currency>().map_err(|e| {
            ConfigError::Validation(format!("range filter for {}: {e}", range.model))
        })?),
        None => None,
    };
    RangeFilter::new(&range.model, range.min, range.max, currency)
}

/// Applies the chain: a product is kept only when every filter includes it.
#[must_use]
pub fn passes_all(filters: &[Box<dyn Filter>], product: &Product) -> bool {
    filters.iter().all(|f| f.include(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: f64, currency: Currency) -> Product {
        Product {
            name: name.to_owned(),
            url: "https://www.ldlc.com/fiche/PB123.html".to_owned(),
            price,
            currency,
            available: true,
        }
    }

    #[test]
    fn include_filter_keeps_matching_names() {
        let filter = IncludeFilter::new("(?i)rtx").unwrap();
        assert!(filter.include(&product("MSI RTX 3080", 719.0, Currency::Eur)));
        assert!(!filter.include(&product("Intel NUC", 299.0, Currency::Eur)));
    }

    #[test]
    fn exclude_filter_drops_matching_names() {
        let filter = ExcludeFilter::new("(?i)occasion").unwrap();
        assert!(!filter.include(&product("RTX 3080 occasion", 600.0, Currency::Eur)));
        assert!(filter.include(&product("RTX 3080", 719.0, Currency::Eur)));
    }

    #[test]
    fn range_filter_keeps_non_matching_models() {
        let filter = RangeFilter::new("(?i)rtx 3080", 500.0, 900.0, None).unwrap();
        assert!(filter.include(&product("RX 6800 XT", 1500.0, Currency::Eur)));
    }

    #[test]
    fn range_filter_enforces_bounds_on_matching_models() {
        let filter = RangeFilter::new("(?i)rtx 3080", 500.0, 900.0, None).unwrap();
        assert!(filter.include(&product("RTX 3080 FE", 719.0, Currency::Eur)));
        assert!(!filter.include(&product("RTX 3080 Strix", 1450.0, Currency::Eur)));
        assert!(!filter.include(&product("RTX 3080 refurb", 450.0, Currency::Eur)));
    }

    #[test]
    fn range_filter_zero_max_is_unbounded_above() {
        let filter = RangeFilter::new("(?i)rtx 3090", 800.0, 0.0, None).unwrap();
        assert!(filter.include(&product("RTX 3090", 2500.0, Currency::Eur)));
        assert!(!filter.include(&product("RTX 3090", 750.0, Currency::Eur)));
    }

    #[test]
    fn range_filter_includes_on_currency_mismatch() {
        let filter = RangeFilter::new("(?i)rtx 3080", 500.0, 900.0, Some(Currency::Usd)).unwrap();
        assert!(filter.include(&product("RTX 3080", 1450.0, Currency::Eur)));
    }

    #[test]
    fn chain_requires_every_filter_to_include() {
        let config = FiltersConfig {
            include: Some("(?i)rtx".to_owned()),
            exclude: Some("(?i)occasion".to_owned()),
            ranges: vec![],
        };
        let filters = build_filters(&config).unwrap();
        assert!(passes_all(
            &filters,
            &product("RTX 3080", 719.0, Currency::Eur)
        ));
        assert!(!passes_all(
            &filters,
            &product("RTX 3080 occasion", 719.0, Currency::Eur)
        ));
        assert!(!passes_all(
            &filters,
            &product("Radeon VII", 719.0, Currency::Eur)
        ));
    }

    #[test]
    fn empty_chain_includes_everything() {
        let filters = build_filters(&FiltersConfig::default()).unwrap();
        assert!(passes_all(
            &filters,
            &product("anything", 1.0, Currency::Eur)
        ));
    }

    #[test]
    fn build_filters_rejects_bad_regex() {
        let config = FiltersConfig {
            include: Some("(unclosed".to_owned()),
            exclude: None,
            ranges: vec![],
        };
        assert!(matches!(
            build_filters(&config),
            Err(ConfigError::InvalidFilterRegex { .. })
        ));
    }

    #[test]
    fn build_filters_rejects_unknown_range_currency() {
        let config = FiltersConfig {
            include: None,
            exclude: None,
            ranges: vec![RangeConfig {
                model: "rtx".to_owned(),
                min: 0.0,
                max: 100.0,
                currency: Some("GBP".to_owned()),
            }],
        };
        assert!(matches!(
            build_filters(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
