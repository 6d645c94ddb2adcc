use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currencies the extraction engines can recognize.
///
/// The set is closed on purpose: a price whose currency symbol is not in this
/// set never completes its record, so the record is dropped at the item
/// boundary rather than persisted with a currency the rest of the pipeline
/// cannot interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    /// ISO 4217 code, as stored in the database.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Symbol used when rendering prices in notification messages.
    #[must_use]
    pub fn sign(self) -> char {
        match self {
            Currency::Eur => '€',
            Currency::Usd => '$',
        }
    }

    /// Detects a currency from a literal symbol embedded in scraped text
    /// (e.g. `"1 234€95"`).
    #[must_use]
    pub fn from_symbol_in(text: &str) -> Option<Self> {
        if text.contains('€') {
            Some(Currency::Eur)
        } else if text.contains('$') {
            Some(Currency::Usd)
        } else {
            None
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(UnknownCurrency(other.to_owned())),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// One product observation extracted from a listing page.
///
/// Instances are only ever produced by [`ProductDraft::finalize`], so every
/// field is guaranteed present. A `Product` lives from item-boundary close
/// until the store has applied it; the extraction layer never retains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Absolute listing URL.
    pub url: String,
    pub price: f64,
    pub currency: Currency,
    pub available: bool,
}

/// Mutable accumulator filled in while traversing one item boundary.
///
/// Finalized into an immutable [`Product`] when the boundary closes; a draft
/// missing any required field yields `None` and is dropped silently.
#[derive(Debug, Default, Clone)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub available: Option<bool>,
}

impl ProductDraft {
    /// Returns `true` once every required field has been captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.url.is_some()
            && self.price.is_some()
            && self.currency.is_some()
            && self.available.is_some()
    }

    /// Consumes the draft, yielding a [`Product`] when complete.
    #[must_use]
    pub fn finalize(self) -> Option<Product> {
        Some(Product {
            name: self.name?,
            url: self.url?,
            price: self.price?,
            currency: self.currency?,
            available: self.available?,
        })
    }
}

/// The persisted state of a product, as seen by the change detector.
///
/// This is a storage-agnostic snapshot: the database layer maps its row type
/// into this shape before asking for a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedProduct {
    pub name: String,
    pub url: String,
    pub price: f64,
    pub currency: Currency,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the currently open availability thread, if any.
    pub thread_id: Option<i64>,
}
