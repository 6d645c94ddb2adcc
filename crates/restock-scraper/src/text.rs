//! Shared text post-processing for scraped fragments.

use restock_core::Currency;

/// Parses a price rendered for display, e.g. `"1 234€"` or `"€ 1.299,-"`.
///
/// Every digit in the fragment is concatenated and read as a whole amount
/// (shops render thousands separators inconsistently; none of them put cents
/// in the same text node as the amount). The currency comes from a literal
/// symbol in the fragment.
#[must_use]
pub(crate) fn parse_displayed_price(text: &str) -> (Option<f64>, Option<Currency>) {
    let currency = Currency::from_symbol_in(text);
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let price = digits.parse::<i64>().ok().map(|p| p as f64);
    (price, currency)
}

/// Parses a superscript cents fragment, e.g. `"95"` → `0.95`.
#[must_use]
pub(crate) fn parse_cents(text: &str) -> Option<f64> {
    text.trim().parse::<i64>().ok().map(|c| c as f64 / 100.0)
}

/// Resolves a captured href against the shop's base address.
#[must_use]
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_owned()
    } else {
        format!("{base_url}{href}")
    }
}

/// Drops the query string from an href (transient tracking parameters).
#[must_use]
pub(crate) fn strip_query(href: &str) -> &str {
    href.split('?').next().unwrap_or(href)
}

/// Extracts `scheme://host` from a URL, e.g. the shop base address from a
/// seed URL.
#[must_use]
pub(crate) fn base_url_of(url: &str) -> Option<String> {
    let scheme_end = url.find("://")? + 3;
    let host_end = url[scheme_end..]
        .find('/')
        .map_or(url.len(), |i| scheme_end + i);
    if scheme_end == host_end {
        None
    } else {
        Some(url[..host_end].to_owned())
    }
}
