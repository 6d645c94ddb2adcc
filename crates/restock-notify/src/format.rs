//! Notification message formatting.

use chrono::Duration;

use restock_core::Product;

/// Hardware hashtags appended to availability announcements. A pattern
/// matches when every one of its words appears in the product name; the
/// first match wins, so longer variants come before their prefixes.
const HASHTAGS: [(&str, &str); 7] = [
    ("rtx 3060 ti", "#nvidia #rtx3060ti"),
    ("rtx 3070", "#nvidia #rtx3070"),
    ("rtx 3080", "#nvidia #rtx3080"),
    ("rtx 3090", "#nvidia #rtx3090"),
    ("rx 6800 xt", "#amd #rx6800xt"),
    ("rx 6800", "#amd #rx6800"),
    ("rx 5700 xt", "#amd #rx5700xt"),
];

/// Message announcing a product becoming available.
#[must_use]
pub fn available_message(shop_name: &str, product: &Product) -> String {
    let price = format_price(product.price);
    let sign = product.currency.sign();
    let mut message = format!(
        "{shop_name}: {} for {price}{sign} is available at {}",
        product.name, product.url
    );
    if let Some(tags) = hashtags(&product.name) {
        message.push(' ');
        message.push_str(tags);
    }
    message
}

/// Reply posted into the thread when the product goes out of stock.
#[must_use]
pub fn closing_reply(open_duration: Duration) -> String {
    format!("And it's over ({})", format_duration(open_duration))
}

/// Renders a thread lifetime as total hours and zero-padded minutes,
/// e.g. `26h05m`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours}h{minutes:02}m")
}

/// Resolves the hashtag suffix for a product name, if any pattern matches.
#[must_use]
pub fn hashtags(product_name: &str) -> Option<&'static str> {
    let lower = product_name.to_lowercase();
    let words: Vec<&str> = lower.split(' ').collect();
    HASHTAGS
        .iter()
        .find(|(pattern, _)| pattern.split(' ').all(|word| words.contains(&word)))
        .map(|(_, tags)| *tags)
}

/// Prices are whole amounts for most shops; cents only show when present.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restock_core::Currency;

    fn product(name: &str, price: f64) -> Product {
        Product {
            name: name.to_owned(),
            url: "https://www.ldlc.com/fiche/PB123.html".to_owned(),
            price,
            currency: Currency::Eur,
            available: true,
        }
    }

    #[test]
    fn available_message_with_hashtags() {
        let message = available_message("ldlc.com", &product("MSI GeForce RTX 3080 VENTUS", 719.95));
        assert_eq!(
            message,
            "ldlc.com: MSI GeForce RTX 3080 VENTUS for 719.95€ is available at \
             https://www.ldlc.com/fiche/PB123.html #nvidia #rtx3080"
        );
    }

    #[test]
    fn available_message_without_hashtags() {
        let message = available_message("ldlc.com", &product("Intel NUC 11", 399.0));
        assert_eq!(
            message,
            "ldlc.com: Intel NUC 11 for 399€ is available at https://www.ldlc.com/fiche/PB123.html"
        );
    }

    #[test]
    fn whole_prices_render_without_decimals() {
        let message = available_message("topachat.com", &product("RX 6800 card", 649.0));
        assert!(message.contains("for 649€ "), "got: {message}");
    }

    #[test]
    fn hashtags_require_every_pattern_word() {
        assert_eq!(hashtags("ASUS RTX 3090 STRIX"), Some("#nvidia #rtx3090"));
        assert_eq!(hashtags("Sapphire RX 6800 XT Nitro+"), Some("#amd #rx6800xt"));
        assert_eq!(hashtags("random gpu"), None);
    }

    #[test]
    fn rx_6800_xt_wins_over_its_prefix() {
        // "rx 6800 xt" is listed before "rx 6800" so the XT card never gets
        // the plain 6800 tags.
        assert_eq!(hashtags("PowerColor RX 6800 XT"), Some("#amd #rx6800xt"));
        assert_eq!(hashtags("PowerColor RX 6800"), Some("#amd #rx6800"));
    }

    #[test]
    fn hashtag_matching_is_case_insensitive() {
        assert_eq!(hashtags("msi geforce rtx 3070 ventus"), Some("#nvidia #rtx3070"));
    }

    #[test]
    fn duration_renders_total_hours_and_padded_minutes() {
        assert_eq!(
            format_duration(Duration::hours(26) + Duration::minutes(5)),
            "26h05m"
        );
        assert_eq!(format_duration(Duration::minutes(42)), "0h42m");
        assert_eq!(
            format_duration(Duration::days(3) + Duration::minutes(10)),
            "72h10m"
        );
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_duration(Duration::minutes(-5)), "0h00m");
    }

    #[test]
    fn closing_reply_embeds_the_duration() {
        assert_eq!(
            closing_reply(Duration::hours(2) + Duration::minutes(30)),
            "And it's over (2h30m)"
        );
    }
}
