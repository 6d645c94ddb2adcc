//! Markup event source.
//!
//! Listing pages are lowered into a flat stream of open/close/text events by
//! `quick-xml` running in a lenient configuration (unmatched and misnamed
//! closing tags accepted, empty elements expanded into balanced pairs,
//! whitespace-only text dropped). The extraction engines consume this stream
//! only — they never see raw markup.
//!
//! Real shop pages are HTML, not XML. The reader copes with the common
//! divergences; when it hits something it cannot tokenize, the parse pass for
//! that page ends there and the records completed so far survive.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::engine::ExtractionEngine;

/// One markup event, as consumed by [`ExtractionEngine::feed`].
///
/// Tag and attribute names are lowercased; attribute values are
/// entity-unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Close {
        name: String,
    },
    Text {
        data: String,
    },
}

/// Returns the value of the named attribute, if present.
#[must_use]
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Returns `true` when the named attribute equals `expected` exactly.
#[must_use]
pub fn attr_eq(attrs: &[(String, String)], name: &str, expected: &str) -> bool {
    attr(attrs, name) == Some(expected)
}

/// Returns `true` when the `class` attribute equals `value` exactly
/// (no token splitting).
#[must_use]
pub fn class_equals(attrs: &[(String, String)], value: &str) -> bool {
    attr_eq(attrs, "class", value)
}

/// Returns `true` when `token` appears in the whitespace-separated `class`
/// attribute token list.
#[must_use]
pub fn class_tokens_contain(attrs: &[(String, String)], token: &str) -> bool {
    attr(attrs, "class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|t| t == token))
}

/// Splits the `class` attribute into its tokens.
#[must_use]
pub fn class_tokens(attrs: &[(String, String)]) -> Vec<String> {
    attr(attrs, "class")
        .map(|classes| {
            classes
                .split_ascii_whitespace()
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Feeds one page of markup into the engine as a stream of [`MarkupEvent`]s.
///
/// Calls [`ExtractionEngine::begin_page`] first so page-scoped state (the
/// pending next-page address and its resolution guard) starts fresh.
pub fn feed_page(html: &str, engine: &mut dyn ExtractionEngine) {
    engine.begin_page();

    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;
    config.expand_empty_elements = true;
    config.allow_unmatched_ends = true;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(e.name().as_ref());
                let attrs = lower_attrs(&e);
                engine.feed(&MarkupEvent::Open { name, attrs });
            }
            Ok(Event::End(e)) => {
                let name = tag_name(e.name().as_ref());
                engine.feed(&MarkupEvent::Close { name });
            }
            Ok(Event::Text(e)) => {
                let data = e.unescape().map_or_else(
                    |_| String::from_utf8_lossy(e.as_ref()).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                if !data.is_empty() {
                    engine.feed(&MarkupEvent::Text { data });
                }
            }
            Ok(Event::CData(e)) => {
                let data = String::from_utf8_lossy(e.as_ref()).into_owned();
                if !data.is_empty() {
                    engine.feed(&MarkupEvent::Text { data });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "markup not tokenizable; ending parse pass early");
                break;
            }
            // Doctype, comments, and processing instructions carry no
            // extraction signal.
            Ok(_) => {}
        }
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn lower_attrs(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .with_checks(false)
        .filter_map(Result::ok)
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).to_ascii_lowercase();
            let value = a.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&a.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            (key, value)
        })
        .collect()
}
