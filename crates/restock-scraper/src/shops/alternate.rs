use restock_core::{Product, ProductDraft};

use crate::engine::ExtractionEngine;
use crate::event::{attr, class_equals, class_tokens_contain, MarkupEvent};
use crate::text::{absolute_url, parse_displayed_price, strip_query};

/// Decoration alternate.be appends to graphics card names.
const NAME_DECORATION: &str = "grafische kaart";

/// Extraction engine for alternate.be listing pages.
///
/// Item boundary: `<div class="listRow">`. The name spans several text
/// events inside `span.name` (terminated by `span.additional`) and is
/// accumulated into one field. Availability comes from the `strong`
/// stock-status class tokens rather than from text. Row markup nests plain
/// `div`s, so the boundary close is the first `div` close at which the
/// record is complete. The listing has no paginator.
pub struct AlternateEngine {
    base_url: String,
    products: Vec<Product>,
    draft: ProductDraft,
    in_row: bool,
    in_name: bool,
    in_price: bool,
}

impl AlternateEngine {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            products: Vec::new(),
            draft: ProductDraft::default(),
            in_row: false,
            in_name: false,
            in_price: false,
        }
    }

    fn handle_open(&mut self, name: &str, attrs: &[(String, String)]) {
        if !self.in_row {
            if name == "div" && class_equals(attrs, "listRow") {
                self.in_row = true;
            }
            return;
        }

        match name {
            "a" => {
                if self.draft.url.is_none() {
                    if let Some(href) = attr(attrs, "href") {
                        self.draft.url = Some(absolute_url(&self.base_url, strip_query(href)));
                    }
                }
            }
            "span" => {
                if !self.in_name && class_equals(attrs, "name") {
                    self.in_name = true;
                } else if self.in_name && class_equals(attrs, "additional") {
                    self.in_name = false;
                }
                if !self.in_price && class_tokens_contain(attrs, "price") {
                    self.in_price = true;
                }
            }
            "strong" => {
                if class_tokens_contain(attrs, "stockStatus") {
                    let available = !class_tokens_contain(attrs, "available_unsure")
                        && !class_tokens_contain(attrs, "preorder");
                    self.draft.available = Some(available);
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, data: &str) {
        if self.in_name {
            let cleaned = data.replace(NAME_DECORATION, "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return;
            }
            match &mut self.draft.name {
                None => self.draft.name = Some(cleaned.to_owned()),
                Some(name) => {
                    name.push(' ');
                    name.push_str(cleaned);
                }
            }
        } else if self.in_price {
            let (price, currency) = parse_displayed_price(data);
            if let (Some(price), Some(currency)) = (price, currency) {
                self.draft.price = Some(price);
                self.draft.currency = Some(currency);
                self.in_price = false;
            }
        }
    }

    fn handle_close(&mut self, name: &str) {
        if name == "span" && self.in_price {
            self.in_price = false;
        } else if name == "div" && self.in_row && self.draft.is_complete() {
            self.in_row = false;
            self.in_name = false;
            if let Some(product) = std::mem::take(&mut self.draft).finalize() {
                self.products.push(product);
            }
        }
    }
}

impl ExtractionEngine for AlternateEngine {
    fn feed(&mut self, event: &MarkupEvent) {
        match event {
            MarkupEvent::Open { name, attrs } => self.handle_open(name, attrs),
            MarkupEvent::Text { data } => self.handle_text(data),
            MarkupEvent::Close { name } => self.handle_close(name),
        }
    }

    fn results(&mut self) -> Vec<Product> {
        std::mem::take(&mut self.products)
    }

    fn next_page(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
#[path = "alternate_test.rs"]
mod tests;
