use restock_core::{Product, ProductDraft};

use crate::engine::ExtractionEngine;
use crate::event::{attr, attr_eq, class_equals, class_tokens_contain, MarkupEvent};
use crate::text::absolute_url;

/// Schema.org marker topachat.com puts on sold-out items.
const OUT_OF_STOCK_HREF: &str = "http://schema.org/OutOfStock";

/// Extraction engine for topachat.com listing pages.
///
/// Item boundary: `<article class="... grille-produit ...">`. Availability,
/// price, and currency come from schema.org microdata attributes; the name
/// and URL come from the `div.libelle` block. The listing has no paginator.
pub struct TopAchatEngine {
    base_url: String,
    products: Vec<Product>,
    draft: ProductDraft,
    in_item: bool,
    /// Inside `div.libelle`, waiting for the product link and `h3` title.
    in_label: bool,
    last_open: String,
}

impl TopAchatEngine {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            products: Vec::new(),
            draft: ProductDraft::default(),
            in_item: false,
            in_label: false,
            last_open: String::new(),
        }
    }

    /// Strips the bundle suffix topachat.com appends to names,
    /// e.g. `"MSI RTX 3080 + Azerty pack"` → `"MSI RTX 3080"`.
    fn clean_name(data: &str) -> String {
        data.split(" + ").next().unwrap_or(data).trim().to_owned()
    }

    fn handle_open(&mut self, name: &str, attrs: &[(String, String)]) {
        if !self.in_item {
            if name == "article" && class_tokens_contain(attrs, "grille-produit") {
                self.in_item = true;
            }
            return;
        }

        match name {
            "link" => {
                if attr_eq(attrs, "itemprop", "availability") {
                    if let Some(href) = attr(attrs, "href") {
                        self.draft.available = Some(href != OUT_OF_STOCK_HREF);
                    }
                }
            }
            "div" => {
                if attr_eq(attrs, "itemprop", "price") {
                    if let Some(content) = attr(attrs, "content") {
                        self.draft.price = content.parse::<f64>().ok();
                    }
                } else if class_equals(attrs, "libelle") {
                    self.in_label = true;
                }
            }
            "meta" => {
                if attr_eq(attrs, "itemprop", "priceCurrency") {
                    if let Some(content) = attr(attrs, "content") {
                        self.draft.currency = content.parse().ok();
                    }
                }
            }
            "a" => {
                if self.in_label && self.draft.url.is_none() {
                    if let Some(href) = attr(attrs, "href") {
                        self.draft.url = Some(absolute_url(&self.base_url, href));
                    }
                }
            }
            _ => {}
        }
    }
}

impl ExtractionEngine for TopAchatEngine {
    fn feed(&mut self, event: &MarkupEvent) {
        match event {
            MarkupEvent::Open { name, attrs } => {
                self.last_open.clone_from(name);
                self.handle_open(name, attrs);
            }
            MarkupEvent::Text { data } => {
                if self.in_item
                    && self.in_label
                    && self.last_open == "h3"
                    && self.draft.name.is_none()
                {
                    self.draft.name = Some(Self::clean_name(data));
                    self.in_label = false;
                }
            }
            MarkupEvent::Close { name } => {
                if self.in_item && name == "article" {
                    self.in_item = false;
                    self.in_label = false;
                    if let Some(product) = std::mem::take(&mut self.draft).finalize() {
                        self.products.push(product);
                    }
                }
            }
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
#[path = "topachat_test.rs"]
mod tests;
