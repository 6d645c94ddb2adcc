use restock_core::{Product, ProductDraft};

use crate::engine::ExtractionEngine;
use crate::event::{attr, class_equals, class_tokens_contain, MarkupEvent};
use crate::text::{absolute_url, parse_cents, parse_displayed_price};

/// Text ldlc.com shows for an out-of-stock web listing.
const OUT_OF_STOCK_TEXT: &str = "Rupture";

/// Extraction engine for ldlc.com listing pages.
///
/// Item boundary: `<li class="pdt-item" id="pdt-…">` — both the class and
/// the id prefix must match, which keeps paginator `li` elements out. The
/// price arrives as two text events (whole euros in the price `div`, cents
/// in a nested `sup`). The next page comes from `ul.pagination` →
/// `li.next` → `a[href]`.
pub struct LdlcEngine {
    base_url: String,
    products: Vec<Product>,
    draft: ProductDraft,
    in_pdt_item: bool,
    has_pdt_id: bool,
    in_title: bool,
    in_stock: bool,
    in_price: bool,
    in_pagination: bool,
    in_next_section: bool,
    /// Only the first pagination block of a page is honored.
    pagination_resolved: bool,
    next_page: Option<String>,
    last_open: String,
}

impl LdlcEngine {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            products: Vec::new(),
            draft: ProductDraft::default(),
            in_pdt_item: false,
            has_pdt_id: false,
            in_title: false,
            in_stock: false,
            in_price: false,
            in_pagination: false,
            in_next_section: false,
            pagination_resolved: false,
            next_page: None,
            last_open: String::new(),
        }
    }

    fn in_item(&self) -> bool {
        self.in_pdt_item && self.has_pdt_id
    }

    fn close_item(&mut self) {
        self.in_pdt_item = false;
        self.has_pdt_id = false;
        self.in_title = false;
        self.in_stock = false;
        self.in_price = false;
        if let Some(product) = std::mem::take(&mut self.draft).finalize() {
            self.products.push(product);
        }
    }

    fn handle_open(&mut self, name: &str, attrs: &[(String, String)]) {
        if !self.in_item() && name == "li" && !self.in_pagination {
            if class_equals(attrs, "pdt-item") {
                self.in_pdt_item = true;
            }
            if attr(attrs, "id").is_some_and(|id| id.starts_with("pdt-")) {
                self.has_pdt_id = true;
            }
        } else if !self.in_pagination && name == "ul" {
            if class_equals(attrs, "pagination") && !self.pagination_resolved {
                self.in_pagination = true;
            }
        } else if self.in_pagination && name == "li" {
            if class_equals(attrs, "next") {
                self.in_next_section = true;
            }
        } else if self.in_next_section && name == "a" {
            if let Some(href) = attr(attrs, "href") {
                self.next_page = Some(absolute_url(&self.base_url, href));
                self.pagination_resolved = true;
            }
        } else if self.in_item() {
            match name {
                "h3" => self.in_title = true,
                "a" if self.in_title => {
                    if self.draft.url.is_none() {
                        if let Some(href) = attr(attrs, "href") {
                            self.draft.url = Some(absolute_url(&self.base_url, href));
                        }
                    }
                }
                "div" => {
                    if !self.in_stock && class_tokens_contain(attrs, "modal-stock-web") {
                        self.in_stock = true;
                    } else if !self.in_price && class_equals(attrs, "price") {
                        self.in_price = true;
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_text(&mut self, data: &str) {
        if self.in_title && self.draft.name.is_none() && self.last_open == "a" {
            self.draft.name = Some(data.trim().to_owned());
        } else if self.in_stock && self.draft.available.is_none() && self.last_open == "span" {
            self.draft.available = Some(data.trim() != OUT_OF_STOCK_TEXT);
        } else if self.in_price {
            if self.last_open == "div" {
                let (price, currency) = parse_displayed_price(data);
                self.draft.price = price;
                self.draft.currency = currency;
            } else if self.last_open == "sup" {
                if let (Some(price), Some(cents)) = (self.draft.price, parse_cents(data)) {
                    self.draft.price = Some(price + cents);
                }
            }
        }
    }

    fn handle_close(&mut self, name: &str) {
        if self.in_item() && name == "li" {
            self.close_item();
        } else if self.in_title && name == "h3" {
            self.in_title = false;
        } else if self.in_stock && name == "span" {
            self.in_stock = false;
        } else if self.in_price && name == "div" {
            self.in_price = false;
        } else if self.in_pagination && name == "ul" {
            self.in_pagination = false;
        } else if self.in_next_section && name == "a" {
            self.in_next_section = false;
        }
    }
}

impl ExtractionEngine for LdlcEngine {
    fn begin_page(&mut self) {
        self.next_page = None;
        self.pagination_resolved = false;
        self.in_pagination = false;
        self.in_next_section = false;
    }

    fn feed(&mut self, event: &MarkupEvent) {
        match event {
            MarkupEvent::Open { name, attrs } => {
                self.handle_open(name, attrs);
                self.last_open.clone_from(name);
            }
            MarkupEvent::Text { data } => self.handle_text(data),
            MarkupEvent::Close { name } => self.handle_close(name),
        }
    }

    fn results(&mut self) -> Vec<Product> {
        std::mem::take(&mut self.products)
    }

    fn next_page(&self) -> Option<String> {
        self.next_page.clone()
    }
}

#[cfg(test)]
#[path = "ldlc_test.rs"]
mod tests;
