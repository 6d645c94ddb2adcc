use restock_core::{Product, ProductDraft};

use crate::engine::ExtractionEngine;
use crate::event::{attr, class_equals, class_tokens_contain, MarkupEvent};
use crate::text::{absolute_url, parse_cents, parse_displayed_price};

/// Text materiel.net shows for an out-of-stock listing.
const OUT_OF_STOCK_TEXT: &str = "Rupture";

/// Extraction engine for materiel.net listing pages.
///
/// Item boundary: `<li class="... ajax-product-item ...">`. The availability
/// span is matched indirectly: the availability block carries a
/// `data-stock-web` id, and the span whose class embeds that id holds the
/// stock text. Pagination is the `ul.pagination` block, where the `li` after
/// the active `page-item` links to the next page; only the first pagination
/// block of a page is honored because the listing region can contain nested
/// paginator-like markup.
pub struct MaterielNetEngine {
    base_url: String,
    products: Vec<Product>,
    draft: ProductDraft,
    in_product: bool,
    in_meta: bool,
    in_title: bool,
    in_availability_block: bool,
    stock_web_id: Option<String>,
    in_availability: bool,
    in_price_category: bool,
    in_price_objects: bool,
    in_price: bool,
    in_pagination: bool,
    active_page_found: bool,
    in_next_page: bool,
    pagination_resolved: bool,
    next_page: Option<String>,
    last_open: String,
}

impl MaterielNetEngine {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            products: Vec::new(),
            draft: ProductDraft::default(),
            in_product: false,
            in_meta: false,
            in_title: false,
            in_availability_block: false,
            stock_web_id: None,
            in_availability: false,
            in_price_category: false,
            in_price_objects: false,
            in_price: false,
            in_pagination: false,
            active_page_found: false,
            in_next_page: false,
            pagination_resolved: false,
            next_page: None,
            last_open: String::new(),
        }
    }

    fn close_availability(&mut self) {
        self.in_availability = false;
        self.stock_web_id = None;
        self.in_availability_block = false;
    }

    fn close_price(&mut self) {
        self.in_price_category = false;
        self.in_price_objects = false;
        self.in_price = false;
    }

    fn close_product(&mut self) {
        self.in_product = false;
        self.in_meta = false;
        self.in_title = false;
        self.close_availability();
        self.close_price();
        if let Some(product) = std::mem::take(&mut self.draft).finalize() {
            self.products.push(product);
        }
    }

    fn handle_open(&mut self, name: &str, attrs: &[(String, String)]) {
        if !self.in_product
            && name == "li"
            && class_tokens_contain(attrs, "ajax-product-item")
        {
            self.in_product = true;
        }

        // Product meta block: canonical link and title.
        if !self.in_meta && name == "div" && class_equals(attrs, "c-product__meta") {
            self.in_meta = true;
        } else if self.in_meta {
            if name == "a" {
                if let Some(href) = attr(attrs, "href") {
                    self.draft.url = Some(absolute_url(&self.base_url, href));
                }
            } else if name == "h2" && class_equals(attrs, "c-product__title") {
                self.in_title = true;
            }
        }

        // Availability: the block announces a stock id, the span carrying
        // that id in its class holds the stock text.
        if name == "div" {
            if !self.in_availability_block && class_equals(attrs, "c-product__availability") {
                self.in_availability_block = true;
            }
            if self.in_availability_block {
                if let Some(id) = attr(attrs, "data-stock-web") {
                    self.stock_web_id = Some(id.to_owned());
                }
            }
        } else if name == "span" {
            if let Some(id) = self.stock_web_id.as_deref() {
                if self.in_availability_block
                    && class_tokens_contain(attrs, &format!("o-availability__value--stock_{id}"))
                {
                    self.in_availability = true;
                }
            }
        }

        // Price: category wrapper, then the price object list, then the
        // price span itself.
        if !self.in_price_objects && name == "div" {
            if !self.in_price_category && class_equals(attrs, "c-product__prices") {
                self.in_price_category = true;
            } else if self.in_price_category && class_tokens_contain(attrs, "o-product__prices") {
                self.in_price_objects = true;
            }
        } else if self.in_price_objects && name == "span" && class_equals(attrs, "o-product__price")
        {
            self.in_price = true;
        }

        // Pagination, honored once per page.
        if !self.pagination_resolved {
            if !self.in_pagination && name == "ul" && class_equals(attrs, "pagination") {
                self.in_pagination = true;
            } else if self.in_pagination && name == "li" {
                if !self.active_page_found
                    && class_tokens_contain(attrs, "page-item")
                    && class_tokens_contain(attrs, "active")
                {
                    self.active_page_found = true;
                } else if self.active_page_found && class_tokens_contain(attrs, "page-item") {
                    self.in_next_page = true;
                }
            } else if self.in_next_page && name == "a" {
                if let Some(href) = attr(attrs, "href") {
                    self.next_page = Some(absolute_url(&self.base_url, href));
                    self.in_next_page = false;
                    self.pagination_resolved = true;
                }
            }
        }
    }

    fn handle_text(&mut self, data: &str) {
        if self.in_title && self.last_open == "h2" {
            self.draft.name = Some(data.trim().to_owned());
            self.in_title = false;
        } else if self.in_availability && self.last_open == "span" {
            self.draft.available = Some(data.trim() != OUT_OF_STOCK_TEXT);
            self.close_availability();
        } else if self.in_price {
            if self.last_open == "span" {
                let (price, currency) = parse_displayed_price(data);
                self.draft.price = price;
                self.draft.currency = currency;
            } else if self.last_open == "sup" {
                if let (Some(price), Some(cents)) = (self.draft.price, parse_cents(data)) {
                    self.draft.price = Some(price + cents);
                }
                self.close_price();
            }
        }
    }

    fn handle_close(&mut self, name: &str) {
        if self.in_meta && name == "div" {
            self.in_meta = false;
        } else if self.in_product && name == "li" {
            self.close_product();
        } else if self.in_pagination && name == "ul" {
            self.in_pagination = false;
            self.pagination_resolved = true;
        }
    }
}

impl ExtractionEngine for MaterielNetEngine {
    fn begin_page(&mut self) {
        self.next_page = None;
        self.pagination_resolved = false;
        self.in_pagination = false;
        self.active_page_found = false;
        self.in_next_page = false;
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
#[path = "materielnet_test.rs"]
mod tests;
