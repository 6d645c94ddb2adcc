use super::*;
use crate::event::feed_page;
use restock_core::Currency;

const BASE: &str = "https://www.alternate.be";

fn engine() -> AlternateEngine {
    AlternateEngine::new(BASE.to_owned())
}

const ROW: &str = r#"<div class="listRow">
  <a href="/MSI/GeForce-RTX-3080-VENTUS/html/product/1694617?campaign=listing">
    <span class="name">MSI GeForce RTX 3080
      <span class="additional">grafische kaart</span>
    </span>
    <span class="price right">€ 869,-</span>
    <strong class="stockStatus available">in stock</strong>
  </a>
</div>"#;

#[test]
fn extracts_a_complete_row() {
    let mut engine = engine();
    feed_page(ROW, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.name, "MSI GeForce RTX 3080");
    assert_eq!(
        product.url,
        "https://www.alternate.be/MSI/GeForce-RTX-3080-VENTUS/html/product/1694617"
    );
    assert_eq!(product.price, 869.0);
    assert_eq!(product.currency, Currency::Eur);
    assert!(product.available);
}

#[test]
fn strips_query_string_from_the_product_url() {
    let mut engine = engine();
    feed_page(ROW, &mut engine);
    let products = engine.results();
    assert!(!products[0].url.contains('?'));
}

#[test]
fn accumulates_name_across_text_events_and_drops_decoration() {
    let page = r#"<div class="listRow">
  <a href="/html/product/1">
    <span class="name">ASUS GeForce RTX 3090 <br/> ROG STRIX grafische kaart
      <span class="additional">grafische kaart</span>
    </span>
    <span class="price">€ 1.999,-</span>
    <strong class="stockStatus available">in stock</strong>
  </a>
</div>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "ASUS GeForce RTX 3090 ROG STRIX");
}

#[test]
fn preorder_and_unsure_rows_are_unavailable() {
    for token in ["available_unsure", "preorder"] {
        let page = format!(
            r#"<div class="listRow">
  <a href="/html/product/2">
    <span class="name">Zotac RTX 3070</span>
    <span class="price">€ 599,-</span>
    <strong class="stockStatus {token}">soon</strong>
  </a>
</div>"#
        );
        let mut engine = engine();
        feed_page(&page, &mut engine);

        let products = engine.results();
        assert_eq!(products.len(), 1, "token {token}: expected one product");
        assert!(!products[0].available, "token {token}: expected unavailable");
    }
}

#[test]
fn price_without_currency_symbol_does_not_complete_the_field() {
    let page = r#"<div class="listRow">
  <a href="/html/product/3">
    <span class="name">Palit RTX 3060 Ti</span>
    <span class="price">call us</span>
    <strong class="stockStatus available">in stock</strong>
  </a>
</div>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);
    assert!(engine.results().is_empty());
}

#[test]
fn nested_div_closes_do_not_finalize_an_incomplete_row() {
    let page = r#"<div class="listRow">
  <div class="thumb"><a href="/html/product/4"></a></div>
  <span class="name">Gainward RTX 3080</span>
  <span class="price">€ 899,-</span>
  <strong class="stockStatus available">in stock</strong>
</div>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Gainward RTX 3080");
}

#[test]
fn row_missing_stock_status_is_dropped() {
    let page = r#"<div class="listRow">
  <a href="/html/product/5">
    <span class="name">Inno3D RTX 3080</span>
    <span class="price">€ 799,-</span>
  </a>
</div>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);
    assert!(engine.results().is_empty());
}

#[test]
fn has_no_pagination() {
    let mut engine = engine();
    feed_page(ROW, &mut engine);
    assert_eq!(engine.next_page(), None);
}
