use super::*;
use crate::event::feed_page;
use restock_core::Currency;

const BASE: &str = "https://www.materiel.net";

fn engine() -> MaterielNetEngine {
    MaterielNetEngine::new(BASE.to_owned())
}

fn item(name: &str, href: &str, stock_id: &str, stock_text: &str, euros: &str, cents: &str) -> String {
    format!(
        r#"<li class="c-products-list__item ajax-product-item">
  <div class="c-product__meta">
    <a href="{href}"><h2 class="c-product__title">{name}</h2></a>
  </div>
  <div class="c-product__availability" data-stock-web="{stock_id}">
    <span class="o-availability__value o-availability__value--stock_{stock_id}">{stock_text}</span>
  </div>
  <div class="c-product__prices">
    <div class="o-product__prices hidden">
      <span class="o-product__price">{euros}<sup>{cents}</sup></span>
    </div>
  </div>
</li>"#
    )
}

fn pagination(active_href: &str, next_href: &str) -> String {
    format!(
        r#"<ul class="pagination">
  <li class="page-item active"><a href="{active_href}">1</a></li>
  <li class="page-item"><a href="{next_href}">2</a></li>
</ul>"#
    )
}

#[test]
fn extracts_a_complete_item() {
    let page = format!(
        "<ul>{}</ul>",
        item(
            "MSI GeForce RTX 3080 VENTUS 3X OC",
            "/produit/00183772.html",
            "1",
            "En stock",
            "849€",
            "95"
        )
    );
    let mut engine = engine();
    feed_page(&page, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.name, "MSI GeForce RTX 3080 VENTUS 3X OC");
    assert_eq!(product.url, "https://www.materiel.net/produit/00183772.html");
    assert_eq!(product.price, 849.95);
    assert_eq!(product.currency, Currency::Eur);
    assert!(product.available);
}

#[test]
fn maps_rupture_to_unavailable() {
    let page = item(
        "RTX 3090",
        "/produit/x.html",
        "2",
        "Rupture",
        "1 799€",
        "00",
    );
    let mut engine = engine();
    feed_page(&page, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 1);
    assert!(!products[0].available);
    assert_eq!(products[0].price, 1799.0);
}

#[test]
fn availability_span_must_carry_the_announced_stock_id() {
    // A span keyed to a different stock id is someone else's availability.
    let page = r#"<li class="ajax-product-item">
  <div class="c-product__meta">
    <a href="/produit/x.html"><h2 class="c-product__title">RTX 3080</h2></a>
  </div>
  <div class="c-product__availability" data-stock-web="1">
    <span class="o-availability__value--stock_9">En stock</span>
  </div>
  <div class="c-product__prices">
    <div class="o-product__prices"><span class="o-product__price">849€<sup>95</sup></span></div>
  </div>
</li>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);
    assert!(engine.results().is_empty());
}

#[test]
fn drops_item_missing_the_title() {
    let page = r#"<li class="ajax-product-item">
  <div class="c-product__availability" data-stock-web="1">
    <span class="o-availability__value--stock_1">En stock</span>
  </div>
  <div class="c-product__prices">
    <div class="o-product__prices"><span class="o-product__price">849€<sup>95</sup></span></div>
  </div>
</li>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);
    assert!(engine.results().is_empty());
}

#[test]
fn resolves_next_page_after_the_active_page_item() {
    let page = format!(
        "{}{}",
        item("RTX 3080", "/produit/a.html", "1", "En stock", "849€", "95"),
        pagination("/carte-graphique/l426/page1", "/carte-graphique/l426/page2")
    );
    let mut engine = engine();
    feed_page(&page, &mut engine);

    assert_eq!(
        engine.next_page(),
        Some("https://www.materiel.net/carte-graphique/l426/page2".to_owned())
    );
}

#[test]
fn honors_only_the_first_pagination_block() {
    let page = format!(
        "{}{}",
        pagination("/l426/page1", "/l426/page2"),
        pagination("/other/page8", "/other/page9")
    );
    let mut engine = engine();
    feed_page(&page, &mut engine);

    assert_eq!(
        engine.next_page(),
        Some("https://www.materiel.net/l426/page2".to_owned())
    );
}

#[test]
fn no_next_page_on_the_last_page() {
    // Last page: the active item is the final one, no following page-item.
    let page = r#"<ul class="pagination">
  <li class="page-item"><a href="/l426/page1">1</a></li>
  <li class="page-item active"><a href="/l426/page2">2</a></li>
</ul>"#;
    let mut engine = engine();
    feed_page(page, &mut engine);
    assert_eq!(engine.next_page(), None);
}

#[test]
fn pagination_state_resets_between_pages() {
    let page_one = pagination("/l426/page1", "/l426/page2");
    let page_two = r#"<ul class="pagination">
  <li class="page-item"><a href="/l426/page1">1</a></li>
  <li class="page-item active"><a href="/l426/page2">2</a></li>
</ul>"#;

    let mut engine = engine();
    feed_page(&page_one, &mut engine);
    assert!(engine.next_page().is_some());

    feed_page(page_two, &mut engine);
    assert_eq!(engine.next_page(), None);
}

#[test]
fn extracts_multiple_items() {
    let page = format!(
        "{}{}",
        item("RTX 3080", "/produit/a.html", "1", "En stock", "849€", "95"),
        item("RTX 3070", "/produit/b.html", "3", "Rupture", "549€", "00")
    );
    let mut engine = engine();
    feed_page(&page, &mut engine);

    let products = engine.results();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "RTX 3080");
    assert!(products[0].available);
    assert_eq!(products[1].name, "RTX 3070");
    assert!(!products[1].available);
}
