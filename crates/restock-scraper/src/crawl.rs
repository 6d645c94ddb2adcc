//! Pagination driver: fixed-point iteration over one shop's listing pages.

use restock_core::Product;

use crate::engine::ExtractionEngine;
use crate::error::ScrapeError;
use crate::event::feed_page;
use crate::fetch::PageFetcher;

/// Crawls one shop: every seed URL is followed page by page until the
/// address resolved after parsing a page equals the address of that page.
/// A page with no next-page address resolves to its own address, so the
/// missing-paginator case is the same fixed point.
///
/// `max_pages` bounds each seed's chain as a backstop against cycling or
/// per-request-unique pagination links.
///
/// Returns every record the engine accumulated across all pages and seeds.
///
/// # Errors
///
/// - [`ScrapeError::PageLimit`] when a seed's chain exceeds `max_pages`.
/// - Any fetch error, which aborts this shop's crawl; pages already parsed
///   are discarded with it, other shops are unaffected.
pub async fn crawl_shop(
    fetcher: &dyn PageFetcher,
    engine: &mut dyn ExtractionEngine,
    seeds: &[String],
    wait_hint: Option<&str>,
    max_pages: usize,
) -> Result<Vec<Product>, ScrapeError> {
    for seed in seeds {
        let mut current = seed.clone();
        let mut pages = 0usize;

        loop {
            pages += 1;
            if pages > max_pages {
                return Err(ScrapeError::PageLimit {
                    url: seed.clone(),
                    max_pages,
                });
            }

            let html = fetcher.fetch(&current, wait_hint).await?;
            feed_page(&html, engine);
            tracing::debug!(url = %current, "page parsed");

            let next = engine.next_page().unwrap_or_else(|| current.clone());
            if next == current {
                break;
            }
            current = next;
        }
    }

    Ok(engine.results())
}
