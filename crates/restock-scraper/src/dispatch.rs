//! Shop dispatch: the closed set of supported shops and the table mapping
//! each to its extraction engine, base address, and fetch wait hint.

use crate::engine::ExtractionEngine;
use crate::shops::{AlternateEngine, LdlcEngine, MaterielNetEngine, TopAchatEngine};
use crate::text::base_url_of;

/// The shops the pipeline knows how to extract. One variant per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopKind {
    TopAchat,
    Ldlc,
    MaterielNet,
    Alternate,
}

impl ShopKind {
    /// Resolves a shop name (as derived from seed URLs, e.g. `"ldlc.com"`)
    /// to its engine variant. Returns `None` for unsupported shops.
    #[must_use]
    pub fn from_shop_name(name: &str) -> Option<Self> {
        match name {
            "topachat.com" => Some(ShopKind::TopAchat),
            "ldlc.com" => Some(ShopKind::Ldlc),
            "materiel.net" => Some(ShopKind::MaterielNet),
            "alternate.be" => Some(ShopKind::Alternate),
            _ => None,
        }
    }

    /// The canonical shop name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ShopKind::TopAchat => "topachat.com",
            ShopKind::Ldlc => "ldlc.com",
            ShopKind::MaterielNet => "materiel.net",
            ShopKind::Alternate => "alternate.be",
        }
    }

    /// Base address used to absolutize relative hrefs when the seed URL
    /// yields none.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ShopKind::TopAchat => "https://www.topachat.com",
            ShopKind::Ldlc => "https://www.ldlc.com",
            ShopKind::MaterielNet => "https://www.materiel.net",
            ShopKind::Alternate => "https://www.alternate.be",
        }
    }

    /// Marker element the fetcher should wait for before the page is worth
    /// parsing. Only materiel.net renders prices late.
    #[must_use]
    pub fn wait_hint(self) -> Option<&'static str> {
        match self {
            ShopKind::MaterielNet => Some("o-product__price"),
            _ => None,
        }
    }

    /// Builds a fresh extraction engine for one crawl of this shop, with the
    /// base address taken from the first seed URL.
    #[must_use]
    pub fn build_engine(self, seed_url: &str) -> Box<dyn ExtractionEngine> {
        let base_url =
            base_url_of(seed_url).unwrap_or_else(|| self.default_base_url().to_owned());
        match self {
            ShopKind::TopAchat => Box::new(TopAchatEngine::new(base_url)),
            ShopKind::Ldlc => Box::new(LdlcEngine::new(base_url)),
            ShopKind::MaterielNet => Box::new(MaterielNetEngine::new(base_url)),
            ShopKind::Alternate => Box::new(AlternateEngine::new(base_url)),
        }
    }
}
