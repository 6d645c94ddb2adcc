pub mod config;
pub mod detect;
pub mod error;
pub mod filter;
pub mod notify;
pub mod product;

pub use config::{group_urls_by_shop, load_app_config, load_shops_file, AppConfig, ShopsFile};
pub use detect::{decide, diff, Decision, FieldChanges, ThreadAction};
pub use error::ConfigError;
pub use filter::{build_filters, passes_all, Filter};
pub use notify::Notifier;
pub use product::{Currency, PersistedProduct, Product, ProductDraft};
