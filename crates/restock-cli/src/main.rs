use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

use restock_core::{passes_all, Filter, Notifier, Product};
use restock_db::ShopRow;
use restock_notify::WebhookNotifier;
use restock_scraper::{crawl_shop, HttpPageFetcher, ShopKind};

#[derive(Debug, Parser)]
#[command(name = "restock")]
#[command(about = "Track product price and availability across shops")]
struct Cli {
    /// Shops file location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print more output
    #[arg(short, long)]
    verbose: bool,

    /// Print even more output
    #[arg(short, long)]
    debug: bool,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,

    /// Logging file location
    #[arg(short = 'o', long)]
    log_file: Option<PathBuf>,

    /// Do not send notifications
    #[arg(short = 'N', long)]
    disable_notifications: bool,

    /// Number of shops crawled concurrently
    #[arg(short, long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let mut config = restock_core::load_app_config()?;
    if let Some(path) = cli.config.clone() {
        config.shops_path = path;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let shops_file = restock_core::load_shops_file(&config.shops_path)?;
    let filters: Arc<Vec<Box<dyn Filter>>> = Arc::new(match &shops_file.filters {
        Some(filters_config) => restock_core::build_filters(filters_config)?,
        None => Vec::new(),
    });
    let shops = restock_core::group_urls_by_shop(&shops_file.urls);

    let pool = restock_db::connect_pool(&config.database_url).await?;
    restock_db::run_migrations(&pool).await?;

    let shop_names: Vec<String> = shops.keys().cloned().collect();
    restock_db::upsert_shops(&pool, &shop_names).await?;

    let notifier = build_notifier(&cli, &config)?;
    let fetcher = Arc::new(HttpPageFetcher::new(
        config.fetch_timeout_secs,
        &config.user_agent,
        config.element_wait_secs,
    )?);

    let shop_rows = restock_db::list_shops(&pool).await?;
    let workers = config.workers.max(1);
    let max_pages = config.max_pages;

    let outcomes: Vec<bool> = stream::iter(shop_rows)
        .map(|shop| {
            let pool = pool.clone();
            let fetcher = Arc::clone(&fetcher);
            let filters = Arc::clone(&filters);
            let notifier = notifier.clone();
            let urls = shops.get(&shop.name).cloned();
            async move {
                process_shop(&pool, &fetcher, &filters, notifier, shop, urls, max_pages).await
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|succeeded| !**succeeded).count();
    if failed > 0 {
        tracing::warn!(failed, total = outcomes.len(), "some shops failed this cycle");
    }

    Ok(())
}

/// Crawls one shop and applies its records to the store. A failure here only
/// affects this shop's cycle; concurrent shops keep running.
async fn process_shop(
    pool: &SqlitePool,
    fetcher: &HttpPageFetcher,
    filters: &[Box<dyn Filter>],
    notifier: Option<Arc<WebhookNotifier>>,
    shop: ShopRow,
    urls: Option<Vec<String>>,
    max_pages: usize,
) -> bool {
    let Some(urls) = urls.filter(|urls| !urls.is_empty()) else {
        tracing::warn!(shop = %shop.name, "cannot find urls for shop in the configuration file");
        return true;
    };
    let Some(kind) = ShopKind::from_shop_name(&shop.name) else {
        tracing::warn!(shop = %shop.name, "shop not supported");
        return true;
    };

    let mut engine = kind.build_engine(&urls[0]);
    let products = match crawl_shop(
        fetcher,
        engine.as_mut(),
        &urls,
        kind.wait_hint(),
        max_pages,
    )
    .await
    {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(shop = %shop.name, error = %e, "crawl aborted");
            return false;
        }
    };

    let kept: Vec<Product> = products
        .into_iter()
        .filter(|product| passes_all(filters, product))
        .collect();
    tracing::debug!(shop = %shop.name, records = kept.len(), "records extracted");

    let notifier_ref = notifier.as_deref().map(|n| n as &dyn Notifier);
    match restock_db::upsert_products(pool, &shop, &kept, notifier_ref).await {
        Ok(summary) => {
            tracing::info!(
                shop = %shop.name,
                created = summary.created,
                updated = summary.updated,
                unchanged = summary.unchanged,
                "shop cycle complete"
            );
            true
        }
        Err(e) => {
            tracing::error!(shop = %shop.name, error = %e, "cannot persist extracted records");
            false
        }
    }
}

fn build_notifier(
    cli: &Cli,
    config: &restock_core::AppConfig,
) -> anyhow::Result<Option<Arc<WebhookNotifier>>> {
    if cli.disable_notifications {
        return Ok(None);
    }
    let Some(endpoint) = &config.webhook_url else {
        tracing::info!("no webhook endpoint configured; notifications disabled");
        return Ok(None);
    };
    let notifier = WebhookNotifier::new(
        endpoint,
        config.webhook_token.as_deref(),
        config.webhook_timeout_secs,
    )?;
    Ok(Some(Arc::new(notifier)))
}

fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder.with_writer(Arc::new(file)).with_ansi(false).init();
        }
        None => builder.init(),
    }
    Ok(())
}
