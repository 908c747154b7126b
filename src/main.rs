use stay_feed::{
    FeedConfig, HttpListingSource, ListingFeed, LoadOutcome, MemoryStore, PriceFilter,
};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: stay-feed <config.yaml> <category> [pages] [minPrice]";

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = std::env::args().skip(1);
    let config_path = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let category = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let pages: usize = match args.next() {
        Some(raw) => raw.parse()?,
        None => 1,
    };
    let filter = match args.next() {
        Some(raw) => PriceFilter::try_from(raw.parse::<u64>()?)?,
        None => PriceFilter::default(),
    };

    let config = FeedConfig::load(&config_path)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    tracing::info!("Starting");

    runtime.block_on(
        async move {
            let source = HttpListingSource::new(&config)?;
            let feed = ListingFeed::new(MemoryStore::new(), source, &config);

            feed.enter(&category).await;
            feed.set_filter(&category, filter);

            for _ in 0..pages {
                match feed.load_more(&category).await? {
                    LoadOutcome::Appended { has_more: true, .. } => continue,
                    _ => break,
                }
            }

            for item in feed.items(&category) {
                tracing::info!(
                    id = item.id,
                    min_price = item.min_price,
                    region = %item.region,
                    "{}",
                    item.title
                );
            }

            Ok::<(), anyhow::Error>(())
        }
        .instrument(tracing::info_span!("Listing", %filter)),
    )
}
