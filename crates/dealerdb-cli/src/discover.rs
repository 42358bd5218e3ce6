//! The `discover` subcommand.

use std::time::Duration;

use clap::Args;

use dealerdb_core::{DealerCandidate, PersistedDealer};
use dealerdb_scraper::{ChromeEngine, Discovery, Geocoder, StepTimeouts};

#[derive(Debug, Args)]
pub(crate) struct DiscoverArgs {
    /// German postal code to search around.
    #[arg(long)]
    postal_code: String,

    /// Manufacturer to scrape: kia, seat, opel, or all.
    #[arg(long, default_value = "all")]
    manufacturer: String,

    /// Merge the results into the catalog instead of previewing.
    #[arg(long)]
    save: bool,

    /// Emit raw JSON instead of the summary lines.
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: DiscoverArgs) -> anyhow::Result<()> {
    let config = dealerdb_core::load_app_config()?;

    let engine = ChromeEngine::new(Duration::from_secs(config.step_timeout_secs));
    let geocoder = Geocoder::new(
        &config.geocoder_base_url,
        &config.user_agent,
        Duration::from_secs(config.geocode_timeout_secs),
    )?;
    let timeouts = StepTimeouts::new(
        Duration::from_secs(config.nav_timeout_secs),
        Duration::from_secs(config.step_timeout_secs),
    );
    let discovery = Discovery::new(engine, geocoder, timeouts);

    if args.save {
        let pool_config = dealerdb_db::PoolConfig::from_app_config(&config);
        let pool = dealerdb_db::connect_pool(&config.database_url, pool_config).await?;
        dealerdb_db::run_migrations(&pool).await?;
        let catalog = dealerdb_db::PgDealerCatalog::new(pool);

        let result = discovery
            .discover_and_save(&catalog, &args.manufacturer, &args.postal_code)
            .await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        for dealer in &result.dealers {
            println!("  \u{2713} {}", dealer_line(dealer));
        }
        println!(
            "Run complete: {} dealers scraped, {} newly saved",
            result.scraped_count, result.saved_count
        );
    } else {
        let candidates = discovery
            .preview(&args.manufacturer, &args.postal_code)
            .await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
            return Ok(());
        }
        println!(
            "Found {} dealers for {}:",
            candidates.len(),
            args.postal_code
        );
        for candidate in &candidates {
            println!("  \u{2713} {}", candidate_line(candidate));
        }
    }

    Ok(())
}

fn candidate_line(candidate: &DealerCandidate) -> String {
    format!(
        "{:<40} {}, {} {}  [{}]",
        candidate.name,
        candidate.address.street,
        candidate.address.postal_code,
        candidate.address.city,
        candidate.manufacturer,
    )
}

fn dealer_line(dealer: &PersistedDealer) -> String {
    format!(
        "{:<40} {}, {} {}  [{}]",
        dealer.name,
        dealer.address.street,
        dealer.address.postal_code,
        dealer.address.city,
        dealer.manufacturer,
    )
}
