use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardwise_core::catalog::{CardCatalogGateway, StaticCatalog};
use cardwise_core::domain::SpendingProfile;
use cardwise_core::RecommendOptions;

mod seed;

#[derive(Debug, Parser)]
#[command(name = "cardwise_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the catalog for a spending profile and print the result as JSON.
    Recommend {
        /// Path to a SpendingProfile JSON document.
        #[arg(long)]
        profile: PathBuf,

        /// Read cards from this JSON file instead of the configured catalog.
        #[arg(long)]
        catalog_file: Option<PathBuf>,

        /// Defaults to RECOMMEND_MAX_RESULTS, then 5.
        #[arg(long)]
        max_results: Option<usize>,

        /// Skip cards listed in the profile's current_cards.
        #[arg(long)]
        exclude_held: bool,
    },

    /// Load the demo catalog into Postgres.
    SeedCatalog {
        /// Validate and log the catalog without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = cardwise_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = match args.command {
        Command::Recommend {
            profile,
            catalog_file,
            max_results,
            exclude_held,
        } => run_recommend(&settings, profile, catalog_file, max_results, exclude_held).await,
        Command::SeedCatalog { dry_run } => seed::run(&settings, dry_run).await,
    };

    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    res
}

async fn run_recommend(
    settings: &cardwise_core::config::Settings,
    profile_path: PathBuf,
    catalog_file: Option<PathBuf>,
    max_results: Option<usize>,
    exclude_held: bool,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&profile_path)
        .with_context(|| format!("failed to read profile {}", profile_path.display()))?;
    let profile: SpendingProfile =
        serde_json::from_str(&text).context("profile is not a valid SpendingProfile document")?;

    let gateway: Arc<dyn CardCatalogGateway> = match catalog_file {
        Some(path) => Arc::new(StaticCatalog::from_json_file(path)?),
        None => cardwise_core::catalog::connect_from_settings(settings).await?,
    };

    let mut opts = RecommendOptions::from_env();
    if let Some(n) = max_results {
        opts.max_results = n;
    }
    opts.exclude_held_cards = exclude_held;

    let items = cardwise_core::recommend(gateway.as_ref(), &profile, &opts).await?;

    tracing::info!(
        gateway = gateway.gateway_name(),
        returned = items.len(),
        "recommend run complete"
    );

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn init_sentry(settings: &cardwise_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
