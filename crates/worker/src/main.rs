use anyhow::Context;
use clap::Parser;
use fundscreen_core::exchange::{ExchangeLocator, ExchangeRules};
use fundscreen_core::mapping::openfigi::OpenFigiClient;
use fundscreen_core::mapping::IdentifierResolver;
use fundscreen_core::pipeline::FundEnricher;
use fundscreen_core::screening::zoya::ZoyaClient;
use fundscreen_core::screening::{ComplianceClassifier, ComplianceScreener};
use fundscreen_core::storage::{enriched, exchange_codes, holdings};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "fundscreen_worker")]
struct Args {
    /// Holdings CSV files. Each file is enriched as its own batch.
    #[arg(required_unless_present = "list_regions")]
    holdings: Vec<PathBuf>,

    /// Exchange-code reference table.
    #[arg(long, default_value = "OpenFIGI_Exchange_Codes.csv")]
    exchange_codes: PathBuf,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Load inputs and log candidate exchanges without calling any service.
    #[arg(long)]
    dry_run: bool,

    /// Print the screening service's regions and exit.
    #[arg(long)]
    list_regions: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fundscreen_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if args.list_regions {
        let zoya = ZoyaClient::from_settings(&settings)?;
        for region in zoya.regions().await? {
            println!("{region}");
        }
        return Ok(());
    }

    let rules = ExchangeRules::default();
    let table = exchange_codes::load_exchange_codes(&args.exchange_codes)?;
    let locator = ExchangeLocator::new(table, rules.clone());

    if args.dry_run {
        for input in &args.holdings {
            log_candidates(&locator, input)?;
        }
        return Ok(());
    }

    let outputs = enriched::output_paths(&args.holdings, &args.output_dir)?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("create output dir {} failed", args.output_dir.display()))?;

    let resolver = IdentifierResolver::new(
        OpenFigiClient::from_settings(&settings)?,
        settings.mapping_retry(),
    );
    let classifier = ComplianceClassifier::new(
        ZoyaClient::from_settings(&settings)?,
        settings.screening_retry(),
        rules,
    );
    let enricher = FundEnricher::new(locator, resolver, classifier, settings.progress_every);

    let mut batches = Vec::with_capacity(args.holdings.len());
    for (input, output) in args.holdings.iter().zip(&outputs) {
        batches.push(batch::run_batch(&enricher, input, output).await);
    }

    let summary = batch::RunSummary::new(batches);
    let summary_path = summary.write(&args.output_dir)?;
    let failed = summary.failed();

    tracing::info!(
        batches = summary.batches.len(),
        failed,
        summary = %summary_path.display(),
        "run finished"
    );

    anyhow::ensure!(failed == 0, "{failed} of {} batches failed", summary.batches.len());
    Ok(())
}

fn log_candidates(locator: &ExchangeLocator, input: &Path) -> anyhow::Result<()> {
    let holdings = holdings::load_holdings(input)?;
    for h in &holdings {
        let codes = locator
            .candidates(&h.country, h.isin_prefix())
            .into_iter()
            .map(|c| c.code)
            .collect::<Vec<_>>();
        tracing::info!(
            input = %input.display(),
            isin = %h.isin,
            country = %h.country,
            candidates = ?codes,
            dry_run = true,
            "candidate exchanges"
        );
    }
    Ok(())
}

fn init_sentry(settings: &fundscreen_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
