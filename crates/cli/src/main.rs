//! AutoValue Command Line Interface
//!
//! Values used-vehicle listings and projects their depreciation.

use anyhow::{Context, Result};
use autovalue_engine::{AppraisalService, DepreciationRequest, EngineConfig, VehicleRecord};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "autovalue")]
#[command(author = "AutoValue Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Used-vehicle valuation and depreciation", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the valuation model and print the training report
    Train {
        /// Corpus size
        #[arg(long)]
        samples: Option<usize>,
        /// Corpus seed
        #[arg(long)]
        seed: Option<u64>,
        /// Number of trees in the forest
        #[arg(long)]
        trees: Option<usize>,
    },
    /// Estimate the fair price of a vehicle and score its listing
    Value(VehicleArgs),
    /// Project the depreciation of a purchase
    Depreciate(DepreciateArgs),
    /// Valuation followed by depreciation of the fair price
    Analyze(VehicleArgs),
    /// Print the annual depreciation rate of every known make
    Rates,
}

#[derive(Args, Debug, Clone)]
struct VehicleArgs {
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    year: i32,
    /// Odometer reading in kilometres
    #[arg(long)]
    mileage: i64,
    #[arg(long)]
    trim: String,
    /// Provincial code, e.g. ON
    #[arg(long)]
    province: String,
    /// Asking price of the listing
    #[arg(long)]
    listing_price: Option<i64>,
}

impl From<VehicleArgs> for VehicleRecord {
    fn from(args: VehicleArgs) -> Self {
        let record = VehicleRecord::new(
            args.make,
            args.model,
            args.year,
            args.mileage,
            args.trim,
            args.province,
        );
        match args.listing_price {
            Some(price) => record.with_listing_price(price),
            None => record,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct DepreciateArgs {
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    /// Purchase price
    #[arg(long, alias = "purchase-price")]
    price: i64,
    /// Purchase year; defaults to the reference year
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    mileage: Option<i64>,
    #[arg(long)]
    province: Option<String>,
}

impl From<DepreciateArgs> for DepreciationRequest {
    fn from(args: DepreciateArgs) -> Self {
        let mut request = DepreciationRequest::new(args.make, args.model, args.price);
        request.year = args.year;
        request.mileage = args.mileage;
        request.province = args.province;
        request
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateEntry {
    make: String,
    annual_depreciation_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RatesOutput {
    rates: Vec<RateEntry>,
    default_rate: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Commands::Train {
        samples,
        seed,
        trees,
    } = &cli.command
    {
        if let Some(samples) = samples {
            config.corpus.samples = *samples;
        }
        if let Some(seed) = seed {
            config.corpus.seed = *seed;
        }
        if let Some(trees) = trees {
            config.valuation.forest.num_trees = *trees;
        }
        config.validate().context("Invalid training options")?;
    }

    init_logging(&config, cli.verbose)?;
    info!("AutoValue v{}", env!("CARGO_PKG_VERSION"));

    let service = AppraisalService::new(config);

    match cli.command {
        Commands::Train { .. } => {
            let report = service.warm_up().context("Training failed")?;
            print_json(report)
        }
        Commands::Value(args) => {
            service.warm_up().context("Training failed")?;
            let result = service
                .valuation(&VehicleRecord::from(args))
                .context("Valuation failed")?;
            info!(confidence = %result.confidence_label(), "valuation complete");
            print_json(&result)
        }
        Commands::Depreciate(args) => {
            let result = service
                .depreciation(&DepreciationRequest::from(args))
                .context("Depreciation failed")?;
            print_json(&result)
        }
        Commands::Analyze(args) => {
            service.warm_up().context("Training failed")?;
            let analysis = service
                .full_analysis(&VehicleRecord::from(args))
                .context("Analysis failed")?;
            print_json(&analysis)
        }
        Commands::Rates => print_json(&rates_output(&service)),
    }
}

fn init_logging(config: &EngineConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn rates_output(service: &AppraisalService) -> RatesOutput {
    let rates = service.rates();
    let percent = |rate: f64| (rate * 1_000.0).round() / 10.0;

    RatesOutput {
        rates: rates
            .iter()
            .map(|(make, rate)| RateEntry {
                make: make.to_string(),
                annual_depreciation_rate: percent(rate),
            })
            .collect(),
        default_rate: percent(rates.default_rate()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
