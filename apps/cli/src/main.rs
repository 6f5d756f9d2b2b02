use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{builder::Builder, Table};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valu_core::{AggregatorStrategy, BankMethod, DdmVariant};
use valu_engine::{Config, Overrides, ValuationOutcome};
use valu_providers::{Aggregator, AlphaVantageAdapter, FmpAdapter, YahooAdapter};

/// Equity valuation engine: CAPM/WACC, DCF/DDM/RIM/relative-multiples,
/// bank hybrid composite, scenario and sensitivity analysis.
#[derive(Parser)]
#[command(name = "valu", version, about = "Multi-method equity valuation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit raw JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full fair-value estimate for a ticker
    Value {
        ticker: String,

        /// Emit a pessimistic/base/optimistic scenario bundle instead of a
        /// single fair-value run
        #[arg(long)]
        scenario: bool,

        /// Aggregation strategy across providers
        #[arg(long, value_enum, default_value = "first-available")]
        strategy: StrategyArg,

        /// DDM variant used for financial-services names
        #[arg(long, value_enum, default_value = "gordon")]
        ddm_variant: DdmVariantArg,

        /// Bank valuation method used for financial-services names
        #[arg(long, value_enum, default_value = "hybrid")]
        bank_method: BankMethodArg,

        /// Override WACC instead of deriving it from fundamentals
        #[arg(long)]
        wacc: Option<f64>,

        /// Override the terminal growth rate
        #[arg(long)]
        terminal_growth: Option<f64>,
    },

    /// Compute WACC / cost of equity for a ticker
    Wacc {
        ticker: String,

        #[arg(long, value_enum, default_value = "first-available")]
        strategy: StrategyArg,
    },

    /// Run a 2-D WACC x terminal-growth sensitivity grid
    Sensitivity {
        ticker: String,

        /// Comma-separated WACC values, e.g. "0.06,0.08,0.10"
        #[arg(long, value_delimiter = ',')]
        wacc_grid: Vec<f64>,

        /// Comma-separated terminal-growth values, e.g. "0.02,0.03,0.04"
        #[arg(long, value_delimiter = ',')]
        growth_grid: Vec<f64>,

        #[arg(long, value_enum, default_value = "first-available")]
        strategy: StrategyArg,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum StrategyArg {
    FirstAvailable,
    BestQuality,
    Merge,
}

impl From<StrategyArg> for AggregatorStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::FirstAvailable => AggregatorStrategy::FirstAvailable,
            StrategyArg::BestQuality => AggregatorStrategy::BestQuality,
            StrategyArg::Merge => AggregatorStrategy::Merge,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum DdmVariantArg {
    Gordon,
    TwoStage,
    HModel,
}

impl From<DdmVariantArg> for DdmVariant {
    fn from(value: DdmVariantArg) -> Self {
        match value {
            DdmVariantArg::Gordon => DdmVariant::Gordon,
            DdmVariantArg::TwoStage => DdmVariant::TwoStage,
            DdmVariantArg::HModel => DdmVariant::HModel,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum BankMethodArg {
    Rim,
    PbRoe,
    Ddm,
    Hybrid,
}

impl From<BankMethodArg> for BankMethod {
    fn from(value: BankMethodArg) -> Self {
        match value {
            BankMethodArg::Rim => BankMethod::Rim,
            BankMethodArg::PbRoe => BankMethod::PbRoe,
            BankMethodArg::Ddm => BankMethod::Ddm,
            BankMethodArg::Hybrid => BankMethod::Hybrid,
        }
    }
}

fn build_aggregator(config: &Config) -> Aggregator {
    let mut adapters: Vec<Box<dyn valu_providers::ProviderAdapter>> =
        vec![Box::new(YahooAdapter::new())];
    if let Some(key) = &config.alpha_vantage_api_key {
        adapters.push(Box::new(AlphaVantageAdapter::new(key.clone())));
    }
    if let Some(key) = &config.fmp_api_key {
        adapters.push(Box::new(FmpAdapter::new(key.clone())));
    }
    Aggregator::new(adapters)
        .with_fan_out(config.aggregator_fan_out)
        .with_adapter_timeout(config.adapter_timeout)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valu_engine=info,valu_providers=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = run(cli.command, &config).await;
    match result {
        Ok(value) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&value).unwrap());
            } else {
                print_table(&value);
            }
        }
        Err(err) => {
            eprintln!("{}: {}", "error".red().bold(), err);
            process::exit(1);
        }
    }
}

async fn run(command: Commands, config: &Config) -> Result<serde_json::Value, anyhow::Error> {
    match command {
        Commands::Value {
            ticker,
            scenario,
            strategy,
            ddm_variant,
            bank_method,
            wacc,
            terminal_growth,
        } => {
            let aggregator = build_aggregator(config);
            let overrides = Overrides {
                strategy: strategy.into(),
                ddm_variant: ddm_variant.into(),
                bank_method: bank_method.into(),
                wacc_override: wacc,
                terminal_growth_override: terminal_growth,
                ..Overrides::default()
            };
            let outcome =
                valu_engine::value_equity(&ticker, &aggregator, &overrides, config, scenario)
                    .await?;
            let value = match outcome {
                ValuationOutcome::Single(result) => serde_json::to_value(result)?,
                ValuationOutcome::Scenario(bundle) => serde_json::to_value(bundle)?,
            };
            Ok(value)
        }
        Commands::Wacc { ticker, strategy } => {
            let aggregator = build_aggregator(config);
            let overrides = Overrides {
                strategy: strategy.into(),
                ..Overrides::default()
            };
            let (data, _score) = aggregator
                .fetch(&ticker, overrides.horizon_years as u32, overrides.strategy)
                .await?;
            let result = valu_engine::compute_wacc(&data, &overrides, config).await;
            Ok(serde_json::to_value(result)?)
        }
        Commands::Sensitivity {
            ticker,
            wacc_grid,
            growth_grid,
            strategy,
        } => {
            if wacc_grid.is_empty() || growth_grid.is_empty() {
                return Err(anyhow::anyhow!(
                    "--wacc-grid and --growth-grid must each list at least one value"
                ));
            }
            let aggregator = build_aggregator(config);
            let overrides = Overrides {
                strategy: strategy.into(),
                ..Overrides::default()
            };
            let (data, _score) = aggregator
                .fetch(&ticker, overrides.horizon_years as u32, overrides.strategy)
                .await?;
            let matrix =
                valu_engine::sensitivity(&data, &wacc_grid, &growth_grid, &overrides, config).await?;
            Ok(serde_json::json!({
                "wacc_grid": wacc_grid,
                "growth_grid": growth_grid,
                "upside_matrix": matrix,
            }))
        }
    }
}

fn print_table(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
        other => println!("{other}"),
    }
}

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}
