//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{format_summary, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_data_config,
};
use crate::domain::error::ShocktraderError;
use crate::domain::metrics::BacktestReport;
use crate::domain::universe::{load_price_table, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;

#[derive(Parser, Debug)]
#[command(
    name = "shocktrader",
    about = "Backtest low-correlation entries after benchmark volatility shocks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Trade log CSV (overrides [report] trades_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        benchmark: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Load a long-format price CSV into a SQLite database
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for the configured tickers
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// List tickers available in the data source
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            benchmark,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_deref(), benchmark.as_deref())
            }
        }
        Command::Import { csv, db } => run_import(&csv, &db),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::ListTickers { config } => run_list_tickers(&config),
    }
}

fn fail(err: &ShocktraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, ShocktraderError> {
    let defaults = BacktestConfig::default();

    let benchmark_ticker = adapter
        .get_string("backtest", "benchmark")
        .map(|s| s.to_uppercase())
        .unwrap_or(defaults.benchmark_ticker);

    let asset_pool = match adapter.get_string("backtest", "asset_pool") {
        Some(s) => parse_codes(&s).map_err(|e| ShocktraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "asset_pool".into(),
            reason: e.to_string(),
        })?,
        None => defaults.asset_pool,
    };

    let get_usize = |key: &str, default: usize| -> Result<usize, ShocktraderError> {
        usize::try_from(adapter.get_int("backtest", key, default as i64)).map_err(|_| {
            ShocktraderError::ConfigInvalid {
                section: "backtest".into(),
                key: key.into(),
                reason: "must be non-negative".into(),
            }
        })
    };

    Ok(BacktestConfig {
        benchmark_ticker,
        asset_pool,
        volatility_window: get_usize("volatility_window", defaults.volatility_window)?,
        correlation_window: get_usize("correlation_window", defaults.correlation_window)?,
        holding_period: get_usize("holding_period", defaults.holding_period)?,
        trigger_threshold: adapter.get_double(
            "backtest",
            "trigger_threshold",
            defaults.trigger_threshold,
        ),
        friction_cost: adapter.get_double("backtest", "friction_cost", defaults.friction_cost),
        num_assets_to_pick: get_usize("num_assets_to_pick", defaults.num_assets_to_pick)?,
        start_date: parse_optional_date(adapter, "start_date")?,
        end_date: parse_optional_date(adapter, "end_date")?,
    })
}

pub fn open_data_port(adapter: &dyn ConfigPort) -> Result<Box<dyn DataPort>, ShocktraderError> {
    validate_data_config(adapter)?;
    let source = adapter
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string())
        .to_lowercase();

    match source.as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(adapter)?))
        }
        "csv" => {
            let path = adapter.get_string("data", "csv_path").unwrap_or_default();
            Ok(Box::new(CsvAdapter::new(PathBuf::from(path))))
        }
        other => Err(ShocktraderError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("source '{}' is not available in this build", other),
        }),
    }
}

/// Loads every configured ticker and runs the engine.
pub fn execute_backtest(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
) -> Result<(BacktestResult, BacktestReport), ShocktraderError> {
    let start = config.start_date.unwrap_or(NaiveDate::MIN);
    let end = config.end_date.unwrap_or(NaiveDate::MAX);

    let (table, summary) = load_price_table(data_port, &config.tickers(), start, end)?;
    info!(
        "Loaded {} prices for {} tickers",
        table.total_points(),
        summary.loaded.len()
    );
    for ticker in &summary.missing {
        warn!("{} has no prices and will never be picked", ticker);
    }

    let result = backtest_engine::run_backtest(&table, config)?;
    let report = result.report();
    Ok((result, report))
}

fn run_backtest(
    config_path: &Path,
    output_override: Option<&Path>,
    benchmark_override: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    let mut bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    if let Some(b) = benchmark_override {
        bt_config.benchmark_ticker = b.to_uppercase();
    }

    let data_port = match open_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    info!(
        "Running backtest: benchmark {}, pool {}",
        bt_config.benchmark_ticker,
        bt_config.asset_pool.join(", ")
    );

    let (result, report) = match execute_backtest(data_port.as_ref(), &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print!("{}", format_summary(&report));

    let output = output_override
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "trades_path").map(PathBuf::from));

    if let Some(path) = output {
        let reporter = match adapter.get_string("report", "summary_path") {
            Some(summary) => CsvReportAdapter::new().with_summary_path(PathBuf::from(summary)),
            None => CsvReportAdapter::new(),
        };
        if let Err(e) = reporter.write(&result, &report, &path) {
            return fail(&e);
        }
        info!("Trade log written to: {}", path.display());
        info!(
            "Report summary written to: {}",
            reporter.summary_path_for(&path).display()
        );
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter).and_then(|_| validate_data_config(&adapter))
    {
        return fail(&e);
    }

    let c = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!("Config validated successfully");
    eprintln!("\nParameters:");
    eprintln!("  benchmark:          {}", c.benchmark_ticker);
    eprintln!("  asset_pool:         {}", c.asset_pool.join(", "));
    eprintln!("  volatility_window:  {}", c.volatility_window);
    eprintln!("  correlation_window: {}", c.correlation_window);
    eprintln!("  holding_period:     {}", c.holding_period);
    eprintln!("  trigger_threshold:  {}", c.trigger_threshold);
    eprintln!("  friction_cost:      {}", c.friction_cost);
    eprintln!("  num_assets_to_pick: {}", c.num_assets_to_pick);
    if let Some(d) = c.start_date {
        eprintln!("  start_date:         {}", d);
    }
    if let Some(d) = c.end_date {
        eprintln!("  end_date:           {}", d);
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_backtest_config(&adapter).and_then(|_| validate_data_config(&adapter)) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_import(csv_path: &Path, db_path: &Path) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::domain::price::PriceTable;

        let points = match CsvAdapter::new(csv_path.to_path_buf()).read_all() {
            Ok(p) => p,
            Err(e) => return fail(&e),
        };

        // Reject duplicate ticker-days before touching the database.
        let table = match PriceTable::from_points(points.clone()) {
            Ok(t) => t,
            Err(e) => return fail(&e),
        };

        let adapter = match SqliteAdapter::open(db_path, 1) {
            Ok(a) => a,
            Err(e) => return fail(&e),
        };
        let inserted = match adapter
            .initialize_schema()
            .and_then(|_| adapter.insert_points(&points))
        {
            Ok(n) => n,
            Err(e) => return fail(&e),
        };

        info!(
            "Imported {} prices for {} tickers into {}",
            inserted,
            table.len(),
            db_path.display()
        );
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (csv_path, db_path);
        eprintln!("error: sqlite feature is required for import");
        ExitCode::from(1)
    }
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let tickers = match ticker {
        Some(t) => vec![t.to_uppercase()],
        None => match build_backtest_config(&adapter) {
            Ok(c) => c.tickers(),
            Err(e) => return fail(&e),
        },
    };

    let data_port = match open_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    for t in &tickers {
        match data_port.get_data_range(t) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} prices, {} to {}", t, count, min_date, max_date);
            }
            Ok(None) => eprintln!("{}: no data found", t),
            Err(e) => eprintln!("error querying {}: {}", t, e),
        }
    }
    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match open_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match data_port.list_tickers() {
        Ok(tickers) if tickers.is_empty() => {
            eprintln!("No tickers found");
            ExitCode::SUCCESS
        }
        Ok(tickers) => {
            for t in &tickers {
                println!("{}", t);
            }
            eprintln!("{} tickers found", tickers.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
