use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use tabstat::cleaning::{self, DataType};
use tabstat::{AnalysisConfig, Analyzer, Dataset, OutlierMethod, Result};

#[derive(Parser)]
#[command(name = "tabstat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Descriptive statistics and column profiling for JSON datasets")]
struct Cli {
    /// Analysis config (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "TABSTAT_CONFIG")]
    config: Option<PathBuf>,

    /// Analyze columns one after another
    #[arg(long, global = true)]
    sequential: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile every column, or a single one
    Analyze {
        input: PathBuf,
        #[arg(long)]
        column: Option<String>,
    },
    /// Correlation matrix of the given numeric columns (all numeric columns by default)
    Correlate {
        input: PathBuf,
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Summary insights
    Insights { input: PathBuf },
    /// Outliers of one numeric column
    Outliers {
        input: PathBuf,
        #[arg(long)]
        column: String,
        #[arg(long, value_enum, default_value = "iqr")]
        method: MethodArg,
        /// IQR multiplier or Z-score threshold; the configured value by default
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Histogram of one numeric column
    Distribution {
        input: PathBuf,
        #[arg(long)]
        column: String,
        #[arg(long)]
        bins: Option<usize>,
    },
    /// Missing values, duplicates and detected types, without changing anything
    CleanPreview {
        input: PathBuf,
        #[arg(long)]
        column: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Iqr,
    Zscore,
}

#[derive(Serialize)]
struct ColumnPreview {
    column: String,
    data_type: DataType,
    missing: usize,
}

#[derive(Serialize)]
struct CleanPreview {
    rows: usize,
    duplicates: usize,
    columns: Vec<ColumnPreview>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };
    Ok(if cli.sequential { config.with_parallel(false) } else { config })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let analyzer = Analyzer::new(load_config(&cli)?)?;

    match cli.command {
        Commands::Analyze { input, column } => {
            let dataset = Dataset::from_json_file(input)?;
            match column {
                Some(column) => print_json(&analyzer.analyze_column(&dataset, &column)?),
                None => print_json(&analyzer.analyze(&dataset)?),
            }
        }
        Commands::Correlate { input, columns } => {
            let dataset = Dataset::from_json_file(input)?;
            let matrix = if columns.is_empty() {
                analyzer.correlate_all(&dataset)?
            } else {
                analyzer.correlate(&dataset, columns.as_slice())?
            };
            print_json(&matrix)
        }
        Commands::Insights { input } => {
            let dataset = Dataset::from_json_file(input)?;
            print_json(&analyzer.insights(&dataset)?)
        }
        Commands::Outliers {
            input,
            column,
            method,
            threshold,
        } => {
            let dataset = Dataset::from_json_file(input)?;
            let config = analyzer.config();
            let method = match method {
                MethodArg::Iqr => OutlierMethod::Iqr {
                    multiplier: threshold.unwrap_or(config.iqr_multiplier),
                },
                MethodArg::Zscore => OutlierMethod::ZScore {
                    threshold: threshold.unwrap_or(config.zscore_threshold),
                },
            };
            print_json(&analyzer.outliers(&dataset, &column, Some(method))?)
        }
        Commands::Distribution { input, column, bins } => {
            let dataset = Dataset::from_json_file(input)?;
            print_json(&analyzer.distribution(&dataset, &column, bins)?)
        }
        Commands::CleanPreview { input, column } => {
            let dataset = Dataset::from_json_file(input)?;
            let names: Vec<String> = match column {
                Some(column) => vec![column],
                None => dataset.columns().to_vec(),
            };
            let sample_size = analyzer.config().type_sample_size;

            let mut columns = Vec::with_capacity(names.len());
            for name in names {
                columns.push(ColumnPreview {
                    data_type: cleaning::column_data_type(&dataset, &name, sample_size)?,
                    missing: cleaning::missing_count(&dataset, &name)?,
                    column: name,
                });
            }

            print_json(&CleanPreview {
                rows: dataset.row_count(),
                duplicates: cleaning::duplicate_count(&dataset),
                columns,
            })
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
