//! CLI commands implementation.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings_with_options, Config, LoadOptions, Settings};
use crate::models::{CellValue, Dataset, DatasetKind, ProviderResult};
use crate::parsers;
use crate::services::AnalysisService;
use crate::store::DatasetStore;

use super::helpers::{check_file_admissible, format_bytes, truncate};

#[derive(Parser)]
#[command(name = "dsight")]
#[command(about = "Document analysis with multi-provider LLM commentary")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data and reports directories
    Init,

    /// Analyze a whole file with every configured provider
    Analyze {
        /// File to analyze (csv, xls, xlsx, pdf)
        file: PathBuf,
        /// Session ID forwarded to providers that track conversations
        #[arg(long)]
        session: Option<String>,
    },

    /// Analyze only the first rows of a file
    AnalyzeRows {
        /// File to analyze (csv, xls, xlsx, pdf)
        file: PathBuf,
        /// Number of rows to analyze
        #[arg(short, long, default_value = "15")]
        rows: usize,
        /// Session ID forwarded to providers that track conversations
        #[arg(long)]
        session: Option<String>,
    },

    /// Show a page of rows from a file
    Data {
        /// File to load
        file: PathBuf,
        /// Row offset to start from
        #[arg(short, long, default_value = "0")]
        offset: usize,
        /// Maximum number of rows to show
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// Show column sums and distinct counts for a file
    Summary {
        /// File to load
        file: PathBuf,
    },

    /// Show chart series derived from a file's numeric columns
    Charts {
        /// File to load
        file: PathBuf,
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show system status
    Status,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
        ..LoadOptions::default()
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => cmd_init(&settings, &config).await,
        Commands::Analyze { file, session } => {
            cmd_analyze(&settings, &config, &file, session).await
        }
        Commands::AnalyzeRows {
            file,
            rows,
            session,
        } => cmd_analyze_rows(&settings, &config, &file, rows, session).await,
        Commands::Data {
            file,
            offset,
            limit,
        } => cmd_data(&file, offset, limit).await,
        Commands::Summary { file } => cmd_summary(&file).await,
        Commands::Charts { file, format } => cmd_charts(&file, &format).await,
        Commands::Status => cmd_status(&settings, &config).await,
    }
}

fn build_service(settings: &Settings, config: &Config) -> AnalysisService {
    AnalysisService::from_configs(
        config.gigachat.clone(),
        config.proxy_api.clone(),
        settings.reports_dir.clone(),
    )
}

/// Validate a file and load it into the process-wide store.
fn load_into_store(path: &Path) -> anyhow::Result<()> {
    check_file_admissible(path)?;
    let dataset = parsers::parse_file(path)?;
    DatasetStore::global().replace(dataset, display_name(path));
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

fn describe_dataset(dataset: &Dataset) -> String {
    match dataset {
        Dataset::Table(table) => format!(
            "table, {} columns x {} rows",
            table.columns.len(),
            table.row_count()
        ),
        Dataset::Text(text) => format!("text, {} characters", text.chars().count()),
    }
}

async fn cmd_init(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    if config.gigachat.has_credentials() {
        println!("  {} GigaChat credentials found", style("✓").green());
    } else {
        println!(
            "  {} GigaChat credentials missing (set GIGACHAT_AUTH_KEY or GIGACHAT_CLIENT_ID/SECRET)",
            style("!").yellow()
        );
    }
    if config.proxy_api.is_configured() {
        println!("  {} ProxyAPI key found", style("✓").green());
    } else {
        println!(
            "  {} ProxyAPI disabled or missing PROXY_API_KEY",
            style("!").yellow()
        );
    }

    println!(
        "{} Initialized datasight in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}

async fn cmd_analyze(
    settings: &Settings,
    config: &Config,
    file: &Path,
    session: Option<String>,
) -> anyhow::Result<()> {
    check_file_admissible(file)?;

    let service = build_service(settings, config);
    let analysis = service.analyze_file(file, session).await?;

    // keep the parsed dataset around for follow-up commands in-process
    DatasetStore::global().replace(analysis.dataset.clone(), display_name(file));

    println!("\n{}", style("Analysis Results").bold());
    println!("{}", "-".repeat(60));
    println!("{:<20} {}", "File:", file.display());
    println!("{:<20} {}", "Dataset:", describe_dataset(&analysis.dataset));

    for outcome in &analysis.outcomes {
        println!("\n{}", style(format!("{}:", outcome.provider)).bold());
        match &outcome.result {
            ProviderResult::Success { text } => println!("{}", text),
            ProviderResult::Failure { message, .. } => {
                println!("{} {}", style("✗").red(), message)
            }
            ProviderResult::Unavailable => {
                println!("{} not configured", style("!").yellow())
            }
        }
    }

    match &analysis.report_path {
        Some(path) => println!(
            "\n{} Report saved to {}",
            style("✓").green(),
            path.display()
        ),
        None => println!(
            "\n{} Report could not be written",
            style("!").yellow()
        ),
    }

    Ok(())
}

async fn cmd_analyze_rows(
    settings: &Settings,
    config: &Config,
    file: &Path,
    rows: usize,
    session: Option<String>,
) -> anyhow::Result<()> {
    load_into_store(file)?;
    let table = DatasetStore::global().sample_table()?;

    let service = build_service(settings, config);
    let analysis = service.analyze_table_rows(&table, rows, session).await;

    println!(
        "\n{}",
        style(format!("First {} Rows Analysis", rows)).bold()
    );
    println!("{}", "-".repeat(60));

    for (provider, result) in &analysis.results {
        println!("\n{}", style(format!("{}:", provider)).bold());
        match result {
            Some(text) => println!("{}", text),
            None => {
                let message = analysis
                    .errors
                    .get(provider)
                    .map(String::as_str)
                    .unwrap_or("unknown error");
                println!("{} {}", style("✗").red(), message);
            }
        }
    }

    Ok(())
}

async fn cmd_data(file: &Path, offset: usize, limit: usize) -> anyhow::Result<()> {
    load_into_store(file)?;
    let page = DatasetStore::global().rows(offset, limit)?;

    println!("\n{}", style("Data").bold());
    println!("{}", "-".repeat(60));
    print_cells(&page.columns, &page.rows);
    println!(
        "\nShowing {} of {} rows (offset {})",
        page.rows.len(),
        page.total_rows,
        offset
    );

    Ok(())
}

async fn cmd_summary(file: &Path) -> anyhow::Result<()> {
    load_into_store(file)?;
    let summary = DatasetStore::global().summary()?;

    println!("\n{}", style("Dataset Summary").bold());
    println!("{}", "-".repeat(60));

    match summary.kind {
        DatasetKind::Table => {
            println!("\n{}", style("Column Sums").bold());
            for (name, value) in &summary.column_sums {
                println!("  {:<20} {}", format!("{}:", name), value);
            }

            println!("\n{}", style("Unique Values").bold());
            for (name, count) in &summary.unique_counts {
                println!("  {:<20} {}", format!("{}:", name), count);
            }
        }
        DatasetKind::Text => {
            for (name, value) in &summary.column_sums {
                println!("{:<20} {}", format!("{}:", name), value);
            }
        }
    }

    Ok(())
}

async fn cmd_charts(file: &Path, format: &str) -> anyhow::Result<()> {
    load_into_store(file)?;
    let series = DatasetStore::global().chart_series()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("{} No numeric columns to chart", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Chart Series").bold());
    println!("{}", "-".repeat(60));
    println!("{:<30} {:<6} Points", "Title", "Kind");
    println!("{}", "-".repeat(60));

    for s in &series {
        println!(
            "{:<30} {:<6} {}",
            truncate(&s.title, 29),
            s.kind.label(),
            s.values.len()
        );
    }

    Ok(())
}

async fn cmd_status(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Datasight Status").bold());
    println!("{}", "-".repeat(60));

    println!("{:<20} {}", "Data directory:", settings.data_dir.display());
    println!(
        "{:<20} {}",
        "Reports directory:",
        settings.reports_dir.display()
    );
    match &config.source_path {
        Some(path) => println!("{:<20} {}", "Config file:", path.display()),
        None => println!(
            "{:<20} {}",
            "Config file:",
            style("none (defaults + env)").dim()
        ),
    }

    println!("\n{}", style("Providers").bold());
    if config.gigachat.has_credentials() {
        println!(
            "  {} GigaChat ({})",
            style("✓").green(),
            config.gigachat.model
        );
    } else {
        println!("  {} GigaChat: no credentials", style("✗").red());
    }
    if config.proxy_api.is_configured() {
        println!("  {} ProxyAPI", style("✓").green());
    } else if !config.proxy_api.enabled {
        println!("  {} ProxyAPI: disabled", style("!").yellow());
    } else {
        println!("  {} ProxyAPI: no API key", style("✗").red());
    }

    println!("\n{}", style("Limits").bold());
    println!(
        "  {:<18} {}",
        "Formats:",
        parsers::SUPPORTED_EXTENSIONS.join(", ")
    );
    println!(
        "  {:<18} {}",
        "Max file size:",
        format_bytes(parsers::MAX_FILE_SIZE_BYTES)
    );

    Ok(())
}

fn print_cells(columns: &[String], rows: &[Vec<CellValue>]) {
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| truncate(&cell.to_string(), 40))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, &width)| format!("{:<width$}", name))
        .collect();
    println!("{}", style(header.join("  ")).bold());

    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell))
            .collect();
        println!("{}", line.join("  "));
    }
}
