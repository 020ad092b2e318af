mod export;
#[cfg_attr(not(feature = "chrome"), allow(dead_code))]
mod progress;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapscrape-cli")]
#[command(about = "Collect business listings from a map search into CSV, JSON or XLSX")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every listing of a map search
    Scrape(ScrapeArgs),
    /// Print the effective selector set as YAML
    Selectors {
        /// YAML file overriding the built-in selectors
        #[arg(long, env = "MAPSCRAPE_SELECTORS_PATH")]
        selectors: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct ScrapeArgs {
    /// Free-text search (e.g. "dentists in lahore") or a full search URL
    input: String,

    /// Stop after this many listings; 0 means unlimited
    #[arg(long, default_value_t = 0)]
    max_listings: usize,

    /// Seconds to let each listing page settle before extraction
    #[arg(long, default_value_t = 1.0, value_parser = parse_positive_secs)]
    scroll_delay: f64,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Prefer an installed Google Chrome
    #[arg(long)]
    system_chrome: bool,

    /// Directory the export is written to
    #[arg(long, env = "MAPSCRAPE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// YAML file overriding the built-in selectors
    #[arg(long, env = "MAPSCRAPE_SELECTORS_PATH")]
    selectors: Option<PathBuf>,

    /// Skip fetching business websites for social profile links
    #[arg(long)]
    no_social: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
    /// Spreadsheet with a bold header row
    Xlsx,
}

fn parse_positive_secs(raw: &str) -> Result<f64, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("'{raw}' must be a positive number of seconds"));
    }
    Ok(secs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = mapscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scrape(args)) => scrape::run(args, &config).await?,
        Some(Commands::Selectors { selectors }) => {
            let path = selectors.or_else(|| config.selectors_path.clone());
            let set = scrape::load_selector_set(path.as_deref())?;
            print!("{}", serde_yaml::to_string(&set)?);
        }
        None => println!("mapscrape-cli ready; run `mapscrape-cli scrape --help`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
