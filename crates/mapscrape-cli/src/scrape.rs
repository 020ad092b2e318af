use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use mapscrape_core::{AppConfig, Record, SelectorSet};
use mapscrape_scraper::{RunOutcome, RunRequest, RunStatus, ScrapeOrchestrator, SocialSniffer};
use tokio_util::sync::CancellationToken;

use crate::export::{export_csv, export_json, export_xlsx};
use crate::{ExportFormat, ScrapeArgs};

/// Built-in selectors, or the YAML override at `path`.
pub(crate) fn load_selector_set(path: Option<&Path>) -> anyhow::Result<SelectorSet> {
    match path {
        Some(path) => mapscrape_core::load_selectors(path)
            .with_context(|| format!("loading selectors from {}", path.display())),
        None => Ok(SelectorSet::default()),
    }
}

/// Export file path for `output_file` in the requested format.
pub(crate) fn export_path(dir: &Path, output_file: &str, format: ExportFormat) -> PathBuf {
    let file = Path::new(output_file);
    match format {
        ExportFormat::Csv => dir.join(file),
        ExportFormat::Json => dir.join(file.with_extension("json")),
        ExportFormat::Xlsx => dir.join(file.with_extension("xlsx")),
    }
}

pub(crate) fn listing_settle_ms(scroll_delay_secs: f64) -> u64 {
    u64::try_from(Duration::from_secs_f64(scroll_delay_secs).as_millis()).unwrap_or(u64::MAX)
}

/// Cancel `cancel` on the first interrupt. Returns `true` once a second
/// interrupt arrives, `false` if listening fails.
pub(crate) async fn relay_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = next_interrupt().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c");
        return false;
    }
    tracing::warn!("ctrl-c received; stopping after the current listing (press again to quit)");
    cancel.cancel();
    next_interrupt().await.is_ok()
}

pub(crate) async fn run(args: ScrapeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let selectors_path = args.selectors.clone().or_else(|| config.selectors_path.clone());
    let selectors = load_selector_set(selectors_path.as_deref())?;

    let cancel = CancellationToken::new();
    let mut orchestrator =
        ScrapeOrchestrator::new(selectors, config.discovery.clone()).with_cancel(cancel.clone());
    if !args.no_social {
        let sniffer = SocialSniffer::new(config.request_timeout_secs, &config.user_agent)
            .context("building website client")?;
        orchestrator = orchestrator.with_sniffer(sniffer);
    }

    tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, cancel).await {
            eprintln!("second interrupt; exiting without export");
            std::process::exit(130);
        }
    });

    let request = RunRequest {
        input: args.input.clone(),
        max_listings: args.max_listings,
        listing_settle_ms: listing_settle_ms(args.scroll_delay),
    };

    let outcome = run_with_browser(&args, config, &orchestrator, &request).await?;

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir.clone());
    let path = export_path(&output_dir, &outcome.output_file, args.format);
    write_export(&path, &outcome.records, args.format)?;
    println!("{} records written to {}", outcome.records.len(), path.display());

    match outcome.status {
        RunStatus::Completed => Ok(()),
        RunStatus::Stopped => {
            println!("run stopped early; partial results kept");
            Ok(())
        }
        RunStatus::Failed(message) => anyhow::bail!("scrape failed: {message}"),
    }
}

fn write_export(path: &Path, records: &[Record], format: ExportFormat) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    match format {
        ExportFormat::Csv => export_csv(path, records),
        ExportFormat::Json => export_json(path, records),
        ExportFormat::Xlsx => export_xlsx(path, records),
    }
    .with_context(|| format!("writing {}", path.display()))
}

#[cfg(feature = "chrome")]
async fn run_with_browser(
    args: &ScrapeArgs,
    config: &AppConfig,
    orchestrator: &ScrapeOrchestrator,
    request: &RunRequest,
) -> anyhow::Result<RunOutcome> {
    use mapscrape_scraper::{ChromeOptions, ChromePage, ResultAccumulator};

    use crate::progress::ConsoleProgress;

    let options = ChromeOptions {
        headless: !args.headed,
        system_chrome: args.system_chrome,
        chrome_path: config.chrome_path.clone(),
        ..ChromeOptions::default()
    };
    let mut page = ChromePage::launch(&options)
        .await
        .context("launching browser")?;
    let mut progress = ConsoleProgress::default();
    let mut results = ResultAccumulator::new();
    let outcome = orchestrator
        .run(&mut page, request, &mut progress, &mut results)
        .await;
    page.close().await;
    Ok(outcome)
}

#[cfg(not(feature = "chrome"))]
async fn run_with_browser(
    _args: &ScrapeArgs,
    _config: &AppConfig,
    _orchestrator: &ScrapeOrchestrator,
    _request: &RunRequest,
) -> anyhow::Result<RunOutcome> {
    anyhow::bail!(
        "mapscrape-cli was built without a browser backend; rebuild with `--features chrome`"
    )
}
