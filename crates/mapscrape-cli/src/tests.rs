use std::path::Path;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mapscrape-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn scrape_defaults() {
    let cli = Cli::try_parse_from(["mapscrape-cli", "scrape", "dentists in lahore"])
        .expect("expected valid cli args");

    let Some(Commands::Scrape(args)) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.input, "dentists in lahore");
    assert_eq!(args.max_listings, 0);
    assert!((args.scroll_delay - 1.0).abs() < f64::EPSILON);
    assert!(!args.headed);
    assert!(!args.system_chrome);
    assert!(!args.no_social);
    assert_eq!(args.format, ExportFormat::Csv);
}

#[test]
fn scrape_accepts_every_flag() {
    let cli = Cli::try_parse_from([
        "mapscrape-cli",
        "scrape",
        "https://www.google.com/maps/search/cafes",
        "--max-listings",
        "25",
        "--scroll-delay",
        "2.5",
        "--headed",
        "--system-chrome",
        "--output-dir",
        "out",
        "--format",
        "json",
        "--selectors",
        "config/selectors.yaml",
        "--no-social",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Scrape(args)) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.max_listings, 25);
    assert!((args.scroll_delay - 2.5).abs() < f64::EPSILON);
    assert!(args.headed);
    assert!(args.system_chrome);
    assert!(args.no_social);
    assert_eq!(args.output_dir.as_deref(), Some(Path::new("out")));
    assert_eq!(args.format, ExportFormat::Json);
    assert_eq!(
        args.selectors.as_deref(),
        Some(Path::new("config/selectors.yaml"))
    );
}

#[test]
fn scrape_requires_input() {
    assert!(Cli::try_parse_from(["mapscrape-cli", "scrape"]).is_err());
}

#[test]
fn scroll_delay_must_be_positive() {
    for bad in ["0", "-1", "soon", "NaN"] {
        let result = Cli::try_parse_from(["mapscrape-cli", "scrape", "cafes", "--scroll-delay", bad]);
        assert!(result.is_err(), "{bad} should be rejected");
    }
}

#[test]
fn parses_selectors_command() {
    let cli = Cli::try_parse_from(["mapscrape-cli", "selectors", "--selectors", "s.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Selectors { selectors: Some(ref p) }) if p == Path::new("s.yaml")
    ));
}

#[test]
fn json_export_swaps_the_extension() {
    let dir = Path::new("out");
    assert_eq!(
        scrape::export_path(dir, "cafes_in_karachi.csv", ExportFormat::Json),
        dir.join("cafes_in_karachi.json")
    );
    assert_eq!(
        scrape::export_path(dir, "cafes_in_karachi.csv", ExportFormat::Csv),
        dir.join("cafes_in_karachi.csv")
    );
}

#[test]
fn scroll_delay_converts_to_millis() {
    assert_eq!(scrape::listing_settle_ms(1.0), 1000);
    assert_eq!(scrape::listing_settle_ms(0.25), 250);
}

#[test]
fn missing_selector_file_is_an_error() {
    assert!(scrape::load_selector_set(Some(Path::new("/nonexistent/selectors.yaml"))).is_err());
    assert!(scrape::load_selector_set(None).is_ok());
}

#[test]
fn parses_xlsx_format() {
    let cli = Cli::try_parse_from(["mapscrape-cli", "scrape", "cafes", "--format", "xlsx"])
        .expect("expected valid cli args");
    let Some(Commands::Scrape(args)) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.format, ExportFormat::Xlsx);
    assert_eq!(
        scrape::export_path(Path::new("out"), "cafes.csv", args.format),
        Path::new("out").join("cafes.xlsx")
    );
}

#[tokio::test]
async fn first_interrupt_cancels_and_second_requests_exit() {
    let cancel = tokio_util::sync::CancellationToken::new();
    let force_quit = scrape::relay_interrupts(|| async { Ok(()) }, cancel.clone()).await;
    assert!(cancel.is_cancelled());
    assert!(force_quit);
}

#[tokio::test]
async fn single_interrupt_only_cancels() {
    let cancel = tokio_util::sync::CancellationToken::new();
    let mut calls = 0;
    let next_interrupt = move || {
        calls += 1;
        let first = calls == 1;
        async move {
            if first {
                Ok(())
            } else {
                std::future::pending::<std::io::Result<()>>().await
            }
        }
    };

    let relay = scrape::relay_interrupts(next_interrupt, cancel.clone());
    let finished = tokio::time::timeout(std::time::Duration::from_millis(50), relay).await;
    assert!(finished.is_err(), "still waiting for a second interrupt");
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn failed_signal_listener_does_not_cancel() {
    let cancel = tokio_util::sync::CancellationToken::new();
    let force_quit = scrape::relay_interrupts(
        || async { Err(std::io::Error::other("no signal handler")) },
        cancel.clone(),
    )
    .await;
    assert!(!force_quit);
    assert!(!cancel.is_cancelled());
}
