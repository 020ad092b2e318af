use console::{style, StyledObject};
use mapscrape_core::Record;
use mapscrape_scraper::{LogLevel, Progress};

/// Prints progress lines to stderr, keeping stdout free for the summary.
#[derive(Debug, Default)]
pub(crate) struct ConsoleProgress {
    total: usize,
    done: usize,
}

fn marker(level: LogLevel) -> StyledObject<&'static str> {
    match level {
        LogLevel::Ok => style("»").green(),
        LogLevel::Warn => style("!").yellow(),
        LogLevel::Err => style("✗").red(),
    }
}

fn line(level: LogLevel, msg: &str) -> String {
    match level {
        LogLevel::Ok => format!("{} {msg}", marker(level)),
        LogLevel::Warn | LogLevel::Err => {
            format!("{} {}: {msg}", marker(level), level.as_str())
        }
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        eprintln!("{} {total} listings to scrape", marker(LogLevel::Ok));
    }

    fn log(&mut self, level: LogLevel, msg: &str) {
        eprintln!("{}", line(level, msg));
    }

    fn item_done(&mut self, _record: &Record) {
        self.done += 1;
    }

    fn finish(&mut self) {
        eprintln!(
            "{} done: {}/{} listings",
            marker(LogLevel::Ok),
            self.done,
            self.total
        );
    }
}
