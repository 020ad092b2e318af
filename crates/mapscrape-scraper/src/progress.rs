use mapscrape_core::Record;

/// Severity of a progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Ok,
    Warn,
    Err,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Err => "err",
        }
    }
}

/// Progress reporting for a scrape run. Front-ends implement this to surface
/// status to users; every method has a no-op default.
pub trait Progress: Send {
    /// Called once discovery has produced `total` listings to extract.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _level: LogLevel, _msg: &str) {}

    /// Called after each record is appended to the result sequence.
    fn item_done(&mut self, _record: &Record) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Send `msg` to the progress sink and mirror it to `tracing`.
pub(crate) fn emit(progress: &mut dyn Progress, level: LogLevel, msg: &str) {
    match level {
        LogLevel::Ok => tracing::info!("{msg}"),
        LogLevel::Warn => tracing::warn!("{msg}"),
        LogLevel::Err => tracing::error!("{msg}"),
    }
    progress.log(level, msg);
}
