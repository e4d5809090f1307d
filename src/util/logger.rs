use crate::error::LrError;
use chrono::Local;
use log::{Level, Log, Metadata, Record};

/// Writes one line per record to stderr, leaving stdout to the task results.
struct LrLogger {
    level: Level,
}

impl Log for LrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    #[allow(clippy::print_stderr)]
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {:<5} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                record.level().to_string(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn init_logger_with_level(level: Level) -> Result<(), LrError> {
    let logger = LrLogger { level };
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| LrError::Generic(format!("Could not set logger: {}", e)))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}
