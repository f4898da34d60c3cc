use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle, opt_format};

/// Start the logger. `RUST_LOG` wins over `level` when set.
///
/// Output goes to stderr so the console protocol on stdout stays clean. Keep
/// the returned handle alive for as long as logging is needed.
pub fn setup_logging(level: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(level)?.format(opt_format).start()
}
