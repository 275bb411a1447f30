use std::fmt::Display;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;
use log::debug;

/// How statistics are written: the prefix put in front of every line, an
/// optional closing line, an optional casing applied to statistic names, and
/// the destination writer (stdout when not given).
///
/// Statistics are only written after [`configure_statistic_logging`] has been
/// called; a line has the shape `{prefix} {name}={value}`.
pub struct StatisticOptions {
    prefix: &'static str,
    after_statistics: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Enable statistic logging. The first call wins; later calls are ignored.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after_statistics: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::new(StatisticOptions {
            prefix,
            after_statistics,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

/// Write one `name=value` statistic line, if logging is configured.
pub fn log_statistic(name: impl Display, value: impl Display) {
    let Some(lock) = STATISTIC_OPTIONS.get() else {
        return;
    };
    let Ok(mut options) = lock.write() else {
        return;
    };
    let name = match &options.casing {
        Some(casing) => name.to_string().to_case(*casing),
        None => name.to_string(),
    };
    let prefix = options.prefix;
    if let Err(error) = writeln!(options.writer, "{prefix} {name}={value}") {
        debug!("could not write statistic: {error}");
    }
}

/// Write the closing line, if one is configured. Output formats such as
/// MiniZinc's require a terminator after a block of statistics.
pub fn log_statistic_postfix() {
    let Some(lock) = STATISTIC_OPTIONS.get() else {
        return;
    };
    let Ok(mut options) = lock.write() else {
        return;
    };
    if let Some(line) = options.after_statistics {
        if let Err(error) = writeln!(options.writer, "{line}") {
            debug!("could not write statistic postfix: {error}");
        }
    }
}

/// Whether statistic logging has been configured.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
