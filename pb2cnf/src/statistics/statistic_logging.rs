use std::fmt::Display;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

static STATISTIC_PREFIX: OnceLock<&str> = OnceLock::new();
static LOG_STATISTICS: OnceLock<bool> = OnceLock::new();
static STATISTICS_CASING: OnceLock<Option<Case>> = OnceLock::new();

/// Configures statistic logging once per process; later calls have no effect.
///
/// Statistics are only printed when `log_statistics` is true. Names are converted to `casing` when
/// one is given.
pub fn configure(log_statistics: bool, prefix: &'static str, casing: Option<Case>) {
    let _ = LOG_STATISTICS.get_or_init(|| log_statistics);
    if log_statistics {
        let _ = STATISTIC_PREFIX.get_or_init(|| prefix);
        let _ = STATISTICS_CASING.get_or_init(|| casing);
    }
}

fn should_log_statistics() -> bool {
    *LOG_STATISTICS.get().unwrap_or(&false)
}

/// Prints `PREFIX name=value` to stdout if statistics are enabled.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if !should_log_statistics() {
        return;
    }

    let name = match STATISTICS_CASING.get() {
        Some(Some(casing)) => name.to_string().to_case(*casing),
        _ => name.to_string(),
    };
    let prefix = STATISTIC_PREFIX.get().copied().unwrap_or("c STAT");
    println!("{prefix} {name}={value}");
}
