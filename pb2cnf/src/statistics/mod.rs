//! Logging of solver statistics as `<prefix> name=value` lines.

mod statistic_logging;

pub use statistic_logging::configure;
pub use statistic_logging::log_statistic;
