use std::sync::Once;

use log::LevelFilter;

static INIT: Once = Once::new();

/// Numeric verbosity levels accepted by `-l`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer. Out-of-range values clamp to the
    /// nearest end.
    pub fn from_i32(level: i32) -> Self {
        match level {
            i32::MIN..=0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            _ => LogLevel::All,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// The `log` filter this verbosity maps to. `User` shows errors only,
    /// since user-facing messages are logged at error level.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

/// Install the global logger. `RUST_LOG`, when set, takes precedence over
/// `verbosity`. Later calls are ignored.
pub fn init_logging(verbosity: LogLevel) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(verbosity.level_filter())
            .format_timestamp_millis();
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }
        if builder.try_init().is_err() {
            log::warn!("a logger was already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_i32() {
        assert_eq!(LogLevel::from_i32(0), LogLevel::Nothing);
        assert_eq!(LogLevel::from_i32(1), LogLevel::User);
        assert_eq!(LogLevel::from_i32(2), LogLevel::Error);
        assert_eq!(LogLevel::from_i32(3), LogLevel::Warning);
        assert_eq!(LogLevel::from_i32(4), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(5), LogLevel::Debug);
        assert_eq!(LogLevel::from_i32(6), LogLevel::All);
    }

    #[test]
    fn test_log_level_out_of_range_clamps() {
        assert_eq!(LogLevel::from_i32(100), LogLevel::All);
        assert_eq!(LogLevel::from_i32(-1), LogLevel::Nothing);
    }

    #[test]
    fn test_log_level_as_i32() {
        assert_eq!(LogLevel::Nothing.as_i32(), 0);
        assert_eq!(LogLevel::Warning.as_i32(), 3);
        assert_eq!(LogLevel::All.as_i32(), 6);
    }

    #[test]
    fn test_level_filter_mapping() {
        assert_eq!(LogLevel::Nothing.level_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::User.level_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warning.level_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::All.level_filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging(LogLevel::Debug);
        init_logging(LogLevel::Nothing);
        log::debug!("logging initialized twice");
    }
}
