use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Installs the global fmt subscriber. A second call (tests, embedded
/// servers) keeps the first subscriber.
pub fn init_tracing(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(LevelFilter::from(level))
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_names_match_config_file() {
        let level: LogLevel = serde_json::from_str(r#""Debug""#).unwrap();
        assert_eq!(LevelFilter::from(level), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::INFO);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing(LogLevel::Warn);
        init_tracing(LogLevel::Trace);
    }
}
