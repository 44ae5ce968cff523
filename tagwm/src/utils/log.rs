use tracing::metadata::LevelFilter;
use tracing_subscriber::{filter::ParseError, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "journald-log")]
mod journald;

#[cfg(feature = "file-log")]
pub mod file;

/// Keeps background log writers alive. Drop it only when shutting down.
#[derive(Default)]
#[must_use]
pub struct LogGuard {
    #[cfg(feature = "file-log")]
    _file: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Builds the filter for `level_regex`, falling back to `debug` when it does not parse.
pub fn parse_log_level(level_regex: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .parse(level_regex)
    {
        Ok(filter) => (filter, None),
        Err(err) => {
            let filter = EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .parse_lossy("");
            (filter, Some(err))
        }
    }
}

/// Installs the global subscriber. Stderr is always logged to; journald and the log
/// file are added when their features are enabled.
pub fn setup_logging(level_regex: &str) -> LogGuard {
    let (filter, parse_err) = parse_log_level(level_regex);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    #[cfg(feature = "journald-log")]
    let subscriber = journald::add_layer(subscriber);

    #[cfg(feature = "file-log")]
    let (subscriber, file_guard) = file::add_layer(subscriber);

    if let Err(err) = subscriber.try_init() {
        eprintln!("Couldn't setup global subscriber (logger): {err}");
    }
    if let Some(err) = parse_err {
        tracing::warn!("Invalid log_level `{}`, logging at debug: {}", level_regex, err);
    }

    LogGuard {
        #[cfg(feature = "file-log")]
        _file: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        let (_, err) = parse_log_level("info");
        assert!(err.is_none());
        let (_, err) = parse_log_level("tagwm_core=trace,warn");
        assert!(err.is_none());
    }

    #[test]
    fn invalid_level_reports_error() {
        let (filter, err) = parse_log_level("tagwm=loud");
        assert!(err.is_some());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
