use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use xdg::BaseDirectories;

const LOG_FILE_NAME: &str = "tagwm.log";

pub fn add_layer<S>(
    subscriber: S,
) -> (impl Subscriber + for<'span> LookupSpan<'span>, Option<WorkerGuard>)
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let (layer, guard) = match get_log_writer() {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            ),
            Some(guard),
        ),
        None => (None, None),
    };
    (subscriber.with(layer), guard)
}

fn get_log_writer() -> Option<(NonBlocking, WorkerGuard)> {
    let dir = BaseDirectories::with_prefix("tagwm")
        .ok()?
        .create_cache_directory("")
        .map_err(|err| eprintln!("Couldn't create log directory: {err}"))
        .ok()?;
    let writer = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    Some(tracing_appender::non_blocking(writer))
}
