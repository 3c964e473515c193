use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{self as fmt_layer, FmtContext};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// `[2025-01-02T03:04:05.000Z] [INFO] message` lines for the run log.
pub struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        write!(writer, "[{stamp}] [{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Console logging on stderr, plus an appending file log when `run_log` is
/// given. A log file that can't be opened is reported and skipped.
pub fn init(run_log: Option<&Path>) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file, failure) = match run_log.map(|p| (p, open_append(p))) {
        Some((_, Ok(f))) => (Some(f), None),
        Some((p, Err(e))) => (None, Some((p, e))),
        None => (None, None),
    };
    let file_layer = file.map(|f| {
        fmt_layer::layer()
            .event_format(RunLogFormat)
            .with_ansi(false)
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt_layer::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    if let Some((path, e)) = failure {
        tracing::warn!("cannot open log file {}: {e}; logging to console only", path.display());
    }
}
