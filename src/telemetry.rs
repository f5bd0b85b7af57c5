use {
    crate::{adapters::ipapi_client::HTTP_EXCHANGE_TARGET, domain::error::AuditError},
    std::{fs::OpenOptions, path::Path, sync::Mutex},
    tracing_subscriber::{
        EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    },
};

/// Install the global subscriber: stdout filtered by `RUST_LOG` (default
/// `info`), plus the diagnostic sink when a path is configured.
///
/// The sink is an append-only file receiving every `info`+ event, including
/// the raw HTTP exchange dumps, which are then kept off stdout. Each event is
/// formatted into one buffer and written with a single call, so concurrent
/// workers never interleave within a line.
pub fn init(diagnostic_log_path: Option<&Path>) -> Result<(), AuditError> {
    let mut stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let diagnostic = match diagnostic_log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AuditError::Config(format!("cannot open diagnostic log {}: {e}", path.display()))
                })?;
            stdout_filter = stdout_filter.add_directive(
                format!("{HTTP_EXCHANGE_TARGET}=off")
                    .parse()
                    .map_err(|e| AuditError::Config(format!("log filter: {e}")))?,
            );
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::INFO),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(stdout_filter))
        .with(diagnostic)
        .try_init()
        .map_err(|e| AuditError::Config(format!("tracing init: {e}")))
}
