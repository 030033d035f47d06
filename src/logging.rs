use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialises tracing: a daily rolling log file in `log_dir` plus warnings on stderr.
///
/// The returned guard flushes the file writer and must be held until exit.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "freightdesk.log"));

  let file_filter = EnvFilter::try_from_env("FREIGHTDESK_LOG")
    .or_else(|_| EnvFilter::try_new("freightdesk=info"))?;
  let file_layer = tracing_subscriber::fmt::layer()
    .with_ansi(false)
    .with_writer(writer)
    .with_filter(file_filter);

  let stderr_layer = tracing_subscriber::fmt::layer()
    .without_time()
    .with_writer(std::io::stderr)
    .with_filter(EnvFilter::try_new("freightdesk=warn")?);

  tracing_subscriber::registry()
    .with(file_layer)
    .with(stderr_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialise tracing: {}", e))?;

  Ok(guard)
}
