//! Subscriber initialization.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::config::{LogConfig, LogFormat, RotationPolicy};

/// Holds the file-appender's background-flush guard for the process
/// lifetime; dropping it would silently stop flushing log lines to disk.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    pub fn init(config: &LogConfig) -> anyhow::Result<Self> {
        let env_filter = EnvFilter::try_new(&config.level)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let (file_layer, guard) = if let Some(dir) = &config.log_dir {
            let appender = match config.rotation {
                RotationPolicy::Daily => tracing_appender::rolling::daily(dir, "eap.log"),
                RotationPolicy::Hourly => tracing_appender::rolling::hourly(dir, "eap.log"),
                RotationPolicy::Never => tracing_appender::rolling::never(dir, "eap.log"),
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info")));
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        let stdout_layer = if config.enable_stdout {
            let layer: Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> = match config.format {
                LogFormat::Json => Box::new(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_filter(env_filter),
                ),
                LogFormat::Pretty => Box::new(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_filter(env_filter),
                ),
            };
            Some(layer)
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

        Ok(Self { _guard: guard })
    }
}
