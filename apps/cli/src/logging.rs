//! Logging initialization for the `fieldmap` binary
//!
//! Logs go to stderr so that mapped documents written to stdout stay clean.
//! `RUST_LOG` wins over `--log-level` when it is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub struct LoggingOptions<'a> {
    pub level: &'a str,
    pub json: bool,
}

pub fn init_logging(options: &LoggingOptions<'_>) -> anyhow::Result<()> {
    let env_filter = build_env_filter(options.level);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if options.json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    }

    tracing::debug!(level = options.level, json = options.json, "Logging initialized");
    Ok(())
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fieldmap={level},fieldmap_engine={level},fieldmap_document={level},fieldmap_conversion={level},warn",
            level = level
        ))
    })
}
