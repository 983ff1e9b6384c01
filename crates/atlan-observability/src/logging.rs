//! Logging setup for SDK consumers and the CLI.
//!
//! Everything is emitted through `tracing`; this module only installs a
//! subscriber.

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Crates whose events are enabled when `RUST_LOG` is not set.
const SDK_TARGETS: &[&str] = &["atlan_client", "atlan_observability", "atlan_cli"];

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the SDK crates.
    pub level: Level,
    /// Emit one JSON object per line instead of human-readable text.
    pub json_format: bool,
    /// Log span open/close events (one per API call).
    pub include_spans: bool,
    /// Include file and line of the call site.
    pub include_location: bool,
    /// Include the module path.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            include_spans: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Verbose text output, with spans for every connector call.
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            include_spans: true,
            include_location: true,
            ..Self::default()
        }
    }

    /// JSON output for log shipping.
    pub fn json() -> Self {
        Self {
            json_format: true,
            ..Self::default()
        }
    }

    /// Filter directives used when `RUST_LOG` is absent.
    pub fn default_directives(&self) -> String {
        SDK_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Initializes logging with the default configuration.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::default());
}

/// Initializes logging with the given configuration.
///
/// Does nothing if a global subscriber is already installed, so embedding
/// applications keep their own setup. Events always go to stderr, leaving
/// stdout to the program's own output.
pub fn init_logging_with_config(config: LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(&config, std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }
}

/// Formatting layer for the configured output, writing to `writer`.
fn fmt_layer<S, W>(config: &LoggingConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(writer)
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target),
        )
    }
}

/// Creates a span scoped to one asset.
#[macro_export]
macro_rules! asset_span {
    ($type_name:expr, $qualified_name:expr) => {
        tracing::info_span!("asset", type_name = %$type_name, qualified_name = %$qualified_name)
    };
}
