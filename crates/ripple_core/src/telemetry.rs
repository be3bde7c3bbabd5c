//! Tracing subscriber configuration.
//!
//! Resources emit `tracing` events (invocations, commits, stale discards,
//! teardown). [`TracingConfig`] installs a `tracing-subscriber` registry that
//! renders them.
//!
//! # Example
//!
//! ```no_run
//! use ripple_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("ripple_resource=debug,ripple_reactive=info")
//!     .install()
//!     .expect("tracing already installed");
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingInitError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    /// The environment filter string could not be parsed.
    #[error("invalid env filter '{filter}': {source}")]
    InvalidFilter {
        /// The rejected filter string.
        filter: String,
        /// The parser's error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing configuration.
///
/// | Setting | Default |
/// |---------|---------|
/// | `level` | `INFO` |
/// | `format` | [`TracingFormat::Pretty`] |
/// | `env_filter` | none (the level applies everywhere) |
/// | `span_events` | off |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a target-specific filter, e.g. `ripple_resource=debug,hyper=warn`.
    ///
    /// Overrides the plain level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Builds the filter this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`TracingInitError::InvalidFilter`] if the custom filter
    /// string does not parse.
    pub fn filter(&self) -> Result<EnvFilter, TracingInitError> {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).map_err(|source| TracingInitError::InvalidFilter {
                    filter: filter.clone(),
                    source,
                })
            }
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Fails if the filter is invalid or a subscriber is already installed.
    pub fn install(&self) -> Result<(), TracingInitError> {
        let env_filter = self.filter()?;
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()?,
        }

        tracing::info!(level = %self.level, format = ?self.format, "tracing initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn builder_sets_fields() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("ripple_resource=trace")
            .with_span_events(true);

        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format(), TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("ripple_resource=trace"));
        assert!(config.span_events);
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = TracingConfig::new().with_env_filter("ripple=notalevel");
        let err = config.filter().expect_err("filter should not parse");
        assert!(matches!(err, TracingInitError::InvalidFilter { .. }));
        assert!(err.to_string().contains("ripple=notalevel"));
    }

    #[test]
    fn second_install_fails() {
        let config = TracingConfig::new().with_format(TracingFormat::Compact);
        // Only one global subscriber per process.
        let _ = config.install();
        let second = config.install();

        assert!(matches!(second, Err(TracingInitError::AlreadyInstalled(_))));
    }
}
