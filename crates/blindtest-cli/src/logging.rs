//! Tracing setup and per-run structured logging.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blindtest_models::RunId;

const DEFAULT_FILTER: &str = "blindtest=info";

/// Install the global subscriber.
///
/// `LOG_FORMAT=json` switches to JSON lines; otherwise output is colored
/// text. A valid `RUST_LOG` replaces the default `blindtest=info` filter.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = env_filter(std::env::var("RUST_LOG").ok().as_deref());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

/// Filter from a `RUST_LOG` value, falling back to `blindtest=info` when it
/// is unset, blank or unparsable.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Stamps every lifecycle line of a run with its id and operation.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    pub fn new(run_id: &RunId, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "Run started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "{}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, operation = %self.operation, "{}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, operation = %self.operation, "Run failed: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "Run completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the run fields, for instrumenting the whole pipeline.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, operation = %self.operation)
    }
}
