//! Example live search CLI.
//!
//! Simulates a user typing each query in turn, faster than the backend
//! answers, and logs every frame the renderer produces.
//!
//! # Usage
//!
//! ```bash
//! search <query>...
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug search b bl blu "" lime
//! ```

use std::time::Duration;

use example::{Catalog, results_renderer, search_resource};
use ripple_core::{TracingConfig, TracingFormat};
use ripple_reactive::{Effect, Scope, Signal};

const LATENCY: Duration = Duration::from_millis(300);
const KEYSTROKE: Duration = Duration::from_millis(80);

#[tokio::main]
async fn main() {
    let mut telemetry = TracingConfig::new().with_format(TracingFormat::Compact);
    if let Ok(filter) = std::env::var("RUST_LOG") {
        telemetry = telemetry.with_env_filter(filter);
    }
    if let Err(e) = telemetry.install() {
        report_setup_error(&e);
        std::process::exit(1);
    }

    let mut queries = std::env::args().skip(1);
    let Some(first) = queries.next() else {
        tracing::error!("usage: search <query>...");
        tracing::error!("example: search b bl blu \"\" lime");
        std::process::exit(1);
    };

    let scope = Scope::new();
    let query = Signal::new(first);
    let resource = search_resource(Catalog::fruit(LATENCY), &query);
    resource.bind_to(&scope);

    let renderer = results_renderer();
    let frames = {
        let resource = resource.clone();
        Effect::new(move || {
            if let Some(frame) = renderer.render_resource(&resource) {
                tracing::info!(generation = resource.generation(), "{frame}");
            }
        })
    };
    frames.bind_to(&scope);

    for (typed, text) in queries.enumerate() {
        tokio::time::sleep(KEYSTROKE).await;
        tracing::debug!(keystroke = typed + 1, query = %text, "typing");
        query.set(text);
    }

    let state = resource.settled().await;
    tracing::info!(
        status = %state.status(),
        generation = state.generation(),
        "search settled"
    );

    scope.dispose();
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is not available when its own setup fails"
)]
fn report_setup_error(error: &ripple_core::TracingInitError) {
    eprintln!("Error: {error}");
}
