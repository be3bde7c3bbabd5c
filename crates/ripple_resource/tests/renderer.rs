//! Integration tests for [`ResourceRenderer`] driven by live resources.

mod common;

use std::sync::Arc;

use common::{EventLog, Gates, flush};
use ripple_reactive::{Effect, Signal};
use ripple_resource::{Resource, ResourceRenderer};

fn counting_renderer(calls: &EventLog) -> ResourceRenderer<i32, String, String> {
    let (pending, resolved, rejected) = (calls.clone(), calls.clone(), calls.clone());
    ResourceRenderer::new()
        .on_pending(move || {
            pending.push("pending");
            "loading".to_string()
        })
        .on_resolved(move |value| {
            resolved.push("resolved");
            format!("value {value}")
        })
        .on_rejected(move |error| {
            rejected.push("rejected");
            format!("error {error}")
        })
}

/// Verifies a resolved resource renders only the resolved branch.
#[tokio::test]
async fn resolved_resource_selects_resolved_branch() {
    let resource: Resource<i32, String> = Resource::new(|_ctx| async { Ok(42) });
    resource.settled().await;

    let renderer: ResourceRenderer<i32, String, i32> =
        ResourceRenderer::new().on_resolved(|value| value * 2);

    assert_eq!(renderer.render_resource(&resource), Some(84));
}

/// Verifies the branch follows the resource through its lifecycle.
#[tokio::test]
async fn branches_follow_resource_state() {
    let source = Signal::new(0);
    let gates = Gates::<Result<i32, String>>::new();
    let resource: Resource<i32, String> = {
        let (source, gates) = (source.clone(), Arc::clone(&gates));
        Resource::new(move |ctx| {
            let _ = ctx.track(|| source.get());
            let rx = gates.open();
            async move { rx.await.map_err(|e| e.to_string())? }
        })
    };
    let calls = EventLog::default();
    let renderer = counting_renderer(&calls);

    assert_eq!(renderer.render_resource(&resource).as_deref(), Some("loading"));

    gates.release(0, Ok(7));
    resource.settled().await;
    assert_eq!(renderer.render_resource(&resource).as_deref(), Some("value 7"));

    source.set(1);
    gates.release(1, Err("offline".into()));
    resource.settled().await;
    assert_eq!(
        renderer.render_resource(&resource).as_deref(),
        Some("error computation failed: offline")
    );

    assert_eq!(calls.snapshot(), vec!["pending", "resolved", "rejected"]);
}

/// Verifies host render passes over an unchanged state do not re-select.
#[tokio::test]
async fn repeated_renders_reuse_output() {
    let resource: Resource<i32, String> = Resource::new(|_ctx| async { Ok(1) });
    resource.settled().await;

    let calls = EventLog::default();
    let renderer = counting_renderer(&calls);
    for _ in 0..5 {
        assert_eq!(renderer.render_resource(&resource).as_deref(), Some("value 1"));
    }

    assert_eq!(calls.count("resolved"), 1);
}

/// Verifies an effect re-renders on state changes and that back-to-back
/// invocations staying pending do not re-run the pending branch.
#[tokio::test]
async fn effect_driven_rendering_skips_redundant_work() {
    let source = Signal::new(0);
    let gates = Gates::<i32>::new();
    let resource: Resource<i32, String> = {
        let (source, gates) = (source.clone(), Arc::clone(&gates));
        Resource::new(move |ctx| {
            let _ = ctx.track(|| source.get());
            let rx = gates.open();
            async move { rx.await.map_err(|e| e.to_string()) }
        })
    };

    let calls = EventLog::default();
    let renderer = Arc::new(counting_renderer(&calls));
    let frames = EventLog::default();
    let effect = {
        let (resource, renderer, frames) =
            (resource.clone(), Arc::clone(&renderer), frames.clone());
        Effect::new(move || {
            if let Some(frame) = renderer.render_resource(&resource) {
                frames.push(frame);
            }
        })
    };

    source.set(1);
    source.set(2);
    assert!(effect.run_count() >= 3, "each state write reaches the effect");
    assert_eq!(calls.count("pending"), 1);

    gates.release(2, 5);
    resource.settled().await;
    flush().await;

    assert_eq!(calls.snapshot(), vec!["pending", "resolved"]);
    assert_eq!(frames.snapshot().last().map(String::as_str), Some("value 5"));
}
