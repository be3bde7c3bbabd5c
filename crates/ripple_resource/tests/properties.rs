//! Property tests for generation numbering and result visibility.

mod common;

use std::sync::Arc;

use common::{Gates, flush};
use proptest::prelude::*;
use ripple_reactive::Signal;
use ripple_resource::{Resource, ResourceStatus};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    /// After N dependency changes the generation is exactly N and only the
    /// last invocation's value is observable.
    #[test]
    fn generation_counts_changes(values in proptest::collection::vec(any::<i32>(), 0..24)) {
        runtime().block_on(async {
            let source = Signal::new(0);
            let resource: Resource<i32, String> = {
                let source = source.clone();
                Resource::new(move |ctx| {
                    let value = ctx.track(|| source.get());
                    async move { Ok(value) }
                })
            };

            for value in &values {
                source.set(*value);
            }

            let state = resource.settled().await;
            prop_assert_eq!(state.generation(), values.len() as u64);
            prop_assert_eq!(state.value().copied(), Some(values.last().copied().unwrap_or(0)));
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Whatever order the gated invocations are released in, the committed
    /// value is the newest invocation's.
    #[test]
    fn release_order_never_exposes_stale_values(
        changes in 1_usize..8,
        order in any::<u64>(),
    ) {
        runtime().block_on(async {
            let source = Signal::new(0);
            let gates = Gates::<usize>::new();
            let resource: Resource<usize, String> = {
                let (source, gates) = (source.clone(), Arc::clone(&gates));
                Resource::new(move |ctx| {
                    let _ = ctx.track(|| source.get());
                    let rx = gates.open();
                    async move { rx.await.map_err(|e| e.to_string()) }
                })
            };
            for step in 1..=changes {
                source.set(step as i32);
            }
            prop_assert_eq!(gates.opened(), changes + 1);

            // Release every gate in a pseudo-random order derived from `order`.
            let mut indices: Vec<usize> = (0..=changes).collect();
            let mut seed = order;
            for i in (1..indices.len()).rev() {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (seed >> 33) as usize % (i + 1);
                indices.swap(i, j);
            }
            for index in indices {
                gates.release(index, index);
                flush().await;

                let state = resource.state_untracked();
                match state.status() {
                    ResourceStatus::Pending => prop_assert!(state.value().is_none()),
                    ResourceStatus::Resolved => prop_assert_eq!(state.value(), Some(&changes)),
                    ResourceStatus::Rejected => prop_assert!(false, "no invocation fails"),
                }
            }

            let settled = resource.settled().await;
            prop_assert_eq!(settled.value(), Some(&changes));
            Ok::<(), TestCaseError>(())
        })?;
    }
}
