//! Bounded polling for remote state transitions.
//!
//! The engine completes state changes asynchronously and offers no push
//! notification, so callers request a transition and then poll here.

use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{FlowError, Result};
use crate::remote::FlowDirectory;
use crate::types::{ComponentRef, RuntimeState, ServiceState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Poll `probe` until `matches` accepts the observed state or the timeout elapses.
///
/// The first probe happens immediately. Probe errors abort the wait and are
/// returned unchanged.
pub fn await_state<S, P, M>(
    component: &str,
    target: impl Display,
    policy: WaitPolicy,
    mut probe: P,
    matches: M,
) -> Result<()>
where
    P: FnMut() -> Result<S>,
    M: Fn(&S) -> bool,
{
    let started = Instant::now();
    loop {
        let state = probe()?;
        if matches(&state) {
            return Ok(());
        }
        let waited = started.elapsed();
        if waited >= policy.timeout {
            tracing::debug!(component = %component, target = %target, ?waited, "wait expired");
            return Err(FlowError::Timeout {
                component: component.to_string(),
                target: target.to_string(),
                waited,
            });
        }
        let remaining = policy.timeout - waited;
        thread::sleep(policy.interval.min(remaining));
    }
}

pub fn await_runtime_state(
    directory: &dyn FlowDirectory,
    component: &ComponentRef,
    target: RuntimeState,
    policy: WaitPolicy,
) -> Result<()> {
    await_state(
        &component.to_string(),
        target,
        policy,
        || directory.runtime_state(component),
        |state: &RuntimeState| state.satisfies(target),
    )
}

pub fn await_service_state(
    directory: &dyn FlowDirectory,
    service_id: &str,
    target: ServiceState,
    policy: WaitPolicy,
) -> Result<()> {
    await_state(
        &format!("controller service {service_id}"),
        target,
        policy,
        || directory.controller_service_state(service_id),
        |state: &ServiceState| *state == target,
    )
}
