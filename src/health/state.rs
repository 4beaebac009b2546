//! Backend health state machine.
//!
//! # States
//! - Unknown: no outcome observed yet, backend receives traffic
//! - Healthy: backend receives traffic
//! - Unhealthy: backend excluded from selection until the cooldown elapses
//!
//! # State Transitions
//! ```text
//! Unknown/Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unknown/Unhealthy → Healthy: consecutive successes >= healthy_threshold
//! Unhealthy → Unhealthy:       a failure re-arms the cooldown
//! ```

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::config::PassiveHealthConfig;

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// Thresholds governing state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub unhealthy_threshold: usize,
    pub healthy_threshold: usize,
    pub cooldown: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::from(&PassiveHealthConfig::default())
    }
}

impl From<&PassiveHealthConfig> for HealthPolicy {
    fn from(config: &PassiveHealthConfig) -> Self {
        Self {
            unhealthy_threshold: config.unhealthy_threshold.max(1) as usize,
            healthy_threshold: config.healthy_threshold.max(1) as usize,
            cooldown: Duration::from_secs(config.cooldown_secs),
        }
    }
}

/// Health of one backend, shared between request tasks.
#[derive(Debug)]
pub struct BackendHealth {
    policy: HealthPolicy,
    /// Current health state (0=Unknown, 1=Healthy, 2=Unhealthy).
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
    /// Milliseconds since `epoch` at the last failure observed while unhealthy.
    tripped_at_ms: AtomicU64,
    epoch: Instant,
}

impl BackendHealth {
    pub fn new(policy: HealthPolicy) -> Self {
        Self {
            policy,
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
            tripped_at_ms: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    pub fn state(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Acquire))
    }

    /// Return true if the backend may receive traffic right now.
    ///
    /// Unhealthy backends become available again once the cooldown has
    /// elapsed since the last observed failure; the next outcome decides
    /// whether they stay.
    ///
    /// There is no single trial request: after the cooldown every caller
    /// sees the backend as available until an outcome is recorded, so a
    /// burst of concurrent requests may all reach it.
    pub fn is_available(&self) -> bool {
        match self.state() {
            HealthState::Unhealthy => {
                let tripped_at = self.tripped_at_ms.load(Ordering::Acquire);
                let elapsed = self.now_ms().saturating_sub(tripped_at);
                elapsed >= self.policy.cooldown.as_millis() as u64
            }
            _ => true,
        }
    }

    /// Report a successful request.
    /// Returns the new state if this call caused a transition.
    pub fn record_success(&self) -> Option<HealthState> {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.state() == HealthState::Healthy {
            return None;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= self.policy.healthy_threshold {
            let previous = self.state.swap(HealthState::Healthy as u8, Ordering::AcqRel);
            if previous != HealthState::Healthy as u8 {
                return Some(HealthState::Healthy);
            }
        }
        None
    }

    /// Report a failed request.
    /// Returns the new state if this call caused a transition.
    pub fn record_failure(&self) -> Option<HealthState> {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        if self.state() == HealthState::Unhealthy {
            self.tripped_at_ms.store(self.now_ms(), Ordering::Release);
            return None;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.policy.unhealthy_threshold {
            self.tripped_at_ms.store(self.now_ms(), Ordering::Release);
            let previous = self.state.swap(HealthState::Unhealthy as u8, Ordering::AcqRel);
            if previous != HealthState::Unhealthy as u8 {
                return Some(HealthState::Unhealthy);
            }
        }
        None
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
