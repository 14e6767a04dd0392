//! A `pybreaker`-style circuit breaker (closed/open/half-open), grounded on
//! `original_source/integrations/ai_engine/client.py`'s
//! `CircuitBreaker(fail_max=5, reset_timeout=60)`.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::PredictionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    /// Open until `opened_at + reset_timeout`, then one probe call is let
    /// through before the breaker decides whether to close or reopen.
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

pub struct CircuitBreaker {
    fail_max: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(fail_max: u32, reset_timeout: Duration) -> Self {
        Self { fail_max,
               reset_timeout,
               inner: Mutex::new(Inner { state: State::Closed,
                                         consecutive_failures: 0,
                                         opened_at: None,
                                         probe_in_flight: false }) }
    }

    /// Call before issuing a request. Returns `Err(ServiceUnavailable)` if
    /// calls are currently suspended, matching the fail-fast error a caller
    /// would see from a real unavailable upstream; otherwise admits the
    /// call (and, if the breaker was half-open, marks a probe as in
    /// flight).
    pub fn before_call(&self) -> Result<(), PredictionError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            State::Closed => Ok(()),
            State::Open => {
                let elapsed = inner.opened_at.map(|at| at.elapsed()).unwrap_or_default();
                if elapsed >= self.reset_timeout {
                    inner.state = State::HalfOpen;
                    inner.probe_in_flight = true;
                    Ok(())
                } else {
                    Err(PredictionError::ServiceUnavailable)
                }
            }
            State::HalfOpen => {
                if inner.probe_in_flight {
                    Err(PredictionError::ServiceUnavailable)
                } else {
                    inner.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    pub fn on_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.probe_in_flight = false;
    }

    pub fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.probe_in_flight = false;
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at = Some(Instant::now());
            }
            State::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.fail_max {
                    inner.state = State::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            State::Open => {}
        }
    }
}
