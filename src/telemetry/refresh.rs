use std::time::Instant;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Structured events for one 401 recovery, keyed by a random attempt id.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
    started: Instant,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
            started: Instant::now(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            "refresh.start"
        );
    }

    pub fn emit_waiting(&self, waiter: u64) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            waiter,
            "refresh.waiting"
        );
    }

    pub fn emit_success(&self, resumed_waiters: usize) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            resumed_waiters,
            elapsed_ms = self.elapsed_ms(),
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, resumed_waiters: usize) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            resumed_waiters,
            elapsed_ms = self.elapsed_ms(),
            error = %error,
            "refresh.failure"
        );
    }
}
