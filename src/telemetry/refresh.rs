use std::time::SystemTime;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::RefreshError;

/// Structured events for one refresh episode, correlated by attempt id.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn emit_start(&self, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &RefreshError, at: SystemTime) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            error = %error,
            "refresh.failure"
        );
    }
}
