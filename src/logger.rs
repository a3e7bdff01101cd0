//! The post-commit diagnostic sink (spec §7 "Post-commit errors ... logs
//! them with method/path/status metadata"). Wraps `tracing` by default, the
//! way the reference router's own middleware wires its diagnostics, but lets
//! an application redirect the one case where the core cannot surface an
//! error as a response: a panic recovered after the response was already
//! committed.

use std::sync::Arc;

/// A single post-commit panic record.
pub struct PanicAfterCommit<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub payload: &'a str,
}

pub trait Logger: Send + Sync {
    fn panic_after_commit(&self, record: PanicAfterCommit<'_>);
}

/// Routes to `tracing::error!`, matching the reference router's structured
/// field convention (`method = %..., path = %..., status = ...`).
#[derive(Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn panic_after_commit(&self, record: PanicAfterCommit<'_>) {
        tracing::error!(
            method = record.method,
            path = record.path,
            status = record.status,
            panic = record.payload,
            "handler panicked after the response was already committed"
        );
    }
}

pub type LoggerHandle = Arc<dyn Logger>;

pub fn default_logger() -> LoggerHandle {
    Arc::new(TracingLogger)
}
