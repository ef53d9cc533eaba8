use thiserror::Error;

/// Failures surfaced to a thread waiting on host execution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutorError {
    /// The host loop has shut down and no longer accepts work.
    #[error("host execution context is unavailable")]
    HostUnavailable,
    /// The submitted work panicked on the host thread.
    #[error("command handler panicked: {message}")]
    WorkPanicked { message: String },
    /// Shutdown began while the caller was waiting.
    #[error("server is shutting down")]
    Abandoned,
    /// The job was discarded without running.
    #[error("host dropped the command before running it")]
    WorkDropped,
}
