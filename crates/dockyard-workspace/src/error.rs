// ABOUTME: Error types for dashboards and cancelable initialization
// ABOUTME: Layout failures pass through; init errors tell cancellation apart from a lost task

use thiserror::Error;

use dockyard_layout::LayoutError;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Closed panel history must keep at least one panel")]
    InvalidHistoryLimit,

    #[error("Invalid workspace document: {0}")]
    Document(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// The caller gave up on the task before it finished.
    #[error("Initialization was canceled")]
    Canceled,

    /// The task ended without producing a value.
    #[error("Initialization task stopped before producing a value")]
    Aborted,

    #[error("Cancelable tasks must be started from within a Tokio runtime")]
    NoRuntime,
}
