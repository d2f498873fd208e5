use thiserror::Error;

/// Failures reported by a subsystem initializer. All of them are fatal for the
/// launch screen.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("storage is unavailable: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("launch sequencer is missing the `{0}` collaborator")]
    MissingCollaborator(&'static str),
}
