/// Errors that can occur while running the command pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] rovctl_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] rovctl_frame::FrameError),

    /// A task thread could not be created.
    #[error("failed to spawn task {name}: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },

    /// The scheduling plan violates the priority ordering contract.
    #[error("invalid scheduling plan: {0}")]
    Scheduling(String),
}

pub type Result<T> = std::result::Result<T, ControlError>;
