/// Errors that can occur while validating or exchanging frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The datagram is not exactly one frame long.
    #[error("wrong frame size ({len} bytes, expected {expected})")]
    WrongSize { len: usize, expected: usize },

    /// The transmitted checksum does not match the recomputed one.
    #[error("checksum mismatch (received {received:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { received: u32, computed: u32 },

    /// An I/O error occurred while receiving or sending.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether the datagram was received but rejected by validation.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::WrongSize { .. } | FrameError::ChecksumMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
