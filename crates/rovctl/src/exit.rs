use std::fmt;
use std::io;

use rovctl_control::ControlError;
use rovctl_frame::FrameError;
use rovctl_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::HostUnreachable => TRANSPORT_ERROR,
        io::ErrorKind::ConnectionRefused => FAILURE,
        io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::InvalidInterface(_) => CliError::usage(format!("{context}: {err}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::WrongSize { .. } | FrameError::ChecksumMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn control_error(context: &str, err: ControlError) -> CliError {
    match err {
        ControlError::Transport(err) => transport_error(context, err),
        ControlError::Frame(err) => frame_error(context, err),
        ControlError::Scheduling(_) => CliError::usage(format!("{context}: {err}")),
        ControlError::Spawn { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_frames_map_to_data_invalid() {
        let err = frame_error(
            "inspect",
            FrameError::WrongSize {
                len: 3,
                expected: 16,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("inspect: "));
    }

    #[test]
    fn bind_conflict_maps_to_transport_error() {
        let err = control_error(
            "start",
            ControlError::Transport(TransportError::Bind {
                addr: "127.0.0.1:12345".parse().unwrap(),
                source: io::Error::from(io::ErrorKind::AddrInUse),
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn bad_interface_is_usage() {
        let err = transport_error("watch", TransportError::InvalidInterface("../x".into()));
        assert_eq!(err.code, USAGE);
    }
}
