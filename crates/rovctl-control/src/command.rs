use rovctl_frame::WireFrame;
use serde::Serialize;

/// Payload byte value that decodes to a neutral (zero) axis.
pub const AXIS_NEUTRAL: u8 = 0x80;

/// A validated, decoded control command.
///
/// Payload byte *i* (bits `8i..8i+7`, least significant byte first) maps to:
///
/// | byte | field         | decoding        |
/// |------|---------------|-----------------|
/// | 0    | `surge`       | `byte - 128`    |
/// | 1    | `sway`        | `byte - 128`    |
/// | 2    | `heave`       | `byte - 128`    |
/// | 3    | `roll`        | `byte - 128`    |
/// | 4    | `pitch`       | `byte - 128`    |
/// | 5    | `yaw`         | `byte - 128`    |
/// | 6    | `light`       | raw             |
/// | 7    | `manipulator` | raw             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedCommand {
    pub sequence: u32,
    /// Forward/backward.
    pub surge: i8,
    /// Left/right.
    pub sway: i8,
    /// Up/down.
    pub heave: i8,
    pub roll: i8,
    pub pitch: i8,
    pub yaw: i8,
    /// Light brightness, 0-255.
    pub light: u8,
    /// Manipulator position, 0-255.
    pub manipulator: u8,
}

/// The six motion axes of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Motion {
    pub surge: i8,
    pub sway: i8,
    pub heave: i8,
    pub roll: i8,
    pub pitch: i8,
    pub yaw: i8,
}

impl DecodedCommand {
    pub fn motion(&self) -> Motion {
        Motion {
            surge: self.surge,
            sway: self.sway,
            heave: self.heave,
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
        }
    }

    /// Axes in payload order: surge, sway, heave, roll, pitch, yaw.
    pub fn axes(&self) -> [i8; 6] {
        [
            self.surge, self.sway, self.heave, self.roll, self.pitch, self.yaw,
        ]
    }
}

impl From<WireFrame> for DecodedCommand {
    fn from(frame: WireFrame) -> Self {
        decode(frame.sequence, frame.payload)
    }
}

fn centered(byte: u8) -> i8 {
    (byte ^ AXIS_NEUTRAL) as i8
}

fn uncentered(axis: i8) -> u8 {
    (axis as u8) ^ AXIS_NEUTRAL
}

/// Decode a payload. Total over all inputs.
pub fn decode(sequence: u32, payload: u64) -> DecodedCommand {
    let b = payload.to_le_bytes();
    DecodedCommand {
        sequence,
        surge: centered(b[0]),
        sway: centered(b[1]),
        heave: centered(b[2]),
        roll: centered(b[3]),
        pitch: centered(b[4]),
        yaw: centered(b[5]),
        light: b[6],
        manipulator: b[7],
    }
}

/// Pack a command back into a payload. Inverse of [`decode`].
pub fn encode_payload(command: &DecodedCommand) -> u64 {
    u64::from_le_bytes([
        uncentered(command.surge),
        uncentered(command.sway),
        uncentered(command.heave),
        uncentered(command.roll),
        uncentered(command.pitch),
        uncentered(command.yaw),
        command.light,
        command.manipulator,
    ])
}
