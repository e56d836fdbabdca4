use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use rovctl_transport::DEFAULT_PORT;

use crate::exit::{CliError, CliResult};
use crate::output::OutputFormat;

pub mod inspect;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the controller and process command frames until killed.
    Run(RunArgs),
    /// Send command frames to a controller.
    Send(SendArgs),
    /// Encode or validate a frame and print its decoded fields.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// How the controller learns that the network link is usable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LinkMode {
    /// Mark the link up once after the settle delay.
    Static,
    /// Follow the operational state of a network interface.
    Watch,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// UDP port to listen on.
    #[arg(long, env = "ROVCTL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Local address to bind.
    #[arg(long, env = "ROVCTL_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    /// Link readiness source.
    #[arg(long, value_enum, env = "ROVCTL_LINK", default_value = "static")]
    pub link: LinkMode,
    /// Interface to watch with `--link watch`.
    #[arg(long, env = "ROVCTL_INTERFACE", required_if_eq("link", "watch"))]
    pub interface: Option<String>,
    /// Delay before a static link is reported up (e.g. 500ms, 0ms).
    #[arg(long, env = "ROVCTL_SETTLE", default_value = "500ms")]
    pub settle: String,
    /// Interval between status reports (e.g. 5s).
    #[arg(long, env = "ROVCTL_STATUS_INTERVAL", default_value = "5s")]
    pub status_interval: String,
    /// Pause after each applied command (e.g. 10ms).
    #[arg(long, env = "ROVCTL_YIELD_INTERVAL", default_value = "10ms")]
    pub yield_interval: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Controller address (host:port).
    pub addr: String,
    /// Sequence number.
    #[arg(long, short = 's', default_value_t = 1, conflicts_with = "suite")]
    pub sequence: u32,
    /// 64-bit payload as hex, byte 0 (surge) least significant.
    #[arg(long, short = 'p', default_value = "0080808080808080", conflicts_with = "suite")]
    pub payload: String,
    /// XOR the checksum with 0xDEADBEEF so the controller rejects the frame.
    #[arg(long, conflicts_with = "suite")]
    pub corrupt_checksum: bool,
    /// Send the reference test sequence (eight frames, two corrupted).
    #[arg(long)]
    pub suite: bool,
    /// Pause between frames with `--suite` (e.g. 2s, 100ms).
    #[arg(long, default_value = "2s")]
    pub delay: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Sequence number.
    #[arg(long, short = 's', default_value_t = 1)]
    pub sequence: u32,
    /// 64-bit payload as hex.
    #[arg(long, short = 'p', default_value = "0080808080808080")]
    pub payload: String,
    /// Validate a raw datagram given as hex instead of encoding one.
    #[arg(long, conflicts_with_all = ["sequence", "payload"])]
    pub frame: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `150ms`, `2s` or a bare number of seconds. Zero is allowed.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

pub fn parse_positive_duration(input: &str) -> CliResult<Duration> {
    let duration = parse_duration(input)?;
    if duration.is_zero() {
        return Err(CliError::usage("duration must be greater than zero"));
    }
    Ok(duration)
}

/// Parse a payload of up to 16 hex digits, with optional `0x` and `_` separators.
pub fn parse_payload(input: &str) -> CliResult<u64> {
    let digits: String = input
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .chars()
        .filter(|c| *c != '_')
        .collect();
    if digits.is_empty() || digits.len() > 16 {
        return Err(CliError::usage(format!(
            "payload must be 1 to 16 hex digits: {input}"
        )));
    }
    u64::from_str_radix(&digits, 16)
        .map_err(|_| CliError::usage(format!("payload is not valid hex: {input}")))
}

/// Parse an even-length hex string into bytes. Whitespace is ignored.
pub fn parse_hex_bytes(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::usage("hex input must have an even number of digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| CliError::usage(format!("invalid hex byte in: {input}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_positive_duration("0s").is_err());
    }

    #[test]
    fn parse_payload_accepts_prefixes_and_separators() {
        assert_eq!(
            parse_payload("0x0080_8080_8080_8080").unwrap(),
            0x0080_8080_8080_8080
        );
        assert_eq!(parse_payload("ff").unwrap(), 0xff);
        assert_eq!(parse_payload("FFFFFFFFFFFFFFFF").unwrap(), u64::MAX);
    }

    #[test]
    fn parse_payload_rejects_bad_input() {
        assert!(parse_payload("").is_err());
        assert!(parse_payload("0x").is_err());
        assert!(parse_payload("1_0000_0000_0000_0000").is_err());
        assert!(parse_payload("xyz").is_err());
    }

    #[test]
    fn parse_hex_bytes_pairs() {
        assert_eq!(parse_hex_bytes("00 ff 10").unwrap(), vec![0x00, 0xff, 0x10]);
        assert!(parse_hex_bytes("abc").is_err());
        assert!(parse_hex_bytes("zz").is_err());
        assert_eq!(parse_hex_bytes("").unwrap(), Vec::<u8>::new());
    }
}
