use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rovctl_control::DecodedCommand;
use rovctl_frame::WireFrame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One frame as sent or inspected.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub sequence: u32,
    pub payload: String,
    pub checksum: String,
    pub bytes: String,
    pub valid: bool,
    /// Why the frame would be rejected, if it would be.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<DecodedCommand>,
}

impl FrameReport {
    pub fn accepted(frame: &WireFrame) -> Self {
        Self {
            sequence: frame.sequence,
            payload: format!("{:#018x}", frame.payload),
            checksum: format!("{:#010x}", frame.checksum),
            bytes: hex(&frame.to_bytes()),
            valid: true,
            rejection: None,
            command: Some(DecodedCommand::from(*frame)),
        }
    }

    /// A frame that went out with a bad checksum, or raw bytes that failed validation.
    pub fn rejected(frame: Option<&WireFrame>, bytes: &[u8], reason: impl Into<String>) -> Self {
        Self {
            sequence: frame.map(|f| f.sequence).unwrap_or_default(),
            payload: frame
                .map(|f| format!("{:#018x}", f.payload))
                .unwrap_or_default(),
            checksum: frame
                .map(|f| format!("{:#010x}", f.checksum))
                .unwrap_or_default(),
            bytes: hex(bytes),
            valid: false,
            rejection: Some(reason.into()),
            command: None,
        }
    }
}

pub fn print_frame(report: &FrameReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["sequence".to_string(), report.sequence.to_string()])
                .add_row(vec!["payload".to_string(), report.payload.clone()])
                .add_row(vec!["checksum".to_string(), report.checksum.clone()])
                .add_row(vec!["bytes".to_string(), report.bytes.clone()])
                .add_row(vec!["valid".to_string(), report.valid.to_string()]);
            if let Some(reason) = &report.rejection {
                table.add_row(vec!["rejection".to_string(), reason.clone()]);
            }
            if let Some(cmd) = &report.command {
                for (name, value) in command_fields(cmd) {
                    table.add_row(vec![name.to_string(), value]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!(
                "seq={} payload={} crc={} valid={}",
                report.sequence, report.payload, report.checksum, report.valid
            );
            if let Some(reason) = &report.rejection {
                line.push_str(&format!(" rejection=\"{reason}\""));
            }
            if let Some(cmd) = &report.command {
                for (name, value) in command_fields(cmd) {
                    line.push_str(&format!(" {name}={value}"));
                }
            }
            println!("{line}");
        }
    }
}

fn command_fields(cmd: &DecodedCommand) -> [(&'static str, String); 8] {
    [
        ("surge", cmd.surge.to_string()),
        ("sway", cmd.sway.to_string()),
        ("heave", cmd.heave.to_string()),
        ("roll", cmd.roll.to_string()),
        ("pitch", cmd.pitch.to_string()),
        ("yaw", cmd.yaw.to_string()),
        ("light", cmd.light.to_string()),
        ("manipulator", cmd.manipulator.to_string()),
    ]
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
