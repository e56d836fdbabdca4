use std::time::Duration;

use rovctl_frame::{FrameSender, WireFrame};
use tracing::info;

use crate::cmd::{parse_duration, parse_payload, SendArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, FrameReport, OutputFormat};

/// One frame of the reference test sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SuiteFrame {
    sequence: u32,
    payload: u64,
    corrupt: bool,
}

const fn frame(sequence: u32, payload: u64, corrupt: bool) -> SuiteFrame {
    SuiteFrame {
        sequence,
        payload,
        corrupt,
    }
}

/// Six frames the controller accepts and two it must reject.
const SUITE: [SuiteFrame; 8] = [
    frame(1, 0x1234_5678_90AB_CDEF, false),
    frame(2, 0xDEAD_BEEF_CAFE_BABE, false),
    frame(3, 0x0000_0000_0000_0000, false),
    frame(4, 0xFFFF_FFFF_FFFF_FFFF, false),
    frame(100, 0x1234_5678_9ABC_DEF0, false),
    frame(255, 0x5555_AAAA_5555_AAAA, true),
    frame(254, 0x5555_AAAA_5555_AAAA, true),
    frame(252, 0x5555_AAAA_5555_AAAA, false),
];

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let plan = if args.suite {
        SUITE.to_vec()
    } else {
        vec![frame(
            args.sequence,
            parse_payload(&args.payload)?,
            args.corrupt_checksum,
        )]
    };
    let delay = parse_duration(&args.delay)?;

    let sender =
        FrameSender::connect(args.addr.as_str()).map_err(|err| frame_error("connect failed", err))?;
    info!(peer = %args.addr, frames = plan.len(), "sending command frames");

    send_all(&sender, &plan, delay, format)?;
    Ok(SUCCESS)
}

fn send_all(
    sender: &FrameSender,
    plan: &[SuiteFrame],
    delay: Duration,
    format: OutputFormat,
) -> CliResult<Vec<WireFrame>> {
    let mut sent = Vec::with_capacity(plan.len());
    for (i, item) in plan.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let frame = if item.corrupt {
            sender.send_corrupted(item.sequence, item.payload)
        } else {
            sender.send(item.sequence, item.payload)
        }
        .map_err(|err| frame_error("send failed", err))?;

        let report = if item.corrupt {
            FrameReport::rejected(Some(&frame), &frame.to_bytes(), "checksum corrupted")
        } else {
            FrameReport::accepted(&frame)
        };
        print_frame(&report, format);
        sent.push(frame);
    }
    Ok(sent)
}
