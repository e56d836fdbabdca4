use rovctl_frame::{validate_frame, WireFrame};

use crate::cmd::{parse_hex_bytes, parse_payload, InspectArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, FrameReport, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    if let Some(hex) = &args.frame {
        let bytes = parse_hex_bytes(hex)?;
        return match validate_frame(&bytes) {
            Ok(frame) => {
                print_frame(&FrameReport::accepted(&frame), format);
                Ok(SUCCESS)
            }
            Err(err) => {
                print_frame(&FrameReport::rejected(None, &bytes, err.to_string()), format);
                Err(frame_error("frame rejected", err))
            }
        };
    }

    let frame = WireFrame::new(args.sequence, parse_payload(&args.payload)?);
    print_frame(&FrameReport::accepted(&frame), format);
    Ok(SUCCESS)
}
