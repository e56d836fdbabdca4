//! Run a controller on loopback and feed it the reference frames.
//!
//! ```sh
//! cargo run -p rovctl --example loopback
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use rovctl::control::{
    Controller, ControllerConfig, LoggingActuator, LoggingIndicator, ReceiverConfig,
};
use rovctl::frame::FrameSender;
use rovctl::transport::{LinkPublisher, LinkSignal, StaticLink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 12345));

    let link = Arc::new(LinkSignal::new());
    let mut publisher = LinkPublisher::new();
    publisher.subscribe(Arc::clone(&link));

    let config = ControllerConfig {
        receiver: ReceiverConfig {
            bind_addr: addr,
            ..ReceiverConfig::default()
        },
        ..ControllerConfig::default()
    };
    let controller = Controller::start(config, link, LoggingActuator, LoggingIndicator::default())?;
    StaticLink::new(Duration::from_millis(100)).spawn(publisher)?;
    std::thread::sleep(Duration::from_millis(300));

    let sender = FrameSender::connect(addr)?;
    for seq in 1..=5u32 {
        let light = (seq * 50) as u64;
        sender.send(seq, 0x0000_8080_8080_8080 | light << 48)?;
    }
    sender.send_corrupted(6, 0)?;

    std::thread::sleep(Duration::from_millis(200));
    let stats = controller.stats();
    println!(
        "accepted={} rejected={} dispatched={}",
        stats.accepted,
        stats.rejected(),
        stats.dispatched
    );
    Ok(())
}
