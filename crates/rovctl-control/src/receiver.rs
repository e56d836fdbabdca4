use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use rovctl_frame::{FrameError, FrameReceiver, WireFrame};
use rovctl_transport::{DatagramSource, LinkSignal, UdpSocket, DEFAULT_PORT};
use tracing::{debug, error, info, warn};

use crate::command::DecodedCommand;
use crate::error::Result;
use crate::queue::{CommandQueue, PutOutcome};
use crate::stats::PipelineStats;

/// Receiver settings.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Address the command socket binds to.
    pub bind_addr: SocketAddr,
    /// Sleep between link readiness checks.
    pub link_poll_interval: Duration,
    /// Pause after a failed receive.
    pub error_backoff: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            link_poll_interval: Duration::from_millis(100),
            error_backoff: Duration::from_millis(100),
        }
    }
}

/// What happened to one received datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Queued { sequence: u32 },
    /// Valid frame, but the queue was full.
    Dropped { sequence: u32 },
    WrongSize { len: usize },
    ChecksumMismatch { received: u32, computed: u32 },
    /// The receive call itself failed.
    IoError,
}

/// Network side of the pipeline: receive, validate, decode, enqueue.
pub struct Receiver {
    config: ReceiverConfig,
    link: Arc<LinkSignal>,
    queue: CommandQueue,
    stats: Arc<PipelineStats>,
}

impl Receiver {
    pub fn new(
        config: ReceiverConfig,
        link: Arc<LinkSignal>,
        queue: CommandQueue,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            config,
            link,
            queue,
            stats,
        }
    }

    /// Wait for the link, bind, and serve forever.
    ///
    /// Only returns on socket setup failure. Setup is not retried.
    pub fn run(self) -> Result<()> {
        let socket = self.open()?;
        self.serve(socket)
    }

    /// Wait until the link is up, then bind the command socket.
    pub fn open(&self) -> Result<UdpSocket> {
        self.link.wait_until_up(self.config.link_poll_interval);
        info!(addr = %self.config.bind_addr, "starting command listener");
        let socket = UdpSocket::bind(self.config.bind_addr)?;
        info!(addr = %socket.local_addr(), "listening for command frames");
        Ok(socket)
    }

    /// Receive from `source` forever.
    pub fn serve<S: DatagramSource>(&self, source: S) -> ! {
        let mut frames = FrameReceiver::new(source);
        loop {
            self.receive_one(&mut frames);
        }
    }

    /// Receive and handle exactly one datagram.
    pub fn receive_one<S: DatagramSource>(&self, frames: &mut FrameReceiver<S>) -> ReceiveOutcome {
        let result = frames.recv_frame();
        if !matches!(result, Err(FrameError::Io(_))) {
            self.stats.record_datagram();
        }
        self.handle(result)
    }

    fn handle(&self, result: rovctl_frame::Result<WireFrame>) -> ReceiveOutcome {
        match result {
            Ok(frame) => self.accept(frame),
            Err(FrameError::WrongSize { len, expected }) => {
                self.stats.record_wrong_size();
                warn!(len, expected, "discarding datagram of wrong size");
                ReceiveOutcome::WrongSize { len }
            }
            Err(FrameError::ChecksumMismatch { received, computed }) => {
                self.stats.record_checksum_mismatch();
                warn!(
                    received = %format!("{received:#010x}"),
                    computed = %format!("{computed:#010x}"),
                    "discarding frame with bad checksum"
                );
                ReceiveOutcome::ChecksumMismatch { received, computed }
            }
            Err(FrameError::Io(err)) => {
                self.stats.record_receive_error();
                error!(error = %err, "receive failed");
                self.recover();
                ReceiveOutcome::IoError
            }
        }
    }

    fn accept(&self, frame: WireFrame) -> ReceiveOutcome {
        self.stats.record_accepted(frame.sequence);
        let command = DecodedCommand::from(frame);
        debug!(
            sequence = command.sequence,
            payload = %format!("{:#018x}", frame.payload),
            "frame accepted"
        );

        match self.queue.put(command) {
            PutOutcome::Queued => {
                self.stats.record_queued();
                ReceiveOutcome::Queued {
                    sequence: command.sequence,
                }
            }
            PutOutcome::Dropped => {
                self.stats.record_dropped();
                ReceiveOutcome::Dropped {
                    sequence: command.sequence,
                }
            }
        }
    }

    /// Pause for the error back-off, then let the caller receive again.
    fn recover(&self) {
        if !self.link.is_up() {
            warn!("receive failed while the link is down");
        }
        std::thread::sleep(self.config.error_backoff);
    }
}
