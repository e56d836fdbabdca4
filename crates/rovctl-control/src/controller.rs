//! Wires the receiver, queue and dispatcher into running tasks.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rovctl_transport::LinkSignal;
use tracing::{error, info, warn};

use crate::dispatcher::{ActuationSink, Dispatcher, DispatcherConfig, StatusIndicator};
use crate::error::Result;
use crate::queue::CommandQueue;
use crate::receiver::{Receiver, ReceiverConfig};
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::task::SchedulingPlan;

/// Default interval between supervisor status reports.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Settings for the whole pipeline.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub receiver: ReceiverConfig,
    pub dispatcher: DispatcherConfig,
    pub scheduling: SchedulingPlan,
    pub status_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            receiver: ReceiverConfig::default(),
            dispatcher: DispatcherConfig::default(),
            scheduling: SchedulingPlan::default(),
            status_interval: DEFAULT_STATUS_INTERVAL,
        }
    }
}

/// Handle to a running pipeline.
///
/// The tasks run for the life of the process; there is no shutdown path.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    queue: CommandQueue,
    stats: Arc<PipelineStats>,
    network: JoinHandle<()>,
    actuation: JoinHandle<()>,
}

impl Controller {
    /// Validate the scheduling plan and start the network and actuation tasks.
    ///
    /// The network task waits on `link` before binding its socket.
    pub fn start<A, I>(
        config: ControllerConfig,
        link: Arc<LinkSignal>,
        sink: A,
        indicator: I,
    ) -> Result<Self>
    where
        A: ActuationSink + Send + 'static,
        I: StatusIndicator + Send + 'static,
    {
        config.scheduling.validate()?;

        let queue = CommandQueue::new();
        let stats = Arc::new(PipelineStats::new());

        let dispatcher = Dispatcher::new(
            queue.clone(),
            sink,
            indicator,
            Arc::clone(&stats),
            config.dispatcher.clone(),
        );
        let actuation = config.scheduling.actuation.spawn(move || dispatcher.run())?;

        let receiver = Receiver::new(
            config.receiver.clone(),
            link,
            queue.clone(),
            Arc::clone(&stats),
        );
        let network = config.scheduling.network.spawn(move || {
            if let Err(err) = receiver.run() {
                error!(error = %err, "command listener failed to start");
            }
        })?;

        info!(
            addr = %config.receiver.bind_addr,
            capacity = queue.capacity(),
            "controller started"
        );

        Ok(Self {
            config,
            queue,
            stats,
            network,
            actuation,
        })
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Commands currently buffered between the tasks.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_running(&self) -> bool {
        !self.network.is_finished() && !self.actuation.is_finished()
    }

    /// Log the current counters.
    pub fn report_status(&self) -> StatsSnapshot {
        let snap = self.stats();
        info!(
            datagrams = snap.datagrams,
            accepted = snap.accepted,
            rejected = snap.rejected(),
            dropped = snap.dropped,
            dispatched = snap.dispatched,
            queued = self.queued(),
            last_sequence = ?snap.last_sequence,
            "controller status"
        );
        snap
    }

    /// Run the supervisor loop on the calling thread. Never returns.
    pub fn supervise(&self) -> ! {
        self.config.scheduling.supervisor.apply_to_current();
        let mut warned = false;
        loop {
            std::thread::sleep(self.config.status_interval);
            self.report_status();
            if !warned && !self.is_running() {
                warn!(
                    network_running = !self.network.is_finished(),
                    actuation_running = !self.actuation.is_finished(),
                    "a pipeline task has stopped"
                );
                warned = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};
    use std::sync::Mutex;
    use std::time::Instant;

    use rovctl_frame::WireFrame;
    use rovctl_transport::{LinkEvent, UdpSocket};

    use super::*;
    use crate::command::Motion;
    use crate::dispatcher::LoggingIndicator;
    use crate::error::ControlError;
    use crate::task::TaskPriority;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Applied {
        motion: Motion,
        light: u8,
        manipulator: u8,
    }

    #[derive(Clone, Default)]
    struct SharedSink {
        applied: Arc<Mutex<Vec<Applied>>>,
        pending: Option<(Motion, u8)>,
    }

    impl ActuationSink for SharedSink {
        fn apply_motion(&mut self, motion: Motion) {
            self.pending = Some((motion, 0));
        }

        fn set_light(&mut self, brightness: u8) {
            if let Some(pending) = self.pending.as_mut() {
                pending.1 = brightness;
            }
        }

        fn set_manipulator(&mut self, position: u8) {
            if let Some((motion, light)) = self.pending.take() {
                self.applied.lock().unwrap().push(Applied {
                    motion,
                    light,
                    manipulator: position,
                });
            }
        }
    }

    fn free_port() -> u16 {
        let spare = std::net::UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        spare.local_addr().unwrap().port()
    }

    fn fast_config(port: u16) -> ControllerConfig {
        ControllerConfig {
            receiver: ReceiverConfig {
                bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
                link_poll_interval: Duration::from_millis(5),
                error_backoff: Duration::from_millis(5),
            },
            dispatcher: DispatcherConfig {
                yield_interval: Duration::from_millis(1),
            },
            status_interval: Duration::from_millis(50),
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn neutral_frame_reaches_sink() {
        let port = free_port();
        let link = Arc::new(LinkSignal::new());
        link.apply(LinkEvent::Up);
        let sink = SharedSink::default();
        let applied = Arc::clone(&sink.applied);

        let controller =
            Controller::start(fast_config(port), link, sink, LoggingIndicator::default()).unwrap();

        let sender = UdpSocket::connect(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).unwrap();
        let frame = WireFrame::new(1, 0x0080_8080_8080_8080).to_bytes();
        let deadline = Instant::now() + Duration::from_secs(5);
        while applied.lock().unwrap().is_empty() && Instant::now() < deadline {
            let _ = sender.send(&frame);
            std::thread::sleep(Duration::from_millis(20));
        }

        let first = applied.lock().unwrap()[0];
        assert_eq!(
            first,
            Applied {
                motion: Motion::default(),
                light: 0x80,
                manipulator: 0,
            }
        );
        let snap = controller.report_status();
        assert!(snap.dispatched >= 1);
        assert_eq!(snap.last_sequence, Some(1));
        assert!(controller.is_running());
    }

    #[test]
    fn corrupt_frames_never_reach_sink() {
        let port = free_port();
        let link = Arc::new(LinkSignal::new());
        link.apply(LinkEvent::Up);
        let sink = SharedSink::default();
        let applied = Arc::clone(&sink.applied);

        let controller =
            Controller::start(fast_config(port), link, sink, LoggingIndicator::default()).unwrap();

        let sender = UdpSocket::connect(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).unwrap();
        let mut bad = WireFrame::new(2, 0x0080_8080_8080_8080).to_bytes();
        bad[15] ^= 0x01;
        let good = WireFrame::new(3, 0x0080_8080_8080_8080).to_bytes();

        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.stats().dispatched == 0 && Instant::now() < deadline {
            let _ = sender.send(&bad);
            let _ = sender.send(&good);
            std::thread::sleep(Duration::from_millis(20));
        }

        let snap = controller.stats();
        assert!(snap.checksum_mismatch >= 1);
        assert_eq!(snap.last_sequence, Some(3));
        assert!(applied.lock().unwrap().iter().all(|a| a.manipulator == 0));
    }

    #[test]
    fn bind_failure_stops_only_the_network_task() {
        let taken = std::net::UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();
        let link = Arc::new(LinkSignal::new());
        link.apply(LinkEvent::Up);

        let controller = Controller::start(
            fast_config(port),
            link,
            SharedSink::default(),
            LoggingIndicator::default(),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !controller.network.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(controller.network.is_finished());
        assert!(!controller.actuation.is_finished());
        assert!(!controller.is_running());
        assert_eq!(controller.report_status().datagrams, 0);
        drop(taken);
    }

    #[test]
    fn inverted_plan_is_rejected_before_spawning() {
        let mut config = fast_config(free_port());
        config.scheduling.network.priority = TaskPriority::LEAST_URGENT;
        config.scheduling.actuation.priority = TaskPriority::MOST_URGENT;

        let result = Controller::start(
            config,
            Arc::new(LinkSignal::new()),
            SharedSink::default(),
            LoggingIndicator::default(),
        );
        assert!(matches!(result, Err(ControlError::Scheduling(_))));
    }

    #[test]
    fn listener_waits_for_link() {
        let port = free_port();
        let link = Arc::new(LinkSignal::new());
        let controller = Controller::start(
            fast_config(port),
            Arc::clone(&link),
            SharedSink::default(),
            LoggingIndicator::default(),
        )
        .unwrap();

        let sender = UdpSocket::connect(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).unwrap();
        let frame = WireFrame::new(9, 0).to_bytes();
        for _ in 0..5 {
            let _ = sender.send(&frame);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(controller.stats().datagrams, 0);

        link.apply(LinkEvent::Up);
        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.stats().dispatched == 0 && Instant::now() < deadline {
            let _ = sender.send(&frame);
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(controller.stats().last_sequence, Some(9));
        assert!(controller.is_running());
    }
}
