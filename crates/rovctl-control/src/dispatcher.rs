use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::command::{DecodedCommand, Motion};
use crate::queue::CommandQueue;
use crate::stats::PipelineStats;

/// Default pause after each applied command.
pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_millis(10);

/// Receives decoded commands. Implemented by the vehicle's actuator drivers.
pub trait ActuationSink {
    /// Apply the six-axis motion demand.
    fn apply_motion(&mut self, motion: Motion);
    fn set_light(&mut self, brightness: u8);
    fn set_manipulator(&mut self, position: u8);
}

/// Single digital output flipped once per processed command.
pub trait StatusIndicator {
    fn toggle(&mut self);
}

impl<T: ActuationSink + ?Sized> ActuationSink for Box<T> {
    fn apply_motion(&mut self, motion: Motion) {
        (**self).apply_motion(motion)
    }

    fn set_light(&mut self, brightness: u8) {
        (**self).set_light(brightness)
    }

    fn set_manipulator(&mut self, position: u8) {
        (**self).set_manipulator(position)
    }
}

impl<T: StatusIndicator + ?Sized> StatusIndicator for Box<T> {
    fn toggle(&mut self) {
        (**self).toggle()
    }
}

/// Actuation sink that reports demands through the log.
#[derive(Debug, Default)]
pub struct LoggingActuator;

impl ActuationSink for LoggingActuator {
    fn apply_motion(&mut self, motion: Motion) {
        info!(
            surge = motion.surge,
            sway = motion.sway,
            heave = motion.heave,
            roll = motion.roll,
            pitch = motion.pitch,
            yaw = motion.yaw,
            "6dof control"
        );
    }

    fn set_light(&mut self, brightness: u8) {
        if brightness > 0 {
            let percent = brightness as u32 * 100 / 255;
            info!(brightness, percent, "light");
        }
    }

    fn set_manipulator(&mut self, position: u8) {
        if position > 0 {
            info!(position, "manipulator");
        }
    }
}

/// Status indicator that tracks its level and logs each flip.
#[derive(Debug, Default)]
pub struct LoggingIndicator {
    on: bool,
}

impl LoggingIndicator {
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl StatusIndicator for LoggingIndicator {
    fn toggle(&mut self) {
        self.on = !self.on;
        debug!(on = self.on, "status indicator toggled");
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Pause after each applied command.
    pub yield_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

/// Consumes the command queue and drives the actuators.
pub struct Dispatcher<A, I> {
    queue: CommandQueue,
    sink: A,
    indicator: I,
    stats: Arc<PipelineStats>,
    config: DispatcherConfig,
}

impl<A: ActuationSink, I: StatusIndicator> Dispatcher<A, I> {
    pub fn new(
        queue: CommandQueue,
        sink: A,
        indicator: I,
        stats: Arc<PipelineStats>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            queue,
            sink,
            indicator,
            stats,
            config,
        }
    }

    /// Apply one command to the sink and flip the indicator.
    pub fn apply(&mut self, command: &DecodedCommand) {
        debug!(sequence = command.sequence, "processing command");
        self.sink.apply_motion(command.motion());
        self.sink.set_light(command.light);
        self.sink.set_manipulator(command.manipulator);
        self.indicator.toggle();
        self.stats.record_dispatched();
    }

    /// Block for the next command and apply it.
    ///
    /// Returns the applied command, or `None` if the queue is disconnected.
    pub fn dispatch_one(&mut self) -> Option<DecodedCommand> {
        let command = self.queue.get()?;
        self.apply(&command);
        Some(command)
    }

    /// Run forever in arrival order.
    pub fn run(mut self) {
        info!(
            capacity = self.queue.capacity(),
            "dispatcher waiting for commands"
        );
        loop {
            if self.dispatch_one().is_none() {
                error!("command queue disconnected, dispatcher stopping");
                return;
            }
            std::thread::sleep(self.config.yield_interval);
        }
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::command::decode;

    #[derive(Debug, Default)]
    struct Recorder {
        motions: Vec<Motion>,
        lights: Vec<u8>,
        manipulators: Vec<u8>,
    }

    impl ActuationSink for Recorder {
        fn apply_motion(&mut self, motion: Motion) {
            self.motions.push(motion);
        }

        fn set_light(&mut self, brightness: u8) {
            self.lights.push(brightness);
        }

        fn set_manipulator(&mut self, position: u8) {
            self.manipulators.push(position);
        }
    }

    /// Sink that forwards to a shared log so a running dispatcher can be observed.
    struct SharedRecorder(Arc<Mutex<Vec<u32>>>, u32);

    impl ActuationSink for SharedRecorder {
        fn apply_motion(&mut self, _motion: Motion) {}

        fn set_light(&mut self, brightness: u8) {
            self.1 = brightness as u32;
        }

        fn set_manipulator(&mut self, position: u8) {
            let mut log = self.0.lock().unwrap();
            log.push(self.1 << 8 | position as u32);
        }
    }

    fn dispatcher(queue: &CommandQueue) -> Dispatcher<Recorder, LoggingIndicator> {
        Dispatcher::new(
            queue.clone(),
            Recorder::default(),
            LoggingIndicator::default(),
            Arc::new(PipelineStats::new()),
            DispatcherConfig::default(),
        )
    }

    #[test]
    fn applies_all_fields_and_toggles_indicator() {
        let queue = CommandQueue::new();
        let mut dispatcher = dispatcher(&queue);

        queue.put(decode(1, 0x0080_8080_8080_8080));
        let applied = dispatcher.dispatch_one().unwrap();

        assert_eq!(applied.sequence, 1);
        assert_eq!(dispatcher.sink().motions, vec![Motion::default()]);
        assert_eq!(dispatcher.sink().lights, vec![0x80]);
        assert_eq!(dispatcher.sink().manipulators, vec![0x00]);
        assert!(dispatcher.indicator().is_on());
        assert_eq!(dispatcher.stats.snapshot().dispatched, 1);
    }

    #[test]
    fn indicator_flips_once_per_command() {
        let queue = CommandQueue::new();
        let mut dispatcher = dispatcher(&queue);

        queue.put(decode(1, 0));
        queue.put(decode(2, 0));
        dispatcher.dispatch_one();
        dispatcher.dispatch_one();

        assert!(!dispatcher.indicator().is_on());
        assert_eq!(dispatcher.sink().motions.len(), 2);
    }

    #[test]
    fn running_dispatcher_applies_in_arrival_order() {
        let queue = CommandQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(
            queue.clone(),
            SharedRecorder(Arc::clone(&log), 0),
            LoggingIndicator::default(),
            Arc::new(PipelineStats::new()),
            DispatcherConfig {
                yield_interval: Duration::from_millis(1),
            },
        );
        std::thread::spawn(move || dispatcher.run());

        for seq in 1u8..=5 {
            let payload = u64::from_le_bytes([0x80, 0x80, 0x80, 0x80, 0x80, 0x80, seq, seq]);
            assert_eq!(queue.put(decode(seq as u32, payload)), crate::PutOutcome::Queued);
        }

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while log.lock().unwrap().len() < 5 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        let expected: Vec<u32> = (1u32..=5).map(|s| s << 8 | s).collect();
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[test]
    fn logging_actuator_accepts_extremes() {
        let mut sink = LoggingActuator;
        sink.apply_motion(decode(0, 0).motion());
        sink.set_light(0);
        sink.set_light(255);
        sink.set_manipulator(0);
        sink.set_manipulator(255);
    }
}
