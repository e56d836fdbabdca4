//! Command decoding, bounded hand-off and actuation dispatch.
//!
//! This is the pipeline layer. A receiver thread validates frames and decodes
//! them into [`DecodedCommand`]s, a bounded [`CommandQueue`] decouples network
//! timing from actuation timing, and a dispatcher thread applies each command
//! to an [`ActuationSink`] in arrival order.

pub mod command;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod receiver;
pub mod stats;
pub mod task;

pub use command::{decode, encode_payload, DecodedCommand, Motion};
pub use controller::{Controller, ControllerConfig, DEFAULT_STATUS_INTERVAL};
pub use dispatcher::{
    ActuationSink, Dispatcher, DispatcherConfig, LoggingActuator, LoggingIndicator,
    StatusIndicator,
};
pub use error::{ControlError, Result};
pub use queue::{CommandQueue, PutOutcome, QUEUE_CAPACITY};
pub use receiver::{Receiver, ReceiverConfig, ReceiveOutcome};
pub use stats::{PipelineStats, StatsSnapshot};
pub use task::{SchedulingPlan, TaskConfig, TaskPriority};
