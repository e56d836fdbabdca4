use std::net::SocketAddr;
use std::sync::Arc;

use rovctl_control::{
    Controller, ControllerConfig, DispatcherConfig, LoggingActuator, LoggingIndicator,
    ReceiverConfig,
};
use rovctl_transport::watch::DEFAULT_WATCH_PERIOD;
use rovctl_transport::{LinkPublisher, LinkSignal, OperstateWatcher, StaticLink};
use tracing::info;

use crate::cmd::{parse_duration, parse_positive_duration, LinkMode, RunArgs};
use crate::exit::{control_error, transport_error, CliError, CliResult};

pub fn run(args: RunArgs) -> CliResult<i32> {
    let config = controller_config(&args)?;
    let settle = parse_duration(&args.settle)?;

    let link = Arc::new(LinkSignal::new());
    let mut publisher = LinkPublisher::new();
    publisher.subscribe(Arc::clone(&link));

    let controller = Controller::start(
        config,
        link,
        LoggingActuator,
        LoggingIndicator::default(),
    )
    .map_err(|err| control_error("controller start failed", err))?;

    match args.link {
        LinkMode::Static => {
            StaticLink::new(settle)
                .spawn(publisher)
                .map_err(|err| transport_error("link setup failed", err))?;
        }
        LinkMode::Watch => {
            let interface = args
                .interface
                .ok_or_else(|| CliError::usage("--interface is required with --link watch"))?;
            let watcher = OperstateWatcher::new(interface, DEFAULT_WATCH_PERIOD)
                .map_err(|err| transport_error("link watch failed", err))?;
            info!(interface = watcher.interface(), "watching interface state");
            watcher
                .spawn(publisher)
                .map_err(|err| transport_error("link watch failed", err))?;
        }
    }

    controller.supervise()
}

fn controller_config(args: &RunArgs) -> CliResult<ControllerConfig> {
    Ok(ControllerConfig {
        receiver: ReceiverConfig {
            bind_addr: SocketAddr::new(args.bind, args.port),
            ..ReceiverConfig::default()
        },
        dispatcher: DispatcherConfig {
            yield_interval: parse_duration(&args.yield_interval)?,
        },
        status_interval: parse_positive_duration(&args.status_interval)?,
        ..ControllerConfig::default()
    })
}
