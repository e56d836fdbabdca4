//! Link event sources.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::link::{LinkEvent, LinkPublisher};

/// Time a statically addressed interface is given to come up.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Default operstate polling period.
pub const DEFAULT_WATCH_PERIOD: Duration = Duration::from_millis(250);

const SYSFS_NET: &str = "/sys/class/net";
const IFNAMSIZ: usize = 16;

/// Statically addressed link: reports `Up` once after a settle delay.
#[derive(Debug, Clone)]
pub struct StaticLink {
    settle: Duration,
}

impl StaticLink {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    pub fn run(self, publisher: LinkPublisher) {
        info!(settle_ms = self.settle.as_millis() as u64, "static link configuration");
        std::thread::sleep(self.settle);
        publisher.publish(LinkEvent::Up);
    }

    /// Run on a background thread.
    pub fn spawn(self, publisher: LinkPublisher) -> Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("rovctl-link".into())
            .spawn(move || self.run(publisher))
            .map_err(TransportError::Io)
    }
}

impl Default for StaticLink {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}

/// Polls `/sys/class/net/<iface>/operstate` and publishes transitions.
#[derive(Debug, Clone)]
pub struct OperstateWatcher {
    interface: String,
    root: PathBuf,
    period: Duration,
    last: Option<LinkEvent>,
}

impl OperstateWatcher {
    pub fn new(interface: impl Into<String>, period: Duration) -> Result<Self> {
        Self::with_root(interface, SYSFS_NET, period)
    }

    /// Watch an interface below an explicit sysfs-style root.
    pub fn with_root(
        interface: impl Into<String>,
        root: impl AsRef<Path>,
        period: Duration,
    ) -> Result<Self> {
        let interface = interface.into();
        if interface.is_empty()
            || interface.len() >= IFNAMSIZ
            || interface.contains('/')
            || interface == "."
            || interface == ".."
        {
            return Err(TransportError::InvalidInterface(interface));
        }
        Ok(Self {
            interface,
            root: root.as_ref().to_path_buf(),
            period,
            last: None,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Read the current state. A missing interface reads as down.
    pub fn read_state(&self) -> LinkEvent {
        let path = self.root.join(&self.interface).join("operstate");
        match std::fs::read_to_string(&path) {
            // Drivers that do not track carrier report "unknown" while usable.
            Ok(state) => match state.trim() {
                "up" | "unknown" => LinkEvent::Up,
                _ => LinkEvent::Down,
            },
            Err(err) => {
                debug!(?path, error = %err, "operstate unreadable");
                LinkEvent::Down
            }
        }
    }

    /// Poll once and publish if the state changed since the last poll.
    pub fn poll(&mut self, publisher: &LinkPublisher) -> Option<LinkEvent> {
        let current = self.read_state();
        if self.last == Some(current) {
            return None;
        }
        if self.last.is_some() && current == LinkEvent::Down {
            warn!(interface = %self.interface, "carrier lost");
        }
        self.last = Some(current);
        publisher.publish(current);
        Some(current)
    }

    pub fn run(mut self, publisher: LinkPublisher) {
        info!(interface = %self.interface, "watching link state");
        loop {
            self.poll(&publisher);
            std::thread::sleep(self.period);
        }
    }

    /// Run on a background thread.
    pub fn spawn(self, publisher: LinkPublisher) -> Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("rovctl-link".into())
            .spawn(move || self.run(publisher))
            .map_err(TransportError::Io)
    }
}
