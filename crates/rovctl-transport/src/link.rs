//! Link readiness.
//!
//! The network stack reports interface up/down asynchronously. Those reports
//! arrive as [`LinkEvent`]s on a [`LinkPublisher`], which forwards them to a
//! single subscribed [`LinkSignal`]. The receiver holds the same signal and
//! polls it before opening its socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Default interval between readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Operational state of the network link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Down,
    Up,
}

/// A link transition reported by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Up,
    Down,
}

/// Shared link readiness flag.
///
/// Only the latest state is kept. Starts [`LinkState::Down`].
#[derive(Debug, Default)]
pub struct LinkSignal {
    up: AtomicBool,
}

impl LinkSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        if self.is_up() {
            LinkState::Up
        } else {
            LinkState::Down
        }
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    /// Apply an event, returning the state it replaced.
    pub fn apply(&self, event: LinkEvent) -> LinkState {
        let was_up = self.up.swap(event == LinkEvent::Up, Ordering::AcqRel);
        if was_up {
            LinkState::Up
        } else {
            LinkState::Down
        }
    }

    /// Block until the link is up, sleeping `poll_interval` between checks.
    pub fn wait_until_up(&self, poll_interval: Duration) {
        let mut polls = 0u64;
        while !self.is_up() {
            if polls == 0 {
                debug!("waiting for link");
            }
            polls = polls.saturating_add(1);
            std::thread::sleep(poll_interval);
        }
        debug!(polls, "link ready");
    }
}

/// Publishes link events to a single subscriber slot.
#[derive(Debug, Default)]
pub struct LinkPublisher {
    subscriber: Option<Arc<LinkSignal>>,
}

impl LinkPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `signal` as the subscriber, replacing any previous one.
    pub fn subscribe(&mut self, signal: Arc<LinkSignal>) {
        if self.subscriber.replace(signal).is_some() {
            debug!("replaced link subscriber");
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Deliver `event` to the subscriber, if any.
    pub fn publish(&self, event: LinkEvent) {
        let Some(signal) = &self.subscriber else {
            debug!(?event, "link event with no subscriber");
            return;
        };

        let previous = signal.apply(event);
        match (previous, event) {
            (LinkState::Down, LinkEvent::Up) => info!("network interface is up"),
            (LinkState::Up, LinkEvent::Down) => warn!("network interface is down"),
            _ => debug!(?event, "link state unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_starts_down() {
        let signal = LinkSignal::new();
        assert_eq!(signal.state(), LinkState::Down);
        assert!(!signal.is_up());
    }

    #[test]
    fn latest_event_wins() {
        let signal = LinkSignal::new();
        assert_eq!(signal.apply(LinkEvent::Up), LinkState::Down);
        assert_eq!(signal.apply(LinkEvent::Up), LinkState::Up);
        assert_eq!(signal.apply(LinkEvent::Down), LinkState::Up);
        assert_eq!(signal.state(), LinkState::Down);
    }

    #[test]
    fn publisher_without_subscriber_is_noop() {
        let publisher = LinkPublisher::new();
        assert!(!publisher.has_subscriber());
        publisher.publish(LinkEvent::Up);
    }

    #[test]
    fn publisher_drives_subscribed_signal() {
        let signal = Arc::new(LinkSignal::new());
        let mut publisher = LinkPublisher::new();
        publisher.subscribe(Arc::clone(&signal));

        publisher.publish(LinkEvent::Up);
        assert!(signal.is_up());

        publisher.publish(LinkEvent::Down);
        assert!(!signal.is_up());
    }

    #[test]
    fn subscribe_replaces_previous_subscriber() {
        let first = Arc::new(LinkSignal::new());
        let second = Arc::new(LinkSignal::new());
        let mut publisher = LinkPublisher::new();

        publisher.subscribe(Arc::clone(&first));
        publisher.subscribe(Arc::clone(&second));
        publisher.publish(LinkEvent::Up);

        assert!(!first.is_up());
        assert!(second.is_up());
    }

    #[test]
    fn wait_until_up_returns_after_event() {
        let signal = Arc::new(LinkSignal::new());
        let mut publisher = LinkPublisher::new();
        publisher.subscribe(Arc::clone(&signal));

        let waiter = {
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || signal.wait_until_up(Duration::from_millis(5)))
        };

        std::thread::sleep(Duration::from_millis(20));
        publisher.publish(LinkEvent::Up);

        waiter.join().unwrap();
        assert_eq!(signal.state(), LinkState::Up);
    }
}
