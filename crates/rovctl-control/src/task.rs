//! Thread configuration for the pipeline tasks.
//!
//! Priorities follow the nice convention: a lower number is more urgent.
//! The network task must be at least as urgent as the actuation task so that
//! the socket is drained before commands are applied.

use std::thread::JoinHandle;

use tracing::debug;

use crate::error::{ControlError, Result};

/// Scheduling priority, 0 (most urgent) to 19 (least urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskPriority(u8);

impl TaskPriority {
    pub const MOST_URGENT: Self = Self(0);
    pub const LEAST_URGENT: Self = Self(19);

    pub fn new(level: u8) -> Result<Self> {
        if level > Self::LEAST_URGENT.0 {
            return Err(ControlError::Scheduling(format!(
                "priority {level} out of range 0..=19"
            )));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_at_least_as_urgent_as(self, other: Self) -> bool {
        self.0 <= other.0
    }
}

/// Spawn-time settings for one task thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    pub name: String,
    pub priority: TaskPriority,
    pub stack_size: usize,
}

impl TaskConfig {
    pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;

    pub fn new(name: impl Into<String>, priority: TaskPriority) -> Self {
        Self {
            name: name.into(),
            priority,
            stack_size: Self::DEFAULT_STACK_SIZE,
        }
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Spawn `f` on a new thread configured from `self`.
    pub fn spawn<F, T>(&self, f: F) -> Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let config = self.clone();
        std::thread::Builder::new()
            .name(self.name.clone())
            .stack_size(self.stack_size)
            .spawn(move || {
                config.apply_to_current();
                f()
            })
            .map_err(|source| ControlError::Spawn {
                name: self.name.clone(),
                source,
            })
    }

    /// Apply the priority to the calling thread. Failure is logged, not fatal.
    pub fn apply_to_current(&self) {
        match set_current_priority(self.priority) {
            Ok(()) => debug!(
                task = %self.name,
                priority = self.priority.level(),
                "task priority applied"
            ),
            Err(err) => debug!(
                task = %self.name,
                priority = self.priority.level(),
                error = %err,
                "task priority not applied"
            ),
        }
    }
}

#[cfg(target_os = "linux")]
fn set_current_priority(priority: TaskPriority) -> std::io::Result<()> {
    // SAFETY: gettid has no preconditions, and setpriority only reads its
    // integer arguments; it targets the calling thread's own id.
    let rc = unsafe {
        let tid = libc::syscall(libc::SYS_gettid) as libc::id_t;
        libc::setpriority(libc::PRIO_PROCESS, tid, priority.level() as libc::c_int)
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_current_priority(_priority: TaskPriority) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "per-thread priority is only applied on linux",
    ))
}

/// Task settings for the whole controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingPlan {
    pub network: TaskConfig,
    pub actuation: TaskConfig,
    pub supervisor: TaskConfig,
}

impl SchedulingPlan {
    /// The network task must be at least as urgent as the actuation task.
    pub fn validate(&self) -> Result<()> {
        if !self
            .network
            .priority
            .is_at_least_as_urgent_as(self.actuation.priority)
        {
            return Err(ControlError::Scheduling(format!(
                "network task priority {} is less urgent than actuation task priority {}",
                self.network.priority.level(),
                self.actuation.priority.level()
            )));
        }
        Ok(())
    }
}

impl Default for SchedulingPlan {
    fn default() -> Self {
        Self {
            network: TaskConfig::new("rovctl-net", TaskPriority(0)),
            actuation: TaskConfig::new("rovctl-control", TaskPriority(2)),
            supervisor: TaskConfig::new("rovctl-supervisor", TaskPriority(5)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_valid() {
        let plan = SchedulingPlan::default();
        plan.validate().unwrap();
        assert!(plan
            .network
            .priority
            .is_at_least_as_urgent_as(plan.actuation.priority));
    }

    #[test]
    fn equal_priorities_are_allowed() {
        let mut plan = SchedulingPlan::default();
        plan.actuation.priority = plan.network.priority;
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn inverted_priorities_are_rejected() {
        let mut plan = SchedulingPlan::default();
        plan.network.priority = TaskPriority::new(10).unwrap();
        plan.actuation.priority = TaskPriority::new(3).unwrap();
        assert!(matches!(plan.validate(), Err(ControlError::Scheduling(_))));
    }

    #[test]
    fn priority_range_is_checked() {
        assert!(TaskPriority::new(19).is_ok());
        assert!(matches!(
            TaskPriority::new(20),
            Err(ControlError::Scheduling(_))
        ));
    }

    #[test]
    fn spawn_names_thread_and_returns_value() {
        let config = TaskConfig::new("rovctl-test", TaskPriority::LEAST_URGENT)
            .with_stack_size(64 * 1024);
        let handle = config
            .spawn(|| std::thread::current().name().map(str::to_owned))
            .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("rovctl-test"));
    }
}
