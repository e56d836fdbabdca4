use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Pipeline counters shared by the receiver, dispatcher and supervisor.
#[derive(Debug)]
pub struct PipelineStats {
    datagrams: AtomicU64,
    accepted: AtomicU64,
    wrong_size: AtomicU64,
    checksum_mismatch: AtomicU64,
    receive_errors: AtomicU64,
    queued: AtomicU64,
    dropped: AtomicU64,
    dispatched: AtomicU64,
    last_sequence: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub datagrams: u64,
    pub accepted: u64,
    pub wrong_size: u64,
    pub checksum_mismatch: u64,
    pub receive_errors: u64,
    pub queued: u64,
    pub dropped: u64,
    pub dispatched: u64,
    /// Sequence of the most recently accepted frame, if any.
    pub last_sequence: Option<u32>,
}

// Sentinel above u32::MAX so that sequence 0 is distinguishable from "none".
const NO_SEQUENCE: u64 = u64::MAX;

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            datagrams: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            wrong_size: AtomicU64::new(0),
            checksum_mismatch: AtomicU64::new(0),
            receive_errors: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            last_sequence: AtomicU64::new(NO_SEQUENCE),
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_datagram(&self) {
        self.datagrams.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self, sequence: u32) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.last_sequence.store(sequence as u64, Ordering::Relaxed);
    }

    pub fn record_wrong_size(&self) {
        self.wrong_size.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_checksum_mismatch(&self) {
        self.checksum_mismatch.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let last = self.last_sequence.load(Ordering::Relaxed);
        StatsSnapshot {
            datagrams: self.datagrams.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            wrong_size: self.wrong_size.load(Ordering::Relaxed),
            checksum_mismatch: self.checksum_mismatch.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            last_sequence: u32::try_from(last).ok(),
        }
    }
}

impl StatsSnapshot {
    /// Frames received but rejected by validation.
    pub fn rejected(&self) -> u64 {
        self.wrong_size + self.checksum_mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_stats_are_zero() {
        let snap = PipelineStats::new().snapshot();
        assert_eq!(snap, StatsSnapshot::default());
        assert_eq!(snap.last_sequence, None);
    }

    #[test]
    fn counters_accumulate() {
        let stats = PipelineStats::new();
        for _ in 0..4 {
            stats.record_datagram();
        }
        stats.record_wrong_size();
        stats.record_checksum_mismatch();
        stats.record_accepted(0);
        stats.record_accepted(7);
        stats.record_queued();
        stats.record_dropped();
        stats.record_dispatched();

        let snap = stats.snapshot();
        assert_eq!(snap.datagrams, 4);
        assert_eq!(snap.accepted, 2);
        assert_eq!(snap.rejected(), 2);
        assert_eq!((snap.queued, snap.dropped, snap.dispatched), (1, 1, 1));
        assert_eq!(snap.last_sequence, Some(7));
    }

    #[test]
    fn sequence_zero_is_reported() {
        let stats = PipelineStats::new();
        stats.record_accepted(0);
        assert_eq!(stats.snapshot().last_sequence, Some(0));
    }

    #[test]
    fn snapshot_serializes() {
        let stats = PipelineStats::new();
        stats.record_accepted(3);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["accepted"], 1);
        assert_eq!(json["last_sequence"], 3);
    }
}
