//! Poll scheduling.
//!
//! Every tick spawns a poll task, even while an earlier one is still running.
//! Results come back through a channel tagged with the sequence number of
//! their dispatch, and [`PollTracker`] drops any result older than the last
//! one applied so a slow poll cannot overwrite newer data.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task,
    time::{self, Interval, MissedTickBehavior},
};

use crate::{
    cluster::ClusterApi,
    error::PollError,
    monitor::{Monitor, Observation},
};

/// Result of one dispatched poll.
#[derive(Debug)]
pub struct PollOutcome {
    pub seq: u64,
    pub result: Result<Vec<Observation>, PollError>,
}

pub struct Scheduler<C> {
    monitor: Monitor<C>,
    tx: mpsc::UnboundedSender<PollOutcome>,
    interval: Interval,
    next_seq: u64,
}

impl<C: ClusterApi> Scheduler<C> {
    /// The first tick fires immediately, so the first poll does not wait a
    /// full period.
    pub fn new(monitor: Monitor<C>, period: Duration) -> (Self, mpsc::UnboundedReceiver<PollOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let scheduler = Self {
            monitor,
            tx,
            interval,
            next_seq: 0,
        };
        (scheduler, rx)
    }

    /// Waits for the next tick and dispatches a poll. Cancel safe.
    pub async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.dispatch()
    }

    /// Spawns a poll task and returns its sequence number.
    pub fn dispatch(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let monitor = self.monitor.clone();
        let tx = self.tx.clone();

        task::spawn(async move {
            // Inner task so a panic inside the poll still produces an outcome.
            let result = match task::spawn(async move { monitor.collect().await }).await {
                Ok(result) => result,
                Err(join_err) => Err(PollError::TaskFailed(join_err)),
            };
            if tx.send(PollOutcome { seq, result }).is_err() {
                tracing::debug!(seq, "event loop gone, dropping poll result");
            }
        });

        tracing::debug!(seq, "dispatched poll");
        seq
    }
}

/// Remembers the newest applied poll.
#[derive(Debug, Default)]
pub struct PollTracker {
    last_applied: Option<u64>,
}

impl PollTracker {
    /// Returns `true` if a result with `seq` is newer than everything applied
    /// so far, and records it as applied.
    pub fn accept(&mut self, seq: u64) -> bool {
        if self.last_applied.is_some_and(|last| seq <= last) {
            tracing::debug!(seq, last = ?self.last_applied, "discarding stale poll result");
            return false;
        }
        self.last_applied = Some(seq);
        true
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        cluster::fake::{entry, object, FakeCluster},
        config::Config,
        discovery::DeprecationPolicy,
    };

    fn monitor(cluster: &FakeCluster) -> Monitor<FakeCluster> {
        let config = Arc::new(Config {
            namespaces: ["default".to_string()].into_iter().collect(),
            ..Config::default()
        });
        Monitor::new(cluster.clone(), config, DeprecationPolicy::default())
    }

    #[test]
    fn test_tracker_discards_stale_results() {
        let mut tracker = PollTracker::default();
        assert!(tracker.accept(0));
        assert!(tracker.accept(2));
        assert!(!tracker.accept(1));
        assert!(!tracker.accept(2));
        assert!(tracker.accept(3));
        assert_eq!(tracker.last_applied(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_and_results_are_delivered() {
        let cluster = FakeCluster::new().with_group("v1", vec![entry("pods", "Pod", true, &["list"])]);
        cluster.set_objects("pods", Some("default"), vec![object("web", "7")]);

        let (mut scheduler, mut rx) = Scheduler::new(monitor(&cluster), Duration::from_secs(5));

        let start = time::Instant::now();
        let seq = scheduler.tick().await;
        assert_eq!(seq, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.seq, 0);
        let observations = outcome.result.unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].version, 7);

        let seq = scheduler.tick().await;
        assert_eq!(seq, 1);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_poll_errors_are_delivered_as_outcomes() {
        let cluster = FakeCluster::new();
        cluster.fail_group_listing();

        let (mut scheduler, mut rx) = Scheduler::new(monitor(&cluster), Duration::from_secs(5));
        scheduler.dispatch();

        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(PollError::DiscoveryFailed(_))));
    }
}
