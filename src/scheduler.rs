//! Background refresh scheduling.
//!
//! The interactive thread owns a [`RefreshScheduler`]. Each refresh runs on
//! its own worker thread, which never touches shared state: it posts the
//! finished [`AggregationReport`] back over an [`mpsc`] channel and the
//! interactive thread installs it.
//!
//! At most one refresh is in flight; triggers that arrive meanwhile are
//! ignored. The timer is re-armed when a refresh completes, using the
//! interval configured at that moment, so a changed interval takes effect
//! after the next tick.
//!
//! A worker that dies without reporting is reaped on the next `trigger` or
//! `poll`, and the timer is re-armed as if it had completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::RetentionWindow;
use crate::services::{AggregationReport, Aggregator};

/// How often the interactive loop wakes to check on a running refresh.
const WORKER_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A refresh is already running; this trigger was dropped.
    AlreadyRunning,
    ShutDown,
}

pub struct RefreshScheduler<E> {
    aggregator: Aggregator,
    tx: Sender<E>,
    in_flight: bool,
    next_due: Option<Instant>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl<E> RefreshScheduler<E>
where
    E: From<AggregationReport> + Send + 'static,
{
    pub fn new(aggregator: Aggregator, tx: Sender<E>) -> Self {
        Self {
            aggregator,
            tx,
            in_flight: false,
            next_due: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Start a refresh on a worker thread unless one is already running.
    pub fn trigger(&mut self, settings: &Settings) -> TriggerOutcome {
        if self.cancelled.load(Ordering::SeqCst) {
            return TriggerOutcome::ShutDown;
        }
        self.reap_dead_worker(settings, Instant::now());
        if self.in_flight {
            debug!("refresh already in flight, ignoring trigger");
            return TriggerOutcome::AlreadyRunning;
        }

        self.in_flight = true;
        self.next_due = None;

        let aggregator = self.aggregator.clone();
        let tx = self.tx.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let feeds = settings.feeds.clone();
        let days = settings.days;

        info!(feeds = feeds.len(), days, "starting refresh");
        self.worker = Some(thread::spawn(move || {
            let now = Utc::now();
            let window = RetentionWindow::new(now, days);
            let Some(report) = aggregator.aggregate_cancellable(&feeds, window, now, &cancelled)
            else {
                return;
            };
            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            // If the receiver is gone the interactive thread has exited.
            let _ = tx.send(E::from(report));
        }));

        TriggerOutcome::Started
    }

    /// Record that the in-flight refresh delivered its result and re-arm the timer.
    pub fn complete(&mut self, settings: &Settings, now: Instant) {
        self.in_flight = false;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if !self.cancelled.load(Ordering::SeqCst) {
            self.next_due = Some(now + settings.refresh_period());
        }
    }

    /// Trigger a refresh if the timer has elapsed.
    pub fn poll(&mut self, settings: &Settings, now: Instant) -> Option<TriggerOutcome> {
        self.reap_dead_worker(settings, now);
        if self.is_due(now) {
            Some(self.trigger(settings))
        } else {
            None
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.in_flight && self.next_due.is_some_and(|due| now >= due)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// How long the interactive loop may block before the next tick; `None` while unarmed.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// How long the interactive loop may block before calling [`poll`](Self::poll).
    pub fn wake_after(&self, now: Instant) -> Option<Duration> {
        if self.in_flight {
            Some(WORKER_CHECK_INTERVAL)
        } else {
            self.time_until_due(now)
        }
    }

    /// Join a worker that has exited. If it panicked it never posted a
    /// report, so clear the in-flight flag and re-arm the timer here.
    fn reap_dead_worker(&mut self, settings: &Settings, now: Instant) {
        if !self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            return;
        }
        let Some(worker) = self.worker.take() else {
            return;
        };
        if worker.join().is_err() {
            warn!("refresh worker died without a result");
            self.in_flight = false;
            if !self.cancelled.load(Ordering::SeqCst) {
                self.next_due = Some(now + settings.refresh_period());
            }
        }
    }

    /// Stop scheduling. A refresh still running is detached and its result discarded.
    pub fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.next_due = None;
        self.worker = None;
    }
}

impl<E> Drop for RefreshScheduler<E> {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
