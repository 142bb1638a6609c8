//! LogBatcher - non-blocking enqueue handle plus the flush worker.
//!
//! Flush triggers, whichever fires first:
//! - the open batch reaches `max_batch_size` records
//! - the oldest buffered record reaches `max_batch_age`
//!
//! On flush with logs disabled the batch moves to a bounded retained ring
//! instead of publishing; re-enabling logs never replays retained batches.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{BusEvent, ConfigStore, EventSink, LogBatch, LogBatchSettings, LogLevel, LogRecord};
use observability::{record_log_batch_discarded, record_log_batch_flushed};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, trace};

/// Cloneable enqueue handle for the log batch worker.
///
/// `enqueue` never blocks: records go over an unbounded channel, so no
/// record is lost between the caller and the worker while logs are enabled.
#[derive(Debug, Clone)]
pub struct LogBatcher {
    tx: mpsc::UnboundedSender<LogRecord>,
    discarded: DiscardedBatches,
}

impl LogBatcher {
    /// Spawn the flush worker and return its enqueue handle
    pub fn spawn(
        settings: LogBatchSettings,
        config: ConfigStore,
        events: EventSink,
        logs_topic: String,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let discarded = DiscardedBatches::default();

        let worker = BatchWorker {
            settings,
            config,
            events,
            topic: logs_topic,
            seq: 0,
            batch: Vec::new(),
            opened_at: None,
            discarded: discarded.clone(),
        };
        let handle = tokio::spawn(worker.run(rx, shutdown));

        (Self { tx, discarded }, handle)
    }

    /// Append a record to the open batch; never blocks.
    ///
    /// Records enqueued after the worker stopped are dropped (shutdown is
    /// best-effort by design).
    pub fn enqueue(&self, record: LogRecord) {
        if self.tx.send(record).is_err() {
            trace!("Log record enqueued after batcher stopped");
        }
    }

    /// Enqueue an info-level record
    pub fn info(&self, message: impl Into<String>) {
        self.enqueue(LogRecord::new(LogLevel::Info, message));
    }

    /// Enqueue a warn-level record
    pub fn warn(&self, message: impl Into<String>) {
        self.enqueue(LogRecord::new(LogLevel::Warn, message));
    }

    /// Enqueue an error-level record
    pub fn error(&self, message: impl Into<String>) {
        self.enqueue(LogRecord::new(LogLevel::Error, message));
    }

    /// Batches captured while logs were disabled
    pub fn discarded(&self) -> &DiscardedBatches {
        &self.discarded
    }
}

/// Bounded ring of batches that flushed while logs were disabled.
///
/// Capped at `max_retained_batches`, oldest dropped first; these are kept
/// for host inspection only and are never published retroactively.
#[derive(Debug, Clone, Default)]
pub struct DiscardedBatches {
    inner: Arc<Mutex<VecDeque<Vec<LogRecord>>>>,
}

impl DiscardedBatches {
    fn push(&self, records: Vec<LogRecord>, cap: usize) {
        let mut ring = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        while ring.len() >= cap.max(1) {
            ring.pop_front();
        }
        if cap > 0 {
            ring.push_back(records);
        }
    }

    /// Number of retained batches
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the ring is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone out all retained batches, oldest first
    pub fn snapshot(&self) -> Vec<Vec<LogRecord>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// Worker state: the open batch and its flush bookkeeping
struct BatchWorker {
    settings: LogBatchSettings,
    config: ConfigStore,
    events: EventSink,
    topic: String,
    seq: u64,
    batch: Vec<LogRecord>,
    opened_at: Option<Instant>,
    discarded: DiscardedBatches,
}

impl BatchWorker {
    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<LogRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!(
            max_batch_size = self.settings.max_batch_size,
            max_batch_age_s = self.settings.max_batch_age_s,
            "Log batch worker started"
        );

        loop {
            let age_deadline = self
                .opened_at
                .map(|opened| opened + self.settings.max_batch_age());

            tokio::select! {
                _ = shutdown.changed() => {
                    // Best-effort final flush before teardown
                    self.flush("shutdown");
                    break;
                }
                maybe = rx.recv() => match maybe {
                    Some(record) => {
                        if self.batch.is_empty() {
                            self.opened_at = Some(Instant::now());
                        }
                        self.batch.push(record);
                        if self.batch.len() >= self.settings.max_batch_size {
                            self.flush("size");
                        }
                    }
                    None => {
                        self.flush("close");
                        break;
                    }
                },
                _ = async { tokio::time::sleep_until(age_deadline.unwrap()).await },
                    if age_deadline.is_some() =>
                {
                    self.flush("age");
                }
            }
        }

        debug!("Log batch worker stopped");
    }

    /// Close the open batch: publish it, or retain it while logs are disabled.
    fn flush(&mut self, trigger: &str) {
        if self.batch.is_empty() {
            return;
        }
        let records = std::mem::take(&mut self.batch);
        self.opened_at = None;

        // logs_enabled is read at flush time, so disabling mid-batch
        // discards that open batch on its next trigger.
        if !self.config.logs_enabled() {
            trace!(
                records = records.len(),
                trigger,
                "Logs disabled, batch retained unpublished"
            );
            record_log_batch_discarded(records.len());
            self.discarded
                .push(records, self.settings.max_retained_batches);
            return;
        }

        let record_count = records.len();
        let batch = LogBatch {
            records,
            batch_seq: self.seq,
        };
        match BusEvent::serialize(&self.topic, &batch, false) {
            Ok(event) => {
                (self.events)(event);
                self.seq += 1;
                record_log_batch_flushed(record_count);
                trace!(records = record_count, trigger, seq = batch.batch_seq, "Log batch flushed");
            }
            Err(e) => error!(error = %e, "Log batch serialize failed"),
        }
    }
}
