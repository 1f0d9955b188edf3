//! The best-effort audit recorder.
//!
//! `BestEffortRecorder` implements the infallible `AuditSink` contract on
//! top of a fallible `AuditStore`. Events flow through a bounded in-process
//! queue drained by a dedicated worker thread, so recording never blocks a
//! gate and a store failure can never abort the primary operation.
//!
//! Failure policy: a failed append is reported with `tracing::warn!` and
//! dropped — no propagation, no synchronous retry. A full queue likewise
//! drops the event with a warning.

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use tracing::warn;

use siwes_contracts::audit::AuditEvent;
use siwes_core::traits::{AuditSink, AuditStore};

use std::sync::Arc;

enum Command {
    Record(AuditEvent),
    /// Acknowledge once every command queued before this one has been
    /// processed. Used by `flush` for deterministic tests and shutdown.
    Flush(SyncSender<()>),
}

/// Fire-and-forget audit recording over a bounded queue.
///
/// Dropping the recorder closes the queue and joins the worker, so events
/// recorded before the drop are flushed to the store.
pub struct BestEffortRecorder {
    tx: Option<SyncSender<Command>>,
    worker: Option<JoinHandle<()>>,
}

/// Queue depth before new events are dropped rather than blocking.
const QUEUE_CAPACITY: usize = 256;

impl BestEffortRecorder {
    /// Spawn the worker thread draining into `store`.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        let (tx, rx) = mpsc::sync_channel::<Command>(QUEUE_CAPACITY);

        let worker = thread::Builder::new()
            .name("audit-recorder".to_string())
            .spawn(move || {
                for command in rx {
                    match command {
                        Command::Record(event) => {
                            if let Err(e) = store.append(&event) {
                                warn!(
                                    action = %event.action,
                                    resource = %event.resource,
                                    error = %e,
                                    "audit append failed; event dropped"
                                );
                            }
                        }
                        Command::Flush(ack) => {
                            // Receiver may have given up waiting; ignore.
                            let _ = ack.send(());
                        }
                    }
                }
            })
            .expect("failed to spawn audit recorder thread");

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Block until every event recorded so far has been handed to the store.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else { return };
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl AuditSink for BestEffortRecorder {
    /// Queue one event. Never blocks and never fails: a full queue or a
    /// stopped worker drops the event with an operator warning.
    fn record(&self, event: AuditEvent) {
        let Some(tx) = &self.tx else { return };
        match tx.try_send(Command::Record(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(Command::Record(event))) => {
                warn!(
                    action = %event.action,
                    resource = %event.resource,
                    "audit queue full; event dropped"
                );
            }
            Err(TrySendError::Disconnected(Command::Record(event))) => {
                warn!(
                    action = %event.action,
                    resource = %event.resource,
                    "audit recorder stopped; event dropped"
                );
            }
            Err(_) => {}
        }
    }
}

impl Drop for BestEffortRecorder {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after it drains.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
