//! Background history writer.
//!
//! Snapshots are handed off over a channel so the caller never waits on disk I/O.
//! Failures are logged and dropped; the in-memory history is unaffected.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::backend::HistoryBackend;

enum PersistCommand {
    Save(Vec<String>),
    Flush(Sender<()>),
}

pub(crate) struct Persister {
    sender: Option<Sender<PersistCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    pub(crate) fn spawn(backend: Arc<dyn HistoryBackend>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::spawn(move || run_worker(backend.as_ref(), receiver));
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Queue a snapshot for writing. Never blocks.
    pub(crate) fn save(&self, snapshot: Vec<String>) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        if sender.send(PersistCommand::Save(snapshot)).is_err() {
            tracing::warn!(target: "history_store", "history persister is gone; snapshot dropped");
        }
    }

    /// Block until every snapshot queued so far has been written (or has failed).
    pub(crate) fn flush(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if sender.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(backend: &dyn HistoryBackend, receiver: Receiver<PersistCommand>) {
    let mut pending: Option<Vec<String>> = None;

    loop {
        let command = match pending {
            // Coalesce bursts of submits: only the newest snapshot matters.
            Some(_) => match receiver.try_recv() {
                Ok(command) => Some(command),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => None,
            },
            None => match receiver.recv() {
                Ok(command) => Some(command),
                Err(_) => return,
            },
        };

        match command {
            Some(PersistCommand::Save(snapshot)) => {
                pending = Some(snapshot);
            }
            Some(PersistCommand::Flush(ack)) => {
                if let Some(snapshot) = pending.take() {
                    write_snapshot(backend, &snapshot);
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(snapshot) = pending.take() {
                    write_snapshot(backend, &snapshot);
                }
            }
        }
    }
}

fn write_snapshot(backend: &dyn HistoryBackend, snapshot: &[String]) {
    match backend.save(snapshot) {
        Ok(()) => {
            tracing::debug!(target: "history_store", entries = snapshot.len(), "history persisted");
        }
        Err(err) => {
            tracing::warn!(target: "history_store", error = %err, "failed to persist history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Persister;
    use crate::backend::MemoryBackend;
    use std::sync::Arc;

    #[test]
    fn flush_waits_for_latest_snapshot() {
        let backend = MemoryBackend::new();
        let persister = Persister::spawn(Arc::new(backend.clone()));

        persister.save(vec!["one".to_string()]);
        persister.save(vec!["two".to_string(), "one".to_string()]);
        persister.flush();

        assert_eq!(backend.snapshot(), vec!["two".to_string(), "one".to_string()]);
        assert!(backend.saves() >= 1);
    }

    #[test]
    fn drop_drains_queued_snapshots() {
        let backend = MemoryBackend::new();
        {
            let persister = Persister::spawn(Arc::new(backend.clone()));
            persister.save(vec!["last".to_string()]);
        }
        assert_eq!(backend.snapshot(), vec!["last".to_string()]);
    }
}
