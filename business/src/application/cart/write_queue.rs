//! Single-writer persistence queue.
//!
//! Every snapshot goes through one channel drained by one task, so writes
//! reach the store in the order the mutations happened. Snapshots that pile
//! up while a write is in flight are coalesced into the newest one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::domain::cart::codec;
use crate::domain::cart::model::Cart;
use crate::domain::logger::Logger;
use crate::domain::storage::KeyValueStore;

enum WriteCommand {
    Persist(Cart),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct WritePolicy {
    pub key: String,
    pub retries: u32,
    pub backoff: Duration,
}

/// Sending side of the queue. Dropping it stops the writer once the
/// pending snapshots are written.
pub struct WriteQueue {
    sender: mpsc::UnboundedSender<WriteCommand>,
}

impl WriteQueue {
    /// Starts the writer task. Must be called within a Tokio runtime.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        logger: Arc<dyn Logger>,
        policy: WritePolicy,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = PersistenceWriter {
            store,
            logger,
            policy,
        };
        let task = tokio::spawn(writer.run(receiver));
        (Self { sender }, task)
    }

    /// Returns `false` when the writer is gone.
    pub fn enqueue(&self, snapshot: Cart) -> bool {
        self.sender.send(WriteCommand::Persist(snapshot)).is_ok()
    }

    /// Resolves once every snapshot enqueued before this call was written
    /// or given up on.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(WriteCommand::Flush(ack)).is_ok() {
            // A closed channel means the writer already stopped.
            let _ = done.await;
        }
    }
}

struct PersistenceWriter {
    store: Arc<dyn KeyValueStore>,
    logger: Arc<dyn Logger>,
    policy: WritePolicy,
}

impl PersistenceWriter {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<WriteCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                WriteCommand::Persist(snapshot) => {
                    let mut latest = snapshot;
                    let mut acks = Vec::new();
                    while let Ok(next) = receiver.try_recv() {
                        match next {
                            WriteCommand::Persist(newer) => latest = newer,
                            WriteCommand::Flush(ack) => {
                                acks.push(ack);
                                break;
                            }
                        }
                    }
                    self.write(&latest).await;
                    for ack in acks {
                        let _ = ack.send(());
                    }
                }
                WriteCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        self.logger.debug("Cart write queue closed");
    }

    async fn write(&self, snapshot: &Cart) {
        let bytes = match codec::encode(snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.logger
                    .error(&format!("Failed to encode cart snapshot: {}", e));
                return;
            }
        };

        let attempts = self.policy.retries.saturating_add(1);
        for attempt in 1..=attempts {
            match self.store.set(&self.policy.key, bytes.clone()).await {
                Ok(()) => {
                    self.logger.debug(&format!(
                        "Persisted cart with {} line items under {}",
                        snapshot.len(),
                        self.policy.key
                    ));
                    return;
                }
                Err(e) if attempt < attempts => {
                    self.logger.warn(&format!(
                        "Cart write attempt {}/{} failed: {}",
                        attempt, attempts, e
                    ));
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "Giving up on cart write after {} attempts: {}",
                        attempts, e
                    ));
                }
            }
        }
    }
}
