//! Ordered background persistence queue.
//!
//! A single worker task drains jobs in submission order, so a node-map
//! write never races an older write for the same document. Failures are
//! logged and dropped: durability is best-effort, the in-memory state
//! stays authoritative for the session.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tree_engine::{HistoryEntry, TreeNodeMap};
use tree_storage::TreeStore;

enum PersistJob {
    SaveNodes(TreeNodeMap),
    SaveEntry(HistoryEntry),
    ClearNodes,
    Flush(oneshot::Sender<()>),
}

pub(crate) struct Outbox {
    tx: mpsc::UnboundedSender<PersistJob>,
}

impl Outbox {
    pub(crate) fn spawn<S: TreeStore + 'static>(storage: Arc<S>, document_id: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    PersistJob::SaveNodes(nodes) => {
                        if let Err(err) = storage.save_nodes(&nodes).await {
                            tracing::warn!(
                                document_id = %document_id,
                                error = %err,
                                "Outbox: background node save failed"
                            );
                        }
                    }
                    PersistJob::SaveEntry(entry) => {
                        if let Err(err) = storage.save_history_entry(&document_id, &entry).await {
                            tracing::warn!(
                                document_id = %document_id,
                                entry_id = %entry.id,
                                error = %err,
                                "Outbox: background history save failed"
                            );
                        }
                    }
                    PersistJob::ClearNodes => {
                        if let Err(err) = storage.clear_nodes().await {
                            tracing::warn!(
                                document_id = %document_id,
                                error = %err,
                                "Outbox: clearing node storage failed"
                            );
                        }
                    }
                    PersistJob::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn save_nodes(&self, nodes: TreeNodeMap) {
        let _ = self.tx.send(PersistJob::SaveNodes(nodes));
    }

    pub(crate) fn save_entry(&self, entry: HistoryEntry) {
        let _ = self.tx.send(PersistJob::SaveEntry(entry));
    }

    pub(crate) fn clear_nodes(&self) {
        let _ = self.tx.send(PersistJob::ClearNodes);
    }

    /// Wait until every previously queued job has been applied.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistJob::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}
