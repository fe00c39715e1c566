//! Store events forwarded to tracing.
use tokio::sync::broadcast;
use workshop_core::api::StoreEvent;

/// Logs store events until every store handle is gone, then returns.
pub async fn log_store_events(mut event_rx: broadcast::Receiver<StoreEvent>) {
    loop {
        let event = match event_rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(target: "workshop.store", skipped, "store event logger lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        match event {
            StoreEvent::Loaded { count, .. } => {
                tracing::debug!(target: "workshop.store", count, "tasks loaded");
            }
            StoreEvent::Inserted { task_id, .. } => {
                tracing::debug!(target: "workshop.store", task_id, "task inserted");
            }
            StoreEvent::OptimisticApplied { task_id, from, to, .. } => {
                tracing::info!(
                    target: "workshop.store",
                    task_id,
                    from = %from,
                    to = %to,
                    "optimistic status applied"
                );
            }
            StoreEvent::Reconciled { task_id, status, .. } => {
                tracing::info!(target: "workshop.store", task_id, status = %status, "task reconciled");
            }
            StoreEvent::RolledBack { task_id, restored, .. } => {
                tracing::warn!(
                    target: "workshop.store",
                    task_id,
                    restored = %restored,
                    "status update rolled back"
                );
            }
        }
    }
}
