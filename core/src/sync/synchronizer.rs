//! Optimistic status updates against the remote authority.
//!
//! The store shows the requested status as soon as `update_status` is called.
//! When the authority answers, the task is either replaced by the authority's
//! record or put back the way it was. Only the targeted task is ever restored,
//! so an in-flight update on another task is never clobbered by a rollback.

use std::sync::Arc;

use super::inflight::{InFlightRegistry, Ticket};
use super::types::SyncOutcome;
use crate::authority::TaskAuthority;
use crate::config::InFlightPolicy;
use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::{ApiError, SyncError};
use crate::store::{TaskSnapshot, TaskStore};

#[derive(Clone)]
pub struct StatusSynchronizer {
    store: TaskStore,
    authority: Arc<dyn TaskAuthority>,
    policy: InFlightPolicy,
    in_flight: Arc<InFlightRegistry>,
    /// Serialises store transitions (optimistic apply, reconcile, rollback)
    /// with the registry decisions that lead to them. Never held across the
    /// authority call.
    transitions: Arc<tokio::sync::Mutex<()>>,
}

impl StatusSynchronizer {
    pub fn new(store: TaskStore, authority: Arc<dyn TaskAuthority>) -> Self {
        Self {
            store,
            authority,
            policy: InFlightPolicy::default(),
            in_flight: Arc::new(InFlightRegistry::default()),
            transitions: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_policy(mut self, policy: InFlightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn is_in_flight(&self, task_id: TaskId) -> bool {
        self.in_flight.is_in_flight(task_id)
    }

    /// Moves `task_id` to `new_status`.
    ///
    /// Errors only when nothing was changed: unknown task, or another update
    /// on the same task is in flight under [`InFlightPolicy::Reject`].
    /// Authority failures come back as [`SyncOutcome::RolledBack`].
    pub async fn update_status(
        &self,
        task_id: TaskId,
        new_status: TaskStatus,
    ) -> Result<SyncOutcome, SyncError> {
        let _queued = match self.policy {
            InFlightPolicy::Queue => Some(self.in_flight.enter_queue(task_id).await),
            InFlightPolicy::Reject | InFlightPolicy::Supersede => None,
        };

        let current = self
            .store
            .get(task_id)
            .await
            .ok_or(SyncError::TaskNotFound(task_id))?;
        if current.status == new_status {
            tracing::debug!(
                target: "workshop.sync",
                stage = "sync.update.noop",
                task_id = task_id,
                status = %new_status
            );
            return Ok(SyncOutcome::Unchanged(current));
        }

        let transition = self.transitions.lock().await;
        let ticket = self.in_flight.begin(task_id, self.policy)?;
        let _ticket_guard = self.in_flight.guard(ticket);

        let snapshot = match self.store.apply_optimistic(task_id, new_status).await? {
            Some(snapshot) => snapshot,
            None => {
                let task = self.store.get(task_id).await.unwrap_or(current);
                return Ok(SyncOutcome::Unchanged(task));
            }
        };
        self.in_flight.record_base(ticket, snapshot.task());
        drop(transition);

        tracing::debug!(
            target: "workshop.sync",
            stage = "sync.update.in",
            authority = self.authority.name(),
            task_id = task_id,
            from = %snapshot.task().status,
            to = %new_status,
            policy = %self.policy
        );

        let payload = snapshot.task().to_update(new_status);
        let result = self.authority.update_task(task_id, payload).await;
        Ok(self.resolve(ticket, snapshot, result).await)
    }

    async fn resolve(
        &self,
        ticket: Ticket,
        snapshot: TaskSnapshot,
        result: Result<Task, ApiError>,
    ) -> SyncOutcome {
        let task_id = ticket.task_id;
        let _transition = self.transitions.lock().await;
        match result {
            Ok(canonical) => {
                let late = self.in_flight.confirm(ticket, &canonical);
                if late {
                    tracing::info!(
                        target: "workshop.sync",
                        stage = "sync.update.late",
                        task_id = task_id,
                        status = %canonical.status,
                        "newer update rolled back, applying older confirmed record"
                    );
                } else if !self.in_flight.is_current(ticket) {
                    tracing::debug!(
                        target: "workshop.sync",
                        stage = "sync.update.superseded",
                        task_id = task_id,
                        status = %canonical.status
                    );
                    return SyncOutcome::Superseded { task_id };
                }
                if let Err(err) = self.store.reconcile(task_id, canonical.clone()).await {
                    tracing::warn!(
                        target: "workshop.sync",
                        stage = "sync.update.reconcile",
                        task_id = task_id,
                        error = %err,
                        "task left the store before the update resolved"
                    );
                }
                tracing::debug!(
                    target: "workshop.sync",
                    stage = "sync.update.out",
                    task_id = task_id,
                    status = %canonical.status
                );
                SyncOutcome::Reconciled(canonical)
            }
            Err(error) => {
                if !self.in_flight.is_current(ticket) {
                    tracing::warn!(
                        target: "workshop.sync",
                        stage = "sync.update.superseded",
                        task_id = task_id,
                        error = %error,
                        "superseded update failed"
                    );
                    return SyncOutcome::Superseded { task_id };
                }
                let restored = self
                    .in_flight
                    .roll_back(ticket)
                    .unwrap_or_else(|| snapshot.into_task());
                if let Err(err) = self
                    .store
                    .rollback(TaskSnapshot::new(restored.clone()))
                    .await
                {
                    tracing::warn!(
                        target: "workshop.sync",
                        stage = "sync.update.rollback",
                        task_id = task_id,
                        error = %err,
                        "task left the store before the update resolved"
                    );
                }
                tracing::warn!(
                    target: "workshop.sync",
                    stage = "sync.update.rolled_back",
                    task_id = task_id,
                    kind = %error.kind(),
                    restored = %restored.status,
                    error = %error
                );
                SyncOutcome::RolledBack { restored, error }
            }
        }
    }
}
