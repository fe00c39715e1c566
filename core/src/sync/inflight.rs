use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::InFlightPolicy;
use crate::domain::{Task, TaskId};
use crate::error::SyncError;

/// Identifies one `update_status` call on one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub task_id: TaskId,
    pub generation: u64,
}

#[derive(Debug)]
struct Entry {
    /// Generation of the newest call on this task.
    generation: u64,
    /// Calls that have not resolved yet.
    pending: usize,
    /// Last record the authority confirmed, or the record before the first
    /// optimistic change. Rollbacks restore this.
    base: Option<Task>,
    /// Generation that produced `base`; 0 while it is the pre-change record.
    confirmed_generation: u64,
    /// Set when the newest call resolved by rolling back.
    rolled_back_generation: Option<u64>,
}

/// Book-keeping for status updates that have not resolved yet.
///
/// The lock is never held across an `.await`.
#[derive(Default)]
pub(crate) struct InFlightRegistry {
    entries: Mutex<HashMap<TaskId, Entry>>,
    queues: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
    next_generation: Mutex<u64>,
}

impl InFlightRegistry {
    fn entries(&self) -> MutexGuard<'_, HashMap<TaskId, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn queues(&self) -> MutexGuard<'_, HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>> {
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump_generation(&self) -> u64 {
        let mut next = self.next_generation.lock().unwrap_or_else(|e| e.into_inner());
        *next += 1;
        *next
    }

    /// Waits for the per-task lock used by [`InFlightPolicy::Queue`].
    ///
    /// The lock is dropped from the map once nobody holds or waits for it.
    pub async fn enter_queue(&self, task_id: TaskId) -> QueueSlot<'_> {
        let lock = self.queues().entry(task_id).or_default().clone();
        let guard = lock.lock_owned().await;
        QueueSlot {
            registry: self,
            task_id,
            guard: Some(guard),
        }
    }

    fn prune_queue(&self, task_id: TaskId) {
        let mut queues = self.queues();
        if queues
            .get(&task_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            queues.remove(&task_id);
        }
    }

    #[cfg(test)]
    pub fn queued_tasks(&self) -> usize {
        self.queues().len()
    }

    pub fn is_in_flight(&self, task_id: TaskId) -> bool {
        self.entries().contains_key(&task_id)
    }

    pub fn begin(&self, task_id: TaskId, policy: InFlightPolicy) -> Result<Ticket, SyncError> {
        let generation = self.bump_generation();
        let mut entries = self.entries();
        match entries.get_mut(&task_id) {
            Some(entry) => match policy {
                // Queue callers hold the per-task lock, so an entry here means
                // the queue was bypassed; treat it like a rejection.
                InFlightPolicy::Reject | InFlightPolicy::Queue => {
                    return Err(SyncError::InFlight(task_id))
                }
                InFlightPolicy::Supersede => {
                    entry.generation = generation;
                    entry.pending += 1;
                }
            },
            None => {
                entries.insert(
                    task_id,
                    Entry {
                        generation,
                        pending: 1,
                        base: None,
                        confirmed_generation: 0,
                        rolled_back_generation: None,
                    },
                );
            }
        }
        Ok(Ticket {
            task_id,
            generation,
        })
    }

    /// Records the pre-change record, unless an older call already did.
    pub fn record_base(&self, ticket: Ticket, before: &Task) {
        if let Some(entry) = self.entries().get_mut(&ticket.task_id) {
            if entry.base.is_none() {
                entry.base = Some(before.clone());
            }
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.entries()
            .get(&ticket.task_id)
            .is_some_and(|e| e.generation == ticket.generation)
    }

    /// The authority accepted a record. It becomes the rollback target unless
    /// a newer call was already confirmed.
    ///
    /// Returns true when a stale call's record has to go into the store: the
    /// newest call already rolled back and nothing newer than `ticket` was
    /// confirmed, so the store shows a state the authority no longer holds.
    pub fn confirm(&self, ticket: Ticket, canonical: &Task) -> bool {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(&ticket.task_id) else {
            return false;
        };
        if ticket.generation < entry.confirmed_generation {
            return false;
        }
        entry.base = Some(canonical.clone());
        entry.confirmed_generation = ticket.generation;
        entry.generation != ticket.generation
            && entry.rolled_back_generation == Some(entry.generation)
    }

    /// Marks the newest call as rolled back and returns the record to restore.
    pub fn roll_back(&self, ticket: Ticket) -> Option<Task> {
        let mut entries = self.entries();
        let entry = entries.get_mut(&ticket.task_id)?;
        entry.rolled_back_generation = Some(ticket.generation);
        entry.base.clone()
    }

    #[cfg(test)]
    pub fn base(&self, ticket: Ticket) -> Option<Task> {
        self.entries()
            .get(&ticket.task_id)
            .and_then(|e| e.base.clone())
    }

    /// Finishes `ticket` when the returned guard drops, including when the
    /// caller's future is dropped mid-flight.
    pub fn guard(&self, ticket: Ticket) -> TicketGuard<'_> {
        TicketGuard {
            registry: self,
            ticket,
        }
    }

    pub fn finish(&self, ticket: Ticket) {
        let mut entries = self.entries();
        let drained = match entries.get_mut(&ticket.task_id) {
            Some(entry) => {
                entry.pending = entry.pending.saturating_sub(1);
                entry.pending == 0
            }
            None => false,
        };
        if drained {
            entries.remove(&ticket.task_id);
        }
    }
}

pub(crate) struct TicketGuard<'a> {
    registry: &'a InFlightRegistry,
    ticket: Ticket,
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        self.registry.finish(self.ticket);
    }
}

/// Holds the per-task queue lock.
pub(crate) struct QueueSlot<'a> {
    registry: &'a InFlightRegistry,
    task_id: TaskId,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.registry.prune_queue(self.task_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: 1,
            workorder_id: "a".into(),
            name: "n".into(),
            assigned_id: 1,
            status,
            time: None,
        }
    }

    #[test]
    fn test_reject_second_call() {
        let reg = InFlightRegistry::default();
        let t = reg.begin(1, InFlightPolicy::Reject).unwrap();
        assert_eq!(
            reg.begin(1, InFlightPolicy::Reject).unwrap_err(),
            SyncError::InFlight(1)
        );
        assert!(reg.begin(2, InFlightPolicy::Reject).is_ok());
        reg.finish(t);
        assert!(!reg.is_in_flight(1));
        assert!(reg.begin(1, InFlightPolicy::Reject).is_ok());
    }

    #[test]
    fn test_guard_finishes_on_drop() {
        let reg = InFlightRegistry::default();
        let t = reg.begin(1, InFlightPolicy::Reject).unwrap();
        {
            let _guard = reg.guard(t);
            assert!(reg.is_in_flight(1));
        }
        assert!(!reg.is_in_flight(1));
    }

    #[test]
    fn test_supersede_tracks_newest_generation() {
        let reg = InFlightRegistry::default();
        let first = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        reg.record_base(first, &task(TaskStatus::ToDo));
        let second = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        reg.record_base(second, &task(TaskStatus::InProgress));

        assert!(!reg.is_current(first));
        assert!(reg.is_current(second));
        // The first call's pre-change record stays the rollback target.
        assert_eq!(reg.base(second).unwrap().status, TaskStatus::ToDo);

        reg.confirm(first, &task(TaskStatus::InProgress));
        assert_eq!(reg.base(second).unwrap().status, TaskStatus::InProgress);

        reg.finish(first);
        assert!(reg.is_in_flight(1));
        reg.finish(second);
        assert!(!reg.is_in_flight(1));
    }

    #[test]
    fn test_late_success_after_newest_rolled_back() {
        let reg = InFlightRegistry::default();
        let first = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        reg.record_base(first, &task(TaskStatus::ToDo));
        let second = reg.begin(1, InFlightPolicy::Supersede).unwrap();

        assert_eq!(reg.roll_back(second).unwrap().status, TaskStatus::ToDo);
        assert!(reg.confirm(first, &task(TaskStatus::InProgress)));
        assert_eq!(reg.base(second).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn test_late_success_is_ignored_while_newest_pending_or_confirmed() {
        let reg = InFlightRegistry::default();
        let first = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        let second = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        assert!(!reg.confirm(first, &task(TaskStatus::InProgress)));

        let third = reg.begin(1, InFlightPolicy::Supersede).unwrap();
        assert!(!reg.confirm(third, &task(TaskStatus::Done)));
        // An older record never replaces a newer confirmed one.
        assert!(!reg.confirm(second, &task(TaskStatus::ToDo)));
        assert_eq!(reg.base(third).unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_queue_lock_is_pruned_after_use() {
        let reg = InFlightRegistry::default();
        {
            let _slot = reg.enter_queue(1).await;
            assert_eq!(reg.queued_tasks(), 1);
        }
        assert_eq!(reg.queued_tasks(), 0);
    }

    #[tokio::test]
    async fn test_queue_lock_kept_while_waiter_holds_it() {
        let reg = Arc::new(InFlightRegistry::default());
        let slot = reg.enter_queue(1).await;
        let waiter = tokio::spawn({
            let reg = reg.clone();
            async move {
                let _slot = reg.enter_queue(1).await;
            }
        });
        // Wait until the waiter holds its handle on the lock.
        while reg.queues().get(&1).map_or(0, Arc::strong_count) < 3 {
            tokio::task::yield_now().await;
        }
        drop(slot);
        assert_eq!(reg.queued_tasks(), 1);
        waiter.await.unwrap();
        assert_eq!(reg.queued_tasks(), 0);
    }
}
