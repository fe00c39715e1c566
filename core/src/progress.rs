//! Completion of a work order, as shown in the customer portal.

use serde::Serialize;

use crate::domain::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkorderProgress {
    pub workorder_id: String,
    pub done: usize,
    pub total: usize,
}

impl WorkorderProgress {
    /// Counts the tasks of `workorder_id` in one pass; other tasks are skipped.
    pub fn from_tasks<'a, I>(workorder_id: &str, tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let (done, total) = tasks
            .into_iter()
            .filter(|t| t.workorder_id == workorder_id)
            .fold((0, 0), |(d, n), t| (d + usize::from(t.status.is_done()), n + 1));
        Self {
            workorder_id: workorder_id.to_string(),
            done,
            total,
        }
    }

    /// `done / total`, 0 for a work order without tasks.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}
