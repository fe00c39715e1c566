#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use workshop_core::api::{ApiError, Task, TaskAuthority, TaskCreate, TaskId, TaskStatus, TaskUpdate};

pub fn task(id: TaskId, status: TaskStatus) -> Task {
    Task {
        id,
        workorder_id: "2025-014".to_string(),
        name: format!("Taak {id}"),
        assigned_id: id,
        status,
        time: Some("-".to_string()),
    }
}

/// `[{id:1, ToDo}, {id:2, Done}]`
pub fn two_tasks() -> Vec<Task> {
    vec![task(1, TaskStatus::ToDo), task(2, TaskStatus::Done)]
}

pub enum Reply {
    /// Echo the update back, stamped with a server-side `time`.
    Accept,
    Return(Task),
    Fail(ApiError),
}

/// In-memory authority with scripted replies.
///
/// Replies are taken in call order. When gated, each `update_task` call
/// announces itself through [`ScriptedAuthority::wait_entered`] and then waits
/// for [`ScriptedAuthority::release`] (per task, first come first served) or,
/// when built with [`ScriptedAuthority::gated_per_call`], for
/// [`ScriptedAuthority::release_call`].
pub struct ScriptedAuthority {
    tasks: Vec<Task>,
    replies: Mutex<HashMap<TaskId, VecDeque<Reply>>>,
    calls: Mutex<Vec<(TaskId, TaskUpdate)>>,
    gated: bool,
    per_call: bool,
    gates: Mutex<HashMap<TaskId, Arc<Semaphore>>>,
    call_gates: Mutex<HashMap<usize, Arc<Semaphore>>>,
    entered_tx: mpsc::UnboundedSender<TaskId>,
    entered_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<TaskId>>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::build(false, false, Vec::new())
    }

    pub fn gated() -> Self {
        Self::build(true, false, Vec::new())
    }

    /// Gated, but every call is released on its own by call index.
    pub fn gated_per_call() -> Self {
        Self::build(true, true, Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self::build(false, false, tasks)
    }

    fn build(gated: bool, per_call: bool, tasks: Vec<Task>) -> Self {
        let (entered_tx, entered_rx) = mpsc::unbounded_channel();
        Self {
            tasks,
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gated,
            per_call,
            gates: Mutex::new(HashMap::new()),
            call_gates: Mutex::new(HashMap::new()),
            entered_tx,
            entered_rx: tokio::sync::Mutex::new(entered_rx),
        }
    }

    pub fn reply(&self, id: TaskId, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(TaskId, TaskUpdate)> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_entered(&self) -> TaskId {
        self.entered_rx
            .lock()
            .await
            .recv()
            .await
            .expect("authority dropped")
    }

    pub fn release(&self, id: TaskId) {
        self.gate(id).add_permits(1);
    }

    /// Releases the `index`-th `update_task` call (0-based, in entry order).
    pub fn release_call(&self, index: usize) {
        self.call_gate(index).add_permits(1);
    }

    fn call_gate(&self, index: usize) -> Arc<Semaphore> {
        self.call_gates
            .lock()
            .unwrap()
            .entry(index)
            .or_insert_with(|| Arc::new(Semaphore::new(0)))
            .clone()
    }

    fn gate(&self, id: TaskId) -> Arc<Semaphore> {
        self.gates
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| Arc::new(Semaphore::new(0)))
            .clone()
    }
}

pub fn accepted(id: TaskId, payload: &TaskUpdate) -> Task {
    Task {
        id,
        workorder_id: payload.workorder_id.clone(),
        name: payload.name.clone(),
        assigned_id: payload.assigned_id,
        status: payload.status,
        time: Some("server".to_string()),
    }
}

#[async_trait]
impl TaskAuthority for ScriptedAuthority {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        Ok(self.tasks.clone())
    }

    async fn create_task(&self, payload: TaskCreate) -> Result<Task, ApiError> {
        Ok(Task {
            id: 100 + self.tasks.len() as TaskId,
            workorder_id: payload.workorder_id,
            name: payload.name,
            assigned_id: payload.assigned_id,
            status: payload.status,
            time: payload.time,
        })
    }

    async fn update_task(&self, id: TaskId, payload: TaskUpdate) -> Result<Task, ApiError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((id, payload.clone()));
            calls.len() - 1
        };
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&id)
            .and_then(|q| q.pop_front())
            .unwrap_or(Reply::Accept);
        let _ = self.entered_tx.send(id);
        if self.gated {
            let gate = if self.per_call {
                self.call_gate(index)
            } else {
                self.gate(id)
            };
            gate.acquire().await.expect("gate closed").forget();
        }
        match reply {
            Reply::Accept => Ok(accepted(id, &payload)),
            Reply::Return(task) => Ok(task),
            Reply::Fail(err) => Err(err),
        }
    }
}
