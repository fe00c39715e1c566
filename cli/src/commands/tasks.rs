//! `workshop tasks ...`
use serde::Serialize;
use workshop_core::api::{
    self as core_api, AppContext, CliError, SyncOutcome, Task, TaskCreate,
};

use crate::commands::cli::{
    OutputFormat, SetTaskStatusArgs, TaskAddArgs, TaskListArgs, TasksCommand,
};
use crate::commands::emit;
use crate::render;

pub async fn handle_tasks(
    cmd: TasksCommand,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        TasksCommand::List(args) => handle_list(args, ctx, format).await,
        TasksCommand::Add(args) => handle_add(args, ctx, format).await,
        TasksCommand::SetStatus(args) => {
            let report = set_status(args, ctx).await?;
            emit(format, &report, || report.to_string())?;
            match report.outcome {
                StatusOutcome::RolledBack => {
                    Err(CliError::RolledBack(report.message.unwrap_or_default()))
                }
                _ => Ok(()),
            }
        }
    }
}

async fn handle_list(
    args: TaskListArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let services = ctx.build_services().await?;
    let store = ctx.store();
    let (_, employees) = futures::try_join!(
        core_api::refresh_store(store, services.tasks.as_ref()),
        services.directory.list_employees()
    )?;

    let tasks = match args.workorder.as_deref() {
        Some(wo) => store.for_workorder(wo).await,
        None => store.list().await,
    };
    emit(format, &tasks, || render::task_table(&tasks, &employees))
}

async fn handle_add(
    args: TaskAddArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let services = ctx.build_services().await?;
    let mut payload = TaskCreate::new(args.workorder, args.name, args.assigned);
    payload.time = args.time;
    let task = core_api::create_task(ctx.store(), services.tasks.as_ref(), payload).await?;
    emit(format, &task, || render::task_line(&task, None))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOutcome {
    Unchanged,
    Updated,
    RolledBack,
    Superseded,
}

/// What `tasks set-status` reports back.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub task_id: u64,
    pub outcome: StatusOutcome,
    pub task: Option<Task>,
    pub message: Option<String>,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.outcome, &self.task) {
            (StatusOutcome::Unchanged, Some(t)) => {
                write!(f, "task {} is already {}", t.id, t.status)
            }
            (StatusOutcome::Updated, Some(t)) => write!(f, "{}", render::task_line(t, None)),
            (StatusOutcome::RolledBack, Some(t)) => write!(
                f,
                "task {} restored to {}: {}",
                t.id,
                t.status,
                self.message.as_deref().unwrap_or("-")
            ),
            _ => write!(f, "task {} was updated again before this update resolved", self.task_id),
        }
    }
}

/// Loads the store, then runs one optimistic status update.
pub async fn set_status(args: SetTaskStatusArgs, ctx: &AppContext) -> Result<StatusReport, CliError> {
    let services = ctx.build_services().await?;
    core_api::refresh_store(ctx.store(), services.tasks.as_ref()).await?;

    let mut sync = ctx.synchronizer(&services);
    if let Some(policy) = args.policy {
        sync = sync.with_policy(policy);
    }
    let outcome = sync.update_status(args.id, args.status).await?;
    let message = outcome.error_message();
    let kind = match &outcome {
        SyncOutcome::Unchanged(_) => StatusOutcome::Unchanged,
        SyncOutcome::Reconciled(_) => StatusOutcome::Updated,
        SyncOutcome::RolledBack { .. } => StatusOutcome::RolledBack,
        SyncOutcome::Superseded { .. } => StatusOutcome::Superseded,
    };
    Ok(StatusReport {
        task_id: args.id,
        outcome: kind,
        task: outcome.task().cloned(),
        message,
    })
}
