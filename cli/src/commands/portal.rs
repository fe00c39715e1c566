//! `workshop portal <id>`: the read-only customer view.
use serde::Serialize;
use workshop_core::api::{
    self as core_api, AppContext, CliError, Task, Workorder, WorkorderProgress,
};

use crate::commands::cli::{OutputFormat, PortalArgs};
use crate::commands::emit;
use crate::render;

#[derive(Debug, Serialize)]
pub struct PortalView {
    pub workorder: Workorder,
    pub progress: WorkorderProgress,
    pub tasks: Vec<Task>,
}

pub async fn load_portal(workorder_id: &str, ctx: &AppContext) -> Result<PortalView, CliError> {
    let services = ctx.build_services().await?;
    let store = ctx.store();
    let (orders, _) = futures::try_join!(
        services.directory.list_workorders(None),
        core_api::refresh_store(store, services.tasks.as_ref())
    )?;

    let workorder = orders
        .into_iter()
        .find(|wo| wo.id == workorder_id)
        .ok_or_else(|| CliError::Command(format!("work order {workorder_id} not found")))?;
    let tasks = store.for_workorder(workorder_id).await;
    let progress = store.progress(workorder_id).await;
    Ok(PortalView {
        workorder,
        progress,
        tasks,
    })
}

pub async fn handle_portal(
    args: PortalArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let view = load_portal(&args.workorder_id, ctx).await?;
    emit(format, &view, || {
        render::portal_view(&view.workorder, &view.progress, &view.tasks)
    })
}
