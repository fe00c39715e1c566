//! `workshop workorders ...`
use workshop_core::api::{AppContext, CliError, WorkorderCreate, WorkorderPatch};

use crate::commands::cli::{OutputFormat, WorkordersCommand};
use crate::commands::emit;
use crate::render;

pub async fn handle_workorders(
    cmd: WorkordersCommand,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let services = ctx.build_services().await?;
    let directory = services.directory.as_ref();

    match cmd {
        WorkordersCommand::List(args) => {
            let orders = directory.list_workorders(args.status).await?;
            emit(format, &orders, || render::workorder_table(&orders))
        }
        WorkordersCommand::Create(args) => {
            let payload = WorkorderCreate {
                vehicle: args.vehicle,
                complaint: args.complaint,
                status: args.status,
                received: args.received,
                due: args.due,
                customer_id: args.customer_id,
            };
            let wo = directory.create_workorder(payload).await?;
            tracing::info!(workorder_id = %wo.id, "work order created");
            emit(format, &wo, || render::workorder_line(&wo))
        }
        WorkordersCommand::SetStatus(args) => {
            let wo = directory
                .update_workorder(&args.id, WorkorderPatch::status(args.status))
                .await?;
            emit(format, &wo, || render::workorder_line(&wo))
        }
    }
}
