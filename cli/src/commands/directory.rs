//! `workshop customers list` and `workshop employees list`.
use workshop_core::api::{AppContext, CliError};

use crate::commands::cli::{ListCommand, OutputFormat};
use crate::commands::emit;
use crate::render;

pub async fn handle_customers(
    cmd: ListCommand,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let ListCommand::List = cmd;
    let services = ctx.build_services().await?;
    let customers = services.directory.list_customers().await?;
    emit(format, &customers, || render::customer_table(&customers))
}

pub async fn handle_employees(
    cmd: ListCommand,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let ListCommand::List = cmd;
    let services = ctx.build_services().await?;
    let employees = services.directory.list_employees().await?;
    emit(format, &employees, || render::employee_table(&employees))
}
