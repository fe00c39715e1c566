//! `workshop login` / `workshop logout`.
use workshop_core::api::{AppContext, CliError};

use crate::commands::cli::LoginArgs;

pub async fn handle_login(args: LoginArgs, ctx: &AppContext) -> Result<(), CliError> {
    let services = ctx.build_services().await?;
    let login = services.auth.login(&args.username, &args.password).await?;
    tracing::debug!(token_type = %login.token_type, "login accepted");
    println!("Logged in as {}.", args.username);
    Ok(())
}

pub async fn handle_logout(ctx: &AppContext) -> Result<(), CliError> {
    let services = ctx.build_services().await?;
    services.auth.logout()?;
    println!("Logged out.");
    Ok(())
}
