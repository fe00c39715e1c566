use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use workshop_cli::commands::{auth, cli, directory, portal, tasks, workorders};
use workshop_cli::events::log_store_events;
use workshop_core::api::{self as core_api, AppContext, CliError, LoggingConfig};
use workshop_plugins::factory::HttpServicesFactory;

const EVENT_DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(500);

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = core_api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(base_url) = args.base_url.as_deref() {
        cfg.api.base_url = base_url.to_string();
    }
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(HttpServicesFactory)));

    let event_logger = tokio::spawn(log_store_events(ctx.store().subscribe()));

    let result = dispatch(args.command, args.format, &ctx).await;

    // Dropping the context closes the event channel; the logger drains what
    // is left and stops.
    drop(ctx);
    if tokio::time::timeout(EVENT_DRAIN_TIMEOUT, event_logger)
        .await
        .is_err()
    {
        tracing::debug!(target: "workshop.store", "store event logger did not drain in time");
    }

    result?;
    Ok(0)
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: API / transport / command error
    // 30: status update rolled back
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Api(_) => 20,
        CliError::Sync(_) => 20,
        CliError::Command(_) => 20,
        CliError::Io(_) => 20,
        CliError::RolledBack(_) => 30,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(
    cmd: cli::Commands,
    format: cli::OutputFormat,
    ctx: &AppContext,
) -> Result<(), CliError> {
    match cmd {
        cli::Commands::Login(args) => auth::handle_login(args, ctx).await,
        cli::Commands::Logout => auth::handle_logout(ctx).await,
        cli::Commands::Tasks(c) => tasks::handle_tasks(c, ctx, format).await,
        cli::Commands::Workorders(c) => workorders::handle_workorders(c, ctx, format).await,
        cli::Commands::Customers(c) => directory::handle_customers(c, ctx, format).await,
        cli::Commands::Employees(c) => directory::handle_employees(c, ctx, format).await,
        cli::Commands::Portal(args) => portal::handle_portal(args, ctx, format).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("workshop"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("workshop.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
