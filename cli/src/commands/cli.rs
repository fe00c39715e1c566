use clap::{Args as ClapArgs, Parser, Subcommand};
use workshop_core::api::{InFlightPolicy, TaskId, TaskStatus, WorkorderStatus};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "workshop", about = "Workshop dashboard client")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Overrides `api.base_url` from the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the access token.
    Login(LoginArgs),
    /// Forget the stored access token.
    Logout,
    #[command(subcommand)]
    Tasks(TasksCommand),
    #[command(subcommand)]
    Workorders(WorkordersCommand),
    #[command(subcommand)]
    Customers(ListCommand),
    #[command(subcommand)]
    Employees(ListCommand),
    /// Read-only customer view of one work order.
    Portal(PortalArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TasksCommand {
    List(TaskListArgs),
    Add(TaskAddArgs),
    SetStatus(SetTaskStatusArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TaskListArgs {
    #[arg(long)]
    pub workorder: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TaskAddArgs {
    #[arg(long)]
    pub workorder: String,

    #[arg(long)]
    pub name: String,

    /// Employee id.
    #[arg(long)]
    pub assigned: u64,

    #[arg(long)]
    pub time: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SetTaskStatusArgs {
    pub id: TaskId,

    /// todo, in-progress, done (or the Dutch labels).
    pub status: TaskStatus,

    /// Overrides `sync.in_flight_policy`.
    #[arg(long)]
    pub policy: Option<InFlightPolicy>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum WorkordersCommand {
    List(WorkorderListArgs),
    Create(WorkorderCreateArgs),
    SetStatus(SetWorkorderStatusArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WorkorderListArgs {
    #[arg(long)]
    pub status: Option<WorkorderStatus>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WorkorderCreateArgs {
    #[arg(long)]
    pub vehicle: String,

    #[arg(long)]
    pub customer_id: u64,

    #[arg(long)]
    pub received: String,

    #[arg(long)]
    pub due: String,

    #[arg(long)]
    pub complaint: Option<String>,

    #[arg(long, default_value = "nieuw")]
    pub status: WorkorderStatus,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SetWorkorderStatusArgs {
    pub id: String,
    pub status: WorkorderStatus,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ListCommand {
    List,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PortalArgs {
    pub workorder_id: String,
}
