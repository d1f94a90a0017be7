//! Argument parsing and command dispatch.

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hostinv_api_models::GroupType;
use hostinv_core::permissions::GENERAL_GROUPS_WRITE_PERMISSION;
use hostinv_core::{ControllerConfig, SortDirection, StaticCapabilities};
use hostinv_telemetry::{LogFormat, LoggingConfig, init_logging};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{CliError, CliResult, HttpGroupsApi, build_client, parse_url};
use crate::commands::groups::{
    handle_groups_add_hosts, handle_groups_delete, handle_groups_list, handle_groups_rename,
    handle_groups_select_all,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

pub(crate) async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 2 } else { 0 };
        }
    };

    if let Err(err) = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha: option_env!("HOSTINV_BUILD_SHA").unwrap_or("dev"),
    }) {
        eprintln!("warning: {err}");
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Everything a command handler needs: the API, the access rules, and the
/// controller configuration.
pub(crate) struct AppContext {
    pub(crate) api: Arc<HttpGroupsApi>,
    pub(crate) capabilities: Arc<StaticCapabilities>,
    pub(crate) config: ControllerConfig,
    pub(crate) output: OutputFormat,
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let request_id = Uuid::new_v4().to_string();
    let client = build_client(cli.timeout, cli.identity.as_deref(), &request_id)?;
    let ctx = AppContext {
        api: Arc::new(HttpGroupsApi::new(client, cli.api_url)),
        capabilities: Arc::new(StaticCapabilities::from_list(&cli.permissions)),
        config: ControllerConfig::default()
            .with_kessel(cli.kessel)
            .with_debounce(std::time::Duration::ZERO),
        output: cli.output,
    };

    match cli.command {
        Command::Groups(groups) => match groups {
            GroupsCommand::Ls(args) => handle_groups_list(&ctx, args).await,
            GroupsCommand::SelectAll(args) => handle_groups_select_all(&ctx, args).await,
            GroupsCommand::Rename(args) => handle_groups_rename(&ctx, args).await,
            GroupsCommand::Delete(args) => handle_groups_delete(&ctx, args).await,
            GroupsCommand::AddHosts(args) => handle_groups_add_hosts(&ctx, args).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "hostinv", about = "Browse and manage inventory workspaces")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "HOSTINV_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "HOSTINV_IDENTITY",
        help = "Identity header value forwarded to the inventory API"
    )]
    identity: Option<String>,
    #[arg(
        long,
        global = true,
        env = "HOSTINV_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "HOSTINV_KESSEL",
        help = "Enable Kessel access-control mode"
    )]
    kessel: bool,
    #[arg(
        long,
        global = true,
        env = "HOSTINV_PERMISSIONS",
        default_value = GENERAL_GROUPS_WRITE_PERMISSION,
        help = "Comma-separated permissions granted to the caller"
    )]
    permissions: String,
    #[arg(long, global = true, env = "HOSTINV_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "HOSTINV_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(subcommand)]
    Groups(GroupsCommand),
}

#[derive(Subcommand)]
enum GroupsCommand {
    /// List one page of workspaces.
    Ls(GroupListArgs),
    /// Print the ids of every workspace matching the filters.
    SelectAll(GroupFilterArgs),
    /// Rename a workspace.
    Rename(GroupRenameArgs),
    /// Delete one or more workspaces.
    Delete(GroupDeleteArgs),
    /// Add systems to a workspace.
    AddHosts(GroupAddHostsArgs),
}

#[derive(Args, Default)]
pub(crate) struct GroupFilterArgs {
    #[arg(long, help = "URL query to start from, e.g. 'name=db&page=2'")]
    pub(crate) query: Option<String>,
    #[arg(long, help = "Name substring filter")]
    pub(crate) name: Option<String>,
    #[arg(long = "type", value_parser = parse_group_type)]
    pub(crate) group_type: Option<GroupType>,
}

#[derive(Args, Default)]
pub(crate) struct GroupListArgs {
    #[command(flatten)]
    pub(crate) filter: GroupFilterArgs,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) per_page: Option<u32>,
    #[arg(long, help = "Column index to sort by (1 name, 2 total systems, 3 last modified)")]
    pub(crate) sort: Option<usize>,
    #[arg(long, value_parser = parse_direction, default_value = "asc")]
    pub(crate) direction: SortDirection,
}

#[derive(Args)]
pub(crate) struct GroupRenameArgs {
    #[arg(help = "Workspace identifier")]
    pub(crate) id: Uuid,
    #[arg(help = "New workspace name")]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct GroupDeleteArgs {
    #[arg(required = true, help = "Workspace identifiers")]
    pub(crate) ids: Vec<Uuid>,
}

#[derive(Args)]
pub(crate) struct GroupAddHostsArgs {
    #[arg(help = "Target workspace identifier")]
    pub(crate) group_id: Uuid,
    #[arg(required = true, help = "System identifiers")]
    pub(crate) host_ids: Vec<Uuid>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

fn parse_group_type(value: &str) -> Result<GroupType, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_direction(value: &str) -> Result<SortDirection, String> {
    value.parse()
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|err| format!("{err}"))
}

impl GroupFilterArgs {
    pub(crate) fn validate(&self) -> CliResult<()> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(CliError::validation("--name must not be blank"));
        }
        Ok(())
    }
}
