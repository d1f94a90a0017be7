//! Workspace listing and mutation commands.

use std::sync::Arc;

use hostinv_api_models::GroupId;
use hostinv_core::config::PER_PAGE_OPTIONS;
use hostinv_core::{GroupsApi, GroupsTableController, InventoryResult};
use tracing::debug;
use url::form_urlencoded;

use crate::cli::{
    AppContext, GroupAddHostsArgs, GroupDeleteArgs, GroupFilterArgs, GroupListArgs,
    GroupRenameArgs,
};
use crate::client::{CliError, CliResult};
use crate::output::{render_group_ids, render_group_page, render_notifications};

/// Starting query for the controller. A `--type` flag takes precedence over
/// any `group_type` already present in `--query`.
fn initial_query(filter: &GroupFilterArgs) -> String {
    let mut query = filter.group_type.map_or_else(String::new, |group_type| {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("group_type", group_type.as_str())
            .finish()
    });
    if let Some(extra) = filter.query.as_deref() {
        let extra = extra.strip_prefix('?').unwrap_or(extra);
        if !extra.is_empty() {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(extra);
        }
    }
    query
}

fn mount(ctx: &AppContext, filter: &GroupFilterArgs) -> CliResult<GroupsTableController> {
    filter.validate()?;
    let api: Arc<dyn GroupsApi> = ctx.api.clone();
    let mut controller = GroupsTableController::mount(
        api,
        ctx.capabilities.clone(),
        ctx.config.clone(),
        &initial_query(filter),
    );
    if let Some(name) = filter.name.as_deref() {
        controller.set_name(name.trim());
    }
    Ok(controller)
}

/// Wait for the latest fetch and surface a failed one as a command error.
async fn settle(controller: &GroupsTableController) -> CliResult<()> {
    let snapshot = controller.wait_settled().await;
    debug!(revision = snapshot.revision, "list settled");
    match snapshot.state.error() {
        Some(err) => Err(CliError::from(err.clone())),
        None => Ok(()),
    }
}

/// Make sure every target id has been loaded so names and the ungrouped
/// flag are known for groups beyond the first page.
async fn resolve_targets(controller: &GroupsTableController, ids: &[GroupId]) -> CliResult<()> {
    if ids.iter().all(|id| controller.known_group(*id).is_some()) {
        return Ok(());
    }
    let loaded = controller.load_directory().await?;
    debug!(loaded, "loaded workspaces beyond the first page");
    Ok(())
}

fn finish(
    controller: &mut GroupsTableController,
    ctx: &AppContext,
    outcome: InventoryResult<()>,
) -> CliResult<()> {
    render_notifications(&controller.take_notifications(), ctx.output)?;
    outcome.map_err(CliError::from)
}

pub(crate) async fn handle_groups_list(ctx: &AppContext, args: GroupListArgs) -> CliResult<()> {
    let mut controller = mount(ctx, &args.filter)?;

    if let Some(per_page) = args.per_page {
        if !controller.set_per_page(per_page) {
            return Err(CliError::validation(format!(
                "--per-page must be one of {PER_PAGE_OPTIONS:?}"
            )));
        }
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err(CliError::validation("--page starts at 1"));
        }
        controller.set_page(page);
    }
    if let Some(column) = args.sort {
        if !controller.set_sort(column, args.direction) {
            return Err(CliError::validation(
                "--sort expects a column index between 1 and 3",
            ));
        }
    }

    settle(&controller).await?;
    render_group_page(
        &controller.rows(),
        &controller.toolbar(),
        controller.query(),
        ctx.output,
    )
}

pub(crate) async fn handle_groups_select_all(
    ctx: &AppContext,
    args: GroupFilterArgs,
) -> CliResult<()> {
    let mut controller = mount(ctx, &args)?;
    settle(&controller).await?;
    controller.select_all().await?;
    render_group_ids(&controller.selection().to_vec(), ctx.output)
}

pub(crate) async fn handle_groups_rename(ctx: &AppContext, args: GroupRenameArgs) -> CliResult<()> {
    let mut controller = mount(ctx, &GroupFilterArgs::default())?;
    settle(&controller).await?;
    resolve_targets(&controller, &[args.id]).await?;
    controller.open_rename(args.id)?;
    let outcome = controller.confirm_rename(&args.name).await;
    finish(&mut controller, ctx, outcome)
}

pub(crate) async fn handle_groups_delete(ctx: &AppContext, args: GroupDeleteArgs) -> CliResult<()> {
    let mut controller = mount(ctx, &GroupFilterArgs::default())?;
    settle(&controller).await?;
    resolve_targets(&controller, &args.ids).await?;
    if let [single] = args.ids.as_slice() {
        controller.open_delete(*single)?;
    } else {
        for id in &args.ids {
            controller.toggle_row(*id, true);
        }
        controller.open_bulk_delete()?;
    }
    let outcome = controller.confirm_delete().await;
    finish(&mut controller, ctx, outcome)
}

pub(crate) async fn handle_groups_add_hosts(
    ctx: &AppContext,
    args: GroupAddHostsArgs,
) -> CliResult<()> {
    let hosts = ctx.api.hosts_by_id(&args.host_ids).await?;
    if let Some(missing) = args
        .host_ids
        .iter()
        .find(|id| hosts.iter().all(|host| host.id != **id))
    {
        return Err(CliError::validation(format!("system {missing} was not found")));
    }

    let mut controller = mount(ctx, &GroupFilterArgs::default())?;
    settle(&controller).await?;
    resolve_targets(&controller, &[args.group_id]).await?;
    let name = controller.known_group(args.group_id).map(|group| group.name);
    controller.open_add_hosts(args.group_id, name)?;
    if let Some(workflow) = controller.add_hosts_workflow() {
        for host in hosts {
            workflow.toggle_host(host, true);
        }
    }
    let outcome = controller.confirm_add_hosts().await;
    finish(&mut controller, ctx, outcome)
}
