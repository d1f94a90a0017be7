//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use hostinv_api_models::GroupId;
use hostinv_core::rows::{GroupRow, ToolbarState};
use hostinv_core::{Notification, TableRow};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

#[derive(Serialize)]
struct GroupRowView<'a> {
    id: GroupId,
    name: &'a str,
    host_count: &'a str,
    updated: &'a str,
    ungrouped: bool,
}

#[derive(Serialize)]
struct GroupPageView<'a> {
    query: &'a str,
    total: u64,
    page: u32,
    per_page: u32,
    groups: Vec<GroupRowView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<&'static str>,
}

impl<'a> From<&'a GroupRow> for GroupRowView<'a> {
    fn from(row: &'a GroupRow) -> Self {
        Self {
            id: row.id,
            name: &row.name_label,
            host_count: &row.host_count_label,
            updated: &row.updated_label,
            ungrouped: row.ungrouped,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn placeholder_title(rows: &[TableRow]) -> Option<&'static str> {
    rows.iter().find_map(|row| match row {
        TableRow::Placeholder { kind, .. } => Some(kind.title()),
        TableRow::Loading | TableRow::Group(_) => None,
    })
}

fn group_rows(rows: &[TableRow]) -> impl Iterator<Item = &GroupRow> {
    rows.iter().filter_map(|row| match row {
        TableRow::Group(group) => Some(group),
        TableRow::Loading | TableRow::Placeholder { .. } => None,
    })
}

pub(crate) fn format_group_table(rows: &[TableRow], toolbar: &ToolbarState) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<36} {:<32} {:>13} LAST MODIFIED",
        "ID", "NAME", "TOTAL SYSTEMS"
    )];
    if let Some(title) = placeholder_title(rows) {
        lines.push(title.to_string());
    }
    lines.extend(group_rows(rows).map(|row| {
        format!(
            "{:<36} {:<32} {:>13} {}",
            row.id, row.name_label, row.host_count_label, row.updated_label
        )
    }));
    lines.push(page_summary(toolbar));
    if !toolbar.chips.is_empty() {
        let chips = toolbar
            .chips
            .iter()
            .map(|chip| format!("{}: {}", chip.category, chip.value))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("filters: {chips}"));
    }
    lines
}

fn page_summary(toolbar: &ToolbarState) -> String {
    let last_page = toolbar.item_count.div_ceil(u64::from(toolbar.per_page.max(1)));
    format!(
        "page {} of {} ({} total, {} per page)",
        toolbar.page,
        last_page.max(1),
        toolbar.item_count,
        toolbar.per_page
    )
}

pub(crate) fn render_group_page(
    rows: &[TableRow],
    toolbar: &ToolbarState,
    query: &str,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let view = GroupPageView {
                query,
                total: toolbar.item_count,
                page: toolbar.page,
                per_page: toolbar.per_page,
                groups: group_rows(rows).map(GroupRowView::from).collect(),
                placeholder: placeholder_title(rows),
            };
            println!("{}", to_json(&view)?);
        }
        OutputFormat::Table => {
            for line in format_group_table(rows, toolbar) {
                println!("{line}");
            }
            println!("query: {query}");
        }
    }
    Ok(())
}

pub(crate) fn render_group_ids(ids: &[GroupId], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&ids)?),
        OutputFormat::Table => {
            for id in ids {
                println!("{id}");
            }
            println!("{} selected", ids.len());
        }
    }
    Ok(())
}

pub(crate) fn render_notifications(
    notifications: &[Notification],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            for notification in notifications {
                println!("{}", serde_json::to_string(notification).map_err(|err| {
                    CliError::failure(anyhow!("failed to format JSON: {err}"))
                })?);
            }
        }
        OutputFormat::Table => {
            for notification in notifications {
                println!("{}: {}", notification.title, notification.description);
            }
        }
    }
    Ok(())
}
