//! Pure projection of fetch results and selection into renderable table state.

use chrono::{DateTime, Utc};
use hostinv_api_models::{Group, GroupId};

use crate::fetch::FetchState;
use crate::filters::{COLUMN_TITLES, FilterChip, FilterState};
use crate::selection::SelectionSet;

/// Text shown in cells whose value the API did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Title of the placeholder shown when nothing matches the filters.
pub const NO_ENTITIES_TITLE: &str = "No matching workspaces found";

/// Title of the placeholder shown when the list request failed.
pub const ERROR_TITLE: &str = "Something went wrong";

/// Cells spanned by a full-width placeholder: every column plus the selection column.
pub const FULL_WIDTH_SPAN: usize = COLUMN_TITLES.len() + 1;

/// One data row of the groups table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    /// Group identifier.
    pub id: GroupId,
    /// Raw group name (may be empty).
    pub group_name: String,
    /// Name cell: the name, or the id when unnamed.
    pub name_label: String,
    /// Total-systems cell.
    pub host_count_label: String,
    /// Last-modified timestamp, when reported.
    pub updated: Option<DateTime<Utc>>,
    /// Last-modified cell.
    pub updated_label: String,
    /// Whether this is the ungrouped bucket.
    pub ungrouped: bool,
    /// Whether the row is checked.
    pub selected: bool,
}

impl GroupRow {
    fn project(group: &Group, selection: &SelectionSet) -> Self {
        Self {
            id: group.id,
            group_name: group.name.clone(),
            name_label: group.display_name(),
            host_count_label: group
                .host_count
                .map_or_else(|| NOT_AVAILABLE.to_string(), |count| count.to_string()),
            updated: group.updated,
            updated_label: group.updated.map_or_else(
                || NOT_AVAILABLE.to_string(),
                |updated| updated.format("%d %b %Y").to_string(),
            ),
            ungrouped: group.ungrouped,
            selected: selection.contains(&group.id),
        }
    }
}

/// Placeholder variants rendered across the full table width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Nothing matched; offers clearing the filters.
    NoEntities,
    /// The list request failed.
    Error,
}

impl PlaceholderKind {
    /// Placeholder title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NoEntities => NO_ENTITIES_TITLE,
            Self::Error => ERROR_TITLE,
        }
    }
}

/// A renderable table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    /// Skeleton row shown while loading.
    Loading,
    /// A group.
    Group(GroupRow),
    /// Full-width placeholder.
    Placeholder {
        /// Placeholder variant.
        kind: PlaceholderKind,
        /// Number of cells spanned.
        col_span: usize,
    },
}

/// Project the current fetch state into table rows.
///
/// Loading yields `per_page` skeleton rows; an empty result or a failure
/// yields exactly one full-width placeholder.
#[must_use]
pub fn present_rows(state: &FetchState, selection: &SelectionSet, per_page: u32) -> Vec<TableRow> {
    match state {
        FetchState::Uninitialized | FetchState::Loading => {
            (0..per_page).map(|_| TableRow::Loading).collect()
        }
        FetchState::Fulfilled(data) if data.results.is_empty() => vec![TableRow::Placeholder {
            kind: PlaceholderKind::NoEntities,
            col_span: FULL_WIDTH_SPAN,
        }],
        FetchState::Fulfilled(data) => data
            .results
            .iter()
            .map(|group| TableRow::Group(GroupRow::project(group, selection)))
            .collect(),
        FetchState::Rejected(_) => vec![TableRow::Placeholder {
            kind: PlaceholderKind::Error,
            col_span: FULL_WIDTH_SPAN,
        }],
    }
}

/// Ids of the groups currently displayed.
#[must_use]
pub fn displayed_ids(state: &FetchState) -> Vec<GroupId> {
    state
        .data()
        .map(|data| data.results.iter().map(|group| group.id).collect())
        .unwrap_or_default()
}

/// Toolbar and pagination state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    /// Total items reported to the pagination control.
    pub item_count: u64,
    /// Current page.
    pub page: u32,
    /// Current page size.
    pub per_page: u32,
    /// Pagination is shown but inert after a failed fetch.
    pub pagination_disabled: bool,
    /// The name filter stays usable so the user can retry.
    pub name_filter_enabled: bool,
    /// Active filter chips.
    pub chips: Vec<FilterChip>,
    /// Whether the "Reset filters" control is shown.
    pub show_reset: bool,
}

/// Build the toolbar state.
#[must_use]
pub fn toolbar_state(state: &FetchState, filters: &FilterState) -> ToolbarState {
    let chips = filters.active_chips();
    ToolbarState {
        item_count: state.total().unwrap_or(0),
        page: filters.page,
        per_page: filters.per_page,
        pagination_disabled: state.is_rejected(),
        name_filter_enabled: true,
        show_reset: !chips.is_empty(),
        chips,
    }
}

/// Entries of the bulk-select dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkSelectAction {
    /// Clear the selection.
    SelectNone,
    /// Select or deselect the displayed page.
    TogglePage,
    /// Select every match or clear.
    ToggleAll,
}

/// One bulk-select dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelectItem {
    /// Action triggered by the entry.
    pub action: BulkSelectAction,
    /// Entry label.
    pub label: String,
    /// Whether the entry is disabled.
    pub disabled: bool,
}

/// Bulk-select control state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelectMenu {
    /// Dropdown entries.
    pub items: Vec<BulkSelectItem>,
    /// Checkbox state: checked when anything is selected.
    pub checked: bool,
    /// Number of selected ids.
    pub count: usize,
}

/// Build the bulk-select control state.
#[must_use]
pub fn bulk_select_menu(
    selection: &SelectionSet,
    state: &FetchState,
    displayed: &[GroupId],
) -> BulkSelectMenu {
    let on_page = state.data().map_or(0, |data| data.count);
    let total = state.total();
    let page_verb = if selection.page_selected(displayed) {
        "Deselect"
    } else {
        "Select"
    };
    let all_verb = if selection.all_selected(total) {
        "Deselect"
    } else {
        "Select"
    };
    BulkSelectMenu {
        items: vec![
            BulkSelectItem {
                action: BulkSelectAction::SelectNone,
                label: "Select none".to_string(),
                disabled: selection.none_selected(),
            },
            BulkSelectItem {
                action: BulkSelectAction::TogglePage,
                label: format!("{page_verb} page ({on_page} items)"),
                disabled: false,
            },
            BulkSelectItem {
                action: BulkSelectAction::ToggleAll,
                label: format!("{all_verb} all ({} items)", total.unwrap_or(0)),
                disabled: false,
            },
        ],
        checked: !selection.is_empty(),
        count: selection.len(),
    }
}

/// Label of the bulk delete action.
#[must_use]
pub fn bulk_delete_label(selection: &SelectionSet) -> &'static str {
    if selection.len() > 1 {
        "Delete workspaces"
    } else {
        "Delete workspace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::error::InventoryError;
    use chrono::TimeZone;
    use hostinv_api_models::GroupListResponse;
    use uuid::Uuid;

    fn group(id: u128, name: &str) -> Group {
        Group {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            host_count: Some(id.try_into().unwrap_or_default()),
            updated: Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()),
            ungrouped: false,
        }
    }

    fn fulfilled(groups: Vec<Group>, total: u64) -> FetchState {
        let count = groups.len() as u64;
        FetchState::Fulfilled(GroupListResponse {
            results: groups,
            total,
            count,
            page: 1,
            per_page: 50,
        })
    }

    #[test]
    fn loading_emits_one_skeleton_per_page_slot() {
        let rows = present_rows(&FetchState::Loading, &SelectionSet::new(), 20);
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|row| *row == TableRow::Loading));
        assert_eq!(
            present_rows(&FetchState::Uninitialized, &SelectionSet::new(), 10).len(),
            10
        );
    }

    #[test]
    fn empty_result_emits_single_spanning_placeholder() {
        let rows = present_rows(&fulfilled(Vec::new(), 0), &SelectionSet::new(), 50);
        assert_eq!(
            rows,
            vec![TableRow::Placeholder {
                kind: PlaceholderKind::NoEntities,
                col_span: 4,
            }]
        );
    }

    #[test]
    fn rejection_emits_error_placeholder() {
        let state = FetchState::Rejected(InventoryError::http("list_groups", 500, "boom"));
        let rows = present_rows(&state, &SelectionSet::new(), 50);
        assert_eq!(rows.len(), 1);
        assert!(matches!(
            rows[0],
            TableRow::Placeholder {
                kind: PlaceholderKind::Error,
                ..
            }
        ));
        let toolbar = toolbar_state(
            &state,
            &FilterState::defaults(&ControllerConfig::default()),
        );
        assert!(toolbar.pagination_disabled);
        assert!(toolbar.name_filter_enabled);
        assert_eq!(toolbar.item_count, 0);
    }

    #[test]
    fn rows_mark_selection_and_fallbacks() {
        let mut unnamed = group(2, "");
        unnamed.host_count = None;
        unnamed.updated = None;
        let state = fulfilled(vec![group(1, "web"), unnamed], 2);
        let mut selection = SelectionSet::new();
        selection.toggle_one(Uuid::from_u128(2), true);

        let rows = present_rows(&state, &selection, 50);
        let TableRow::Group(first) = &rows[0] else {
            panic!("expected group row");
        };
        assert_eq!(first.name_label, "web");
        assert_eq!(first.updated_label, "09 Mar 2024");
        assert!(!first.selected);
        let TableRow::Group(second) = &rows[1] else {
            panic!("expected group row");
        };
        assert_eq!(second.name_label, Uuid::from_u128(2).to_string());
        assert_eq!(second.host_count_label, NOT_AVAILABLE);
        assert_eq!(second.updated_label, NOT_AVAILABLE);
        assert!(second.selected);
    }

    #[test]
    fn bulk_menu_labels_follow_selection() {
        let state = fulfilled(vec![group(1, "a"), group(2, "b")], 5);
        let displayed = displayed_ids(&state);
        let mut selection = SelectionSet::new();

        let menu = bulk_select_menu(&selection, &state, &displayed);
        assert!(menu.items[0].disabled);
        assert_eq!(menu.items[1].label, "Select page (2 items)");
        assert_eq!(menu.items[2].label, "Select all (5 items)");
        assert!(!menu.checked);

        selection.set_page(&displayed, true);
        let menu = bulk_select_menu(&selection, &state, &displayed);
        assert_eq!(menu.items[1].label, "Deselect page (2 items)");
        assert!(menu.checked);
        assert_eq!(menu.count, 2);
        assert_eq!(bulk_delete_label(&selection), "Delete workspaces");
    }
}
