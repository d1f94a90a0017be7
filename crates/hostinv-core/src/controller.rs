//! The groups table controller.
//!
//! # Design
//! - Owns the filter state, its URL mirror, the debounced fetch, the
//!   cross-page selection, and the open modal workflow. Every filter mutation
//!   rewrites the URL query and schedules a fetch with the new state.
//! - Mutating workflows never touch the fetch result directly. Success reloads
//!   through the debounced path; failure only produces a notification.
//! - Access rules are delegated to the [`CapabilityResolver`].
//! - Groups off the current page resolve through the [`GroupDirectory`], which
//!   holds every group seen in a fetched page or a batch load. Names of groups
//!   that were never loaded fall back to their id.

use std::sync::Arc;

use hostinv_api_models::{Group, GroupId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::add_hosts::{AddHostsWorkflow, NO_SYSTEMS_SELECTED_MESSAGE};
use crate::api::GroupsApi;
use crate::batch::fetch_all;
use crate::config::ControllerConfig;
use crate::directory::GroupDirectory;
use crate::error::{InventoryError, InventoryResult};
use crate::fetch::{FetchController, FetchSnapshot, FetchState};
use crate::filters::{FilterState, GroupFilter, SortDirection, read_query, write_query};
use crate::notify::{Notification, plural};
use crate::permissions::{
    Affordance, CapabilityResolver, add_hosts_affordance, bulk_delete_affordance,
    create_affordance, row_modify_affordance,
};
use crate::rows::{
    BulkSelectMenu, TableRow, ToolbarState, bulk_delete_label, bulk_select_menu, displayed_ids,
    present_rows, toolbar_state,
};
use crate::selection::{PageToggle, SelectionSet};

/// Group targeted by a per-row action, or implied by a single selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedGroup {
    /// Group id.
    pub id: GroupId,
    /// Group name, when the group has been loaded.
    pub name: Option<String>,
}

impl SelectedGroup {
    /// Name for messages, falling back to the id.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Modal workflow currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveModal {
    /// Rename a single workspace.
    Rename(SelectedGroup),
    /// Delete one or more workspaces.
    Delete {
        /// Workspaces that will be deleted on confirm.
        targets: Vec<GroupId>,
    },
    /// Add systems to a workspace.
    AddHosts(AddHostsWorkflow),
}

/// State machine behind the workspaces table.
pub struct GroupsTableController {
    config: ControllerConfig,
    api: Arc<dyn GroupsApi>,
    capabilities: Arc<dyn CapabilityResolver>,
    filters: FilterState,
    query: String,
    fetch: FetchController,
    selection: SelectionSet,
    row_target: Option<SelectedGroup>,
    modal: Option<ActiveModal>,
    notifications: Vec<Notification>,
}

impl GroupsTableController {
    /// Mount the table: overlay `initial_query` onto the defaults and schedule
    /// the first fetch.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn mount(
        api: Arc<dyn GroupsApi>,
        capabilities: Arc<dyn CapabilityResolver>,
        config: ControllerConfig,
        initial_query: &str,
    ) -> Self {
        let filters = read_query(initial_query, FilterState::defaults(&config));
        let fetch = FetchController::spawn(Arc::clone(&api), config.debounce);
        let mut controller = Self {
            config,
            api,
            capabilities,
            filters,
            query: String::new(),
            fetch,
            selection: SelectionSet::new(),
            row_target: None,
            modal: None,
            notifications: Vec::new(),
        };
        controller.commit();
        controller
    }

    fn commit(&mut self) {
        self.query = write_query(&self.filters);
        let revision = self.fetch.on_filter_change(&self.filters);
        debug!(revision, query = %self.query, "filters committed");
    }

    /// Controller configuration.
    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current filter state.
    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// URL query mirroring the filter state.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current fetch state.
    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.fetch.state()
    }

    /// Current fetch snapshot including its revision.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot {
        self.fetch.snapshot()
    }

    /// Subscribe to fetch snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.fetch.subscribe()
    }

    /// Wait for the latest scheduled fetch to settle.
    pub async fn wait_settled(&self) -> FetchSnapshot {
        self.fetch.wait_settled().await
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    // Filters

    /// Set the name filter; an empty value clears it.
    pub fn set_name(&mut self, value: &str) {
        self.filters.set_name(value);
        self.commit();
    }

    /// Remove the name filter.
    pub fn clear_name(&mut self) {
        self.filters.clear_name();
        self.commit();
    }

    /// Move to another page.
    pub fn set_page(&mut self, page: u32) {
        self.filters.set_page(page);
        self.commit();
    }

    /// Change the page size. Unlisted sizes are ignored and return `false`.
    pub fn set_per_page(&mut self, per_page: u32) -> bool {
        let changed = self.filters.set_per_page(per_page);
        if changed {
            self.commit();
        }
        changed
    }

    /// Sort by a table column. The selection column is never dispatched.
    pub fn set_sort(&mut self, column_index: usize, direction: SortDirection) -> bool {
        let changed = self.filters.set_sort(column_index, direction);
        if changed {
            self.commit();
        } else {
            debug!(column_index, "ignoring sort on unsortable column");
        }
        changed
    }

    /// Restore the default filters.
    pub fn reset_filters(&mut self) {
        self.filters = FilterState::defaults(&self.config);
        self.commit();
    }

    /// Re-fetch with the current filters through the debounced path.
    pub fn reload(&mut self) {
        let revision = self.fetch.on_filter_change(&self.filters);
        debug!(revision, "reload scheduled");
    }

    // Presentation

    /// Latest loaded copy of a group, from the current page or any earlier
    /// page or batch load.
    #[must_use]
    pub fn known_group(&self, id: GroupId) -> Option<Group> {
        self.directory().get(id)
    }

    /// Every group loaded so far.
    #[must_use]
    pub const fn directory(&self) -> &GroupDirectory {
        self.fetch.directory()
    }

    /// Rows to render.
    #[must_use]
    pub fn rows(&self) -> Vec<TableRow> {
        present_rows(&self.fetch.state(), &self.selection, self.filters.per_page)
    }

    /// Toolbar and pagination state.
    #[must_use]
    pub fn toolbar(&self) -> ToolbarState {
        toolbar_state(&self.fetch.state(), &self.filters)
    }

    /// Bulk-select control state.
    #[must_use]
    pub fn bulk_select(&self) -> BulkSelectMenu {
        let state = self.fetch.state();
        bulk_select_menu(&self.selection, &state, &displayed_ids(&state))
    }

    /// Ids of the rows on the current page.
    #[must_use]
    pub fn displayed_ids(&self) -> Vec<GroupId> {
        displayed_ids(&self.fetch.state())
    }

    /// Group implied by exactly one selected id, with its name when it has
    /// been loaded.
    #[must_use]
    pub fn selected_group(&self) -> Option<SelectedGroup> {
        self.selection.single().map(|id| self.row_group(id))
    }

    // Selection

    /// Check or uncheck one row.
    pub fn toggle_row(&mut self, id: GroupId, selected: bool) {
        self.selection.toggle_one(id, selected);
    }

    /// Select the page, or deselect it when already fully selected.
    pub fn toggle_page(&mut self) -> PageToggle {
        let displayed = self.displayed_ids();
        self.selection.toggle_page(&displayed)
    }

    /// Clear the selection.
    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// Every group matching the current filters, recorded in the directory.
    ///
    /// `None` while the last fetch has not reported a total.
    async fn fetch_matching(&self) -> InventoryResult<Option<Vec<Group>>> {
        let Some(total) = self.fetch.state().total() else {
            return Ok(None);
        };
        let filter = self.filters.without_sort_and_pagination();
        let api = Arc::clone(&self.api);
        let pages = fetch_all(
            |filter: &GroupFilter, page, per_page| {
                let api = Arc::clone(&api);
                let params = filter.page_params(page, per_page);
                async move { api.list_groups(&params).await }
            },
            Some(total),
            &filter,
            self.config.batch_page_size,
        )
        .await?;
        let groups: Vec<Group> = pages.into_iter().flat_map(|page| page.results).collect();
        self.directory().record(&groups);
        Ok(Some(groups))
    }

    /// Load every group matching the current filters into the directory
    /// without touching the selection. Returns the number loaded.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn load_directory(&self) -> InventoryResult<usize> {
        let loaded = self
            .fetch_matching()
            .await
            .inspect_err(|err| warn!(error = %err, "directory load aborted"))?;
        Ok(loaded.map_or_else(
            || {
                debug!("no total yet; directory load skipped");
                0
            },
            |groups| groups.len(),
        ))
    }

    /// Replace the selection with every group matching the current filters.
    ///
    /// Uses the total from the last fulfilled fetch. While no total is known,
    /// or when a page request fails, the selection is left untouched.
    /// Returns the size of the selection.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn select_all(&mut self) -> InventoryResult<usize> {
        let matching = self
            .fetch_matching()
            .await
            .inspect_err(|err| warn!(error = %err, "select-all aborted"))?;
        let Some(groups) = matching else {
            debug!("no total yet; select-all skipped");
            return Ok(self.selection.len());
        };
        self.selection.replace(groups.into_iter().map(|group| group.id));
        info!(count = self.selection.len(), "selected all matching workspaces");
        Ok(self.selection.len())
    }

    /// "Select all" menu entry: deselects everything when all are selected.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::select_all`] failures.
    pub async fn toggle_all(&mut self) -> InventoryResult<usize> {
        if self.selection.all_selected(self.fetch.state().total()) {
            self.selection.clear();
            Ok(0)
        } else {
            self.select_all().await
        }
    }

    /// Bulk-select checkbox: checking selects all matches, unchecking clears.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::select_all`] failures.
    pub async fn set_bulk_checkbox(&mut self, checked: bool) -> InventoryResult<usize> {
        if checked {
            self.select_all().await
        } else {
            self.selection.clear();
            Ok(0)
        }
    }

    // Affordances

    /// Rename/delete affordance for one row.
    ///
    /// In Kessel mode a group that has never been loaded is refused, since it
    /// may be the ungrouped workspace.
    #[must_use]
    pub fn row_affordance(&self, id: GroupId) -> Affordance {
        let ungrouped = self.known_group(id).map(|group| group.ungrouped);
        row_modify_affordance(
            self.capabilities.as_ref(),
            id,
            ungrouped,
            self.config.kessel_enabled,
        )
    }

    /// Bulk delete affordance for the current selection.
    #[must_use]
    pub fn bulk_delete_affordance(&self) -> Affordance {
        let selected = self.selection.to_vec();
        let known: Vec<Option<Group>> = selected.iter().map(|id| self.known_group(*id)).collect();
        let contains_ungrouped = if known.iter().flatten().any(|group| group.ungrouped) {
            Some(true)
        } else if known.iter().any(Option::is_none) {
            None
        } else {
            Some(false)
        };
        bulk_delete_affordance(
            self.capabilities.as_ref(),
            &selected,
            contains_ungrouped,
            self.config.kessel_enabled,
        )
    }

    /// Label of the bulk delete action.
    #[must_use]
    pub fn bulk_delete_label(&self) -> &'static str {
        bulk_delete_label(&self.selection)
    }

    /// "Create workspace" affordance.
    #[must_use]
    pub fn create_affordance(&self) -> Affordance {
        create_affordance(self.capabilities.as_ref())
    }

    // Modals

    /// Open modal, if any.
    #[must_use]
    pub const fn modal(&self) -> Option<&ActiveModal> {
        self.modal.as_ref()
    }

    fn row_group(&self, id: GroupId) -> SelectedGroup {
        SelectedGroup {
            id,
            name: self.known_group(id).map(|group| group.name),
        }
    }

    fn require(affordance: Affordance) -> InventoryResult<()> {
        match affordance {
            Affordance::Enabled => Ok(()),
            Affordance::Disabled { reason } => Err(InventoryError::ActionUnavailable { reason }),
        }
    }

    /// Open the rename modal from a row action.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ActionUnavailable`] when the row may not be modified.
    pub fn open_rename(&mut self, id: GroupId) -> InventoryResult<()> {
        Self::require(self.row_affordance(id))?;
        let target = self.row_group(id);
        self.row_target = Some(target.clone());
        self.modal = Some(ActiveModal::Rename(target));
        Ok(())
    }

    /// Open the delete modal from a row action.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ActionUnavailable`] when the row may not be modified.
    pub fn open_delete(&mut self, id: GroupId) -> InventoryResult<()> {
        Self::require(self.row_affordance(id))?;
        self.row_target = Some(self.row_group(id));
        self.modal = Some(ActiveModal::Delete { targets: vec![id] });
        Ok(())
    }

    /// Open the delete modal for the whole selection.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ActionUnavailable`] when bulk delete is disabled.
    pub fn open_bulk_delete(&mut self) -> InventoryResult<()> {
        Self::require(self.bulk_delete_affordance())?;
        self.modal = Some(ActiveModal::Delete {
            targets: self.selection.to_vec(),
        });
        Ok(())
    }

    /// Open the add-systems modal for a workspace.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ActionUnavailable`] when the workspace may not be modified.
    pub fn open_add_hosts(
        &mut self,
        group_id: GroupId,
        group_name: Option<String>,
    ) -> InventoryResult<()> {
        Self::require(add_hosts_affordance(self.capabilities.as_ref(), group_id))?;
        self.modal = Some(ActiveModal::AddHosts(AddHostsWorkflow::new(
            group_id,
            group_name,
            self.config.kessel_enabled,
        )));
        Ok(())
    }

    /// Host selection of the open add-systems modal.
    pub fn add_hosts_workflow(&mut self) -> Option<&mut AddHostsWorkflow> {
        match self.modal.as_mut() {
            Some(ActiveModal::AddHosts(workflow)) => Some(workflow),
            _ => None,
        }
    }

    /// Close the open modal and forget the per-row target.
    pub fn close_modal(&mut self) {
        if let Some(ActiveModal::AddHosts(workflow)) = self.modal.as_mut() {
            workflow.clear();
        }
        self.modal = None;
        self.row_target = None;
    }

    /// Notifications produced so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain the collected notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Confirm the rename modal.
    ///
    /// An empty name keeps the modal open. A request failure closes it and
    /// leaves only an error notification behind.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NoActiveWorkflow`] without an open rename modal,
    /// [`InventoryError::Validation`] for an empty name, or the API failure.
    pub async fn confirm_rename(&mut self, new_name: &str) -> InventoryResult<()> {
        let Some(ActiveModal::Rename(target)) = self.modal.clone() else {
            return Err(InventoryError::NoActiveWorkflow { workflow: "rename" });
        };
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(InventoryError::validation("name", "name must not be empty"));
        }

        let outcome = self.api.rename_group(target.id, new_name).await;
        self.close_modal();
        match outcome {
            Ok(()) => {
                info!(group_id = %target.id, "workspace renamed");
                self.notifications.push(Notification::success(format!(
                    "{} has been renamed to {new_name}",
                    target.label()
                )));
                self.reload();
                Ok(())
            }
            Err(err) => {
                warn!(group_id = %target.id, error = %err, "rename failed");
                self.notifications.push(Notification::error(format!(
                    "Failed to rename {}",
                    target.label()
                )));
                Err(err)
            }
        }
    }

    /// Confirm the delete modal.
    ///
    /// Success clears the selection and reloads; failure leaves both alone.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NoActiveWorkflow`] without an open delete modal, or
    /// the API failure.
    pub async fn confirm_delete(&mut self) -> InventoryResult<()> {
        let Some(ActiveModal::Delete { targets }) = self.modal.clone() else {
            return Err(InventoryError::NoActiveWorkflow { workflow: "delete" });
        };
        let subject = match targets.as_slice() {
            [single] => self.row_group(*single).label(),
            many => format!("{} workspaces", many.len()),
        };

        let outcome = self.api.delete_groups(&targets).await;
        self.close_modal();
        match outcome {
            Ok(()) => {
                info!(count = targets.len(), "workspaces deleted");
                self.directory().forget(&targets);
                self.notifications.push(Notification::success(format!(
                    "{subject} {} been removed",
                    plural(targets.len(), "has", "have")
                )));
                self.reload();
                self.selection.clear();
                Ok(())
            }
            Err(err) => {
                warn!(count = targets.len(), error = %err, "delete failed");
                self.notifications
                    .push(Notification::error(format!("Failed to delete {subject}")));
                Err(err)
            }
        }
    }

    /// Confirm the add-systems modal.
    ///
    /// A disabled confirm keeps the modal open. Otherwise the modal closes
    /// and its host selection is cleared whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NoActiveWorkflow`] without an open add-systems modal,
    /// [`InventoryError::ActionUnavailable`] while confirm is disabled, or the
    /// API failure.
    pub async fn confirm_add_hosts(&mut self) -> InventoryResult<()> {
        let Some(ActiveModal::AddHosts(workflow)) = self.modal.clone() else {
            return Err(InventoryError::NoActiveWorkflow {
                workflow: "add-systems",
            });
        };
        if !workflow.confirm_enabled() {
            let reason = workflow.warning().unwrap_or(NO_SYSTEMS_SELECTED_MESSAGE);
            return Err(InventoryError::ActionUnavailable {
                reason: reason.to_string(),
            });
        }

        let count = workflow.selected_count();
        let outcome = workflow.submit(self.api.as_ref()).await;
        self.close_modal();
        self.notifications
            .push(workflow.notification(count, outcome.is_ok()));
        outcome?;
        self.reload();
        Ok(())
    }
}
