//! "Add systems to workspace" workflow state.

use std::collections::BTreeMap;

use hostinv_api_models::{GroupId, HostId, HostSummary};
use tracing::{info, warn};

use crate::api::GroupsApi;
use crate::error::{InventoryError, InventoryResult};
use crate::notify::{Notification, plural};

/// Warning shown when the host selection contains systems that already have a workspace.
pub const ALREADY_IN_WORKSPACE_WARNING: &str = "One or more of the selected systems already belong to a workspace. Only systems not already belonging to a workspace can be added. Unselect these systems to move forward.";

/// Reason shown when confirming with no systems selected.
pub const NO_SYSTEMS_SELECTED_MESSAGE: &str = "Select at least one system.";

/// Whether `host` is already assigned to a workspace.
///
/// In Kessel mode every host lives in some workspace, so only membership of
/// the ungrouped workspace counts as unassigned. Otherwise a named first
/// group counts as assigned.
#[must_use]
pub fn belongs_to_workspace(host: &HostSummary, kessel_enabled: bool) -> bool {
    let first = host.groups.first();
    if kessel_enabled {
        !first.is_some_and(|group| group.ungrouped)
    } else {
        first.is_some_and(|group| !group.name.is_empty())
    }
}

/// Host selection and target of an open add-systems modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddHostsWorkflow {
    group_id: GroupId,
    group_name: Option<String>,
    kessel_enabled: bool,
    selected: BTreeMap<HostId, HostSummary>,
}

impl AddHostsWorkflow {
    /// Open the workflow for a target workspace.
    #[must_use]
    pub fn new(group_id: GroupId, group_name: Option<String>, kessel_enabled: bool) -> Self {
        Self {
            group_id,
            group_name: group_name.filter(|name| !name.is_empty()),
            kessel_enabled,
            selected: BTreeMap::new(),
        }
    }

    /// Target workspace id.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Target name used in messages, falling back to the id.
    #[must_use]
    pub fn target_label(&self) -> String {
        self.group_name
            .clone()
            .unwrap_or_else(|| self.group_id.to_string())
    }

    /// Select or deselect one host.
    pub fn toggle_host(&mut self, host: HostSummary, selected: bool) {
        if selected {
            self.selected.insert(host.id, host);
        } else {
            self.selected.remove(&host.id);
        }
    }

    /// Drop every selected host.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected host ids in ascending order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<HostId> {
        self.selected.keys().copied().collect()
    }

    /// Number of selected hosts.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected hosts that already belong to a workspace.
    #[must_use]
    pub fn already_assigned(&self) -> Vec<HostId> {
        self.selected
            .values()
            .filter(|host| belongs_to_workspace(host, self.kessel_enabled))
            .map(|host| host.id)
            .collect()
    }

    /// Warning text, when any selected host already has a workspace.
    #[must_use]
    pub fn warning(&self) -> Option<&'static str> {
        self.selected
            .values()
            .any(|host| belongs_to_workspace(host, self.kessel_enabled))
            .then_some(ALREADY_IN_WORKSPACE_WARNING)
    }

    /// Confirm is enabled when something is selected and no warning applies.
    #[must_use]
    pub fn confirm_enabled(&self) -> bool {
        !self.selected.is_empty() && self.warning().is_none()
    }

    /// Header label such as "3 systems selected"; `None` with nothing selected.
    #[must_use]
    pub fn selected_label(&self) -> Option<String> {
        match self.selected.len() {
            0 => None,
            1 => Some("1 system selected".to_string()),
            count => Some(format!("{count} systems selected")),
        }
    }

    /// Send the selected hosts to the API.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ActionUnavailable`] when confirm is disabled,
    /// or the API failure.
    pub async fn submit(&self, api: &dyn GroupsApi) -> InventoryResult<Vec<HostId>> {
        if let Some(warning) = self.warning() {
            return Err(InventoryError::ActionUnavailable {
                reason: warning.to_string(),
            });
        }
        if self.selected.is_empty() {
            return Err(InventoryError::ActionUnavailable {
                reason: NO_SYSTEMS_SELECTED_MESSAGE.to_string(),
            });
        }
        let host_ids = self.selected_ids();
        match api.add_hosts_to_group(self.group_id, &host_ids).await {
            Ok(()) => {
                info!(group_id = %self.group_id, count = host_ids.len(), "systems added to workspace");
                Ok(host_ids)
            }
            Err(err) => {
                warn!(group_id = %self.group_id, count = host_ids.len(), error = %err, "adding systems failed");
                Err(err)
            }
        }
    }

    /// Notification for a submit outcome over `count` hosts.
    #[must_use]
    pub fn notification(&self, count: usize, succeeded: bool) -> Notification {
        let target = self.target_label();
        if succeeded {
            Notification::success(format!(
                "{} added to {target}",
                plural(count, "System", "Systems")
            ))
        } else {
            Notification::error(format!(
                "Failed to add {} to {target}",
                plural(count, "system", "systems")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostinv_api_models::HostGroup;
    use uuid::Uuid;

    fn host(id: u128, groups: Vec<HostGroup>) -> HostSummary {
        HostSummary {
            id: Uuid::from_u128(id),
            display_name: format!("host-{id}"),
            groups,
        }
    }

    fn group(name: &str, ungrouped: bool) -> HostGroup {
        HostGroup {
            id: Uuid::from_u128(900),
            name: name.to_string(),
            ungrouped,
        }
    }

    #[test]
    fn standard_mode_warns_on_named_group() {
        assert!(!belongs_to_workspace(&host(1, Vec::new()), false));
        assert!(!belongs_to_workspace(&host(1, vec![group("", false)]), false));
        assert!(belongs_to_workspace(&host(1, vec![group("web", false)]), false));
    }

    #[test]
    fn kessel_mode_only_accepts_ungrouped_hosts() {
        assert!(!belongs_to_workspace(
            &host(1, vec![group("Ungrouped Hosts", true)]),
            true
        ));
        assert!(belongs_to_workspace(&host(1, vec![group("web", false)]), true));
        assert!(belongs_to_workspace(&host(1, Vec::new()), true));
    }

    #[test]
    fn confirm_requires_selection_without_warning() {
        let mut workflow = AddHostsWorkflow::new(Uuid::from_u128(5), Some("db".into()), false);
        assert!(!workflow.confirm_enabled());
        assert_eq!(workflow.selected_label(), None);

        workflow.toggle_host(host(1, Vec::new()), true);
        assert!(workflow.confirm_enabled());
        assert_eq!(workflow.selected_label().as_deref(), Some("1 system selected"));

        workflow.toggle_host(host(2, vec![group("web", false)]), true);
        assert_eq!(workflow.warning(), Some(ALREADY_IN_WORKSPACE_WARNING));
        assert_eq!(workflow.already_assigned(), vec![Uuid::from_u128(2)]);
        assert!(!workflow.confirm_enabled());
        assert_eq!(workflow.selected_label().as_deref(), Some("2 systems selected"));

        workflow.toggle_host(host(2, Vec::new()), false);
        assert!(workflow.confirm_enabled());
    }

    #[test]
    fn notifications_name_the_target() {
        let named = AddHostsWorkflow::new(Uuid::from_u128(5), Some("db".into()), false);
        assert_eq!(named.notification(1, true).description, "System added to db");
        assert_eq!(
            named.notification(3, false).description,
            "Failed to add systems to db"
        );
        let unnamed = AddHostsWorkflow::new(Uuid::from_u128(5), Some(String::new()), false);
        assert_eq!(
            unnamed.notification(2, true).description,
            format!("Systems added to {}", Uuid::from_u128(5))
        );
    }
}
