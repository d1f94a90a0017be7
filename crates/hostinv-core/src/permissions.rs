//! Capability boundary for mutating actions.
//!
//! # Design
//! - The controller never evaluates access rules. It asks a [`CapabilityResolver`]
//!   and turns the answer into an [`Affordance`] with a user-facing reason.
//! - Kessel mode adds one fixed rule on top: the ungrouped workspace can never be
//!   renamed or deleted. A workspace that has not been loaded yet might be the
//!   ungrouped one, so Kessel mode refuses it as well.

use std::collections::{HashMap, HashSet};

use hostinv_api_models::GroupId;

/// Permission required to create or modify workspaces.
pub const GENERAL_GROUPS_WRITE_PERMISSION: &str = "inventory:groups:write";

/// Reason shown when a single workspace cannot be modified.
pub const NO_MODIFY_WORKSPACE_MESSAGE: &str = "You do not have the necessary permissions to modify this workspace. Contact your organization administrator.";

/// Reason shown when workspaces cannot be created or modified in bulk.
pub const NO_MODIFY_WORKSPACES_MESSAGE: &str = "You do not have the necessary permissions to modify workspaces. Contact your organization administrator.";

/// Reason shown for the ungrouped workspace in Kessel mode.
pub const UNGROUPED_IMMUTABLE_MESSAGE: &str =
    "The ungrouped hosts workspace cannot be renamed or deleted.";

/// Reason shown in Kessel mode for a workspace that has not been loaded.
pub const UNLOADED_WORKSPACE_MESSAGE: &str =
    "This workspace has not been loaded, so it cannot be renamed or deleted.";

/// Reason shown when a bulk action has nothing to act on.
pub const NOTHING_SELECTED_MESSAGE: &str = "Select at least one workspace.";

/// A permission string, optionally scoped to one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    /// Permission identifier, e.g. `inventory:groups:write`.
    pub permission: String,
    /// Group the permission must apply to; `None` for unscoped checks.
    pub group_id: Option<GroupId>,
}

impl Permission {
    /// Unscoped permission.
    pub fn new(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            group_id: None,
        }
    }

    /// Permission scoped to a group.
    pub fn scoped(permission: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            permission: permission.into(),
            group_id: Some(group_id),
        }
    }
}

/// Permissions needed to rename or delete a group.
#[must_use]
pub fn required_permissions_to_modify_group(group_id: GroupId) -> Vec<Permission> {
    vec![Permission::scoped(GENERAL_GROUPS_WRITE_PERMISSION, group_id)]
}

/// Opaque permission predicate supplied by the host application.
pub trait CapabilityResolver: Send + Sync {
    /// Whether every permission in `required` is granted in the given context.
    fn can_perform(&self, required: &[Permission], context: Option<GroupId>) -> bool;
}

/// Resolver backed by a fixed grant list.
///
/// A grant without groups applies everywhere; a grant with groups applies only
/// to checks scoped to one of them.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    global: HashSet<String>,
    scoped: HashMap<String, HashSet<GroupId>>,
}

impl StaticCapabilities {
    /// Resolver that grants nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Grant a permission everywhere.
    #[must_use]
    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.global.insert(permission.into());
        self
    }

    /// Grant a permission on specific groups only.
    #[must_use]
    pub fn grant_on(
        mut self,
        permission: impl Into<String>,
        groups: impl IntoIterator<Item = GroupId>,
    ) -> Self {
        self.scoped
            .entry(permission.into())
            .or_default()
            .extend(groups);
        self
    }

    /// Parse a comma-separated grant list such as `inventory:groups:write,inventory:hosts:read`.
    #[must_use]
    pub fn from_list(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .fold(Self::none(), |caps, entry| caps.grant(entry))
    }

    fn allows(&self, permission: &Permission, context: Option<GroupId>) -> bool {
        if self.global.contains(&permission.permission) {
            return true;
        }
        let Some(group_id) = permission.group_id.or(context) else {
            return false;
        };
        self.scoped
            .get(&permission.permission)
            .is_some_and(|groups| groups.contains(&group_id))
    }
}

impl CapabilityResolver for StaticCapabilities {
    fn can_perform(&self, required: &[Permission], context: Option<GroupId>) -> bool {
        required
            .iter()
            .all(|permission| self.allows(permission, context))
    }
}

/// Whether an action control is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// The action may be performed.
    Enabled,
    /// The action is shown but disabled.
    Disabled {
        /// User-facing explanation.
        reason: String,
    },
}

impl Affordance {
    fn disabled(reason: &str) -> Self {
        Self::Disabled {
            reason: reason.to_string(),
        }
    }

    /// True when enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Explanation when disabled.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Enabled => None,
            Self::Disabled { reason } => Some(reason),
        }
    }
}

/// Affordance for a per-row rename or delete.
///
/// `ungrouped` is `None` when the group has not been loaded.
#[must_use]
pub fn row_modify_affordance(
    resolver: &dyn CapabilityResolver,
    group_id: GroupId,
    ungrouped: Option<bool>,
    kessel_enabled: bool,
) -> Affordance {
    if let Some(reason) = kessel_refusal(ungrouped, kessel_enabled) {
        return Affordance::disabled(reason);
    }
    let required = required_permissions_to_modify_group(group_id);
    if resolver.can_perform(&required, Some(group_id)) {
        Affordance::Enabled
    } else {
        Affordance::disabled(NO_MODIFY_WORKSPACE_MESSAGE)
    }
}

fn kessel_refusal(ungrouped: Option<bool>, kessel_enabled: bool) -> Option<&'static str> {
    match (kessel_enabled, ungrouped) {
        (false, _) | (true, Some(false)) => None,
        (true, Some(true)) => Some(UNGROUPED_IMMUTABLE_MESSAGE),
        (true, None) => Some(UNLOADED_WORKSPACE_MESSAGE),
    }
}

/// Affordance for deleting the whole selection. Every selected group must pass.
///
/// `contains_ungrouped` is `Some(true)` when a loaded selected group is the
/// ungrouped one, `None` when some selected group has not been loaded.
#[must_use]
pub fn bulk_delete_affordance(
    resolver: &dyn CapabilityResolver,
    selected: &[GroupId],
    contains_ungrouped: Option<bool>,
    kessel_enabled: bool,
) -> Affordance {
    if selected.is_empty() {
        return Affordance::disabled(NOTHING_SELECTED_MESSAGE);
    }
    if let Some(reason) = kessel_refusal(contains_ungrouped, kessel_enabled) {
        return Affordance::disabled(reason);
    }
    let required: Vec<Permission> = selected
        .iter()
        .flat_map(|id| required_permissions_to_modify_group(*id))
        .collect();
    if resolver.can_perform(&required, None) {
        Affordance::Enabled
    } else {
        Affordance::disabled(NO_MODIFY_WORKSPACES_MESSAGE)
    }
}

/// Affordance for adding systems to a workspace.
#[must_use]
pub fn add_hosts_affordance(resolver: &dyn CapabilityResolver, group_id: GroupId) -> Affordance {
    let required = required_permissions_to_modify_group(group_id);
    if resolver.can_perform(&required, Some(group_id)) {
        Affordance::Enabled
    } else {
        Affordance::disabled(NO_MODIFY_WORKSPACE_MESSAGE)
    }
}

/// Affordance for creating a workspace.
#[must_use]
pub fn create_affordance(resolver: &dyn CapabilityResolver) -> Affordance {
    if resolver.can_perform(&[Permission::new(GENERAL_GROUPS_WRITE_PERMISSION)], None) {
        Affordance::Enabled
    } else {
        Affordance::disabled(NO_MODIFY_WORKSPACES_MESSAGE)
    }
}
