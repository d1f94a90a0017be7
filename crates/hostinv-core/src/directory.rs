//! Groups seen in any fulfilled page or batch load.
//!
//! The table only holds the current page, but the selection and the row
//! actions can refer to groups on other pages. The directory remembers every
//! group the controller has loaded so those ids still resolve to a name and
//! to their ungrouped flag.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hostinv_api_models::{Group, GroupId};

/// Shared record of loaded groups, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GroupDirectory {
    groups: Arc<Mutex<HashMap<GroupId, Group>>>,
}

impl GroupDirectory {
    fn lock(&self) -> MutexGuard<'_, HashMap<GroupId, Group>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remember `groups`, replacing older copies of the same ids.
    pub fn record<'a>(&self, groups: impl IntoIterator<Item = &'a Group>) {
        let mut known = self.lock();
        for group in groups {
            known.insert(group.id, group.clone());
        }
    }

    /// Last loaded copy of the group.
    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<Group> {
        self.lock().get(&id).cloned()
    }

    /// True when the group has been loaded.
    #[must_use]
    pub fn contains(&self, id: GroupId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Drop groups that no longer exist.
    pub fn forget(&self, ids: &[GroupId]) {
        let mut known = self.lock();
        for id in ids {
            known.remove(id);
        }
    }

    /// Number of loaded groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
