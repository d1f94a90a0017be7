//! Cross-page selection of group ids.

use std::collections::BTreeSet;

use hostinv_api_models::GroupId;

/// Membership changes made by a page-level toggle, kept so the toggle can be reverted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageToggle {
    /// Ids that were added by the toggle.
    pub added: Vec<GroupId>,
    /// Ids that were removed by the toggle.
    pub removed: Vec<GroupId>,
}

impl PageToggle {
    /// True when the toggle changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set of selected group ids, independent of the rows currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<GroupId>,
}

impl SelectionSet {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove a single id.
    pub fn toggle_one(&mut self, id: GroupId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Add (union) or remove (difference) every displayed id in one step.
    pub fn set_page(&mut self, displayed: &[GroupId], selected: bool) -> PageToggle {
        let mut toggle = PageToggle::default();
        for id in displayed {
            if selected {
                if self.ids.insert(*id) {
                    toggle.added.push(*id);
                }
            } else if self.ids.remove(id) {
                toggle.removed.push(*id);
            }
        }
        toggle
    }

    /// Deselect the page when it is fully selected, otherwise select it.
    pub fn toggle_page(&mut self, displayed: &[GroupId]) -> PageToggle {
        let selected = !self.page_selected(displayed);
        self.set_page(displayed, selected)
    }

    /// Undo a page toggle, restoring the exact prior membership.
    pub fn revert(&mut self, toggle: &PageToggle) {
        for id in &toggle.added {
            self.ids.remove(id);
        }
        self.ids.extend(toggle.removed.iter().copied());
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = GroupId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Remove every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &GroupId) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupId> {
        self.ids.iter()
    }

    /// Selected ids collected into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<GroupId> {
        self.ids.iter().copied().collect()
    }

    /// The only selected id, when exactly one is selected.
    #[must_use]
    pub fn single(&self) -> Option<GroupId> {
        if self.ids.len() == 1 {
            self.ids.first().copied()
        } else {
            None
        }
    }

    /// Every matching entity is selected. Unknown totals never count as all.
    #[must_use]
    pub fn all_selected(&self, total: Option<u64>) -> bool {
        total.is_some_and(|total| u64::try_from(self.ids.len()).is_ok_and(|len| len == total))
    }

    /// Nothing is selected.
    #[must_use]
    pub fn none_selected(&self) -> bool {
        self.ids.is_empty()
    }

    /// Every displayed id is selected (vacuously true for an empty page).
    #[must_use]
    pub fn page_selected(&self, displayed: &[GroupId]) -> bool {
        displayed.iter().all(|id| self.ids.contains(id))
    }
}
