//! In-memory implementation of the groups API.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use hostinv_api_models::{
    Group, GroupId, GroupListParams, GroupListResponse, GroupType, HostId, OrderBy, OrderHow,
};
use hostinv_core::{GroupsApi, InventoryError, InventoryResult};

#[derive(Debug, Default)]
struct FakeState {
    groups: Vec<Group>,
    list_calls: Vec<GroupListParams>,
    renames: Vec<(GroupId, String)>,
    deletes: Vec<Vec<GroupId>>,
    host_additions: Vec<(GroupId, Vec<HostId>)>,
    list_delays: VecDeque<Duration>,
    fail_list: bool,
    fail_pages: HashSet<u32>,
    fail_mutations: bool,
}

/// Groups API backed by a vector, recording every call.
///
/// Filtering, ordering, and pagination follow the server contract closely
/// enough for controller tests: case-insensitive name substring, group type,
/// single-field ordering, one-based pages.
#[derive(Debug, Default)]
pub struct FakeGroupsApi {
    state: Mutex<FakeState>,
}

impl FakeGroupsApi {
    /// Fake serving `groups`.
    #[must_use]
    pub fn with_groups(groups: Vec<Group>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                groups,
                ..FakeState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delay the next list response by `delay`. Queued delays apply in call order.
    pub fn push_list_delay(&self, delay: Duration) {
        self.state().list_delays.push_back(delay);
    }

    /// Make every list request fail with a server error.
    pub fn fail_list(&self, fail: bool) {
        self.state().fail_list = fail;
    }

    /// Make list requests for `page` fail.
    pub fn fail_page(&self, page: u32) {
        self.state().fail_pages.insert(page);
    }

    /// Make rename, delete, and add-hosts fail.
    pub fn fail_mutations(&self, fail: bool) {
        self.state().fail_mutations = fail;
    }

    /// Every list request received, in arrival order.
    #[must_use]
    pub fn list_calls(&self) -> Vec<GroupListParams> {
        self.state().list_calls.clone()
    }

    /// Number of list requests received.
    #[must_use]
    pub fn list_call_count(&self) -> usize {
        self.state().list_calls.len()
    }

    /// Rename requests received.
    #[must_use]
    pub fn renames(&self) -> Vec<(GroupId, String)> {
        self.state().renames.clone()
    }

    /// Delete requests received.
    #[must_use]
    pub fn deletes(&self) -> Vec<Vec<GroupId>> {
        self.state().deletes.clone()
    }

    /// Add-hosts requests received.
    #[must_use]
    pub fn host_additions(&self) -> Vec<(GroupId, Vec<HostId>)> {
        self.state().host_additions.clone()
    }

    /// Groups currently stored.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.state().groups.clone()
    }

    fn mutation_guard(&self, operation: &'static str) -> InventoryResult<()> {
        if self.state().fail_mutations {
            Err(InventoryError::http(operation, 500, "injected failure"))
        } else {
            Ok(())
        }
    }
}

fn matches(group: &Group, params: &GroupListParams) -> bool {
    let type_ok = match params.group_type {
        Some(GroupType::Standard) => !group.ungrouped,
        Some(GroupType::UngroupedHosts) => group.ungrouped,
        Some(GroupType::All) | None => true,
    };
    let name_ok = params.name.as_ref().is_none_or(|needle| {
        group
            .name
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    });
    type_ok && name_ok
}

fn order(groups: &mut [Group], order_by: Option<OrderBy>, order_how: Option<OrderHow>) {
    let Some(order_by) = order_by else {
        return;
    };
    groups.sort_by(|left, right| match order_by {
        OrderBy::Name => left.name.cmp(&right.name),
        OrderBy::HostCount => left.host_count.cmp(&right.host_count),
        OrderBy::Updated => left.updated.cmp(&right.updated),
    });
    if order_how == Some(OrderHow::Desc) {
        groups.reverse();
    }
}

#[async_trait]
impl GroupsApi for FakeGroupsApi {
    async fn list_groups(&self, params: &GroupListParams) -> InventoryResult<GroupListResponse> {
        let (delay, failed, mut matching) = {
            let mut state = self.state();
            state.list_calls.push(params.clone());
            let delay = state.list_delays.pop_front();
            let failed = state.fail_list || state.fail_pages.contains(&params.page);
            let matching: Vec<Group> = state
                .groups
                .iter()
                .filter(|group| matches(group, params))
                .cloned()
                .collect();
            (delay, failed, matching)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failed {
            return Err(InventoryError::http(
                "list_groups",
                500,
                "injected failure",
            ));
        }

        order(&mut matching, params.order_by, params.order_how);
        let total = matching.len() as u64;
        let per_page = params.per_page.max(1) as usize;
        let skip = (params.page.max(1) as usize - 1) * per_page;
        let results: Vec<Group> = matching.into_iter().skip(skip).take(per_page).collect();
        Ok(GroupListResponse {
            count: results.len() as u64,
            results,
            total,
            page: params.page,
            per_page: params.per_page,
        })
    }

    async fn rename_group(&self, id: GroupId, name: &str) -> InventoryResult<()> {
        self.mutation_guard("rename_group")?;
        let mut state = self.state();
        state.renames.push((id, name.to_string()));
        if let Some(group) = state.groups.iter_mut().find(|group| group.id == id) {
            group.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_groups(&self, ids: &[GroupId]) -> InventoryResult<()> {
        self.mutation_guard("delete_groups")?;
        let mut state = self.state();
        state.deletes.push(ids.to_vec());
        state.groups.retain(|group| !ids.contains(&group.id));
        Ok(())
    }

    async fn add_hosts_to_group(
        &self,
        group_id: GroupId,
        host_ids: &[HostId],
    ) -> InventoryResult<()> {
        self.mutation_guard("add_hosts_to_group")?;
        let mut state = self.state();
        state.host_additions.push((group_id, host_ids.to_vec()));
        if let Some(group) = state.groups.iter_mut().find(|group| group.id == group_id) {
            group.host_count = Some(group.host_count.unwrap_or(0) + host_ids.len() as u64);
        }
        Ok(())
    }
}
