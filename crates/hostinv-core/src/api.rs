//! Remote API seam consumed by the controller.

use async_trait::async_trait;
use hostinv_api_models::{GroupId, GroupListParams, GroupListResponse, HostId};

use crate::error::InventoryResult;

/// Inventory groups API as seen by the controller.
///
/// Implementations map transport failures to [`crate::InventoryError::Network`].
#[async_trait]
pub trait GroupsApi: Send + Sync {
    /// Fetch one page of groups.
    async fn list_groups(&self, params: &GroupListParams) -> InventoryResult<GroupListResponse>;

    /// Rename a group.
    async fn rename_group(&self, id: GroupId, name: &str) -> InventoryResult<()>;

    /// Delete one or more groups.
    async fn delete_groups(&self, ids: &[GroupId]) -> InventoryResult<()>;

    /// Assign hosts to a group.
    async fn add_hosts_to_group(&self, group_id: GroupId, host_ids: &[HostId])
    -> InventoryResult<()>;
}
