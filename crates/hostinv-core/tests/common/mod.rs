#![allow(dead_code)]

use std::sync::Arc;

use hostinv_core::permissions::GENERAL_GROUPS_WRITE_PERMISSION;
use hostinv_core::{ControllerConfig, GroupsTableController, StaticCapabilities};
use hostinv_test_support::FakeGroupsApi;

pub fn writer() -> Arc<StaticCapabilities> {
    Arc::new(StaticCapabilities::none().grant(GENERAL_GROUPS_WRITE_PERMISSION))
}

pub fn mount(api: &Arc<FakeGroupsApi>, query: &str) -> GroupsTableController {
    mount_with(api, ControllerConfig::default(), query)
}

pub fn mount_with(
    api: &Arc<FakeGroupsApi>,
    config: ControllerConfig,
    query: &str,
) -> GroupsTableController {
    GroupsTableController::mount(api.clone(), writer(), config, query)
}
