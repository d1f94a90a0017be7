mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use hostinv_core::add_hosts::ALREADY_IN_WORKSPACE_WARNING;
use hostinv_core::permissions::{
    GENERAL_GROUPS_WRITE_PERMISSION, NO_MODIFY_WORKSPACE_MESSAGE, UNGROUPED_IMMUTABLE_MESSAGE,
    UNLOADED_WORKSPACE_MESSAGE,
};
use hostinv_core::{
    ActiveModal, ControllerConfig, GroupsTableController, InventoryError, NotificationVariant,
    StaticCapabilities,
};
use hostinv_test_support::FakeGroupsApi;
use hostinv_test_support::fixtures::{group, group_id, groups, host, host_id, ungrouped_group};
use tokio::time::sleep;

use common::{mount, mount_with};

#[tokio::test(start_paused = true)]
async fn select_all_pages_through_every_match() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(120)));
    let mut controller = mount(&api, "?order_by=name&order_how=desc&page=2&per_page=10");
    controller.wait_settled().await;

    let selected = controller.select_all().await.expect("select all");
    assert_eq!(selected, 120);

    let batch: Vec<_> = api.list_calls().into_iter().skip(1).collect();
    assert_eq!(batch.len(), 3);
    let pages: HashSet<u32> = batch.iter().map(|call| call.page).collect();
    assert_eq!(pages, HashSet::from([1, 2, 3]));
    assert!(batch.iter().all(|call| call.per_page == 50));
    assert!(batch.iter().all(|call| call.order_by.is_none()));

    let unique: HashSet<_> = controller.selection().iter().copied().collect();
    assert_eq!(unique.len(), 120);
    assert!(controller.bulk_select().items[2].label.starts_with("Deselect all"));

    assert_eq!(controller.toggle_all().await.expect("toggle"), 0);
    assert!(controller.selection().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_batch_page_leaves_selection_alone() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(120)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;
    controller.toggle_row(group_id(7), true);
    api.fail_page(2);

    let err = controller.set_bulk_checkbox(true).await.expect_err("page 2 fails");
    assert!(err.is_network());
    assert_eq!(controller.selection().to_vec(), vec![group_id(7)]);
}

#[tokio::test(start_paused = true)]
async fn page_toggle_round_trips_over_existing_selection() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(30)));
    let mut controller = mount(&api, "per_page=10");
    controller.wait_settled().await;
    controller.toggle_row(group_id(2), true);
    controller.toggle_row(group_id(25), true);
    let before = controller.selection().clone();

    let first = controller.toggle_page();
    assert_eq!(controller.selection().len(), 11);
    assert!(controller.bulk_select().items[1].label.starts_with("Deselect page"));
    let second = controller.toggle_page();
    assert!(!first.is_noop() && !second.is_noop());
    assert_eq!(controller.selection().to_vec(), vec![group_id(25)]);

    let mut restored = controller.selection().clone();
    restored.revert(&second);
    assert_eq!(restored.len(), 11);
    restored.revert(&first);
    assert_eq!(restored, before);
}

#[tokio::test(start_paused = true)]
async fn delete_selection_clears_it_and_reloads() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(5)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;
    controller.toggle_row(group_id(1), true);
    controller.toggle_row(group_id(2), true);
    assert_eq!(controller.bulk_delete_label(), "Delete workspaces");

    controller.open_bulk_delete().expect("bulk delete enabled");
    controller.confirm_delete().await.expect("delete");

    assert_eq!(api.deletes(), vec![vec![group_id(1), group_id(2)]]);
    assert!(controller.selection().is_empty());
    assert!(controller.modal().is_none());
    let notice = &controller.notifications()[0];
    assert_eq!(notice.variant, NotificationVariant::Success);
    assert_eq!(notice.description, "2 workspaces have been removed");

    let snapshot = controller.wait_settled().await;
    assert_eq!(snapshot.state.total(), Some(3));
    assert_eq!(api.list_call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_only_notifies() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(5)));
    let mut controller = mount(&api, "");
    let settled = controller.wait_settled().await;
    controller.toggle_row(group_id(4), true);
    api.fail_mutations(true);

    controller.open_delete(group_id(4)).expect("row delete enabled");
    let err = controller.confirm_delete().await.expect_err("delete fails");
    assert!(err.is_network());

    assert_eq!(controller.selection().to_vec(), vec![group_id(4)]);
    assert_eq!(controller.snapshot(), settled);
    let notice = &controller.notifications()[0];
    assert_eq!(notice.variant, NotificationVariant::Error);
    assert_eq!(notice.description, "Failed to delete group-004");
}

#[tokio::test(start_paused = true)]
async fn rename_validates_before_calling_the_api() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(3)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;

    controller.open_rename(group_id(2)).expect("rename enabled");
    let err = controller.confirm_rename("   ").await.expect_err("empty");
    assert!(matches!(err, InventoryError::Validation { field: "name", .. }));
    assert!(matches!(controller.modal(), Some(ActiveModal::Rename(_))));
    assert!(api.renames().is_empty());

    controller.confirm_rename("  databases ").await.expect("rename");
    assert_eq!(api.renames(), vec![(group_id(2), "databases".to_string())]);
    assert_eq!(
        controller.take_notifications()[0].description,
        "group-002 has been renamed to databases"
    );
    assert!(controller.notifications().is_empty());
    controller.wait_settled().await;
    assert_eq!(api.list_call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn confirm_without_modal_is_rejected() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(1)));
    let mut controller = mount(&api, "");
    assert_eq!(
        controller.confirm_delete().await,
        Err(InventoryError::NoActiveWorkflow { workflow: "delete" })
    );
    assert!(matches!(
        controller.confirm_rename("x").await,
        Err(InventoryError::NoActiveWorkflow { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn capability_boundary_gates_row_actions() {
    let mut all = groups(2);
    all.push(ungrouped_group());
    let ungrouped_id = ungrouped_group().id;
    let api = Arc::new(FakeGroupsApi::with_groups(all));

    let mut kessel = mount_with(&api, ControllerConfig::default().with_kessel(true), "");
    kessel.wait_settled().await;
    assert_eq!(
        kessel.open_rename(ungrouped_id),
        Err(InventoryError::ActionUnavailable {
            reason: UNGROUPED_IMMUTABLE_MESSAGE.to_string()
        })
    );
    kessel.toggle_row(ungrouped_id, true);
    assert!(!kessel.bulk_delete_affordance().is_enabled());

    let mut reader = GroupsTableController::mount(
        api.clone(),
        Arc::new(StaticCapabilities::none()),
        ControllerConfig::default(),
        "",
    );
    reader.wait_settled().await;
    assert_eq!(
        reader.row_affordance(group_id(1)).reason(),
        Some(NO_MODIFY_WORKSPACE_MESSAGE)
    );
    assert!(reader.open_delete(group_id(1)).is_err());
    assert!(!reader.create_affordance().is_enabled());
    assert!(reader.modal().is_none());

    let scoped = GroupsTableController::mount(
        api.clone(),
        Arc::new(StaticCapabilities::none().grant_on(GENERAL_GROUPS_WRITE_PERMISSION, [group_id(1)])),
        ControllerConfig::default(),
        "",
    );
    assert!(scoped.row_affordance(group_id(1)).is_enabled());
    assert!(!scoped.row_affordance(group_id(2)).is_enabled());
}

#[tokio::test(start_paused = true)]
async fn single_selection_names_the_selected_group() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(3)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;
    controller.toggle_row(group_id(3), true);

    let selected = controller.selected_group().expect("one selected");
    assert_eq!(selected.name.as_deref(), Some("group-003"));
    controller.toggle_row(group_id(1), true);
    assert!(controller.selected_group().is_none());
}

#[tokio::test(start_paused = true)]
async fn add_systems_requires_unassigned_hosts() {
    let target = group(1, "web");
    let assigned_to = group(2, "db");
    let api = Arc::new(FakeGroupsApi::with_groups(vec![target.clone(), assigned_to.clone()]));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;

    controller
        .open_add_hosts(target.id, Some(target.name.clone()))
        .expect("add systems enabled");
    let workflow = controller.add_hosts_workflow().expect("modal open");
    workflow.toggle_host(host(1, &[]), true);
    workflow.toggle_host(host(2, &[&assigned_to]), true);

    assert_eq!(
        controller.confirm_add_hosts().await,
        Err(InventoryError::ActionUnavailable {
            reason: ALREADY_IN_WORKSPACE_WARNING.to_string()
        })
    );
    assert!(api.host_additions().is_empty());

    let workflow = controller.add_hosts_workflow().expect("still open");
    workflow.toggle_host(host(2, &[&assigned_to]), false);
    assert_eq!(workflow.selected_label().as_deref(), Some("1 system selected"));
    controller.confirm_add_hosts().await.expect("add");

    assert_eq!(api.host_additions(), vec![(target.id, vec![host_id(1)])]);
    assert!(controller.modal().is_none());
    assert_eq!(
        controller.notifications()[0].description,
        "System added to web"
    );
    let snapshot = controller.wait_settled().await;
    let refreshed = snapshot
        .state
        .data()
        .and_then(|page| page.results.iter().find(|group| group.id == target.id).cloned())
        .expect("target listed");
    assert_eq!(refreshed.host_count, Some(2));
}

#[tokio::test(start_paused = true)]
async fn failed_add_systems_closes_with_error() {
    let target = group(1, "");
    let api = Arc::new(FakeGroupsApi::with_groups(vec![target.clone()]));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;
    api.fail_mutations(true);

    controller.open_add_hosts(target.id, None).expect("enabled");
    let workflow = controller.add_hosts_workflow().expect("open");
    workflow.toggle_host(host(1, &[]), true);
    workflow.toggle_host(host(2, &[]), true);
    assert!(controller.confirm_add_hosts().await.is_err());

    assert!(controller.add_hosts_workflow().is_none());
    assert_eq!(
        controller.notifications()[0].description,
        format!("Failed to add systems to {}", target.id)
    );
}

fn kessel_with_ungrouped_on_page_two() -> (Arc<FakeGroupsApi>, GroupsTableController) {
    let mut all = groups(15);
    all.push(ungrouped_group());
    let api = Arc::new(FakeGroupsApi::with_groups(all));
    let controller = mount_with(
        &api,
        ControllerConfig::default().with_kessel(true),
        "per_page=10",
    );
    (api, controller)
}

fn unavailable(reason: &str) -> Result<(), InventoryError> {
    Err(InventoryError::ActionUnavailable {
        reason: reason.to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn kessel_refuses_unloaded_groups() {
    let (api, mut controller) = kessel_with_ungrouped_on_page_two();
    controller.wait_settled().await;
    let ungrouped_id = ungrouped_group().id;
    assert!(!controller.displayed_ids().contains(&ungrouped_id));

    assert_eq!(
        controller.row_affordance(ungrouped_id).reason(),
        Some(UNLOADED_WORKSPACE_MESSAGE)
    );
    assert_eq!(controller.open_delete(ungrouped_id), unavailable(UNLOADED_WORKSPACE_MESSAGE));
    assert_eq!(controller.open_rename(ungrouped_id), unavailable(UNLOADED_WORKSPACE_MESSAGE));
    controller.toggle_row(ungrouped_id, true);
    assert_eq!(
        controller.bulk_delete_affordance().reason(),
        Some(UNLOADED_WORKSPACE_MESSAGE)
    );
    assert!(controller.modal().is_none());
    assert!(api.deletes().is_empty());
    assert!(api.renames().is_empty());
}

#[tokio::test(start_paused = true)]
async fn kessel_select_all_keeps_ungrouped_off_page_immutable() {
    let (api, mut controller) = kessel_with_ungrouped_on_page_two();
    controller.wait_settled().await;
    let ungrouped_id = ungrouped_group().id;

    assert_eq!(controller.select_all().await.expect("select all"), 16);
    assert!(controller.selection().contains(&ungrouped_id));
    assert!(!controller.displayed_ids().contains(&ungrouped_id));

    assert_eq!(
        controller.bulk_delete_affordance().reason(),
        Some(UNGROUPED_IMMUTABLE_MESSAGE)
    );
    assert_eq!(controller.open_bulk_delete(), unavailable(UNGROUPED_IMMUTABLE_MESSAGE));
    assert_eq!(controller.open_delete(ungrouped_id), unavailable(UNGROUPED_IMMUTABLE_MESSAGE));
    assert_eq!(controller.open_rename(ungrouped_id), unavailable(UNGROUPED_IMMUTABLE_MESSAGE));
    assert!(controller.row_affordance(group_id(12)).is_enabled());
    assert!(controller.modal().is_none());
    assert!(api.deletes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn kessel_remembers_ungrouped_after_leaving_its_page() {
    let (api, mut controller) = kessel_with_ungrouped_on_page_two();
    controller.wait_settled().await;
    let ungrouped_id = ungrouped_group().id;

    controller.set_page(2);
    controller.wait_settled().await;
    controller.toggle_row(ungrouped_id, true);
    controller.toggle_row(group_id(11), true);
    controller.set_page(1);
    controller.wait_settled().await;

    assert_eq!(
        controller.bulk_delete_affordance().reason(),
        Some(UNGROUPED_IMMUTABLE_MESSAGE)
    );
    assert!(controller.open_bulk_delete().is_err());
    assert!(api.deletes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn select_all_without_total_keeps_selection() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(30)));
    let mut controller = mount(&api, "per_page=10");
    controller.wait_settled().await;
    controller.toggle_row(group_id(3), true);

    api.push_list_delay(Duration::from_secs(1));
    controller.set_page(2);
    sleep(Duration::from_millis(600)).await;
    assert!(controller.fetch_state().is_loading());
    let calls = api.list_call_count();
    assert_eq!(controller.select_all().await, Ok(1));
    assert_eq!(controller.selection().to_vec(), vec![group_id(3)]);
    assert_eq!(api.list_call_count(), calls);

    controller.wait_settled().await;
    api.fail_list(true);
    controller.set_page(3);
    assert!(controller.wait_settled().await.state.is_rejected());
    let calls = api.list_call_count();
    assert_eq!(controller.set_bulk_checkbox(true).await, Ok(1));
    assert_eq!(controller.selection().to_vec(), vec![group_id(3)]);
    assert_eq!(api.list_call_count(), calls);
}

#[tokio::test(start_paused = true)]
async fn notifications_name_groups_from_earlier_pages() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(30)));
    let mut controller = mount(&api, "per_page=10");
    controller.wait_settled().await;
    controller.set_page(2);
    controller.wait_settled().await;
    controller.set_page(1);
    controller.wait_settled().await;

    controller.open_rename(group_id(15)).expect("rename enabled");
    controller.confirm_rename("archive").await.expect("rename");
    assert_eq!(
        controller.take_notifications()[0].description,
        "group-015 has been renamed to archive"
    );
    controller.wait_settled().await;

    controller.toggle_row(group_id(25), true);
    assert_eq!(
        controller.selected_group().and_then(|group| group.name),
        None
    );
    assert_eq!(controller.load_directory().await, Ok(30));
    assert_eq!(
        controller.selected_group().and_then(|group| group.name).as_deref(),
        Some("group-025")
    );
    controller.open_delete(group_id(25)).expect("delete enabled");
    controller.confirm_delete().await.expect("delete");
    assert_eq!(
        controller.take_notifications()[0].description,
        "group-025 has been removed"
    );
    assert!(controller.known_group(group_id(25)).is_none());
}
