mod common;

use std::sync::Arc;
use std::time::Duration;

use hostinv_api_models::{GroupType, OrderBy, OrderHow};
use hostinv_core::rows::PlaceholderKind;
use hostinv_core::{ControllerConfig, FetchState, SortDirection, TableRow};
use hostinv_test_support::FakeGroupsApi;
use hostinv_test_support::fixtures::{group_id, groups};
use tokio::time::{advance, sleep};

use common::{mount, mount_with};

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_request() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(30)));
    let mut controller = mount(&api, "");
    for prefix in ["g", "gr", "gro", "grou", "group-01"] {
        controller.set_name(prefix);
    }
    let snapshot = controller.wait_settled().await;

    assert_eq!(api.list_call_count(), 1);
    assert_eq!(api.list_calls()[0].name.as_deref(), Some("group-01"));
    assert_eq!(snapshot.state.total(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn each_edit_restarts_the_quiet_window() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(5)));
    let mut controller = mount(&api, "");
    for page in 2..=4 {
        advance(Duration::from_millis(400)).await;
        controller.set_page(page);
    }
    controller.wait_settled().await;

    assert_eq!(api.list_call_count(), 1);
    assert_eq!(api.list_calls()[0].page, 4);
}

#[tokio::test(start_paused = true)]
async fn superseded_slow_response_is_discarded() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(20)));
    api.push_list_delay(Duration::from_secs(2));
    let mut controller = mount(&api, "");

    // The first request is now in flight and will answer late.
    sleep(Duration::from_millis(600)).await;
    assert_eq!(api.list_call_count(), 1);
    assert!(controller.fetch_state().is_loading());

    controller.set_name("group-00");
    let snapshot = controller.wait_settled().await;
    assert_eq!(snapshot.state.total(), Some(9));

    sleep(Duration::from_secs(3)).await;
    assert_eq!(api.list_call_count(), 2);
    assert_eq!(controller.fetch_state().total(), Some(9));
    assert_eq!(controller.snapshot().revision, 2);
}

#[tokio::test(start_paused = true)]
async fn rejection_keeps_the_selection() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(8)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;
    controller.toggle_row(group_id(3), true);
    controller.toggle_row(group_id(5), true);
    let before = controller.selection().clone();

    api.fail_list(true);
    api.push_list_delay(Duration::from_millis(100));
    let mut updates = controller.subscribe();
    controller.set_page(2);
    updates
        .wait_for(|snapshot| snapshot.revision == 2 && snapshot.state == FetchState::Loading)
        .await
        .expect("loading state");

    let snapshot = controller.wait_settled().await;
    assert!(snapshot.state.is_rejected());
    assert_eq!(controller.selection(), &before);

    let rows = controller.rows();
    assert!(matches!(
        rows.as_slice(),
        [TableRow::Placeholder {
            kind: PlaceholderKind::Error,
            col_span: 4
        }]
    ));
    let toolbar = controller.toolbar();
    assert!(toolbar.pagination_disabled);
    assert!(toolbar.name_filter_enabled);

    // Filters stay usable and a later success recovers.
    api.fail_list(false);
    controller.reset_filters();
    assert!(controller.wait_settled().await.state.data().is_some());
}

#[tokio::test(start_paused = true)]
async fn empty_result_renders_one_placeholder() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(4)));
    let controller = mount(&api, "?name=nothing-matches");
    controller.wait_settled().await;

    assert_eq!(
        controller.rows(),
        vec![TableRow::Placeholder {
            kind: PlaceholderKind::NoEntities,
            col_span: 4,
        }]
    );
    assert!(controller.toolbar().show_reset);
}

#[tokio::test(start_paused = true)]
async fn loading_renders_per_page_skeletons() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(4)));
    let controller = mount(&api, "per_page=20");
    let rows = controller.rows();
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|row| *row == TableRow::Loading));
}

#[tokio::test(start_paused = true)]
async fn column_sort_reaches_the_request() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(6)));
    let mut controller = mount(&api, "");
    controller.wait_settled().await;

    assert!(!controller.set_sort(0, SortDirection::Asc));
    assert_eq!(controller.snapshot().revision, 1);

    assert!(controller.set_sort(2, SortDirection::Asc));
    controller.wait_settled().await;
    let calls = api.list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].order_by, Some(OrderBy::HostCount));
    assert_eq!(calls[1].order_how, Some(OrderHow::Asc));
    assert!(controller.query().contains("order_by=host_count&order_how=asc"));
}

#[tokio::test(start_paused = true)]
async fn mount_restores_url_state() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(120)));
    let controller = mount(&api, "?name=group&page=2&per_page=50&bogus=1");
    assert!(
        controller
            .query()
            .contains("name=group&page=2&per_page=50"),
        "{}",
        controller.query()
    );
    let snapshot = controller.wait_settled().await;

    let call = &api.list_calls()[0];
    assert_eq!(call.page, 2);
    assert_eq!(call.per_page, 50);
    assert_eq!(call.order_by, None);
    assert_eq!(snapshot.state.data().map(|page| page.count), Some(50));
}

#[tokio::test(start_paused = true)]
async fn kessel_mode_lists_every_group_type() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(2)));
    let controller = mount_with(&api, ControllerConfig::default().with_kessel(true), "");
    controller.wait_settled().await;
    assert_eq!(api.list_calls()[0].group_type, Some(GroupType::All));
    assert!(controller.query().ends_with("group_type=all"));
}

#[tokio::test(start_paused = true)]
async fn per_page_change_returns_to_first_page() {
    let api = Arc::new(FakeGroupsApi::with_groups(groups(60)));
    let mut controller = mount(&api, "page=3&per_page=10");
    assert!(controller.set_per_page(20));
    assert!(!controller.set_per_page(25));
    controller.wait_settled().await;

    assert_eq!(controller.filters().page, 1);
    let call = &api.list_calls()[0];
    assert_eq!((call.page, call.per_page), (1, 20));
}
