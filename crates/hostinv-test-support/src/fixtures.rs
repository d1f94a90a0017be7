//! Entity builders with deterministic ids.

use chrono::{TimeZone, Utc};
use hostinv_api_models::{Group, GroupId, HostGroup, HostId, HostSummary};
use uuid::Uuid;

/// Deterministic group id for index `n`.
#[must_use]
pub const fn group_id(n: u128) -> GroupId {
    Uuid::from_u128(n)
}

/// Deterministic host id for index `n`.
#[must_use]
pub const fn host_id(n: u128) -> HostId {
    Uuid::from_u128(0x1000_0000 + n)
}

/// A standard group with `n` hosts, updated on a fixed date.
#[must_use]
pub fn group(n: u128, name: &str) -> Group {
    Group {
        id: group_id(n),
        name: name.to_string(),
        host_count: u64::try_from(n).ok(),
        updated: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).single(),
        ungrouped: false,
    }
}

/// `count` standard groups named `group-001`, `group-002`, and so on.
#[must_use]
pub fn groups(count: u128) -> Vec<Group> {
    (1..=count)
        .map(|n| group(n, &format!("group-{n:03}")))
        .collect()
}

/// The built-in ungrouped workspace.
#[must_use]
pub fn ungrouped_group() -> Group {
    Group {
        ungrouped: true,
        ..group(0xffff, "Ungrouped Hosts")
    }
}

/// A host belonging to `groups`, first entry first.
#[must_use]
pub fn host(n: u128, groups: &[&Group]) -> HostSummary {
    HostSummary {
        id: host_id(n),
        display_name: format!("host-{n:03}.example.test"),
        groups: groups
            .iter()
            .map(|group| HostGroup {
                id: group.id,
                name: group.name.clone(),
                ungrouped: group.ungrouped,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_numbered_from_one() {
        let built = groups(3);
        assert_eq!(built.len(), 3);
        assert_eq!(built[0].name, "group-001");
        assert_eq!(built[2].id, group_id(3));
        assert_eq!(built[2].host_count, Some(3));
    }

    #[test]
    fn host_ids_do_not_collide_with_group_ids() {
        assert_ne!(host_id(1), group_id(1));
        let ungrouped = ungrouped_group();
        let summary = host(1, &[&ungrouped]);
        assert!(summary.groups[0].ungrouped);
    }
}
