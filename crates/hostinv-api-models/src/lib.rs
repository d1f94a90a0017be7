#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs)]
//! Shared HTTP DTOs for the inventory groups API.
//!
//! These types are used by the controller and the CLI for request/response
//! encoding so the wire contract lives in one place.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a group (workspace).
pub type GroupId = Uuid;

/// Identifier of a registered host (system).
pub type HostId = Uuid;

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
}

/// Which kinds of groups a list request should return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    /// Only user-created groups.
    #[default]
    Standard,
    /// Only the reserved bucket holding unassigned hosts.
    UngroupedHosts,
    /// Every group, including the ungrouped bucket.
    All,
}

impl GroupType {
    /// Wire representation used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::UngroupedHosts => "ungrouped-hosts",
            Self::All => "all",
        }
    }
}

impl Display for GroupType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupType {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(Self::Standard),
            "ungrouped-hosts" => Ok(Self::UngroupedHosts),
            "all" => Ok(Self::All),
            other => Err(UnknownValue::new("group_type", other)),
        }
    }
}

/// Server-side ordering field for group lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Order by group name.
    Name,
    /// Order by number of hosts in the group.
    HostCount,
    /// Order by last modification time.
    Updated,
}

impl OrderBy {
    /// Wire representation used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::HostCount => "host_count",
            Self::Updated => "updated",
        }
    }
}

impl FromStr for OrderBy {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "host_count" => Ok(Self::HostCount),
            "updated" => Ok(Self::Updated),
            other => Err(UnknownValue::new("order_by", other)),
        }
    }
}

/// Server-side ordering direction. Always upper-case on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderHow {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderHow {
    /// Wire representation used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Error returned when a wire value does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    /// Parameter the value was supplied for.
    pub param: &'static str,
    /// Offending raw value.
    pub value: String,
}

impl UnknownValue {
    fn new(param: &'static str, value: &str) -> Self {
        Self {
            param,
            value: value.to_string(),
        }
    }
}

impl Display for UnknownValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value '{}'", self.param, self.value)
    }
}

impl std::error::Error for UnknownValue {}

/// A group (workspace) record as returned by the inventory API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Stable group identifier.
    pub id: GroupId,
    /// Display name; may be empty on legacy records.
    #[serde(default)]
    pub name: String,
    /// Number of hosts assigned to the group, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_count: Option<u64>,
    /// Last modification time, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Marks the reserved bucket that holds unassigned hosts.
    #[serde(default)]
    pub ungrouped: bool,
}

impl Group {
    /// Name to show for the group, falling back to the id when unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Paginated group list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GroupListResponse {
    /// Groups on the requested page.
    #[serde(default)]
    pub results: Vec<Group>,
    /// Total number of groups matching the filter across all pages.
    #[serde(default)]
    pub total: u64,
    /// Number of groups on this page.
    #[serde(default)]
    pub count: u64,
    /// Page number echoed by the server.
    #[serde(default)]
    pub page: u32,
    /// Page size echoed by the server.
    #[serde(default)]
    pub per_page: u32,
}

/// Query parameters accepted by the group list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListParams {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Group kind filter.
    pub group_type: Option<GroupType>,
    /// Ordering field; only sent together with `order_how`.
    pub order_by: Option<OrderBy>,
    /// Ordering direction; only sent together with `order_by`.
    pub order_how: Option<OrderHow>,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

impl GroupListParams {
    /// Encode the parameters as ordered query pairs, omitting absent fields.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(group_type) = self.group_type {
            pairs.push(("group_type", group_type.as_str().to_string()));
        }
        if let (Some(order_by), Some(order_how)) = (self.order_by, self.order_how) {
            pairs.push(("order_by", order_by.as_str().to_string()));
            pairs.push(("order_how", order_how.as_str().to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }
}

/// Body for the rename-group endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameGroupRequest {
    /// New group name.
    pub name: String,
}

/// Body for the add-hosts-to-group endpoint: a bare JSON array of host ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AddHostsRequest(pub Vec<HostId>);

/// Group membership reported on a host record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostGroup {
    /// Group identifier.
    pub id: GroupId,
    /// Group name; empty when unnamed.
    #[serde(default)]
    pub name: String,
    /// Whether this is the ungrouped bucket.
    #[serde(default)]
    pub ungrouped: bool,
}

/// Host record as needed by the add-systems workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostSummary {
    /// Host identifier.
    pub id: HostId,
    /// Display name of the host.
    #[serde(default)]
    pub display_name: String,
    /// Groups the host belongs to (at most one in practice).
    #[serde(default)]
    pub groups: Vec<HostGroup>,
}

/// Response of the hosts-by-id endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostListResponse {
    /// Hosts found.
    pub results: Vec<HostSummary>,
    /// Number of hosts found.
    #[serde(default)]
    pub total: u64,
}
