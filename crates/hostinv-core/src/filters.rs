//! Filter, sort, and pagination state for the groups table and its URL mirror.
//!
//! # Design
//! - `FilterState` is the single source of truth; the URL query is written from it
//!   after every mutation and only read back once, when the table mounts.
//! - The mapping between fields and query parameters is a declarative table
//!   (`FILTER_PARAMS`) so reading and writing stay symmetric.
//! - Unknown keys and undecodable values are ignored; defaults fill the gaps.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use hostinv_api_models::{GroupListParams, GroupType, OrderBy, OrderHow};
use url::form_urlencoded;

use crate::config::{ControllerConfig, PER_PAGE_OPTIONS};

/// Columns of the groups table, in display order. Index 0 is the selection column.
pub const COLUMN_TITLES: [&str; 3] = ["Name", "Total systems", "Last modified"];

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Group name column.
    Name,
    /// Host count column.
    HostCount,
    /// Last-modified column.
    Updated,
}

impl SortField {
    /// Column index of the field; index 0 is reserved for the selection boxes.
    #[must_use]
    pub const fn column_index(self) -> usize {
        match self {
            Self::Name => 1,
            Self::HostCount => 2,
            Self::Updated => 3,
        }
    }

    /// Resolve a table column index. The reserved index 0 and unknown indexes map to `None`.
    #[must_use]
    pub const fn from_column_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::Name),
            2 => Some(Self::HostCount),
            3 => Some(Self::Updated),
            _ => None,
        }
    }

    /// Server ordering field for this column.
    #[must_use]
    pub const fn order_by(self) -> OrderBy {
        match self {
            Self::Name => OrderBy::Name,
            Self::HostCount => OrderBy::HostCount,
            Self::Updated => OrderBy::Updated,
        }
    }

    const fn from_order_by(order_by: OrderBy) -> Self {
        match order_by {
            OrderBy::Name => Self::Name,
            OrderBy::HostCount => Self::HostCount,
            OrderBy::Updated => Self::Updated,
        }
    }
}

/// Sort direction as held in the table state (lower-case on the URL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// URL representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Upper-cased server representation.
    #[must_use]
    pub const fn order_how(self) -> OrderHow {
        match self {
            Self::Asc => OrderHow::Asc,
            Self::Desc => OrderHow::Desc,
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Filter criteria with sort and pagination stripped, as used by select-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFilter {
    /// Name substring filter.
    pub name: Option<String>,
    /// Group kind filter.
    pub group_type: GroupType,
}

impl GroupFilter {
    /// List parameters for one page of this filter, without ordering.
    #[must_use]
    pub fn page_params(&self, page: u32, per_page: u32) -> GroupListParams {
        GroupListParams {
            name: self.name.clone(),
            group_type: Some(self.group_type),
            order_by: None,
            order_how: None,
            page,
            per_page,
        }
    }
}

/// Active filter chip shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    /// Chip category label.
    pub category: &'static str,
    /// Chip value.
    pub value: String,
}

/// Filter, sort, and pagination criteria of the groups table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// One-based page number.
    pub page: u32,
    /// Page size, one of [`PER_PAGE_OPTIONS`].
    pub per_page: u32,
    /// Sorted column, if any.
    pub sort_field: Option<SortField>,
    /// Sort direction, if any.
    pub sort_direction: Option<SortDirection>,
    /// Name substring filter; never an empty string.
    pub name: Option<String>,
    /// Group kind filter.
    pub group_type: GroupType,
}

impl FilterState {
    /// Initial table state for the given configuration.
    #[must_use]
    pub const fn defaults(config: &ControllerConfig) -> Self {
        Self {
            page: 1,
            per_page: config.default_per_page,
            sort_field: None,
            sort_direction: None,
            name: None,
            group_type: if config.kessel_enabled {
                GroupType::All
            } else {
                GroupType::Standard
            },
        }
    }

    /// Set the name filter; an empty value removes it.
    pub fn set_name(&mut self, value: &str) {
        self.name = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    /// Remove the name filter.
    pub fn clear_name(&mut self) {
        self.name = None;
    }

    /// Move to another page. Page numbers below one are clamped.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change the page size and return to the first page.
    ///
    /// Returns `false` and leaves the state untouched when the size is not offered.
    pub fn set_per_page(&mut self, per_page: u32) -> bool {
        if !PER_PAGE_OPTIONS.contains(&per_page) {
            return false;
        }
        self.per_page = per_page;
        self.page = 1;
        true
    }

    /// Sort by a table column.
    ///
    /// Returns `false` for the reserved selection column and unknown indexes,
    /// in which case nothing changes.
    pub fn set_sort(&mut self, column_index: usize, direction: SortDirection) -> bool {
        let Some(field) = SortField::from_column_index(column_index) else {
            return false;
        };
        self.sort_field = Some(field);
        self.sort_direction = Some(direction);
        true
    }

    /// Strip sort and pagination, leaving only the matching criteria.
    #[must_use]
    pub fn without_sort_and_pagination(&self) -> GroupFilter {
        GroupFilter {
            name: self.name.clone(),
            group_type: self.group_type,
        }
    }

    /// Build list endpoint parameters. Ordering is included only when both
    /// sort field and direction are set.
    #[must_use]
    pub fn list_params(&self) -> GroupListParams {
        let (order_by, order_how) = match (self.sort_field, self.sort_direction) {
            (Some(field), Some(direction)) => {
                (Some(field.order_by()), Some(direction.order_how()))
            }
            _ => (None, None),
        };
        GroupListParams {
            name: self.name.clone(),
            group_type: Some(self.group_type),
            order_by,
            order_how,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Chips describing the active filters.
    #[must_use]
    pub fn active_chips(&self) -> Vec<FilterChip> {
        self.name
            .iter()
            .map(|name| FilterChip {
                category: "Name",
                value: name.clone(),
            })
            .collect()
    }
}

struct FilterParam {
    param: &'static str,
    encode: fn(&FilterState) -> Option<String>,
    decode: fn(&mut FilterState, &str),
}

const FILTER_PARAMS: [FilterParam; 6] = [
    FilterParam {
        param: "name",
        encode: |state| state.name.clone(),
        decode: |state, raw| state.set_name(raw),
    },
    FilterParam {
        param: "page",
        encode: |state| Some(state.page.to_string()),
        decode: |state, raw| {
            if let Some(page) = raw.trim().parse::<u32>().ok().filter(|page| *page >= 1) {
                state.page = page;
            }
        },
    },
    FilterParam {
        param: "per_page",
        encode: |state| Some(state.per_page.to_string()),
        decode: |state, raw| {
            if let Some(per_page) = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| PER_PAGE_OPTIONS.contains(value))
            {
                state.per_page = per_page;
            }
        },
    },
    FilterParam {
        param: "order_by",
        encode: |state| {
            state
                .sort_field
                .map(|field| field.order_by().as_str().to_string())
        },
        decode: |state, raw| {
            state.sort_field = raw.parse::<OrderBy>().ok().map(SortField::from_order_by);
        },
    },
    FilterParam {
        param: "order_how",
        encode: |state| {
            state
                .sort_direction
                .map(|direction| direction.as_str().to_string())
        },
        decode: |state, raw| {
            state.sort_direction = raw.parse().ok();
        },
    },
    FilterParam {
        param: "group_type",
        encode: |state| Some(state.group_type.as_str().to_string()),
        decode: |state, raw| {
            if let Ok(group_type) = raw.parse() {
                state.group_type = group_type;
            }
        },
    },
];

/// Overlay URL query parameters onto `defaults`.
///
/// A leading `?` is accepted. Unknown keys are ignored, and for repeated keys
/// the first occurrence wins.
#[must_use]
pub fn read_query(query: &str, defaults: FilterState) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = defaults;
    let mut seen = HashSet::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let Some(param) = FILTER_PARAMS.iter().find(|param| param.param == key) else {
            continue;
        };
        if seen.insert(param.param) {
            (param.decode)(&mut state, &value);
        }
    }
    state
}

/// Serialize the state into a URL query string (without a leading `?`).
///
/// Absent fields are omitted rather than written empty.
#[must_use]
pub fn write_query(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for param in &FILTER_PARAMS {
        if let Some(value) = (param.encode)(state) {
            serializer.append_pair(param.param, &value);
        }
    }
    serializer.finish()
}
