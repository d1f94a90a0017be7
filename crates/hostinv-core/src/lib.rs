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
#![allow(clippy::module_name_repetitions)]
//! Paginated selection-and-filter controller for the inventory groups table.
//!
//! The controller keeps filter, sort, and pagination state mirrored into a
//! URL query, debounces list requests, tracks a selection that spans pages,
//! and drives the rename, delete, and add-systems workflows behind a
//! capability boundary.

pub mod add_hosts;
pub mod api;
pub mod batch;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod notify;
pub mod permissions;
pub mod rows;
pub mod selection;

pub use add_hosts::AddHostsWorkflow;
pub use api::GroupsApi;
pub use config::ControllerConfig;
pub use controller::{ActiveModal, GroupsTableController, SelectedGroup};
pub use directory::GroupDirectory;
pub use error::{InventoryError, InventoryResult};
pub use fetch::{FetchController, FetchSnapshot, FetchState};
pub use filters::{FilterState, SortDirection, SortField, read_query, write_query};
pub use notify::{Notification, NotificationVariant};
pub use permissions::{Affordance, CapabilityResolver, Permission, StaticCapabilities};
pub use rows::{TableRow, ToolbarState};
pub use selection::SelectionSet;
