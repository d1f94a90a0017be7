//! Controller tuning knobs.

use std::time::Duration;

/// Quiet period a filter change must survive before a list request is sent.
pub const REQUEST_DEBOUNCE: Duration = Duration::from_millis(500);

/// Page size used when paging through every match for select-all.
pub const BATCH_PAGE_SIZE: u32 = 50;

/// Initial page size of the groups table.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Page sizes offered by the pagination control.
pub const PER_PAGE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Runtime configuration for [`crate::GroupsTableController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Debounce window applied to every filter change.
    pub debounce: Duration,
    /// Page size for select-all batch fetching.
    pub batch_page_size: u32,
    /// Page size applied when the URL does not carry one.
    pub default_per_page: u32,
    /// Kessel access-control mode.
    pub kessel_enabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: REQUEST_DEBOUNCE,
            batch_page_size: BATCH_PAGE_SIZE,
            default_per_page: DEFAULT_PER_PAGE,
            kessel_enabled: false,
        }
    }
}

impl ControllerConfig {
    /// Toggle Kessel mode.
    #[must_use]
    pub const fn with_kessel(mut self, enabled: bool) -> Self {
        self.kessel_enabled = enabled;
        self
    }

    /// Override the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Override the select-all batch size. Zero is clamped to one.
    #[must_use]
    pub const fn with_batch_page_size(mut self, size: u32) -> Self {
        self.batch_page_size = if size == 0 { 1 } else { size };
        self
    }

    /// Override the default page size. Values outside [`PER_PAGE_OPTIONS`] are ignored.
    #[must_use]
    pub fn with_default_per_page(mut self, per_page: u32) -> Self {
        if PER_PAGE_OPTIONS.contains(&per_page) {
            self.default_per_page = per_page;
        }
        self
    }
}
