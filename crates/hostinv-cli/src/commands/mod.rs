//! Command handlers.

pub(crate) mod groups;
