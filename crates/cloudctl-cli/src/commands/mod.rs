//! Command handlers grouped by API area.

pub(crate) mod billing;
