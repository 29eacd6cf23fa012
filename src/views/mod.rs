//! Presentation logic for the dashboard views
//!
//! Pure filtering/sorting/summarizing over store state. Rendering consumers
//! (CLI commands, SVG builders) call these; nothing here mutates the store
//! directly, mutations are expressed as [`StatePatch`](crate::StatePatch)es
//! for the caller to apply.

pub mod alerts;
pub mod dashboard;
pub mod logs;
