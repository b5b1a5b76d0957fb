//! Application layer: curation state, batch dispatch and notifications.

pub mod curator;
pub mod error;
pub mod pagination;
pub mod toasts;
