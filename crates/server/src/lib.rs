//! HTTP surface of the conversion service.

pub mod api;
pub mod metrics;
pub mod state;
