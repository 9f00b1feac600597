//! HTTP handlers for jotter-api.

pub mod actions;
pub mod places;
