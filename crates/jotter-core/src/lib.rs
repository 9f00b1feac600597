//! # jotter-core
//!
//! Core types, quota rules, and repository traits for jotter.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other jotter crates depend on.

pub mod codes;
pub mod defaults;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod models;
pub mod quota;
pub mod size;
pub mod storage;
pub mod traits;

// Re-export commonly used types at crate root
pub use codes::ErrorCode;
pub use error::{Error, Result};
pub use models::*;
pub use quota::{
    resolve_limits, usage_period, DefaultLimits, PremiumLimits, QuotaChecker, QuotaLimits,
    QuotaSnapshot, QuotaValidator, QuotaViolation, SizeChange, Tier, UserLimits,
};
pub use size::humanize_size;
pub use storage::StorageUrl;
pub use traits::*;
