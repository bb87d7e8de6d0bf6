//! Organization cost reporting through the admin API

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
mod error;
mod types;

pub use client::Costs;
pub use error::{Result, UsageError};
pub use types::{CostAmount, CostBucket, CostPage, CostQuery, CostResult};
