//! Algorithm implementations for donor household matching
//!
//! This module contains the core pipeline stages: head-of-household
//! classification, per-policy income aggregation, match key construction,
//! the layered donor index with relaxation lookup, nearest-wage selection,
//! and pool statistics.

pub mod aggregate;
pub mod head;
pub mod index;
pub mod keys;
pub mod nearest;
pub mod statistics;

pub use aggregate::{PoolBuilder, aggregate_household};
pub use head::{HeadSelection, classify_household};
pub use index::{Candidates, DonorIndex, LayeredMap, reachable_labour_pairs};
pub use keys::{KEY_PARTS, KeyPart, MatchKey, MatchProfile};
pub use nearest::NearestSelector;
pub use statistics::{PoolStatistics, PoolStats};
