//! A Rust library for aggregating donor household incomes from EUROMOD
//! tax-benefit output and matching simulated households to their nearest
//! donor through a layered multi-key index.

pub mod algorithm;
pub mod collections;
pub mod config;
pub mod error;
pub mod euromod;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::DonorConfig;
pub use error::{DonorError, Result};
pub use models::{
    DonorHousehold, DonorPerson, Gender, Health, LabourPair, LabourSupply, Occupancy,
    PolicySchedule, UpratingTable,
};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Pipeline stages
pub use algorithm::{DonorIndex, MatchKey, MatchProfile, NearestSelector, PoolBuilder};
pub use collections::{DonorPool, PersonArena};

// Ingestion
pub use euromod::{IncomeRow, PersonRow, load_arena};
