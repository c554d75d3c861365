//! Domain models for the donor population
//!
//! This module contains the core entity models of the matching engine: the
//! donor person and household records, the policy bookkeeping they carry, and
//! the shared categorical vocabulary.

pub mod household;
pub mod person;
pub mod policy;
pub mod types;

// Re-export commonly used types
pub use household::{CHILD_AGES, ChildIndicators, DonorHousehold};
pub use person::DonorPerson;
pub use policy::{PolicyMap, PolicySchedule, UpratingTable};
pub use types::{Gender, Health, HouseholdId, LabourPair, LabourSupply, Occupancy, PersonId};
