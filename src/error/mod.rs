//! Error handling for donor aggregation and matching.
//!
//! One error enum covers both pipeline stages. Fatal data-quality variants
//! carry the offending household or person identifier so a failed run can be
//! traced back to the donor record that violated an invariant.

use crate::models::types::{HouseholdId, LabourPair, PersonId};

/// Errors raised while aggregating donor households or querying the index
#[derive(Debug, thiserror::Error)]
pub enum DonorError {
    /// A household id appeared without any occupants
    #[error("household {household}: occupant set is empty")]
    EmptyHousehold {
        /// Offending household
        household: HouseholdId,
    },

    /// An occupant classified as a child has an age outside 0..=17
    #[error("household {household}: child {person} has age {age}, outside 0-17")]
    ChildAgeOutOfRange {
        /// Offending household
        household: HouseholdId,
        /// Offending occupant
        person: PersonId,
        /// Observed age
        age: u32,
    },

    /// The head's partner does not link back to the head
    #[error("household {household}: partner {partner} does not link back to head {head}")]
    PartnerLinkInconsistent {
        /// Offending household
        household: HouseholdId,
        /// Selected head
        head: PersonId,
        /// Resolved partner
        partner: PersonId,
    },

    /// Two households with the same id disagree on their aggregated fields
    #[error("household {household}: duplicate id with diverging aggregated fields")]
    DuplicateHouseholdMismatch {
        /// Offending household
        household: HouseholdId,
    },

    /// The same person id was ingested twice
    #[error("person {person}: duplicate id in donor input")]
    DuplicatePerson {
        /// Offending person
        person: PersonId,
    },

    /// A referenced person id was never loaded
    #[error("person {person}: referenced by donor data but never loaded")]
    UnknownPerson {
        /// Missing person
        person: PersonId,
    },

    /// An ingested age is outside what a person record can hold
    #[error("person {person}: age {value} is not a valid age")]
    InvalidAge {
        /// Offending person
        person: PersonId,
        /// Raw value from the donor source
        value: i64,
    },

    /// Index construction found a reachable labour combination with no donors
    #[error("no donor household covers labour combination {pair}")]
    MissingLabourCoverage {
        /// Uncovered labour pair
        pair: LabourPair,
    },

    /// A lookup reached depth zero and still found no donors
    #[error("donor index has no entry for labour combination {pair}")]
    NoDonorCoverage {
        /// Queried labour pair
        pair: LabourPair,
    },

    /// A policy name has no recorded value
    #[error("policy '{policy}' is not present")]
    UnknownPolicy {
        /// Missing policy name
        policy: String,
    },

    /// A person record lacks an income value for a scheduled policy
    #[error("person {person}: no income value for policy '{policy}'")]
    MissingPolicyValue {
        /// Offending person
        person: PersonId,
        /// Scheduled policy the person has no value for
        policy: String,
    },

    /// No policy is scheduled at or before the requested year
    #[error("no policy scheduled for simulated year {year}")]
    NoPolicyForYear {
        /// Requested year
        year: i32,
    },

    /// The uprating table has no factor for a (year, policy) combination
    #[error("no uprating factor for year {year}, policy '{policy}'")]
    MissingUpratingFactor {
        /// Requested year
        year: i32,
        /// Requested policy
        policy: String,
    },

    /// Nearest selection was handed an empty candidate set
    #[error("cannot select a nearest donor from an empty candidate set")]
    EmptyCandidateSet,

    /// A configuration value fails validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON input could not be parsed or output could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A donor record batch could not be deserialized
    #[error("donor batch deserialization error: {0}")]
    Deserialize(#[from] serde_arrow::Error),
}

/// Alias for Result with `DonorError`
pub type Result<T> = std::result::Result<T, DonorError>;
