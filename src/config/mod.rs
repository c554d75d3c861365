//! Configuration for donor aggregation and matching.
//!
//! Everything the pipeline used to read from ambient state is an explicit
//! field here: callers construct one `DonorConfig` and pass it down.

use serde::{Deserialize, Serialize};

use crate::error::{DonorError, Result};
use crate::models::types::LabourSupply;

/// Configuration for one donor aggregation and matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorConfig {
    /// Age at which an occupant counts as a responsible adult rather than a
    /// child. Must stay within 1..=18 so child ages fit the 0-17 counters.
    pub age_to_become_responsible: u32,
    /// Policy scenario used for head selection and hourly wage derivation
    pub base_policy: String,
    /// Labour bands a simulated male adult can be assigned
    pub male_labour_categories: Vec<LabourSupply>,
    /// Labour bands a simulated female adult can be assigned
    pub female_labour_categories: Vec<LabourSupply>,
    /// Aggregate households in parallel when the batch is large enough
    pub use_parallel: bool,
    /// Seed for reproducible tie-breaking in nearest selection
    pub random_seed: Option<u64>,
}

impl Default for DonorConfig {
    fn default() -> Self {
        Self {
            age_to_become_responsible: 18,
            base_policy: String::new(),
            male_labour_categories: LabourSupply::ALL.to_vec(),
            female_labour_categories: LabourSupply::ALL.to_vec(),
            use_parallel: true,
            random_seed: None,
        }
    }
}

impl DonorConfig {
    /// Create a configuration with the given base policy and defaults for
    /// everything else
    #[must_use]
    pub fn new(base_policy: impl Into<String>) -> Self {
        Self {
            base_policy: base_policy.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.age_to_become_responsible == 0 || self.age_to_become_responsible > 18 {
            return Err(DonorError::InvalidConfig(format!(
                "age_to_become_responsible must be within 1..=18, got {}",
                self.age_to_become_responsible
            )));
        }
        if self.base_policy.is_empty() {
            return Err(DonorError::InvalidConfig(
                "base_policy must name a policy scenario".to_string(),
            ));
        }
        if self.male_labour_categories.is_empty() || self.female_labour_categories.is_empty() {
            return Err(DonorError::InvalidConfig(
                "labour category lists must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
