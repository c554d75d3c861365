//! Policy scenario bookkeeping
//!
//! This module contains the per-policy income map stored on donor persons and
//! households, the year-to-policy schedule that says which tax-benefit regime
//! applies in a simulated year, and the uprating table whose factors are
//! applied to monetary amounts at read time.

use std::collections::BTreeMap;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DonorError, Result};

/// Income values keyed by policy scenario name
///
/// Policy names are the EUROMOD system names under which the donor population
/// was run. Amounts are stored exactly as ingested; uprating happens in the
/// household read accessors, never here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyMap {
    values: BTreeMap<String, f64>,
}

impl PolicyMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value recorded under a policy name
    pub fn insert(&mut self, policy: impl Into<String>, value: f64) {
        self.values.insert(policy.into(), value);
    }

    /// Get the value recorded under a policy name
    ///
    /// A missing name is a hard error: silently treating an unknown policy as
    /// zero income would corrupt every aggregate built on top of it.
    pub fn get(&self, policy: &str) -> Result<f64> {
        self.values
            .get(policy)
            .copied()
            .ok_or_else(|| DonorError::UnknownPolicy {
                policy: policy.to_string(),
            })
    }

    /// Get the value recorded under a policy name, if present
    #[must_use]
    pub fn get_opt(&self, policy: &str) -> Option<f64> {
        self.values.get(policy).copied()
    }

    /// Whether a value is recorded under the policy name
    #[must_use]
    pub fn contains(&self, policy: &str) -> bool {
        self.values.contains_key(policy)
    }

    /// Iterate over (policy, value) pairs in policy-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// Number of policies with a recorded value
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Schedule mapping simulated years to the policy regime in force
///
/// Each entry marks the first year its policy applies; the regime stays in
/// force until the next entry takes over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySchedule {
    by_year: BTreeMap<i32, String>,
}

impl PolicySchedule {
    /// Create an empty schedule
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a policy starting from the given year
    pub fn insert(&mut self, year: i32, policy: impl Into<String>) {
        self.by_year.insert(year, policy.into());
    }

    /// The policy in force in the given simulated year
    ///
    /// Returns the latest scheduled policy whose start year is not after the
    /// requested year. Querying before the first entry is an error.
    pub fn policy_for_year(&self, year: i32) -> Result<&str> {
        self.by_year
            .range(..=year)
            .next_back()
            .map(|(_, policy)| policy.as_str())
            .ok_or(DonorError::NoPolicyForYear { year })
    }

    /// Distinct policy names in order of first appearance
    #[must_use]
    pub fn policy_names(&self) -> Vec<&str> {
        self.by_year.values().map(String::as_str).unique().collect()
    }

    /// Whether the schedule names the policy in any year
    #[must_use]
    pub fn contains(&self, policy: &str) -> bool {
        self.by_year.values().any(|name| name == policy)
    }

    /// Number of scheduled year entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    /// Whether the schedule has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

/// Uprating factors by simulated year and policy
///
/// Donor amounts are stored at their collection-year level; the factor scales
/// them to the simulated year at read time. A missing factor is an error, not
/// an implicit 1.0.
#[derive(Debug, Clone, Default)]
pub struct UpratingTable {
    factors: FxHashMap<i32, FxHashMap<String, f64>>,
}

impl UpratingTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the factor for a (year, policy) combination
    pub fn insert(&mut self, year: i32, policy: impl Into<String>, factor: f64) {
        self.factors.entry(year).or_default().insert(policy.into(), factor);
    }

    /// The factor for a (year, policy) combination
    pub fn factor(&self, year: i32, policy: &str) -> Result<f64> {
        self.factors
            .get(&year)
            .and_then(|by_policy| by_policy.get(policy))
            .copied()
            .ok_or_else(|| DonorError::MissingUpratingFactor {
                year,
                policy: policy.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_map_lookup() {
        let mut map = PolicyMap::new();
        map.insert("UK_2019", 1200.0);
        map.insert("UK_2023", 1350.0);

        assert_eq!(map.get("UK_2019").unwrap(), 1200.0);
        assert_eq!(map.get_opt("UK_2023"), Some(1350.0));
        assert_eq!(map.len(), 2);

        let err = map.get("UK_1999").unwrap_err();
        assert!(matches!(err, DonorError::UnknownPolicy { policy } if policy == "UK_1999"));
    }

    #[test]
    fn test_schedule_spans_years() {
        let mut schedule = PolicySchedule::new();
        schedule.insert(2019, "UK_2019");
        schedule.insert(2023, "UK_2023");

        assert_eq!(schedule.policy_for_year(2019).unwrap(), "UK_2019");
        assert_eq!(schedule.policy_for_year(2021).unwrap(), "UK_2019");
        assert_eq!(schedule.policy_for_year(2023).unwrap(), "UK_2023");
        assert_eq!(schedule.policy_for_year(2030).unwrap(), "UK_2023");

        let err = schedule.policy_for_year(2018).unwrap_err();
        assert!(matches!(err, DonorError::NoPolicyForYear { year: 2018 }));
    }

    #[test]
    fn test_schedule_distinct_names() {
        let mut schedule = PolicySchedule::new();
        schedule.insert(2019, "UK_2019");
        schedule.insert(2021, "UK_2019");
        schedule.insert(2023, "UK_2023");

        assert_eq!(schedule.policy_names(), vec!["UK_2019", "UK_2023"]);
        assert!(schedule.contains("UK_2019"));
        assert!(!schedule.contains("UK_2025"));
    }

    #[test]
    fn test_uprating_factor_required() {
        let mut table = UpratingTable::new();
        table.insert(2025, "UK_2023", 1.08);

        assert_eq!(table.factor(2025, "UK_2023").unwrap(), 1.08);

        let err = table.factor(2026, "UK_2023").unwrap_err();
        assert!(matches!(
            err,
            DonorError::MissingUpratingFactor { year: 2026, policy } if policy == "UK_2023"
        ));
    }
}
