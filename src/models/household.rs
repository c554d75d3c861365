//! Donor household model
//!
//! A `DonorHousehold` is the aggregated, immutable view of all occupants
//! sharing one donor household id: role assignment, per-policy income sums
//! and ratios, child counters, and the categorical snapshot that matching
//! keys are derived from. Households hold occupant ids, never references;
//! the arena owns every person record.

use crate::error::Result;
use crate::models::policy::{PolicyMap, UpratingTable};
use crate::models::types::{Gender, Health, HouseholdId, LabourPair, Occupancy, PersonId};

/// Number of tracked single-year child ages (0-17)
pub const CHILD_AGES: usize = 18;

/// Boolean child-presence indicators over age bands
///
/// The bands overlap on purpose; each downstream behavioural module consumes
/// the band it was estimated on. Indicators are always re-derived in full
/// from the per-age counters, never patched incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildIndicators {
    /// Any child aged 0-2
    pub under_3: bool,
    /// Any child aged 4-12
    pub aged_4_12: bool,
    /// Any child aged 0-1
    pub under_2: bool,
    /// Any child aged 3-6
    pub aged_3_6: bool,
    /// Any child aged 7-12
    pub aged_7_12: bool,
    /// Any child aged 13-17
    pub aged_13_17: bool,
}

impl ChildIndicators {
    /// Derive all six indicators from the per-age counters
    #[must_use]
    pub fn from_counts(counts: &[u32; CHILD_AGES]) -> Self {
        let any = |range: std::ops::RangeInclusive<usize>| counts[range].iter().any(|&n| n > 0);
        Self {
            under_3: any(0..=2),
            aged_4_12: any(4..=12),
            under_2: any(0..=1),
            aged_3_6: any(3..=6),
            aged_7_12: any(7..=12),
            aged_13_17: any(13..=17),
        }
    }
}

/// Aggregated view of all occupants sharing a donor household id
///
/// Constructed once from the full occupant set at donor-data load time and
/// never mutated afterwards. Stored money amounts stay at their
/// collection-year level; the `_uprated` accessors scale them to a simulated
/// year at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorHousehold {
    /// Household identifier (EUROMOD `idhh`)
    pub id: HouseholdId,
    /// Which responsible adult slots are filled
    pub occupancy: Occupancy,
    /// Gender of the selected head
    pub head_gender: Gender,
    /// The male responsible adult, if any
    pub male_adult: Option<PersonId>,
    /// The female responsible adult, if any
    pub female_adult: Option<PersonId>,
    /// Occupants below the age-to-become-responsible threshold, sorted by id
    pub children: Vec<PersonId>,
    /// Non-head, non-partner occupants at or above the threshold, sorted by id
    pub others: Vec<PersonId>,
    /// Total occupant count
    pub occupant_count: usize,
    /// Region of the head
    pub region: String,
    /// Labour bands of the responsible adults, male slot first
    pub labour: LabourPair,
    /// Health of the male adult, if any
    pub male_health: Option<Health>,
    /// Health of the female adult, if any
    pub female_health: Option<Health>,
    /// Age of the male adult, if any
    pub male_age: Option<u32>,
    /// Age of the female adult, if any
    pub female_age: Option<u32>,
    /// Gross hourly wage of the male adult, if any
    pub male_wage: Option<f64>,
    /// Gross hourly wage of the female adult, if any
    pub female_wage: Option<f64>,
    /// Children counted per single year of age, 0 through 17
    pub children_by_age: [u32; CHILD_AGES],
    /// Child-presence indicators derived from `children_by_age`
    pub indicators: ChildIndicators,
    /// Sum of occupant gross earnings per policy
    pub earnings: PolicyMap,
    /// Sum of occupant gross original income per policy
    pub original_income: PolicyMap,
    /// Sum of occupant disposable income per policy
    pub disposable_income: PolicyMap,
    /// Disposable over original income per policy, 0.0 on a zero denominator
    pub ratio_disposable_to_original: PolicyMap,
    /// Disposable over earnings per policy, 0.0 on a zero denominator
    pub ratio_disposable_to_earnings: PolicyMap,
}

impl DonorHousehold {
    /// Number of children in the household
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of children of the exact age
    #[must_use]
    pub fn children_of_age(&self, age: usize) -> u32 {
        self.children_by_age.get(age).copied().unwrap_or(0)
    }

    /// Disposable income under the policy, scaled to the simulated year
    pub fn disposable_income_uprated(
        &self,
        policy: &str,
        year: i32,
        factors: &UpratingTable,
    ) -> Result<f64> {
        Ok(self.disposable_income.get(policy)? * factors.factor(year, policy)?)
    }

    /// Gross earnings under the policy, scaled to the simulated year
    pub fn earnings_uprated(&self, policy: &str, year: i32, factors: &UpratingTable) -> Result<f64> {
        Ok(self.earnings.get(policy)? * factors.factor(year, policy)?)
    }

    /// Gross original income under the policy, scaled to the simulated year
    pub fn original_income_uprated(
        &self,
        policy: &str,
        year: i32,
        factors: &UpratingTable,
    ) -> Result<f64> {
        Ok(self.original_income.get(policy)? * factors.factor(year, policy)?)
    }

    /// Disposable-to-original ratio under the policy, scaled to the simulated
    /// year
    pub fn ratio_disposable_to_original_uprated(
        &self,
        policy: &str,
        year: i32,
        factors: &UpratingTable,
    ) -> Result<f64> {
        Ok(self.ratio_disposable_to_original.get(policy)? * factors.factor(year, policy)?)
    }

    /// Disposable-to-earnings ratio under the policy, scaled to the simulated
    /// year
    pub fn ratio_disposable_to_earnings_uprated(
        &self,
        policy: &str,
        year: i32,
        factors: &UpratingTable,
    ) -> Result<f64> {
        Ok(self.ratio_disposable_to_earnings.get(policy)? * factors.factor(year, policy)?)
    }
}
