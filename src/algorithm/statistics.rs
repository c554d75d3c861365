//! Donor pool statistics and summaries
//!
//! This module provides functions for describing an aggregated donor pool:
//! occupancy and child counts, and how the pool covers the labour-supply
//! combinations that matching keys are anchored on.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::collections::DonorPool;
use crate::error::Result;
use crate::models::types::Occupancy;

/// Basic statistics over an aggregated donor pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    /// Total number of donor households
    pub household_count: usize,
    /// Total number of occupants across all households
    pub occupant_count: usize,
    /// Households with both responsible adults present
    pub couple_count: usize,
    /// Households with only a male responsible adult
    pub single_male_count: usize,
    /// Households with only a female responsible adult
    pub single_female_count: usize,
    /// Total number of children across all households
    pub child_count: usize,
    /// Average children per household
    pub avg_children_per_household: f64,
    /// Households per labour-pair label
    pub labour_coverage: BTreeMap<String, usize>,
}

/// Functions for donor pool statistics and summaries
pub struct PoolStatistics;

impl PoolStatistics {
    /// Calculate basic statistics for a donor pool
    #[must_use]
    pub fn calculate(pool: &DonorPool) -> PoolStats {
        let household_count = pool.len();
        let mut occupant_count = 0;
        let mut couple_count = 0;
        let mut single_male_count = 0;
        let mut single_female_count = 0;
        let mut child_count = 0;
        let mut labour_coverage: BTreeMap<String, usize> = BTreeMap::new();

        for household in pool.households() {
            occupant_count += household.occupant_count;
            child_count += household.child_count();
            match household.occupancy {
                Occupancy::Couple => couple_count += 1,
                Occupancy::SingleMale => single_male_count += 1,
                Occupancy::SingleFemale => single_female_count += 1,
            }
            *labour_coverage.entry(household.labour.to_string()).or_insert(0) += 1;
        }

        let avg_children_per_household = if household_count > 0 {
            child_count as f64 / household_count as f64
        } else {
            0.0
        };

        PoolStats {
            household_count,
            occupant_count,
            couple_count,
            single_male_count,
            single_female_count,
            child_count,
            avg_children_per_household,
            labour_coverage,
        }
    }

    /// Generate a human-readable pool summary
    #[must_use]
    pub fn generate_summary(stats: &PoolStats) -> String {
        let mut summary = String::new();
        summary.push_str("Donor Pool Summary:\n");
        summary.push_str(&format!("  Total Households: {}\n", stats.household_count));
        summary.push_str(&format!("  Total Occupants: {}\n", stats.occupant_count));
        summary.push_str(&format!("  Couples: {}\n", stats.couple_count));
        summary.push_str(&format!("  Single Male: {}\n", stats.single_male_count));
        summary.push_str(&format!("  Single Female: {}\n", stats.single_female_count));
        summary.push_str(&format!("  Total Children: {}\n", stats.child_count));
        summary.push_str(&format!(
            "  Average Children per Household: {:.2}\n",
            stats.avg_children_per_household
        ));

        if !stats.labour_coverage.is_empty() {
            summary.push_str("  Labour Combination Coverage:\n");
            for (pair, count) in &stats.labour_coverage {
                let percentage = if stats.household_count > 0 {
                    (*count as f64 / stats.household_count as f64) * 100.0
                } else {
                    0.0
                };
                summary.push_str(&format!("    {pair}: {count} ({percentage:.1}%)\n"));
            }
        }

        summary
    }

    /// Serialize the statistics to pretty-printed JSON
    pub fn to_json(stats: &PoolStats) -> Result<String> {
        Ok(serde_json::to_string_pretty(stats)?)
    }
}
