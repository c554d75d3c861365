//! Donor household aggregation
//!
//! One batch pass turns the person arena into the donor pool: head selection,
//! per-policy income sums and ratios, and child-field derivation for every
//! household. Households are independent of each other, so large batches run
//! the per-household step in parallel.

use std::time::Instant;

use indicatif::ParallelProgressIterator;
use itertools::Itertools;
use log::info;
use rayon::prelude::*;

use crate::algorithm::head::classify_household;
use crate::collections::{DonorPool, PersonArena};
use crate::config::DonorConfig;
use crate::error::{DonorError, Result};
use crate::models::household::{CHILD_AGES, ChildIndicators, DonorHousehold};
use crate::models::person::DonorPerson;
use crate::models::policy::{PolicyMap, PolicySchedule};
use crate::models::types::{HouseholdId, LabourPair, PersonId};
use crate::utils::progress::{create_main_progress_bar, finish_progress_bar};

/// Builder running the aggregation pass over a person arena
#[derive(Debug)]
pub struct PoolBuilder<'a> {
    /// Run configuration
    config: &'a DonorConfig,
    /// Policy scenarios to aggregate under
    schedule: &'a PolicySchedule,
}

impl<'a> PoolBuilder<'a> {
    // Threshold for switching to parallel processing
    const PARALLEL_THRESHOLD: usize = 500;

    /// Create a builder with the given configuration and policy schedule
    #[must_use]
    pub const fn new(config: &'a DonorConfig, schedule: &'a PolicySchedule) -> Self {
        Self { config, schedule }
    }

    /// Aggregate every household in the arena into a donor pool
    pub fn build(&self, arena: &PersonArena) -> Result<DonorPool> {
        let start_time = Instant::now();
        self.config.validate()?;

        let household_ids: Vec<HouseholdId> = arena.household_ids().sorted_unstable().collect();
        info!(
            "Aggregating {} donor households across {} policy scenarios",
            household_ids.len(),
            self.schedule.policy_names().len()
        );

        let use_parallel =
            self.config.use_parallel && household_ids.len() >= Self::PARALLEL_THRESHOLD;

        let households: Vec<DonorHousehold> = if use_parallel {
            let progress = create_main_progress_bar(
                household_ids.len() as u64,
                Some("Aggregating donor households"),
            );
            let results: Result<Vec<_>> = household_ids
                .par_iter()
                .progress_with(progress.clone())
                .map(|&id| self.aggregate_one(id, arena))
                .collect();
            finish_progress_bar(&progress, Some("Aggregation complete"));
            results?
        } else {
            household_ids
                .iter()
                .map(|&id| self.aggregate_one(id, arena))
                .collect::<Result<Vec<_>>>()?
        };

        let mut pool = DonorPool::new();
        for household in households {
            pool.insert(household)?;
        }

        info!(
            "Aggregated {} donor households in {:.2?}",
            pool.len(),
            start_time.elapsed()
        );
        Ok(pool)
    }

    fn aggregate_one(&self, id: HouseholdId, arena: &PersonArena) -> Result<DonorHousehold> {
        let occupants = arena.occupants(id)?;
        aggregate_household(id, &occupants, self.config, self.schedule)
    }
}

/// Aggregate one household from its occupant records
///
/// Sums the three income measures over every occupant regardless of role,
/// independently for every scheduled policy, derives the ratios with the
/// zero-denominator fallback, rebuilds the child fields, and snapshots the
/// categorical attributes that matching keys are built from.
///
/// Occupants are summed in ascending id order, so equal occupant data yields
/// bit-identical aggregates whatever order the source delivered the records.
pub fn aggregate_household(
    id: HouseholdId,
    occupants: &[&DonorPerson],
    config: &DonorConfig,
    schedule: &PolicySchedule,
) -> Result<DonorHousehold> {
    let mut occupants: Vec<&DonorPerson> = occupants.to_vec();
    occupants.sort_unstable_by_key(|person| person.id);

    let selection = classify_household(id, &occupants, config)?;

    let mut earnings = PolicyMap::new();
    let mut original_income = PolicyMap::new();
    let mut disposable_income = PolicyMap::new();
    let mut ratio_disposable_to_original = PolicyMap::new();
    let mut ratio_disposable_to_earnings = PolicyMap::new();

    for policy in schedule.policy_names() {
        let mut sum_earnings = 0.0;
        let mut sum_original = 0.0;
        let mut sum_disposable = 0.0;
        for person in &occupants {
            sum_earnings += policy_value(&person.earnings, person.id, policy)?;
            sum_original += policy_value(&person.original_income, person.id, policy)?;
            sum_disposable += policy_value(&person.disposable_income, person.id, policy)?;
        }
        earnings.insert(policy, sum_earnings);
        original_income.insert(policy, sum_original);
        disposable_income.insert(policy, sum_disposable);

        // A zero denominator forces the ratio to exactly 0.0; consumers must
        // then use the disposable level directly instead of the ratio.
        let to_original = if sum_original == 0.0 {
            0.0
        } else {
            sum_disposable / sum_original
        };
        let to_earnings = if sum_earnings == 0.0 {
            0.0
        } else {
            sum_disposable / sum_earnings
        };
        ratio_disposable_to_original.insert(policy, to_original);
        ratio_disposable_to_earnings.insert(policy, to_earnings);
    }

    let mut children_by_age = [0u32; CHILD_AGES];
    for child in &selection.children {
        let age = child.age as usize;
        if age >= CHILD_AGES {
            return Err(DonorError::ChildAgeOutOfRange {
                household: id,
                person: child.id,
                age: child.age,
            });
        }
        children_by_age[age] += 1;
    }
    let indicators = ChildIndicators::from_counts(&children_by_age);

    let male = selection.male_adult();
    let female = selection.female_adult();

    let mut children: Vec<PersonId> = selection.children.iter().map(|p| p.id).collect();
    children.sort_unstable();
    let mut others: Vec<PersonId> = selection.others.iter().map(|p| p.id).collect();
    others.sort_unstable();

    Ok(DonorHousehold {
        id,
        occupancy: selection.occupancy(),
        head_gender: selection.head.gender,
        male_adult: male.map(|p| p.id),
        female_adult: female.map(|p| p.id),
        children,
        others,
        occupant_count: occupants.len(),
        region: selection.head.region.clone(),
        labour: LabourPair::new(
            male.map(|p| p.labour_supply),
            female.map(|p| p.labour_supply),
        ),
        male_health: male.map(|p| p.health),
        female_health: female.map(|p| p.health),
        male_age: male.map(|p| p.age),
        female_age: female.map(|p| p.age),
        male_wage: male.map(|p| p.hourly_wage),
        female_wage: female.map(|p| p.hourly_wage),
        children_by_age,
        indicators,
        earnings,
        original_income,
        disposable_income,
        ratio_disposable_to_original,
        ratio_disposable_to_earnings,
    })
}

fn policy_value(map: &PolicyMap, person: PersonId, policy: &str) -> Result<f64> {
    map.get_opt(policy)
        .ok_or_else(|| DonorError::MissingPolicyValue {
            person,
            policy: policy.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Gender, Health, LabourSupply};

    fn schedule() -> PolicySchedule {
        let mut schedule = PolicySchedule::new();
        schedule.insert(2019, "UK_2019");
        schedule.insert(2023, "UK_2023");
        schedule
    }

    fn config() -> DonorConfig {
        DonorConfig::new("UK_2019")
    }

    fn create_test_person(id: i64, age: u32, gender: Gender) -> DonorPerson {
        let mut person = DonorPerson::new(id, age, gender);
        person.record_income("UK_2019", 0.0, 0.0, 0.0);
        person.record_income("UK_2023", 0.0, 0.0, 0.0);
        person
    }

    #[test]
    fn test_sums_cover_all_occupants() {
        let mut head = create_test_person(1, 40, Gender::Male);
        head.record_income("UK_2019", 2000.0, 2100.0, 1700.0);
        let mut teen = create_test_person(2, 16, Gender::Female);
        teen.record_income("UK_2019", 300.0, 300.0, 300.0);
        let mut grandparent = create_test_person(3, 70, Gender::Male);
        grandparent.record_income("UK_2019", 0.0, 900.0, 850.0);

        let occupants = vec![&head, &teen, &grandparent];
        let household = aggregate_household(5, &occupants, &config(), &schedule()).unwrap();

        // Children and other members count, not just the head.
        assert_eq!(household.earnings.get("UK_2019").unwrap(), 2300.0);
        assert_eq!(household.original_income.get("UK_2019").unwrap(), 3300.0);
        assert_eq!(household.disposable_income.get("UK_2019").unwrap(), 2850.0);
        assert_eq!(household.occupant_count, 3);
        assert_eq!(household.children, vec![2]);
        assert_eq!(household.others, vec![3]);
    }

    #[test]
    fn test_ratios_per_policy() {
        let mut person = create_test_person(1, 40, Gender::Female);
        person.record_income("UK_2019", 2000.0, 2000.0, 1500.0);
        person.record_income("UK_2023", 2000.0, 2500.0, 2000.0);

        let occupants = vec![&person];
        let household = aggregate_household(5, &occupants, &config(), &schedule()).unwrap();

        assert_eq!(
            household.ratio_disposable_to_original.get("UK_2019").unwrap(),
            0.75
        );
        assert_eq!(
            household.ratio_disposable_to_original.get("UK_2023").unwrap(),
            0.8
        );
        assert_eq!(
            household.ratio_disposable_to_earnings.get("UK_2023").unwrap(),
            1.0
        );
    }

    #[test]
    fn test_zero_denominator_forces_zero_ratio() {
        let person = create_test_person(1, 40, Gender::Male);
        let occupants = vec![&person];
        let household = aggregate_household(5, &occupants, &config(), &schedule()).unwrap();

        let ratio = household.ratio_disposable_to_original.get("UK_2019").unwrap();
        assert_eq!(ratio, 0.0);
        assert!(!ratio.is_nan());
        assert_eq!(
            household.ratio_disposable_to_earnings.get("UK_2019").unwrap(),
            0.0
        );
    }

    #[test]
    fn test_missing_policy_value_is_fatal() {
        let mut person = DonorPerson::new(1, 40, Gender::Male);
        person.record_income("UK_2019", 100.0, 100.0, 100.0);
        // No UK_2023 values recorded.

        let occupants = vec![&person];
        let err = aggregate_household(5, &occupants, &config(), &schedule()).unwrap_err();
        assert!(matches!(
            err,
            DonorError::MissingPolicyValue { person: 1, policy } if policy == "UK_2023"
        ));
    }

    #[test]
    fn test_matching_snapshot_follows_adults() {
        let head = {
            let mut p = create_test_person(1, 40, Gender::Male);
            p.record_income("UK_2019", 3000.0, 3000.0, 2400.0);
            p.with_partner(2)
                .with_region("7")
                .with_health(Health::Good)
                .with_labour_supply(LabourSupply::Forty)
                .with_hourly_wage(18.0)
        };
        let partner = {
            let mut p = create_test_person(2, 38, Gender::Female);
            p.record_income("UK_2019", 1200.0, 1200.0, 1100.0);
            p.with_partner(1)
                .with_region("7")
                .with_health(Health::VeryGood)
                .with_labour_supply(LabourSupply::Twenty)
                .with_hourly_wage(13.5)
        };
        let child = create_test_person(3, 2, Gender::Female);

        let occupants = vec![&head, &partner, &child];
        let household = aggregate_household(9, &occupants, &config(), &schedule()).unwrap();

        assert_eq!(household.occupancy, crate::models::types::Occupancy::Couple);
        assert_eq!(household.head_gender, Gender::Male);
        assert_eq!(household.male_adult, Some(1));
        assert_eq!(household.female_adult, Some(2));
        assert_eq!(household.region, "7");
        assert_eq!(
            household.labour,
            LabourPair::new(Some(LabourSupply::Forty), Some(LabourSupply::Twenty))
        );
        assert_eq!(household.male_health, Some(Health::Good));
        assert_eq!(household.female_health, Some(Health::VeryGood));
        assert_eq!(household.male_age, Some(40));
        assert_eq!(household.female_age, Some(38));
        assert_eq!(household.male_wage, Some(18.0));
        assert_eq!(household.female_wage, Some(13.5));
        assert_eq!(household.children_by_age[2], 1);
        assert!(household.indicators.under_3);
    }

    #[test]
    fn test_occupant_order_does_not_matter() {
        let mut a = create_test_person(1, 40, Gender::Male);
        a.record_income("UK_2019", 0.1, 0.2, 0.3);
        let mut b = create_test_person(2, 38, Gender::Female);
        b.record_income("UK_2019", 0.7, 0.5, 0.9);
        let mut c = create_test_person(3, 12, Gender::Male);
        c.record_income("UK_2019", 0.001, 0.0007, 0.0003);

        let forward = aggregate_household(5, &[&a, &b, &c], &config(), &schedule()).unwrap();
        let backward = aggregate_household(5, &[&c, &b, &a], &config(), &schedule()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_pool_builder_sequential() {
        let mut arena = PersonArena::new();
        let mut head = create_test_person(1, 40, Gender::Male);
        head.record_income("UK_2019", 2000.0, 2000.0, 1500.0);
        arena.insert(1, head).unwrap();
        arena.insert(2, create_test_person(2, 30, Gender::Female)).unwrap();

        let mut config = config();
        config.use_parallel = false;
        let pool = PoolBuilder::new(&config, &schedule()).build(&arena).unwrap();

        assert_eq!(pool.len(), 2);
        let household = pool.get(1).unwrap();
        assert_eq!(household.ratio_disposable_to_original.get("UK_2019").unwrap(), 0.75);
    }
}
