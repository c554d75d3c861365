//! Tests for the donor pool, uprated income reads and pool statistics

use donor_match::algorithm::{PoolStatistics, aggregate_household};
use donor_match::collections::DonorPool;
use donor_match::config::DonorConfig;
use donor_match::error::DonorError;
use donor_match::models::{
    DonorHousehold, DonorPerson, Gender, LabourSupply, PolicySchedule, UpratingTable,
};

fn create_test_schedule() -> PolicySchedule {
    let mut schedule = PolicySchedule::new();
    schedule.insert(2019, "UK_2019");
    schedule
}

fn create_single_male(id: i64, wage: f64) -> DonorHousehold {
    let config = DonorConfig::new("UK_2019");
    let schedule = create_test_schedule();
    let mut person = DonorPerson::new(id * 10, 45, Gender::Male)
        .with_region("1")
        .with_labour_supply(LabourSupply::Forty)
        .with_hourly_wage(wage);
    person.record_income("UK_2019", 2400.0, 2500.0, 1900.0);
    let occupants = vec![&person];
    aggregate_household(id, &occupants, &config, &schedule).unwrap()
}

fn create_family(id: i64) -> DonorHousehold {
    let config = DonorConfig::new("UK_2019");
    let schedule = create_test_schedule();
    let mut mother = DonorPerson::new(id * 10, 36, Gender::Female)
        .with_region("2")
        .with_labour_supply(LabourSupply::Twenty)
        .with_hourly_wage(10.5);
    mother.record_income("UK_2019", 900.0, 900.0, 1000.0);
    let mut child = DonorPerson::new(id * 10 + 1, 2, Gender::Male).with_region("2");
    child.record_income("UK_2019", 0.0, 0.0, 0.0);
    let occupants = vec![&mother, &child];
    aggregate_household(id, &occupants, &config, &schedule).unwrap()
}

#[test]
fn test_identical_duplicate_insert_is_idempotent() {
    let mut pool = DonorPool::new();
    pool.insert(create_single_male(1, 14.0)).unwrap();
    pool.insert(create_single_male(1, 14.0)).unwrap();

    assert_eq!(pool.len(), 1);
    assert!(pool.get(1).is_some());
}

#[test]
fn test_diverging_duplicate_insert_fails() {
    let mut pool = DonorPool::new();
    pool.insert(create_single_male(1, 14.0)).unwrap();

    let mut altered = create_single_male(1, 14.0);
    altered.earnings.insert("UK_2019", 9999.0);
    let err = pool.insert(altered).unwrap_err();
    assert!(matches!(
        err,
        DonorError::DuplicateHouseholdMismatch { household: 1 }
    ));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_uprated_reads_apply_the_factor() {
    let household = create_single_male(1, 14.0);
    let mut factors = UpratingTable::new();
    factors.insert(2021, "UK_2019", 1.05);

    let raw = household.disposable_income.get("UK_2019").unwrap();
    assert_eq!(raw, 1900.0);

    let uprated = household
        .disposable_income_uprated("UK_2019", 2021, &factors)
        .unwrap();
    assert!((uprated - 1900.0 * 1.05).abs() < 1e-12);

    let earnings = household
        .earnings_uprated("UK_2019", 2021, &factors)
        .unwrap();
    assert!((earnings - 2400.0 * 1.05).abs() < 1e-12);
}

#[test]
fn test_missing_uprating_factor_is_fatal() {
    let household = create_single_male(1, 14.0);
    let factors = UpratingTable::new();

    let err = household
        .disposable_income_uprated("UK_2019", 2022, &factors)
        .unwrap_err();
    assert!(matches!(
        err,
        DonorError::MissingUpratingFactor { year: 2022, policy } if policy == "UK_2019"
    ));
}

#[test]
fn test_pool_statistics_reflect_composition() {
    let mut pool = DonorPool::new();
    pool.insert(create_single_male(1, 14.0)).unwrap();
    pool.insert(create_single_male(2, 16.5)).unwrap();
    pool.insert(create_family(3)).unwrap();

    let stats = PoolStatistics::calculate(&pool);
    assert_eq!(stats.household_count, 3);
    assert_eq!(stats.occupant_count, 4);
    assert_eq!(stats.single_male_count, 2);
    assert_eq!(stats.single_female_count, 1);
    assert_eq!(stats.couple_count, 0);
    assert_eq!(stats.child_count, 1);
    assert_eq!(stats.labour_coverage.get("(40h, none)"), Some(&2));
    assert_eq!(stats.labour_coverage.get("(none, 20h)"), Some(&1));

    let summary = PoolStatistics::generate_summary(&stats);
    assert!(summary.contains("Total Households: 3"));
    assert!(summary.contains("(40h, none): 2"));
}
