use anyhow::Context;
use log::info;
use rand::prelude::*;
use rand::rngs::StdRng;

use donor_match::Result;
use donor_match::algorithm::{
    DonorIndex, MatchProfile, NearestSelector, PoolBuilder, PoolStatistics, reachable_labour_pairs,
};
use donor_match::collections::PersonArena;
use donor_match::config::DonorConfig;
use donor_match::models::{
    DonorPerson, Gender, Health, HouseholdId, LabourPair, LabourSupply, PersonId, PolicySchedule,
    UpratingTable,
};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

/// Number of synthetic donor households to generate
const DEMO_HOUSEHOLDS: usize = 2_000;

/// Region codes used for the synthetic population
const REGIONS: [&str; 4] = ["1", "2", "3", "4"];

/// Health states drawn for synthetic adults
const HEALTH_STATES: [Health; 5] = [
    Health::Poor,
    Health::Fair,
    Health::Good,
    Health::VeryGood,
    Health::Excellent,
];

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut schedule = PolicySchedule::new();
    schedule.insert(2019, "UK_2019");
    schedule.insert(2023, "UK_2023");

    let mut factors = UpratingTable::new();
    factors.insert(2019, "UK_2019", 1.0);
    factors.insert(2021, "UK_2019", 1.049);
    factors.insert(2023, "UK_2023", 1.0);
    factors.insert(2025, "UK_2023", 1.062);

    // An optional first argument points at a JSON run configuration.
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading configuration from {path}"))?;
            DonorConfig::from_json(&raw)?
        }
        None => DonorConfig::new("UK_2019"),
    };
    if config.random_seed.is_none() {
        config.random_seed = Some(42);
    }

    info!("Generating {DEMO_HOUSEHOLDS} synthetic donor households");
    let arena = synthetic_arena(&config, &schedule, DEMO_HOUSEHOLDS)?;

    let pool = PoolBuilder::new(&config, &schedule).build(&arena)?;
    let index = DonorIndex::build(&pool, &config)?;

    let queries = [
        // A fully-specified couple: usually matched deep in the key
        MatchProfile {
            labour: LabourPair::new(Some(LabourSupply::Forty), Some(LabourSupply::Twenty)),
            region: "2".to_string(),
            male_health: Some(Health::Good),
            female_health: Some(Health::VeryGood),
            child_count: 2,
            male_age: Some(38),
            female_age: Some(36),
            male_wage: Some(17.5),
            female_wage: Some(14.0),
        },
        // A single-female household in a region no donor lives in: forces
        // relaxation down to the labour-only layer
        MatchProfile {
            labour: LabourPair::new(None, Some(LabourSupply::Thirty)),
            region: "9".to_string(),
            male_health: None,
            female_health: Some(Health::Fair),
            child_count: 1,
            male_age: None,
            female_age: Some(44),
            male_wage: None,
            female_wage: Some(11.2),
        },
        MatchProfile {
            labour: LabourPair::new(Some(LabourSupply::Ten), Some(LabourSupply::Ten)),
            region: "1".to_string(),
            male_health: Some(Health::Poor),
            female_health: Some(Health::Poor),
            child_count: 0,
            male_age: Some(61),
            female_age: Some(60),
            male_wage: Some(9.6),
            female_wage: Some(9.1),
        },
    ];

    let mut selector = NearestSelector::new(config.random_seed);
    for profile in &queries {
        let candidates = index.lookup_profile(profile)?;
        let donor = selector.select(candidates.households, profile)?;
        info!(
            "Query {} in region {} matched household {} at depth {} from {} candidates",
            profile.labour,
            profile.region,
            donor.id,
            candidates.depth,
            candidates.households.len()
        );
        let raw = donor.disposable_income.get("UK_2019")?;
        let uprated = donor.disposable_income_uprated("UK_2019", 2021, &factors)?;
        info!(
            "  disposable under UK_2019: {raw:.2} at collection, {uprated:.2} uprated to 2021"
        );
    }

    let stats = PoolStatistics::calculate(&pool);
    info!("{}", PoolStatistics::generate_summary(&stats));

    Ok(())
}

/// Generate a synthetic arena with donors for every reachable labour
/// combination
///
/// The first households enumerate the reachable combinations one by one so
/// index validation always finds coverage; the remainder draw combinations,
/// regions, ages and wages at random.
fn synthetic_arena(
    config: &DonorConfig,
    schedule: &PolicySchedule,
    count: usize,
) -> Result<PersonArena> {
    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut arena = PersonArena::new();
    let mut next_person: PersonId = 1;

    let pairs = reachable_labour_pairs(config);
    for (offset, &pair) in pairs.iter().enumerate() {
        let household = offset as HouseholdId + 1;
        add_household(&mut arena, household, pair, schedule, &mut next_person, &mut rng)?;
    }
    for household in pairs.len() + 1..=count {
        let pair = pairs[rng.random_range(0..pairs.len())];
        add_household(
            &mut arena,
            household as HouseholdId,
            pair,
            schedule,
            &mut next_person,
            &mut rng,
        )?;
    }
    Ok(arena)
}

/// Add one household with the given labour combination to the arena
fn add_household(
    arena: &mut PersonArena,
    household: HouseholdId,
    pair: LabourPair,
    schedule: &PolicySchedule,
    next_person: &mut PersonId,
    rng: &mut StdRng,
) -> Result<()> {
    let mut take_id = || {
        let id = *next_person;
        *next_person += 1;
        id
    };
    let male_id = pair.male.map(|_| take_id());
    let female_id = pair.female.map(|_| take_id());
    let child_ids: Vec<PersonId> = (0..rng.random_range(0..=3)).map(|_| take_id()).collect();
    let region = REGIONS[rng.random_range(0..REGIONS.len())];

    if let (Some(band), Some(id)) = (pair.male, male_id) {
        let mut person = DonorPerson::new(id, rng.random_range(25..=60), Gender::Male)
            .with_region(region)
            .with_health(HEALTH_STATES[rng.random_range(0..HEALTH_STATES.len())])
            .with_labour_supply(band)
            .with_hourly_wage(rng.random_range(9.0..35.0));
        if let Some(partner) = female_id {
            person = person.with_partner(partner);
        }
        record_synthetic_income(&mut person, schedule);
        arena.insert(household, person)?;
    }
    if let (Some(band), Some(id)) = (pair.female, female_id) {
        let mut person = DonorPerson::new(id, rng.random_range(25..=60), Gender::Female)
            .with_region(region)
            .with_health(HEALTH_STATES[rng.random_range(0..HEALTH_STATES.len())])
            .with_labour_supply(band)
            .with_hourly_wage(rng.random_range(9.0..35.0));
        if let Some(partner) = male_id {
            person = person.with_partner(partner);
        }
        record_synthetic_income(&mut person, schedule);
        arena.insert(household, person)?;
    }
    for id in child_ids {
        let gender = if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let mut child = DonorPerson::new(id, rng.random_range(0..18), gender).with_region(region);
        for policy in schedule.policy_names() {
            child.record_income(policy, 0.0, 0.0, 0.0);
        }
        arena.insert(household, child)?;
    }
    Ok(())
}

/// Fill in per-policy incomes derived from the adult's wage and hours
fn record_synthetic_income(person: &mut DonorPerson, schedule: &PolicySchedule) {
    let monthly_hours = f64::from(person.labour_supply.hours()) * 4.33;
    let earnings = person.hourly_wage * monthly_hours;
    for (offset, policy) in schedule.policy_names().into_iter().enumerate() {
        // Later regimes run slightly more generous transfers in this
        // synthetic world, so the ratios differ per policy.
        let transfers = 280.0 + 40.0 * offset as f64;
        let disposable = earnings.mul_add(0.78, transfers);
        person.record_income(policy, earnings, earnings, disposable);
    }
}
