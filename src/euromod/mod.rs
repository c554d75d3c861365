//! EUROMOD input ingestion
//!
//! This module provides `serde_arrow`-based deserialization for EUROMOD
//! donor data: wide demographic person rows and long-format per-policy income
//! rows, both arriving as Arrow `RecordBatch`es. `load_arena` assembles the
//! two row kinds into a `PersonArena` ready for aggregation.

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer};

use crate::collections::PersonArena;
use crate::error::{DonorError, Result};
use crate::models::person::DonorPerson;
use crate::models::types::{Gender, Health, HouseholdId, LabourSupply, PersonId};

/// Average weeks per month, used to convert weekly hours to the monthly
/// basis the EUROMOD income variables are expressed in
const WEEKS_PER_MONTH: f64 = 4.33;

/// Custom deserializer for the partner link from the `idpartner` field
///
/// EUROMOD encodes "no partner" as zero; null is accepted too.
fn deserialize_partner<'de, D>(deserializer: D) -> std::result::Result<Option<PersonId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<PersonId>::deserialize(deserializer)?;
    Ok(id.filter(|&id| id > 0))
}

/// Custom deserializer for gender from the `dgn` field
fn deserialize_gender<'de, D>(deserializer: D) -> std::result::Result<Gender, D::Error>
where
    D: Deserializer<'de>,
{
    let code = i64::deserialize(deserializer)?;
    Gender::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid gender code: {code}")))
}

/// Custom deserializer for health from the `dhe` field
fn deserialize_health<'de, D>(deserializer: D) -> std::result::Result<Health, D::Error>
where
    D: Deserializer<'de>,
{
    let code = i64::deserialize(deserializer)?;
    Health::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid health code: {code}")))
}

/// Custom deserializer for the region from the `drgn1` field
///
/// This converts from integer to string.
fn deserialize_region<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let code = i64::deserialize(deserializer)?;
    Ok(code.to_string())
}

/// One wide demographic row of the EUROMOD donor input
///
/// Serde aliases carry the EUROMOD variable names so batches deserialize
/// without renaming columns first.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRow {
    /// Person identifier
    #[serde(alias = "idperson")]
    pub person_id: PersonId,

    /// Household identifier
    #[serde(alias = "idhh")]
    pub household_id: HouseholdId,

    /// Partner's person id; zero or null means unpartnered
    #[serde(alias = "idpartner", deserialize_with = "deserialize_partner", default)]
    pub partner_id: Option<PersonId>,

    /// Age in completed years; negative values are rejected during assembly
    #[serde(alias = "dag")]
    pub age: i64,

    /// Gender code (1 male, 0 female)
    #[serde(alias = "dgn", deserialize_with = "deserialize_gender")]
    pub gender: Gender,

    /// Region of residence
    #[serde(alias = "drgn1", deserialize_with = "deserialize_region")]
    pub region: String,

    /// Self-assessed health code (1 poor through 5 excellent)
    #[serde(alias = "dhe", deserialize_with = "deserialize_health")]
    pub health: Health,

    /// Weekly hours of work
    #[serde(alias = "lhw")]
    pub weekly_hours: f64,
}

impl PersonRow {
    /// Convert the raw row into a `DonorPerson` plus its household id and
    /// raw weekly hours
    ///
    /// The hours are returned alongside because the wage derivation needs
    /// them after the income rows have been applied.
    fn into_person(self) -> Result<(HouseholdId, f64, DonorPerson)> {
        let age = u32::try_from(self.age).map_err(|_| DonorError::InvalidAge {
            person: self.person_id,
            value: self.age,
        })?;
        let mut person = DonorPerson::new(self.person_id, age, self.gender)
            .with_region(self.region)
            .with_health(self.health)
            .with_labour_supply(LabourSupply::from_weekly_hours(self.weekly_hours));
        if let Some(partner) = self.partner_id {
            person = person.with_partner(partner);
        }
        Ok((self.household_id, self.weekly_hours, person))
    }
}

/// One long-format income row: the three income measures one person
/// receives under one policy system
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeRow {
    /// Person identifier
    #[serde(alias = "idperson")]
    pub person_id: PersonId,

    /// Policy system the amounts were computed under
    pub system: String,

    /// Monthly employment income
    #[serde(alias = "ils_earns")]
    pub earnings: f64,

    /// Monthly original income
    #[serde(alias = "ils_origy")]
    pub original_income: f64,

    /// Monthly disposable income
    #[serde(alias = "ils_dispy")]
    pub disposable_income: f64,
}

/// Deserialize a batch of wide person rows
pub fn deserialize_person_batch(batch: &RecordBatch) -> Result<Vec<PersonRow>> {
    debug!("Deserializing EUROMOD person batch with {} rows", batch.num_rows());
    Ok(serde_arrow::from_record_batch(batch)?)
}

/// Deserialize a batch of long-format income rows
pub fn deserialize_income_batch(batch: &RecordBatch) -> Result<Vec<IncomeRow>> {
    debug!("Deserializing EUROMOD income batch with {} rows", batch.num_rows());
    Ok(serde_arrow::from_record_batch(batch)?)
}

/// Assemble person and income batches into a `PersonArena`
///
/// Person rows create the arena entries; income rows fill the per-policy
/// income maps. An income row naming an unknown person id is fatal. Once all
/// incomes are applied, each worker's hourly wage is derived from their
/// base-policy earnings over monthly hours; persons without hours keep a
/// zero wage.
pub fn load_arena(
    person_batches: &[RecordBatch],
    income_batches: &[RecordBatch],
    base_policy: &str,
) -> Result<PersonArena> {
    let start = Instant::now();
    let mut arena = PersonArena::new();
    let mut weekly_hours: FxHashMap<PersonId, f64> = FxHashMap::default();

    for batch in person_batches {
        for row in deserialize_person_batch(batch)? {
            let (household_id, hours, person) = row.into_person()?;
            weekly_hours.insert(person.id, hours);
            arena.insert(household_id, person)?;
        }
    }

    for batch in income_batches {
        for row in deserialize_income_batch(batch)? {
            let person = arena
                .get_mut(row.person_id)
                .ok_or(DonorError::UnknownPerson {
                    person: row.person_id,
                })?;
            person.record_income(
                &row.system,
                row.earnings,
                row.original_income,
                row.disposable_income,
            );
        }
    }

    for (&id, &hours) in &weekly_hours {
        if hours > 0.0 {
            if let Some(person) = arena.get_mut(id) {
                let earnings = person.earnings.get_opt(base_policy).unwrap_or(0.0);
                person.hourly_wage = earnings / (hours * WEEKS_PER_MONTH);
            }
        }
    }

    info!(
        "Loaded {} donor persons across {} households in {:.2?}",
        arena.person_count(),
        arena.household_count(),
        start.elapsed()
    );
    Ok(arena)
}
