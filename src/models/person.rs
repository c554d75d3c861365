//! Donor person model
//!
//! A `DonorPerson` is one individual from the donor population snapshot, with
//! the resolved attributes matching needs (region, health, labour band, wage)
//! and the three per-policy income measures produced by the tax-benefit runs.

use crate::models::policy::PolicyMap;
use crate::models::types::{Gender, Health, LabourSupply, PersonId};

/// One donor individual in a collection-year snapshot
///
/// Records are immutable once the arena is published; every mutating method
/// here belongs to the construction phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorPerson {
    /// Person identifier (EUROMOD `idperson`)
    pub id: PersonId,
    /// Age in completed years at collection (EUROMOD `dag`)
    pub age: u32,
    /// Gender (EUROMOD `dgn`)
    pub gender: Gender,
    /// Partner's person id, if partnered (EUROMOD `idpartner`)
    pub partner_id: Option<PersonId>,
    /// Region of residence (EUROMOD `drgn1`)
    pub region: String,
    /// Self-assessed health (EUROMOD `dhe`)
    pub health: Health,
    /// Discretized weekly labour supply (from EUROMOD `lhw`)
    pub labour_supply: LabourSupply,
    /// Gross hourly wage derived from base-policy earnings over monthly hours
    pub hourly_wage: f64,
    /// Monthly employment income by policy (EUROMOD `ils_earns`)
    pub earnings: PolicyMap,
    /// Monthly original income by policy (EUROMOD `ils_origy`)
    pub original_income: PolicyMap,
    /// Monthly disposable income by policy (EUROMOD `ils_dispy`)
    pub disposable_income: PolicyMap,
}

impl DonorPerson {
    /// Create a person with empty income maps
    ///
    /// Non-demographic attributes start at neutral defaults (no partner, empty
    /// region, good health, zero labour, zero wage) and are filled in with the
    /// `with_*` builders.
    #[must_use]
    pub fn new(id: PersonId, age: u32, gender: Gender) -> Self {
        Self {
            id,
            age,
            gender,
            partner_id: None,
            region: String::new(),
            health: Health::Good,
            labour_supply: LabourSupply::Zero,
            hourly_wage: 0.0,
            earnings: PolicyMap::new(),
            original_income: PolicyMap::new(),
            disposable_income: PolicyMap::new(),
        }
    }

    /// Set the partner's person id
    #[must_use]
    pub const fn with_partner(mut self, partner_id: PersonId) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    /// Set the region of residence
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the health status
    #[must_use]
    pub const fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Set the labour supply band
    #[must_use]
    pub const fn with_labour_supply(mut self, labour_supply: LabourSupply) -> Self {
        self.labour_supply = labour_supply;
        self
    }

    /// Set the gross hourly wage
    #[must_use]
    pub const fn with_hourly_wage(mut self, hourly_wage: f64) -> Self {
        self.hourly_wage = hourly_wage;
        self
    }

    /// Record the three income measures observed under one policy
    pub fn record_income(
        &mut self,
        policy: &str,
        earnings: f64,
        original_income: f64,
        disposable_income: f64,
    ) {
        self.earnings.insert(policy, earnings);
        self.original_income.insert(policy, original_income);
        self.disposable_income.insert(policy, disposable_income);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_builders() {
        let person = DonorPerson::new(7, 34, Gender::Female)
            .with_partner(8)
            .with_region("5")
            .with_health(Health::VeryGood)
            .with_labour_supply(LabourSupply::Thirty)
            .with_hourly_wage(14.5);

        assert_eq!(person.id, 7);
        assert_eq!(person.partner_id, Some(8));
        assert_eq!(person.region, "5");
        assert_eq!(person.health, Health::VeryGood);
        assert_eq!(person.labour_supply, LabourSupply::Thirty);
        assert_eq!(person.hourly_wage, 14.5);
        assert!(person.earnings.is_empty());
    }

    #[test]
    fn test_record_income_fills_all_three_maps() {
        let mut person = DonorPerson::new(1, 40, Gender::Male);
        person.record_income("UK_2019", 2000.0, 2100.0, 1800.0);
        person.record_income("UK_2023", 2200.0, 2300.0, 1950.0);

        assert_eq!(person.earnings.get("UK_2019").unwrap(), 2000.0);
        assert_eq!(person.original_income.get("UK_2023").unwrap(), 2300.0);
        assert_eq!(person.disposable_income.get("UK_2019").unwrap(), 1800.0);
        assert_eq!(person.earnings.len(), 2);
    }
}
