//! Donor record collections
//!
//! This module provides the two owning collections of the engine: the
//! `PersonArena`, which owns every `DonorPerson` record keyed by id together
//! with the household membership lists, and the `DonorPool`, which owns the
//! aggregated `DonorHousehold` records and enforces the duplicate-id
//! consistency invariant.
//!
//! Persons are referenced everywhere else by id only; households hand out
//! `Arc` clones so the read-only index can share them without copying.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DonorError, Result};
use crate::models::household::DonorHousehold;
use crate::models::person::DonorPerson;
use crate::models::types::{HouseholdId, PersonId};

/// Owner of all donor person records, keyed by person id
///
/// The arena also tracks which persons share a household id, in insertion
/// order. Records are immutable once the arena is handed to aggregation.
#[derive(Debug, Default)]
pub struct PersonArena {
    /// Person records by id
    persons: FxHashMap<PersonId, DonorPerson>,
    /// Occupant ids per household, in insertion order
    by_household: FxHashMap<HouseholdId, Vec<PersonId>>,
}

impl PersonArena {
    /// Create an empty arena
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person as an occupant of the given household
    ///
    /// A person id may be inserted only once; a second insertion is a fatal
    /// data error.
    pub fn insert(&mut self, household: HouseholdId, person: DonorPerson) -> Result<()> {
        let id = person.id;
        if self.persons.contains_key(&id) {
            return Err(DonorError::DuplicatePerson { person: id });
        }
        self.persons.insert(id, person);
        self.by_household.entry(household).or_default().push(id);
        Ok(())
    }

    /// Look up a person by id
    #[must_use]
    pub fn get(&self, id: PersonId) -> Option<&DonorPerson> {
        self.persons.get(&id)
    }

    /// Mutable access to a person record during the construction phase
    pub(crate) fn get_mut(&mut self, id: PersonId) -> Option<&mut DonorPerson> {
        self.persons.get_mut(&id)
    }

    /// Resolve the occupants of a household
    ///
    /// Household ids without occupants and membership entries pointing at
    /// unknown persons are both fatal.
    pub fn occupants(&self, household: HouseholdId) -> Result<Vec<&DonorPerson>> {
        let ids = self
            .by_household
            .get(&household)
            .filter(|ids| !ids.is_empty())
            .ok_or(DonorError::EmptyHousehold { household })?;
        ids.iter()
            .map(|&id| {
                self.persons
                    .get(&id)
                    .ok_or(DonorError::UnknownPerson { person: id })
            })
            .collect()
    }

    /// Iterate over all household ids in the arena
    pub fn household_ids(&self) -> impl Iterator<Item = HouseholdId> + '_ {
        self.by_household.keys().copied()
    }

    /// Number of persons in the arena
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    /// Number of distinct household ids in the arena
    #[must_use]
    pub fn household_count(&self) -> usize {
        self.by_household.len()
    }

    /// Whether the arena holds no persons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

/// Owner of the aggregated donor households
///
/// Inserting the same household id twice is allowed only when both instances
/// carry identical derived fields; a divergence signals corrupt input and
/// fails hard rather than letting two versions of one household coexist.
#[derive(Debug, Default)]
pub struct DonorPool {
    /// Aggregated households by id
    households: FxHashMap<HouseholdId, Arc<DonorHousehold>>,
}

impl DonorPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an aggregated household, enforcing duplicate-id consistency
    pub fn insert(&mut self, household: DonorHousehold) -> Result<()> {
        match self.households.get(&household.id) {
            None => {
                self.households.insert(household.id, Arc::new(household));
                Ok(())
            }
            Some(existing) if **existing == household => Ok(()),
            Some(_) => Err(DonorError::DuplicateHouseholdMismatch {
                household: household.id,
            }),
        }
    }

    /// Look up a household by id
    #[must_use]
    pub fn get(&self, id: HouseholdId) -> Option<Arc<DonorHousehold>> {
        self.households.get(&id).cloned()
    }

    /// Iterate over all households
    pub fn households(&self) -> impl Iterator<Item = &Arc<DonorHousehold>> {
        self.households.values()
    }

    /// Number of households in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.households.len()
    }

    /// Whether the pool holds no households
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.households.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::Gender;

    #[test]
    fn test_arena_groups_by_household() {
        let mut arena = PersonArena::new();
        arena
            .insert(1, DonorPerson::new(10, 40, Gender::Male))
            .unwrap();
        arena
            .insert(1, DonorPerson::new(11, 38, Gender::Female))
            .unwrap();
        arena
            .insert(2, DonorPerson::new(12, 55, Gender::Male))
            .unwrap();

        assert_eq!(arena.person_count(), 3);
        assert_eq!(arena.household_count(), 2);

        let occupants = arena.occupants(1).unwrap();
        assert_eq!(occupants.len(), 2);
        assert!(arena.occupants(3).is_err());
    }

    #[test]
    fn test_arena_rejects_duplicate_person() {
        let mut arena = PersonArena::new();
        arena
            .insert(1, DonorPerson::new(10, 40, Gender::Male))
            .unwrap();
        let err = arena
            .insert(2, DonorPerson::new(10, 41, Gender::Male))
            .unwrap_err();
        assert!(matches!(err, DonorError::DuplicatePerson { person: 10 }));
    }
}
