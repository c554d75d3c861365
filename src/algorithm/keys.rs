//! Matching key derivation
//!
//! One pure derivation produces the layered matching key, and it is used
//! identically for donor households at index-build time and for simulated
//! households at query time; any divergence between the two sides would
//! silently break matching. Key parts are ordered from the never-relaxed
//! labour pair to the relaxed-first age tier, and the male value always
//! occupies the first slot of a paired part.

use smallvec::SmallVec;

use crate::models::household::DonorHousehold;
use crate::models::types::{Health, LabourPair};

/// Number of parts in a full key: the labour pair plus four refinement tiers
pub const KEY_PARTS: usize = 5;

/// One discriminator in a matching key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Labour bands of the adults, male slot first
    Labour(LabourPair),
    /// Region of the head
    Region(String),
    /// Health of the adults, male slot first
    Health(Option<Health>, Option<Health>),
    /// Number of children
    Children(usize),
    /// Ages of the adults, male slot first
    Ages(Option<u32>, Option<u32>),
}

/// The attributes key derivation reads, shared by donor households and
/// simulated query households
///
/// The wages ride along for the nearest-selection step after lookup; they are
/// never part of the key itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchProfile {
    /// Labour bands of the adults, male slot first
    pub labour: LabourPair,
    /// Region of the head
    pub region: String,
    /// Health of the male adult, if any
    pub male_health: Option<Health>,
    /// Health of the female adult, if any
    pub female_health: Option<Health>,
    /// Number of children
    pub child_count: usize,
    /// Age of the male adult, if any
    pub male_age: Option<u32>,
    /// Age of the female adult, if any
    pub female_age: Option<u32>,
    /// Gross hourly wage of the male adult, if any
    pub male_wage: Option<f64>,
    /// Gross hourly wage of the female adult, if any
    pub female_wage: Option<f64>,
}

impl MatchProfile {
    /// Snapshot the matching profile of an aggregated donor household
    #[must_use]
    pub fn from_household(household: &DonorHousehold) -> Self {
        Self {
            labour: household.labour,
            region: household.region.clone(),
            male_health: household.male_health,
            female_health: household.female_health,
            child_count: household.child_count(),
            male_age: household.male_age,
            female_age: household.female_age,
            male_wage: household.male_wage,
            female_wage: household.female_wage,
        }
    }
}

/// Full matching key of one household
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    /// The labour pair anchoring the key
    labour: LabourPair,
    /// All parts in priority order, `parts[0]` being the labour pair
    parts: SmallVec<[KeyPart; KEY_PARTS]>,
}

impl MatchKey {
    /// Derive the key from a matching profile
    #[must_use]
    pub fn from_profile(profile: &MatchProfile) -> Self {
        let mut parts = SmallVec::new();
        parts.push(KeyPart::Labour(profile.labour));
        parts.push(KeyPart::Region(profile.region.clone()));
        parts.push(KeyPart::Health(profile.male_health, profile.female_health));
        parts.push(KeyPart::Children(profile.child_count));
        parts.push(KeyPart::Ages(profile.male_age, profile.female_age));
        Self {
            labour: profile.labour,
            parts,
        }
    }

    /// Derive the key of an aggregated donor household
    #[must_use]
    pub fn from_household(household: &DonorHousehold) -> Self {
        Self::from_profile(&MatchProfile::from_household(household))
    }

    /// The labour pair anchoring this key
    #[must_use]
    pub const fn labour(&self) -> LabourPair {
        self.labour
    }

    /// All parts in priority order
    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }
}
