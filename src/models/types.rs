//! Common domain type definitions
//!
//! This module contains the shared vocabulary of the donor model: identifier
//! aliases, the categorical attributes that enter matching keys, and the
//! male-first labour pair that anchors every key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a donor person within one donor population.
pub type PersonId = i64;

/// Identifier of a donor household within one donor population.
pub type HouseholdId = i64;

/// Gender of a donor individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male gender
    Male,
    /// Female gender
    Female,
}

impl Gender {
    /// Converts the EUROMOD `dgn` code (1 = male, 0 = female).
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            0 => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Self-assessed health status, the five categories of the EUROMOD `dhe`
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    /// Poor health (code 1)
    Poor,
    /// Fair health (code 2)
    Fair,
    /// Good health (code 3)
    Good,
    /// Very good health (code 4)
    VeryGood,
    /// Excellent health (code 5)
    Excellent,
}

impl Health {
    /// Converts the EUROMOD `dhe` code (1 = poor .. 5 = excellent).
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Poor),
            2 => Some(Self::Fair),
            3 => Some(Self::Good),
            4 => Some(Self::VeryGood),
            5 => Some(Self::Excellent),
            _ => None,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
            Self::VeryGood => write!(f, "very good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

/// Discretized weekly labour supply, in ten-hour bands capped at forty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabourSupply {
    /// Not working
    Zero,
    /// Around ten hours per week
    Ten,
    /// Around twenty hours per week
    Twenty,
    /// Around thirty hours per week
    Thirty,
    /// Forty hours per week or more
    Forty,
}

impl LabourSupply {
    /// All bands, in increasing order of hours.
    pub const ALL: [Self; 5] = [Self::Zero, Self::Ten, Self::Twenty, Self::Thirty, Self::Forty];

    /// Nominal weekly hours of the band.
    #[must_use]
    pub const fn hours(self) -> u32 {
        match self {
            Self::Zero => 0,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Thirty => 30,
            Self::Forty => 40,
        }
    }

    /// Discretizes observed weekly hours (EUROMOD `lhw`) to the nearest band.
    ///
    /// Negative observations collapse to `Zero`; anything above 35 hours is
    /// `Forty`.
    #[must_use]
    pub fn from_weekly_hours(hours: f64) -> Self {
        if hours < 5.0 {
            Self::Zero
        } else if hours < 15.0 {
            Self::Ten
        } else if hours < 25.0 {
            Self::Twenty
        } else if hours < 35.0 {
            Self::Thirty
        } else {
            Self::Forty
        }
    }
}

impl fmt::Display for LabourSupply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

/// Which responsible adults occupy a household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    /// A male and a female responsible adult
    Couple,
    /// A single male responsible adult
    SingleMale,
    /// A single female responsible adult
    SingleFemale,
}

impl Occupancy {
    /// Whether the male adult slot is filled.
    #[must_use]
    pub const fn has_male(self) -> bool {
        matches!(self, Self::Couple | Self::SingleMale)
    }

    /// Whether the female adult slot is filled.
    #[must_use]
    pub const fn has_female(self) -> bool {
        matches!(self, Self::Couple | Self::SingleFemale)
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Couple => write!(f, "couple"),
            Self::SingleMale => write!(f, "single male"),
            Self::SingleFemale => write!(f, "single female"),
        }
    }
}

/// Male-first pair of labour bands, with `None` marking an absent adult slot.
///
/// The pair is the innermost matching key and is never relaxed: an absent
/// slot only ever matches an absent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabourPair {
    /// Labour band of the male adult, if the household has one.
    pub male: Option<LabourSupply>,
    /// Labour band of the female adult, if the household has one.
    pub female: Option<LabourSupply>,
}

impl LabourPair {
    /// Creates a pair from the two optional slots.
    #[must_use]
    pub const fn new(male: Option<LabourSupply>, female: Option<LabourSupply>) -> Self {
        Self { male, female }
    }
}

impl fmt::Display for LabourPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.male {
            Some(band) => write!(f, "({band}, ")?,
            None => write!(f, "(none, ")?,
        }
        match self.female {
            Some(band) => write!(f, "{band})"),
            None => write!(f, "none)"),
        }
    }
}
