//! Head-of-household selection and occupant classification
//!
//! Picks exactly one head per household with a three-level lexicographic
//! tie-break, resolves the head's partner, and sorts the remaining occupants
//! into children and other members.

use std::cmp::Ordering;

use log::warn;

use crate::config::DonorConfig;
use crate::error::{DonorError, Result};
use crate::models::person::DonorPerson;
use crate::models::types::{Gender, HouseholdId, Occupancy};

/// Outcome of head selection for one household
#[derive(Debug)]
pub struct HeadSelection<'a> {
    /// The selected head
    pub head: &'a DonorPerson,
    /// The head's partner, when one resolved among the occupants
    pub partner: Option<&'a DonorPerson>,
    /// Occupants below the age-to-become-responsible threshold
    pub children: Vec<&'a DonorPerson>,
    /// Remaining occupants at or above the threshold
    pub others: Vec<&'a DonorPerson>,
}

impl<'a> HeadSelection<'a> {
    /// The male responsible adult, if the household has one
    #[must_use]
    pub fn male_adult(&self) -> Option<&'a DonorPerson> {
        if self.head.gender == Gender::Male {
            Some(self.head)
        } else {
            self.partner
        }
    }

    /// The female responsible adult, if the household has one
    #[must_use]
    pub fn female_adult(&self) -> Option<&'a DonorPerson> {
        if self.head.gender == Gender::Female {
            Some(self.head)
        } else {
            self.partner
        }
    }

    /// The occupancy category implied by head and partner
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        if self.partner.is_some() {
            Occupancy::Couple
        } else if self.head.gender == Gender::Male {
            Occupancy::SingleMale
        } else {
            Occupancy::SingleFemale
        }
    }
}

/// Select the head of a household and classify the remaining occupants
///
/// The head is the occupant with the highest original income under the base
/// policy; exact ties prefer the strictly older occupant, then the lower
/// person id. The tie-break is a total order, so the result does not depend
/// on occupant iteration order.
///
/// A declared partner id that resolves to no occupant downgrades the
/// household to single-headed with a warning. A resolved partner whose own
/// partner id does not point back at the head is a fatal inconsistency.
pub fn classify_household<'a>(
    household: HouseholdId,
    occupants: &[&'a DonorPerson],
    config: &DonorConfig,
) -> Result<HeadSelection<'a>> {
    let mut iter = occupants.iter();
    let mut head = *iter
        .next()
        .ok_or(DonorError::EmptyHousehold { household })?;
    let mut head_income = base_policy_income(head, config)?;

    for &candidate in iter {
        let income = base_policy_income(candidate, config)?;
        let ordering = income
            .total_cmp(&head_income)
            .then_with(|| candidate.age.cmp(&head.age))
            .then_with(|| head.id.cmp(&candidate.id));
        if ordering == Ordering::Greater {
            head = candidate;
            head_income = income;
        }
    }

    let mut partner: Option<&DonorPerson> = None;
    if let Some(partner_id) = head.partner_id {
        match occupants.iter().find(|person| person.id == partner_id) {
            None => {
                warn!(
                    "household {household}: partner {partner_id} of head {} is not among the \
                     occupants, downgrading to single-headed",
                    head.id
                );
            }
            Some(&candidate) => {
                if candidate.partner_id != Some(head.id) {
                    return Err(DonorError::PartnerLinkInconsistent {
                        household,
                        head: head.id,
                        partner: candidate.id,
                    });
                }
                if candidate.gender == head.gender {
                    warn!(
                        "household {household}: partner {} shares the head's gender, \
                         downgrading to single-headed",
                        candidate.id
                    );
                } else {
                    partner = Some(candidate);
                }
            }
        }
    }

    let mut children = Vec::new();
    let mut others = Vec::new();
    for &person in occupants {
        if person.id == head.id || partner.is_some_and(|p| p.id == person.id) {
            continue;
        }
        if person.age < config.age_to_become_responsible {
            children.push(person);
        } else {
            others.push(person);
        }
    }

    Ok(HeadSelection {
        head,
        partner,
        children,
        others,
    })
}

fn base_policy_income(person: &DonorPerson, config: &DonorConfig) -> Result<f64> {
    person
        .original_income
        .get_opt(&config.base_policy)
        .ok_or_else(|| DonorError::MissingPolicyValue {
            person: person.id,
            policy: config.base_policy.clone(),
        })
}
