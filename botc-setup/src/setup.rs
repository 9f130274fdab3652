//! Setup distributions: base tables, actual counts and modifier targets.

use crate::modifiers::{self, DistributionDelta, SetupModifier};
use crate::roles::{CharacterId, CharacterInfo, RoleType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 15;
pub const TEENSYVILLE_MAX_PLAYERS: usize = 6;

/// Townsfolk/outsider/minion/demon counts for players 5 through 15.
const BASE_TABLE: [Distribution; MAX_PLAYERS - MIN_PLAYERS + 1] = [
    Distribution::new(3, 0, 1, 1),
    Distribution::new(3, 1, 1, 1),
    Distribution::new(5, 0, 1, 1),
    Distribution::new(5, 1, 1, 1),
    Distribution::new(5, 2, 1, 1),
    Distribution::new(7, 0, 2, 1),
    Distribution::new(7, 1, 2, 1),
    Distribution::new(7, 2, 2, 1),
    Distribution::new(9, 0, 3, 1),
    Distribution::new(9, 1, 3, 1),
    Distribution::new(9, 2, 3, 1),
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Distribution {
    pub townsfolk: u8,
    pub outsider: u8,
    pub minion: u8,
    pub demon: u8,
}

impl Distribution {
    #[must_use]
    pub const fn new(townsfolk: u8, outsider: u8, minion: u8, demon: u8) -> Self {
        Self {
            townsfolk,
            outsider,
            minion,
            demon,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        usize::from(self.townsfolk)
            + usize::from(self.outsider)
            + usize::from(self.minion)
            + usize::from(self.demon)
    }

    /// Count for a role type; fabled and travellers are never counted.
    #[must_use]
    pub const fn get(&self, role_type: RoleType) -> u8 {
        match role_type {
            RoleType::Townsfolk => self.townsfolk,
            RoleType::Outsider => self.outsider,
            RoleType::Minion => self.minion,
            RoleType::Demon => self.demon,
            RoleType::Fabled | RoleType::Traveller => 0,
        }
    }

    fn increment(&mut self, role_type: RoleType) {
        let slot = match role_type {
            RoleType::Townsfolk => &mut self.townsfolk,
            RoleType::Outsider => &mut self.outsider,
            RoleType::Minion => &mut self.minion,
            RoleType::Demon => &mut self.demon,
            RoleType::Fabled | RoleType::Traveller => return,
        };
        *slot = slot.saturating_add(1);
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.townsfolk, self.outsider, self.minion, self.demon
        )
    }
}

#[must_use]
pub const fn zero_distribution() -> Distribution {
    Distribution::new(0, 0, 0, 0)
}

/// Official base distribution, or zero outside 5..=15 players.
#[must_use]
pub fn distribution_for_count(num_players: usize) -> Distribution {
    num_players
        .checked_sub(MIN_PLAYERS)
        .and_then(|i| BASE_TABLE.get(i))
        .copied()
        .unwrap_or_else(zero_distribution)
}

/// Count characters by role type, ignoring fabled and travellers.
pub fn actual_distribution<'a, I>(characters: I) -> Distribution
where
    I: IntoIterator<Item = &'a CharacterInfo>,
{
    let mut dist = zero_distribution();
    for c in characters {
        dist.increment(c.role_type);
    }
    dist
}

/// Base distribution adjusted by the default effect of every selected modifier.
pub fn effective_distribution<'a, I>(num_players: usize, selected: I) -> Distribution
where
    I: IntoIterator<Item = &'a CharacterInfo>,
{
    let base = distribution_for_count(num_players);
    if base == zero_distribution() {
        return base;
    }
    let selected: BTreeSet<&str> = selected.into_iter().map(|c| c.id.as_str()).collect();
    let delta = modifiers::MODIFIERS
        .iter()
        .filter(|m| selected.contains(m.id))
        .fold(DistributionDelta::NONE, |acc, m| acc.plus(m.default_delta()));
    delta.apply(base)
}

/// Selected ids that modify the setup, in declared modifier order.
pub fn modifying_characters<'a, I>(selection: I) -> Vec<CharacterId>
where
    I: IntoIterator<Item = &'a CharacterId>,
{
    let selection: BTreeSet<&str> = selection.into_iter().map(String::as_str).collect();
    modifiers::MODIFIERS
        .iter()
        .filter(|m| selection.contains(m.id))
        .map(|m| m.id.to_string())
        .collect()
}

/// Every distribution reachable through some choice of modifier alternatives.
///
/// Only modifiers that are both listed and part of `all_characters` count.
#[must_use]
pub fn target_distributions(
    num_players: usize,
    modifying: &[CharacterId],
    all_characters: &[CharacterInfo],
) -> BTreeSet<Distribution> {
    let base = distribution_for_count(num_players);
    if base == zero_distribution() {
        return BTreeSet::from([base]);
    }
    let active: Vec<&SetupModifier> = modifiers::MODIFIERS
        .iter()
        .filter(|m| modifying.iter().any(|id| id == m.id))
        .filter(|m| all_characters.iter().any(|c| c.id == m.id))
        .collect();
    modifiers::combinations(&active)
        .into_iter()
        .map(|delta| delta.apply(base))
        .collect()
}

/// Role types whose count already meets every target.
#[must_use]
pub fn role_types_definitely_done(
    targets: &BTreeSet<Distribution>,
    actual: &Distribution,
) -> BTreeSet<RoleType> {
    RoleType::COUNTED
        .into_iter()
        .filter(|&t| targets.iter().all(|target| actual.get(t) >= target.get(t)))
        .collect()
}

#[must_use]
pub const fn goes_in_bag(character: &CharacterInfo) -> bool {
    character.role_type.is_counted()
}
