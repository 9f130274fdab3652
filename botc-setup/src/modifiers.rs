//! Characters that change the setup distribution.
//!
//! Each modifier declares one or more alternative deltas. The first
//! alternative is the one assumed when a single effective distribution is
//! needed; target ranges consider all of them.

use crate::setup::Distribution;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DistributionDelta {
    pub townsfolk: i8,
    pub outsider: i8,
    pub minion: i8,
    pub demon: i8,
}

impl DistributionDelta {
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    #[must_use]
    pub const fn new(townsfolk: i8, outsider: i8, minion: i8, demon: i8) -> Self {
        Self {
            townsfolk,
            outsider,
            minion,
            demon,
        }
    }

    /// Swap `n` townsfolk for outsiders (negative `n` swaps back).
    #[must_use]
    pub const fn outsiders(n: i8) -> Self {
        Self::new(-n, n, 0, 0)
    }

    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self::new(
            self.townsfolk.saturating_add(other.townsfolk),
            self.outsider.saturating_add(other.outsider),
            self.minion.saturating_add(other.minion),
            self.demon.saturating_add(other.demon),
        )
    }

    /// Shift a distribution without taking any count below zero.
    ///
    /// A loss larger than the available count is cut down to that count, and
    /// the gains it pays for shrink by the same amount so the total holds.
    #[must_use]
    pub fn apply(self, dist: Distribution) -> Distribution {
        let counts = [dist.townsfolk, dist.outsider, dist.minion, dist.demon].map(i16::from);
        let mut deltas = [self.townsfolk, self.outsider, self.minion, self.demon].map(i16::from);

        let mut shortfall = 0;
        for (delta, count) in deltas.iter_mut().zip(counts) {
            if *delta < -count {
                shortfall += -*delta - count;
                *delta = -count;
            }
        }
        for delta in deltas.iter_mut().filter(|d| **d > 0) {
            let cut = (*delta).min(shortfall);
            *delta -= cut;
            shortfall -= cut;
        }

        let shifted: [u8; 4] = std::array::from_fn(|i| {
            u8::try_from(counts[i] + deltas[i]).unwrap_or(u8::MAX)
        });
        Distribution::new(shifted[0], shifted[1], shifted[2], shifted[3])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupModifier {
    pub id: &'static str,
    pub description: &'static str,
    pub alternatives: &'static [DistributionDelta],
}

impl SetupModifier {
    #[must_use]
    pub fn default_delta(&self) -> DistributionDelta {
        self.alternatives
            .first()
            .copied()
            .unwrap_or(DistributionDelta::NONE)
    }
}

/// Declared modifiers, in application order.
pub const MODIFIERS: &[SetupModifier] = &[
    SetupModifier {
        id: "baron",
        description: "+2 Outsiders",
        alternatives: &[DistributionDelta::outsiders(2)],
    },
    SetupModifier {
        id: "godfather",
        description: "-1 or +1 Outsider",
        alternatives: &[DistributionDelta::outsiders(1), DistributionDelta::outsiders(-1)],
    },
    SetupModifier {
        id: "fanggu",
        description: "+1 Outsider",
        alternatives: &[DistributionDelta::outsiders(1)],
    },
    SetupModifier {
        id: "vigormortis",
        description: "-1 Outsider",
        alternatives: &[DistributionDelta::outsiders(-1)],
    },
    SetupModifier {
        id: "balloonist",
        description: "+0 or +1 Outsider",
        alternatives: &[DistributionDelta::outsiders(1), DistributionDelta::NONE],
    },
    SetupModifier {
        id: "hermit",
        description: "-0 or -1 Outsider",
        alternatives: &[DistributionDelta::outsiders(-1), DistributionDelta::NONE],
    },
    SetupModifier {
        id: "sentinel",
        description: "+1, +0 or -1 Outsider",
        alternatives: &[
            DistributionDelta::outsiders(1),
            DistributionDelta::NONE,
            DistributionDelta::outsiders(-1),
        ],
    },
    SetupModifier {
        id: "lordoftyphon",
        description: "+1 Minion",
        alternatives: &[DistributionDelta::new(-1, 0, 1, 0)],
    },
    SetupModifier {
        id: "lilmonsta",
        description: "+1 Minion, no Demon in the bag",
        alternatives: &[DistributionDelta::new(0, 0, 1, -1)],
    },
    SetupModifier {
        id: "summoner",
        description: "No Demon, +1 Townsfolk",
        alternatives: &[DistributionDelta::new(1, 0, 0, -1)],
    },
];

#[must_use]
pub fn modifier_for(id: &str) -> Option<&'static SetupModifier> {
    MODIFIERS.iter().find(|m| m.id == id)
}

#[must_use]
pub fn is_modifier(id: &str) -> bool {
    modifier_for(id).is_some()
}

/// Every summed delta reachable by picking one alternative per modifier.
#[must_use]
pub fn combinations(modifiers: &[&SetupModifier]) -> SmallVec<[DistributionDelta; 8]> {
    let mut sums: SmallVec<[DistributionDelta; 8]> = smallvec![DistributionDelta::NONE];
    for modifier in modifiers {
        sums = sums
            .iter()
            .flat_map(|sum| modifier.alternatives.iter().map(move |alt| sum.plus(*alt)))
            .collect();
    }
    sums
}
