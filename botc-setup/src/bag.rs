//! Bag assembly: which selected characters go in the bag, and in what order.

use crate::roles::{CharacterId, CharacterInfo, RoleType};
use crate::selection::{SelAction, Selection, SelectionReducer};
use crate::setup::{
    Distribution, actual_distribution, distribution_for_count, goes_in_bag, modifying_characters,
    target_distributions, zero_distribution,
};
use log::{debug, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A full ordering over a script's character ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranking(pub Vec<CharacterId>);

impl Ranking {
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|r| r == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CharacterId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BagSplit {
    pub bag: Vec<CharacterId>,
    pub not_in_bag: Vec<CharacterId>,
}

impl BagSplit {
    /// A bag is complete once it seats exactly `num_players`.
    #[must_use]
    pub fn is_complete(&self, num_players: usize) -> bool {
        self.bag.len() == num_players
    }
}

/// Partition the selection, in script order, into the bag and the
/// fabled/traveller characters that never occupy a seat.
#[must_use]
pub fn split_selected_chars(
    all_characters: &[CharacterInfo],
    selection: &Selection,
    num_players: usize,
) -> BagSplit {
    let mut split = BagSplit::default();
    for c in all_characters.iter().filter(|c| selection.contains(&c.id)) {
        if goes_in_bag(c) {
            split.bag.push(c.id.clone());
        } else {
            split.not_in_bag.push(c.id.clone());
        }
    }
    for id in selection {
        if !all_characters.iter().any(|c| &c.id == id) {
            warn!("selected character {id} is not on the script");
        }
    }
    debug!("bag holds {} of {num_players} players", split.bag.len());
    split
}

/// Reorder `bag` to follow `ranking`; unranked ids keep their order at the end.
pub fn sort_bag(bag: &mut [CharacterId], ranking: &Ranking) {
    let positions: HashMap<&str, usize> = ranking
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    bag.sort_by_key(|id| positions.get(id.as_str()).copied().unwrap_or(usize::MAX));
}

/// Uniformly random permutation of the characters' ids.
pub fn random_ranking<R: Rng + ?Sized>(characters: &[CharacterInfo], rng: &mut R) -> Ranking {
    let mut ids: Vec<CharacterId> = characters.iter().map(|c| c.id.clone()).collect();
    ids.shuffle(rng);
    Ranking(ids)
}

#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Evil first, so setup modifiers are settled before the good counts.
const FILL_ORDER: [RoleType; 4] = [
    RoleType::Minion,
    RoleType::Demon,
    RoleType::Outsider,
    RoleType::Townsfolk,
];

fn selected_distribution(characters: &[CharacterInfo], selection: &Selection) -> Distribution {
    actual_distribution(characters.iter().filter(|c| selection.contains(&c.id)))
}

fn within(actual: &Distribution, target: &Distribution) -> bool {
    RoleType::COUNTED
        .into_iter()
        .all(|r| actual.get(r) <= target.get(r))
}

/// Draw a target, preferring ones the current selection does not overshoot.
fn pick_target<R: Rng + ?Sized>(
    characters: &[CharacterInfo],
    selection: &Selection,
    num_players: usize,
    rng: &mut R,
) -> Distribution {
    let actual = selected_distribution(characters, selection);
    let targets: Vec<Distribution> =
        target_distributions(num_players, &modifying_characters(selection), characters)
            .into_iter()
            .collect();
    let reachable: Vec<Distribution> = targets
        .iter()
        .copied()
        .filter(|t| within(&actual, t))
        .collect();
    let pool = if reachable.is_empty() {
        &targets
    } else {
        &reachable
    };
    pool.choose(rng)
        .copied()
        .unwrap_or_else(|| distribution_for_count(num_players))
}

/// Whether the selection after a pick can still land on a target.
///
/// Picks that pull in companions may overshoot; picks that change the
/// modifiers are checked against the new target range instead.
fn pick_fits(
    characters: &[CharacterInfo],
    before: &[CharacterId],
    after: &Selection,
    num_players: usize,
    target: &Distribution,
) -> bool {
    let actual = selected_distribution(characters, after);
    let modifiers = modifying_characters(after);
    if modifiers == before {
        within(&actual, target)
    } else {
        target_distributions(num_players, &modifiers, characters)
            .iter()
            .any(|t| within(&actual, t))
    }
}

/// Fill the selection with random characters up to a target distribution.
///
/// Existing selections are kept. Whenever a pick changes the set of selected
/// modifiers, a new target is drawn from the updated range.
pub fn random_setup<R: Rng + ?Sized>(
    characters: &[CharacterInfo],
    selection: &Selection,
    num_players: usize,
    reducer: &SelectionReducer,
    rng: &mut R,
) -> Selection {
    let mut next = selection.clone();
    reducer.close(&mut next);
    if distribution_for_count(num_players) == zero_distribution() {
        return next;
    }

    let mut target = pick_target(characters, &next, num_players, rng);
    let mut exhausted: BTreeSet<RoleType> = BTreeSet::new();
    loop {
        let actual = selected_distribution(characters, &next);
        let Some(short) = FILL_ORDER
            .into_iter()
            .find(|t| !exhausted.contains(t) && actual.get(*t) < target.get(*t))
        else {
            break;
        };
        let modifiers_before = modifying_characters(&next);
        let candidates: Vec<Selection> = characters
            .iter()
            .filter(|c| c.role_type == short && !next.contains(&c.id))
            .map(|c| reducer.reduce(&next, &SelAction::toggle(c.id.clone())))
            .filter(|after| pick_fits(characters, &modifiers_before, after, num_players, &target))
            .collect();
        let Some(pick) = candidates.choose(rng) else {
            debug!("no {short} left to reach target {target}");
            exhausted.insert(short);
            continue;
        };
        debug!(
            "random setup adds {:?} toward {target}",
            pick.difference(&next).collect::<Vec<_>>()
        );
        next = pick.clone();
        if modifying_characters(&next) != modifiers_before {
            target = pick_target(characters, &next, num_players, rng);
            exhausted.clear();
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Edition;
    use crate::selection::{bluffs_reducer, create_selection_reducer, initial_selection};

    fn ch(id: &str, role_type: RoleType) -> CharacterInfo {
        CharacterInfo::new(id, id, role_type, Edition::Other)
    }

    fn ids(ids: &[&str]) -> Vec<CharacterId> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    fn script() -> Vec<CharacterInfo> {
        vec![
            ch("washerwoman", RoleType::Townsfolk),
            ch("librarian", RoleType::Townsfolk),
            ch("investigator", RoleType::Townsfolk),
            ch("chef", RoleType::Townsfolk),
            ch("empath", RoleType::Townsfolk),
            ch("monk", RoleType::Townsfolk),
            ch("butler", RoleType::Outsider),
            ch("saint", RoleType::Outsider),
            ch("recluse", RoleType::Outsider),
            ch("poisoner", RoleType::Minion),
            ch("spy", RoleType::Minion),
            ch("imp", RoleType::Demon),
            ch("sentinel", RoleType::Fabled),
            ch("beggar", RoleType::Traveller),
        ]
    }

    #[test]
    fn split_keeps_special_characters_out() {
        let selection: Selection = ids(&["imp", "chef", "sentinel", "beggar", "spy"])
            .into_iter()
            .collect();
        let split = split_selected_chars(&script(), &selection, 5);
        assert_eq!(split.bag, ids(&["chef", "spy", "imp"]));
        assert_eq!(split.not_in_bag, ids(&["sentinel", "beggar"]));
        assert_eq!(split.bag.len() + split.not_in_bag.len(), selection.len());
        assert!(!split.is_complete(5));
        assert!(split.is_complete(3));
    }

    #[test]
    fn sort_follows_ranking() {
        let ranking = Ranking(ids(&["spy", "chef", "imp", "monk"]));
        let mut bag = ids(&["imp", "monk", "spy"]);
        sort_bag(&mut bag, &ranking);
        assert_eq!(bag, ids(&["spy", "imp", "monk"]));
    }

    #[test]
    fn sort_puts_unranked_last_in_order() {
        let ranking = Ranking(ids(&["imp"]));
        let mut bag = ids(&["saint", "imp", "butler"]);
        sort_bag(&mut bag, &ranking);
        assert_eq!(bag, ids(&["imp", "saint", "butler"]));
    }

    #[test]
    fn random_ranking_is_a_permutation() {
        let chars = script();
        let mut rng = seeded_rng(7);
        let ranking = random_ranking(&chars, &mut rng);
        let mut sorted = ranking.0.clone();
        sorted.sort();
        let mut expected: Vec<CharacterId> = chars.iter().map(|c| c.id.clone()).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn random_ranking_is_reproducible_per_seed() {
        let chars = script();
        let a = random_ranking(&chars, &mut seeded_rng(42));
        let b = random_ranking(&chars, &mut seeded_rng(42));
        assert_eq!(a, b);
        let distinct: BTreeSet<Vec<CharacterId>> = (0..20)
            .map(|seed| random_ranking(&chars, &mut seeded_rng(seed)).0)
            .collect();
        assert!(distinct.len() > 15);
    }

    #[test]
    fn random_setup_reaches_base_distribution() {
        let chars = script();
        let reducer = create_selection_reducer(&chars);
        for seed in 0..10 {
            let filled = random_setup(
                &chars,
                &initial_selection(&chars),
                7,
                &reducer,
                &mut seeded_rng(seed),
            );
            let split = split_selected_chars(&chars, &filled, 7);
            assert!(split.is_complete(7), "seed {seed}: {:?}", split.bag);
            assert!(filled.contains("imp"));
            assert!(filled.contains("sentinel"));
        }
    }

    #[test]
    fn random_setup_keeps_existing_picks() {
        let chars = script();
        let start: Selection = ids(&["saint", "poisoner"]).into_iter().collect();
        let filled = random_setup(&chars, &start, 6, &bluffs_reducer(), &mut seeded_rng(3));
        assert!(filled.is_superset(&start));
        let actual = actual_distribution(chars.iter().filter(|c| filled.contains(&c.id)));
        assert_eq!(actual, distribution_for_count(6));
    }

    #[test]
    fn random_setup_retries_skipped_types_after_target_changes() {
        let chars = vec![
            ch("t0", RoleType::Townsfolk),
            ch("t1", RoleType::Townsfolk),
            ch("t2", RoleType::Townsfolk),
            ch("t3", RoleType::Townsfolk),
            ch("balloonist", RoleType::Townsfolk),
            ch("o0", RoleType::Outsider),
            ch("m0", RoleType::Minion),
            ch("vigormortis", RoleType::Demon),
        ];
        let start: Selection = ids(&["t0", "t1", "t2", "t3", "o0"]).into_iter().collect();
        // the vigormortis only fits once the balloonist widens the outsider count
        let filled = random_setup(&chars, &start, 8, &bluffs_reducer(), &mut seeded_rng(5));
        assert!(filled.contains("balloonist"));
        assert!(filled.contains("vigormortis"));
        let actual = actual_distribution(chars.iter().filter(|c| filled.contains(&c.id)));
        assert_eq!(actual, distribution_for_count(8));
    }

    #[test]
    fn random_setup_stops_when_candidates_run_out() {
        let chars = script();
        let filled = random_setup(&chars, &Selection::new(), 15, &bluffs_reducer(), &mut seeded_rng(1));
        let actual = actual_distribution(chars.iter().filter(|c| filled.contains(&c.id)));
        // only six townsfolk and two minions exist
        assert_eq!(actual, Distribution::new(6, 2, 2, 1));
    }

    #[test]
    fn random_setup_ignores_out_of_range_counts() {
        let chars = script();
        let filled = random_setup(&chars, &Selection::new(), 3, &bluffs_reducer(), &mut seeded_rng(1));
        assert!(filled.is_empty());
    }
}
