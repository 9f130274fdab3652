//! Per-script session state: player count, ranking and selection.

use crate::bag::{Ranking, random_ranking, random_setup, sort_bag, split_selected_chars};
use crate::roles::{CharacterId, CharacterInfo, RoleType};
use crate::script::Script;
use crate::selection::{SelAction, Selection, SelectionReducer, create_selection_reducer};
use crate::setup::{
    Distribution, actual_distribution, effective_distribution, modifying_characters,
    role_types_definitely_done, target_distributions,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_PLAYERS: usize = 8;

/// What gets persisted for a script, keyed by script id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(rename = "scriptTitle", default)]
    pub script_title: String,
    #[serde(rename = "numPlayers")]
    pub num_players: usize,
    pub ranking: Ranking,
    pub selection: Vec<CharacterId>,
}

/// Trait for abstracting session persistence
/// Platform-specific implementations should provide this
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the state for a script
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save_state(&self, script_id: &str, state: &SavedState) -> Result<(), Self::Error>;

    /// Load the state for a script, if any was saved
    ///
    /// # Errors
    ///
    /// Returns an error if stored state exists but cannot be read.
    fn load_state(&self, script_id: &str) -> Result<Option<SavedState>, Self::Error>;

    /// Forget the state for a script
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be deleted.
    fn delete_state(&self, script_id: &str) -> Result<(), Self::Error>;
}

/// Everything a view needs to present the current setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupSummary {
    pub num_players: usize,
    pub base: Distribution,
    pub targets: BTreeSet<Distribution>,
    pub actual: Distribution,
    pub effective: Distribution,
    pub done: BTreeSet<RoleType>,
    pub bag: Vec<CharacterId>,
    pub not_in_bag: Vec<CharacterId>,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    script: Script,
    reducer: SelectionReducer,
    num_players: usize,
    ranking: Ranking,
    selection: Selection,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(script: Script, rng: &mut R) -> Self {
        let reducer = create_selection_reducer(&script.characters);
        let selection = reducer.reduce(&Selection::new(), &SelAction::Clear);
        let ranking = random_ranking(&script.characters, rng);
        let num_players = script.clamp_players(DEFAULT_PLAYERS);
        Self {
            script,
            reducer,
            num_players,
            ranking,
            selection,
        }
    }

    #[must_use]
    pub const fn script(&self) -> &Script {
        &self.script
    }

    #[must_use]
    pub const fn num_players(&self) -> usize {
        self.num_players
    }

    #[must_use]
    pub const fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dispatch(&mut self, action: &SelAction) {
        self.selection = self.reducer.reduce(&self.selection, action);
    }

    /// Set the player count, clamped to what the script can seat.
    pub fn set_num_players(&mut self, num_players: usize) -> usize {
        self.num_players = self.script.clamp_players(num_players);
        self.num_players
    }

    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.ranking = random_ranking(&self.script.characters, rng);
    }

    pub fn random_setup<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.selection = random_setup(
            &self.script.characters,
            &self.selection,
            self.num_players,
            &self.reducer,
            rng,
        );
    }

    fn selected_characters(&self) -> impl Iterator<Item = &CharacterInfo> {
        self.script
            .characters
            .iter()
            .filter(|c| self.selection.contains(&c.id))
    }

    #[must_use]
    pub fn summary(&self) -> SetupSummary {
        let targets = target_distributions(
            self.num_players,
            &modifying_characters(&self.selection),
            &self.script.characters,
        );
        let actual = actual_distribution(self.selected_characters());
        let effective = effective_distribution(self.num_players, self.selected_characters());
        let done = role_types_definitely_done(&targets, &actual);
        let mut split =
            split_selected_chars(&self.script.characters, &self.selection, self.num_players);
        sort_bag(&mut split.bag, &self.ranking);
        SetupSummary {
            num_players: self.num_players,
            base: self.script.base_distribution(self.num_players),
            targets,
            actual,
            effective,
            done,
            complete: split.is_complete(self.num_players),
            bag: split.bag,
            not_in_bag: split.not_in_bag,
        }
    }

    #[must_use]
    pub fn to_saved(&self) -> SavedState {
        SavedState {
            script_title: self.script.title.clone(),
            num_players: self.num_players,
            ranking: self.ranking.clone(),
            selection: self.selection.iter().cloned().collect(),
        }
    }

    /// Restore saved state; the selection goes back through the reducer so the
    /// inclusion rules hold for the current script.
    pub fn restore(&mut self, saved: SavedState) {
        self.set_num_players(saved.num_players);
        if !saved.ranking.is_empty() {
            self.ranking = saved.ranking;
        }
        self.dispatch(&SelAction::SetAll {
            ids: saved.selection,
        });
    }
}
