//! Blood on the Clocktower setup engine
//!
//! Platform-agnostic core logic for building a game setup: character catalog,
//! setup distributions, selection rules and the randomized bag.
//! This crate provides no rendering, storage or network access of its own.

pub mod bag;
pub mod modifiers;
pub mod nightsheet;
pub mod roles;
pub mod script;
pub mod selection;
pub mod session;
pub mod setup;

// Re-export commonly used types
pub use bag::{
    BagSplit, Ranking, random_ranking, random_setup, seeded_rng, sort_bag, split_selected_chars,
};
pub use modifiers::{DistributionDelta, MODIFIERS, SetupModifier, is_modifier, modifier_for};
pub use nightsheet::night_order;
pub use roles::{
    Catalog, CatalogData, CatalogError, CatalogSource, CharacterId, CharacterInfo, Edition,
    EXTRA_COPIES, NightAction, NightSheet, OnlineRole, OverrideEntry, Overrides, RoleType,
    ScriptRole, copy_of, extra_copy_ids, name_to_id,
};
pub use script::{Script, ScriptError};
pub use selection::{
    SelAction, Selection, SelectionReducer, bluffs_reducer, create_selection_reducer,
    initial_selection, required_selection,
};
pub use session::{DEFAULT_PLAYERS, SavedState, Session, SessionStore, SetupSummary};
pub use setup::{
    Distribution, actual_distribution, distribution_for_count, effective_distribution,
    goes_in_bag, modifying_characters, role_types_definitely_done, target_distributions,
    zero_distribution,
};

use rand::Rng;

/// Ties a loaded catalog to session persistence
pub struct SetupEngine<S>
where
    S: SessionStore,
{
    catalog: Catalog,
    storage: S,
}

impl<S> SetupEngine<S>
where
    S: SessionStore,
{
    /// Create an engine around an already built catalog
    pub const fn new(catalog: Catalog, storage: S) -> Self {
        Self { catalog, storage }
    }

    /// Build the catalog once from a data source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog data cannot be loaded.
    pub fn load<L: CatalogSource>(source: &L, storage: S) -> Result<Self, L::Error> {
        Ok(Self::new(Catalog::load(source)?, storage))
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parse a script-tool JSON document against this engine's catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the script is malformed or lists unknown characters.
    pub fn script_from_json(&self, id: &str, json: &str) -> Result<Script, ScriptError> {
        Script::from_json(id, json, &self.catalog)
    }

    /// Open a session for a script, restoring saved state when present
    ///
    /// # Errors
    ///
    /// Returns an error if saved state exists but cannot be loaded.
    pub fn open_session<R: Rng + ?Sized>(
        &self,
        script: Script,
        rng: &mut R,
    ) -> Result<Session, S::Error> {
        let saved = self.storage.load_state(&script.id)?;
        let mut session = Session::new(script, rng);
        if let Some(saved) = saved {
            session.restore(saved);
        }
        Ok(session)
    }

    /// Save a session under its script id
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn save_session(&self, session: &Session) -> Result<(), S::Error> {
        self.storage
            .save_state(&session.script().id, &session.to_saved())
    }

    /// Drop any saved state for a script
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be deleted.
    pub fn forget_session(&self, script_id: &str) -> Result<(), S::Error> {
        self.storage.delete_state(script_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CatalogSource for FixtureLoader {
        type Error = Infallible;

        fn load_catalog_data(&self) -> Result<CatalogData, Self::Error> {
            let roles = [
                ("chef", "townsfolk"),
                ("empath", "townsfolk"),
                ("monk", "townsfolk"),
                ("mayor", "townsfolk"),
                ("soldier", "townsfolk"),
                ("saint", "outsider"),
                ("poisoner", "minion"),
                ("imp", "demon"),
            ];
            Ok(CatalogData {
                script_roles: roles
                    .iter()
                    .map(|(id, role_type)| ScriptRole {
                        id: (*id).to_string(),
                        name: (*id).to_string(),
                        role_type: (*role_type).to_string(),
                        version: "1 - Trouble Brewing".to_string(),
                    })
                    .collect(),
                ..CatalogData::default()
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, SavedState>>>,
    }

    impl SessionStore for MemoryStorage {
        type Error = Infallible;

        fn save_state(&self, script_id: &str, state: &SavedState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(script_id.to_string(), state.clone());
            Ok(())
        }

        fn load_state(&self, script_id: &str) -> Result<Option<SavedState>, Self::Error> {
            Ok(self.saves.borrow().get(script_id).cloned())
        }

        fn delete_state(&self, script_id: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(script_id);
            Ok(())
        }
    }

    const SCRIPT: &str = r#"[{"id": "_meta", "name": "Tiny"}, "chef", "empath", "monk", "mayor", "soldier", "saint", "poisoner", "imp"]"#;

    #[test]
    fn engine_opens_and_roundtrips_sessions() {
        let storage = MemoryStorage::default();
        let engine = SetupEngine::load(&FixtureLoader, storage.clone()).unwrap();
        let script = engine.script_from_json("tiny", SCRIPT).unwrap();
        assert_eq!(script.title, "Tiny");

        let mut session = engine
            .open_session(script.clone(), &mut seeded_rng(11))
            .unwrap();
        assert_eq!(session.num_players(), 6);
        session.dispatch(&SelAction::toggle("saint"));
        engine.save_session(&session).unwrap();

        let reopened = engine.open_session(script.clone(), &mut seeded_rng(12)).unwrap();
        assert_eq!(reopened.selection(), session.selection());
        assert_eq!(reopened.ranking(), session.ranking());

        engine.forget_session("tiny").unwrap();
        assert!(storage.load_state("tiny").unwrap().is_none());
        let fresh = engine.open_session(script, &mut seeded_rng(12)).unwrap();
        assert_eq!(fresh.selection().len(), 1);
    }

    #[test]
    fn engine_catalog_includes_info_records() {
        let engine = SetupEngine::load(&FixtureLoader, MemoryStorage::default()).unwrap();
        assert!(engine.catalog().contains(roles::MINION_INFO_ID));
        assert!(engine.catalog().get("imp").unwrap().evil());
        assert!(engine.script_from_json("bad", r#"["ghost"]"#).is_err());
    }
}
