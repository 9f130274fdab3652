//! Scripts: titled character lists resolved against the catalog.

use crate::roles::{
    Catalog, CharacterId, CharacterInfo, RoleType, copy_of, extra_copy_ids, name_to_id,
};
use crate::setup::{
    Distribution, MAX_PLAYERS, MIN_PLAYERS, TEENSYVILLE_MAX_PLAYERS, distribution_for_count,
    zero_distribution,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const META_ID: &str = "_meta";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script lists unknown character {0}")]
    UnknownCharacter(CharacterId),
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("script {0} lists no characters")]
    Empty(String),
}

/// One entry of a script-tool JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Id(String),
    Object {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub title: String,
    pub characters: Vec<CharacterInfo>,
    pub teensyville: bool,
}

impl Script {
    /// Resolve `ids` against the catalog, dropping duplicates.
    ///
    /// Characters that may appear more than once bring their numbered copies
    /// along, so a script listing `villageidiot` also holds `villageidiot-1`
    /// and `villageidiot-2`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownCharacter`] for an id the catalog lacks, and
    /// [`ScriptError::Empty`] when no ids are given.
    pub fn new<S: AsRef<str>>(
        id: impl Into<String>,
        title: impl Into<String>,
        ids: &[S],
        catalog: &Catalog,
    ) -> Result<Self, ScriptError> {
        let id = id.into();
        if ids.is_empty() {
            return Err(ScriptError::Empty(id));
        }
        let mut characters: Vec<CharacterInfo> = Vec::with_capacity(ids.len());
        for raw in ids {
            let info = resolve(catalog, raw.as_ref())?;
            let base = copy_of(&info.id).unwrap_or(info.id.as_str());
            let mut group = vec![catalog.get(base).map_err(|_| unknown(raw.as_ref()))?];
            for copy_id in extra_copy_ids(base) {
                group.push(catalog.get(&copy_id).map_err(|_| unknown(raw.as_ref()))?);
            }
            for member in group {
                if !characters.iter().any(|c| c.id == member.id) {
                    characters.push(member.clone());
                }
            }
        }
        let townsfolk = characters
            .iter()
            .filter(|c| c.role_type == RoleType::Townsfolk && copy_of(&c.id).is_none())
            .count();
        Ok(Self {
            id,
            title: title.into(),
            characters,
            teensyville: townsfolk <= TEENSYVILLE_MAX_PLAYERS,
        })
    }

    /// Parse a script-tool JSON array: id strings, `{id}` objects and an
    /// optional `{"id": "_meta", "name": ...}` title entry.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or unknown characters.
    pub fn from_json(id: &str, json: &str, catalog: &Catalog) -> Result<Self, ScriptError> {
        let entries: Vec<ScriptEntry> = serde_json::from_str(json)?;
        let mut title = None;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                ScriptEntry::Object { id, name } if id == META_ID => title = name,
                ScriptEntry::Id(id) | ScriptEntry::Object { id, .. } => ids.push(id),
            }
        }
        Self::new(id, title.unwrap_or_else(|| id.to_string()), &ids, catalog)
    }

    #[must_use]
    pub const fn min_players(&self) -> usize {
        MIN_PLAYERS
    }

    #[must_use]
    pub const fn max_players(&self) -> usize {
        if self.teensyville {
            TEENSYVILLE_MAX_PLAYERS
        } else {
            MAX_PLAYERS
        }
    }

    #[must_use]
    pub fn clamp_players(&self, num_players: usize) -> usize {
        num_players.clamp(self.min_players(), self.max_players())
    }

    /// Base distribution, or zero for counts this script cannot seat.
    #[must_use]
    pub fn base_distribution(&self, num_players: usize) -> Distribution {
        if (self.min_players()..=self.max_players()).contains(&num_players) {
            distribution_for_count(num_players)
        } else {
            zero_distribution()
        }
    }

    #[must_use]
    pub fn character(&self, id: &str) -> Option<&CharacterInfo> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CharacterId> {
        self.characters.iter().map(|c| &c.id)
    }
}

fn resolve<'a>(catalog: &'a Catalog, raw: &str) -> Result<&'a CharacterInfo, ScriptError> {
    catalog
        .get(raw)
        .or_else(|_| catalog.get(&name_to_id(raw)))
        .map_err(|_| unknown(raw))
}

fn unknown(raw: &str) -> ScriptError {
    ScriptError::UnknownCharacter(raw.to_string())
}
