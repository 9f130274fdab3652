//! Character catalog.
//!
//! The catalog joins three external data sets: the script tool's role list
//! (identity and role type), the online tool's role list (ability text and
//! night reminders) and the script tool's night sheet (global night order).
//! A small override table replaces individual texts.

use log::{error, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

pub type CharacterId = String;

/// Id of the synthetic first-night "Minion Info" record.
pub const MINION_INFO_ID: &str = "MINION";
/// Id of the synthetic first-night "Demon Info" record.
pub const DEMON_INFO_ID: &str = "DEMON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
    Fabled,
    Traveller,
}

impl RoleType {
    /// Role types that count toward the player distribution.
    pub const COUNTED: [Self; 4] = [Self::Townsfolk, Self::Outsider, Self::Minion, Self::Demon];

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "townsfolk" => Some(Self::Townsfolk),
            "outsider" => Some(Self::Outsider),
            "minion" => Some(Self::Minion),
            "demon" => Some(Self::Demon),
            "fabled" => Some(Self::Fabled),
            "travellers" | "traveller" => Some(Self::Traveller),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Townsfolk => "townsfolk",
            Self::Outsider => "outsider",
            Self::Minion => "minion",
            Self::Demon => "demon",
            Self::Fabled => "fabled",
            Self::Traveller => "traveller",
        }
    }

    /// Whether characters of this type occupy a seat in the bag.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        !matches!(self, Self::Fabled | Self::Traveller)
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Tb,
    Bmr,
    Snv,
    Other,
}

impl Edition {
    #[must_use]
    pub fn from_version(version: &str) -> Self {
        match version {
            "1 - Trouble Brewing" => Self::Tb,
            "2 - Bad Moon Rising" => Self::Bmr,
            "3 - Sects and Violets" => Self::Snv,
            _ => Self::Other,
        }
    }
}

/// Storyteller instruction for one night, with its position in the night sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAction {
    pub details: String,
    /// Position in the night sheet, or [`NightAction::NOT_FOUND`].
    pub index: i32,
}

impl NightAction {
    pub const NOT_FOUND: i32 = -1;

    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.index >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub id: CharacterId,
    pub name: String,
    pub role_type: RoleType,
    pub edition: Edition,
    pub ability: Option<String>,
    pub first_night: Option<NightAction>,
    pub other_nights: Option<NightAction>,
}

impl CharacterInfo {
    #[must_use]
    pub fn new(
        id: impl Into<CharacterId>,
        name: impl Into<String>,
        role_type: RoleType,
        edition: Edition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role_type,
            edition,
            ability: None,
            first_night: None,
            other_nights: None,
        }
    }

    #[must_use]
    pub const fn good(&self) -> bool {
        matches!(self.role_type, RoleType::Townsfolk | RoleType::Outsider)
    }

    #[must_use]
    pub const fn evil(&self) -> bool {
        matches!(self.role_type, RoleType::Minion | RoleType::Demon)
    }

    #[must_use]
    pub const fn special(&self) -> bool {
        !self.role_type.is_counted()
    }

    #[must_use]
    pub const fn night_details(&self, first_night: bool) -> Option<&NightAction> {
        if first_night {
            self.first_night.as_ref()
        } else {
            self.other_nights.as_ref()
        }
    }
}

/// Normalize a character name (or loosely formatted id) to a catalog id.
#[must_use]
pub fn name_to_id(name: &str) -> CharacterId {
    // constant pattern, compiled once
    static SEPARATORS: OnceLock<Option<Regex>> = OnceLock::new();
    let lower = name.to_lowercase();
    SEPARATORS
        .get_or_init(|| Regex::new(r"[ '\-_]").ok())
        .as_ref()
        .map_or_else(
            || lower.chars().filter(|c| !" '-_".contains(*c)).collect(),
            |re| re.replace_all(&lower, "").into_owned(),
        )
}

/// Characters a script may hold more than once, with the number of extra copies.
pub const EXTRA_COPIES: &[(&str, usize)] = &[("villageidiot", 2)];

/// Ids of the numbered extra copies of `id`, e.g. `villageidiot-1`.
#[must_use]
pub fn extra_copy_ids(id: &str) -> Vec<CharacterId> {
    EXTRA_COPIES
        .iter()
        .find(|(base, _)| *base == id)
        .map(|(base, copies)| (1..=*copies).map(|n| format!("{base}-{n}")).collect())
        .unwrap_or_default()
}

/// The character an extra copy duplicates, or `None` for ordinary ids.
#[must_use]
pub fn copy_of(id: &str) -> Option<&'static str> {
    let (base, n) = id.rsplit_once('-')?;
    let n: usize = n.parse().ok()?;
    EXTRA_COPIES
        .iter()
        .find(|(b, copies)| *b == base && (1..=*copies).contains(&n))
        .map(|(b, _)| *b)
}

/// Role entry from the script tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRole {
    pub id: String,
    pub name: String,
    #[serde(rename = "roleType")]
    pub role_type: String,
    #[serde(default)]
    pub version: String,
}

/// Role entry from the online tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineRole {
    pub id: String,
    #[serde(default)]
    pub ability: String,
    #[serde(rename = "firstNightReminder", default)]
    pub first_night_reminder: String,
    #[serde(rename = "otherNightReminder", default)]
    pub other_night_reminder: String,
}

/// Global night ordering by character name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NightSheet {
    #[serde(rename = "firstNight", default)]
    pub first_night: Vec<String>,
    #[serde(rename = "otherNight", default)]
    pub other_night: Vec<String>,
}

impl NightSheet {
    #[must_use]
    pub fn index_of(&self, name: &str, first_night: bool) -> i32 {
        let order = if first_night {
            &self.first_night
        } else {
            &self.other_night
        };
        order
            .iter()
            .position(|n| n == name)
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(NightAction::NOT_FOUND)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverrideEntry {
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(rename = "firstNight", default)]
    pub first_night: Option<String>,
    #[serde(rename = "otherNights", default)]
    pub other_nights: Option<String>,
}

/// App-provided replacements for ability and night texts, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Overrides(pub BTreeMap<CharacterId, OverrideEntry>);

impl Overrides {
    #[must_use]
    pub fn ability(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(|o| o.ability.as_deref())
    }

    #[must_use]
    pub fn first_night(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(|o| o.first_night.as_deref())
    }

    #[must_use]
    pub fn other_nights(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(|o| o.other_nights.as_deref())
    }
}

/// Everything needed to build a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogData {
    pub script_roles: Vec<ScriptRole>,
    pub online_roles: Vec<OnlineRole>,
    pub night_sheet: NightSheet,
    pub overrides: Overrides,
}

/// Platform-specific source of catalog data.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the raw catalog inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if any input cannot be read or parsed.
    fn load_catalog_data(&self) -> Result<CatalogData, Self::Error>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only character metadata, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    characters: BTreeMap<CharacterId, CharacterInfo>,
}

impl Catalog {
    /// Join the catalog inputs by id.
    #[must_use]
    pub fn build(data: &CatalogData) -> Self {
        let mut characters = BTreeMap::new();

        for role in &data.script_roles {
            let id = name_to_id(&role.id);
            let Some(role_type) = RoleType::parse(&role.role_type) else {
                warn!("invalid role {} for {id}", role.role_type);
                continue;
            };
            let info = CharacterInfo::new(
                id.clone(),
                role.name.clone(),
                role_type,
                Edition::from_version(&role.version),
            );
            characters.insert(id, info);
        }

        let overrides = &data.overrides;
        for role in &data.online_roles {
            // renamed characters are only known to the online tool
            let Some(info) = characters.get_mut(&role.id) else {
                continue;
            };
            info.ability = Some(
                overrides
                    .ability(&role.id)
                    .unwrap_or(&role.ability)
                    .to_string(),
            );
            if !role.first_night_reminder.is_empty() {
                let details = overrides
                    .first_night(&role.id)
                    .unwrap_or(&role.first_night_reminder);
                info.first_night = Some(night_action(&data.night_sheet, info, details, true));
            }
            if !role.other_night_reminder.is_empty() {
                let details = overrides
                    .other_nights(&role.id)
                    .unwrap_or(&role.other_night_reminder);
                info.other_nights = Some(night_action(&data.night_sheet, info, details, false));
            }
        }

        let online_ids: HashSet<&str> = data.online_roles.iter().map(|r| r.id.as_str()).collect();
        for (id, entry) in &overrides.0 {
            if online_ids.contains(id.as_str()) {
                continue;
            }
            let Some(info) = characters.get_mut(id) else {
                error!("override info for unknown id {id}");
                continue;
            };
            if let Some(ability) = &entry.ability {
                info.ability = Some(ability.clone());
            }
        }

        for (base, _) in EXTRA_COPIES {
            let Some(info) = characters.get(*base).cloned() else {
                continue;
            };
            for copy_id in extra_copy_ids(base) {
                // one night-sheet step covers every copy
                let copy = CharacterInfo {
                    id: copy_id.clone(),
                    first_night: None,
                    other_nights: None,
                    ..info.clone()
                };
                characters.insert(copy_id, copy);
            }
        }

        characters.insert(
            MINION_INFO_ID.to_string(),
            minion_info(&data.night_sheet),
        );
        characters.insert(DEMON_INFO_ID.to_string(), demon_info(&data.night_sheet));

        Self { characters }
    }

    /// Parse the catalog inputs from JSON documents and build.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] naming the first malformed document.
    pub fn from_json(
        script_roles: &str,
        online_roles: &str,
        night_sheet: &str,
        overrides: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let data = CatalogData {
            script_roles: parse_json("script roles", script_roles)?,
            online_roles: parse_json("online roles", online_roles)?,
            night_sheet: parse_json("night sheet", night_sheet)?,
            overrides: overrides
                .map(|json| parse_json("overrides", json))
                .transpose()?
                .unwrap_or_default(),
        };
        Ok(Self::build(&data))
    }

    /// Build from a platform data source.
    ///
    /// # Errors
    ///
    /// Propagates the source's load error.
    pub fn load<L: CatalogSource>(source: &L) -> Result<Self, L::Error> {
        source.load_catalog_data().map(|data| Self::build(&data))
    }

    /// Look up a character.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCharacter`] for ids the catalog does not know.
    pub fn get(&self, id: &str) -> Result<&CharacterInfo, CatalogError> {
        self.characters
            .get(id)
            .ok_or_else(|| CatalogError::UnknownCharacter(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.characters.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterInfo> {
        self.characters.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    what: &'static str,
    json: &str,
) -> Result<T, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse { what, source })
}

fn night_action(
    sheet: &NightSheet,
    info: &CharacterInfo,
    details: &str,
    first_night: bool,
) -> NightAction {
    let index = sheet.index_of(&info.name, first_night);
    if index < 0 && info.role_type != RoleType::Traveller {
        warn!("{} not found in night sheet", info.id);
    }
    NightAction {
        details: details.to_string(),
        index,
    }
}

fn minion_info(sheet: &NightSheet) -> CharacterInfo {
    let mut info = CharacterInfo::new(MINION_INFO_ID, "Minion Info", RoleType::Minion, Edition::Other);
    info.first_night = Some(NightAction {
        details: "If there are 7 or more players: Wake all Minions. Show the THIS IS THE DEMON token. Point to the Demon.".to_string(),
        index: sheet.index_of(MINION_INFO_ID, true),
    });
    info
}

fn demon_info(sheet: &NightSheet) -> CharacterInfo {
    let mut info = CharacterInfo::new(DEMON_INFO_ID, "Demon Info", RoleType::Demon, Edition::Other);
    info.first_night = Some(NightAction {
        details: "If there are 7 or more players: Wake the Demon. Show the THESE ARE YOUR MINIONS token. Point to all Minions. Show THESE CHARACTERS ARE NOT IN PLAY and three bluffs.".to_string(),
        index: sheet.index_of(DEMON_INFO_ID, true),
    });
    info
}
