//! Selected characters and the rules that force characters into a selection.

use crate::roles::{CharacterId, CharacterInfo, RoleType};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selected character ids, iterated in a stable order.
pub type Selection = BTreeSet<CharacterId>;

pub const ATHEIST: &str = "atheist";

/// Characters whose presence drags a companion into the selection.
const COMPANIONS: &[(&[&str], &str)] = &[
    (&["huntsman"], "damsel"),
    (&["choirboy"], "king"),
    // the unnumbered village idiot must be in play before any extras
    (&["villageidiot-1", "villageidiot-2"], "villageidiot"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelAction {
    #[serde(rename = "toggle")]
    Toggle { id: CharacterId },
    #[serde(rename = "deselect")]
    Deselect { id: CharacterId },
    #[serde(rename = "set all")]
    SetAll { ids: Vec<CharacterId> },
    #[serde(rename = "clear")]
    Clear,
}

impl SelAction {
    #[must_use]
    pub fn toggle(id: impl Into<CharacterId>) -> Self {
        Self::Toggle { id: id.into() }
    }

    #[must_use]
    pub fn deselect(id: impl Into<CharacterId>) -> Self {
        Self::Deselect { id: id.into() }
    }

    pub fn set_all<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CharacterId>,
    {
        Self::SetAll {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Characters that must always be selected for a script.
///
/// A lone demon is required unless the script has the Atheist, and every
/// fabled character is required.
#[must_use]
pub fn required_selection(characters: &[CharacterInfo]) -> Selection {
    let mut required = Selection::new();
    let mut demons = characters.iter().filter(|c| c.role_type == RoleType::Demon);
    let has_atheist = characters.iter().any(|c| c.id == ATHEIST);
    if let (Some(demon), None) = (demons.next(), demons.next())
        && !has_atheist
    {
        required.insert(demon.id.clone());
    }
    required.extend(
        characters
            .iter()
            .filter(|c| c.role_type == RoleType::Fabled)
            .map(|c| c.id.clone()),
    );
    required
}

#[must_use]
pub fn initial_selection(characters: &[CharacterInfo]) -> Selection {
    required_selection(characters)
}

/// Add companions for every selected trigger until nothing changes.
///
/// With the Atheist selected any setup is legal, so nothing is added.
pub fn add_mandatory_selections(selection: &mut Selection) {
    if selection.contains(ATHEIST) {
        return;
    }
    loop {
        let missing: Vec<&str> = COMPANIONS
            .iter()
            .filter(|(triggers, _)| triggers.iter().any(|t| selection.contains(*t)))
            .map(|(_, companion)| *companion)
            .filter(|companion| !selection.contains(*companion))
            .collect();
        if missing.is_empty() {
            return;
        }
        for companion in missing {
            debug!("adding required companion {companion}");
            selection.insert(companion.to_string());
        }
    }
}

/// Pure transition function over a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionReducer {
    required: Selection,
    companions: bool,
}

impl SelectionReducer {
    /// A reducer enforcing `required` plus the companion rules.
    #[must_use]
    pub const fn constrained(required: Selection) -> Self {
        Self {
            required,
            companions: true,
        }
    }

    /// A reducer with no required characters and no companion rules.
    #[must_use]
    pub const fn unconstrained() -> Self {
        Self {
            required: Selection::new(),
            companions: false,
        }
    }

    #[must_use]
    pub const fn required(&self) -> &Selection {
        &self.required
    }

    /// Apply every inclusion rule in place.
    pub fn close(&self, selection: &mut Selection) {
        selection.extend(self.required.iter().cloned());
        if self.companions {
            add_mandatory_selections(selection);
        }
    }

    #[must_use]
    pub fn reduce(&self, selection: &Selection, action: &SelAction) -> Selection {
        let mut next = match action {
            SelAction::Toggle { id } => {
                let mut next = selection.clone();
                if !next.remove(id) {
                    next.insert(id.clone());
                }
                next
            }
            SelAction::Deselect { id } => {
                let mut next = selection.clone();
                next.remove(id);
                return next;
            }
            SelAction::SetAll { ids } => ids.iter().cloned().collect(),
            SelAction::Clear => Selection::new(),
        };
        self.close(&mut next);
        next
    }
}

/// Reducer for a script's main selection.
#[must_use]
pub fn create_selection_reducer(characters: &[CharacterInfo]) -> SelectionReducer {
    SelectionReducer::constrained(required_selection(characters))
}

/// Reducer for demon bluffs, which have no required characters.
#[must_use]
pub const fn bluffs_reducer() -> SelectionReducer {
    SelectionReducer::unconstrained()
}
