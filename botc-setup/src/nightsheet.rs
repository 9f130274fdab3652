//! Night order for the characters in play.

use crate::roles::{
    Catalog, CatalogError, CharacterId, CharacterInfo, DEMON_INFO_ID, MINION_INFO_ID,
};

/// Characters that act on the given night, in night-sheet order.
///
/// The first night also carries the Minion and Demon info steps. Characters
/// missing from the night sheet come last, in input order.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownCharacter`] for ids the catalog does not know.
pub fn night_order<'a>(
    catalog: &'a Catalog,
    ids: &[CharacterId],
    first_night: bool,
) -> Result<Vec<&'a CharacterInfo>, CatalogError> {
    let mut acting = Vec::new();
    if first_night {
        acting.push(catalog.get(MINION_INFO_ID)?);
        acting.push(catalog.get(DEMON_INFO_ID)?);
    }
    for id in ids {
        let info = catalog.get(id)?;
        if info.night_details(first_night).is_some() && !acting.iter().any(|c| c.id == info.id) {
            acting.push(info);
        }
    }
    acting.sort_by_key(|c| match c.night_details(first_night) {
        Some(action) if action.is_placed() => (false, action.index),
        _ => (true, 0),
    });
    Ok(acting)
}
