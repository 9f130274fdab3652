use anyhow::{Result, bail};
use botc_setup::{CharacterId, Script, name_to_id};
use std::path::Path;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Script id used for saved state: the file name without its extension.
pub fn script_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "script".to_string())
}

/// Resolve a user-typed id or character name to a character on the script.
pub fn resolve_on_script(script: &Script, token: &str) -> Result<CharacterId> {
    if let Some(info) = script
        .character(token)
        .or_else(|| script.character(&name_to_id(token)))
    {
        return Ok(info.id.clone());
    }
    bail!("{token} is not on script {}", script.title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use botc_setup::Catalog;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" imp, ,Fortune Teller,  baron ");
        assert_eq!(parts, vec!["imp", "Fortune Teller", "baron"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn script_id_uses_file_stem() {
        assert_eq!(script_id_for(Path::new("scripts/trouble-brewing.json")), "trouble-brewing");
        assert_eq!(script_id_for(Path::new("/")), "script");
    }

    #[test]
    fn resolves_names_against_script() {
        let catalog = Catalog::from_json(
            r#"[{"id": "fortune_teller", "name": "Fortune Teller", "roleType": "townsfolk"},
                {"id": "imp", "name": "Imp", "roleType": "demon"},
                {"id": "baron", "name": "Baron", "roleType": "minion"}]"#,
            "[]",
            "{}",
            None,
        )
        .unwrap();
        let script = Script::new("tb", "Trouble Brewing", &["fortuneteller", "imp"], &catalog).unwrap();
        assert_eq!(resolve_on_script(&script, "Fortune Teller").unwrap(), "fortuneteller");
        assert_eq!(resolve_on_script(&script, "imp").unwrap(), "imp");
        let err = resolve_on_script(&script, "baron").unwrap_err();
        assert!(err.to_string().contains("not on script Trouble Brewing"));
    }

    #[test]
    fn resolves_numbered_village_idiots() {
        let catalog = Catalog::from_json(
            r#"[{"id": "village_idiot", "name": "Village Idiot", "roleType": "townsfolk"},
                {"id": "imp", "name": "Imp", "roleType": "demon"}]"#,
            "[]",
            "{}",
            None,
        )
        .unwrap();
        let script = Script::new("vi", "Idiots", &["imp", "villageidiot"], &catalog).unwrap();
        assert_eq!(resolve_on_script(&script, "villageidiot-1").unwrap(), "villageidiot-1");
        assert_eq!(resolve_on_script(&script, "Village Idiot").unwrap(), "villageidiot");
        assert!(resolve_on_script(&script, "villageidiot-3").is_err());
    }
}
