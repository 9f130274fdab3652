use botc_setup::{CatalogData, CatalogSource, NightSheet, OnlineRole, Overrides, ScriptRole};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SCRIPT_ROLES_FILE: &str = "roles.json";
pub const ONLINE_ROLES_FILE: &str = "botc_online_roles.json";
pub const NIGHT_SHEET_FILE: &str = "nightsheet.json";
pub const OVERRIDES_FILE: &str = "overrides.json";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Catalog data read from a directory of downloaded JSON files.
#[derive(Debug, Clone)]
pub struct FsCatalogSource {
    dir: PathBuf,
}

impl FsCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, AssetError> {
        let path = self.dir.join(file);
        let json = fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("read {} bytes from {}", json.len(), path.display());
        parse(&path, &json)
    }

    fn read_optional<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, AssetError> {
        if self.dir.join(file).exists() {
            self.read(file)
        } else {
            Ok(T::default())
        }
    }
}

fn parse<T: DeserializeOwned>(path: &Path, json: &str) -> Result<T, AssetError> {
    serde_json::from_str(json).map_err(|source| AssetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl CatalogSource for FsCatalogSource {
    type Error = AssetError;

    fn load_catalog_data(&self) -> Result<CatalogData, Self::Error> {
        let script_roles: Vec<ScriptRole> = self.read(SCRIPT_ROLES_FILE)?;
        let online_roles: Vec<OnlineRole> = self.read(ONLINE_ROLES_FILE)?;
        let night_sheet: NightSheet = self.read(NIGHT_SHEET_FILE)?;
        let overrides: Overrides = self.read_optional(OVERRIDES_FILE)?;
        info!(
            "loaded {} script roles, {} online roles and {} overrides from {}",
            script_roles.len(),
            online_roles.len(),
            overrides.0.len(),
            self.dir.display()
        );
        Ok(CatalogData {
            script_roles,
            online_roles,
            night_sheet,
            overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botc_setup::Catalog;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "botc-assets-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_required(dir: &Path) {
        fs::write(
            dir.join(SCRIPT_ROLES_FILE),
            r#"[{"id": "imp", "name": "Imp", "roleType": "demon", "version": "1 - Trouble Brewing"},
                {"id": "sentinel", "name": "Sentinel", "roleType": "fabled", "version": "Fabled"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join(ONLINE_ROLES_FILE),
            r#"[{"id": "imp", "ability": "Each night*, choose a player: they die.", "otherNightReminder": "The Imp points to a player."}]"#,
        )
        .unwrap();
        fs::write(
            dir.join(NIGHT_SHEET_FILE),
            r#"{"firstNight": ["MINION", "DEMON"], "otherNight": ["Imp"]}"#,
        )
        .unwrap();
    }

    #[test]
    fn loads_directory_without_overrides() {
        let dir = temp_dir("plain");
        write_required(&dir);
        let catalog = Catalog::load(&FsCatalogSource::new(&dir)).unwrap();
        let imp = catalog.get("imp").unwrap();
        assert_eq!(imp.other_nights.as_ref().unwrap().index, 0);
        assert!(catalog.get("sentinel").unwrap().ability.is_none());
    }

    #[test]
    fn applies_overrides_when_present() {
        let dir = temp_dir("overrides");
        write_required(&dir);
        fs::write(
            dir.join(OVERRIDES_FILE),
            r#"{"sentinel": {"ability": "There might be 1 extra or 1 fewer Outsider in play."}}"#,
        )
        .unwrap();
        let catalog = Catalog::load(&FsCatalogSource::new(&dir)).unwrap();
        assert!(catalog.get("sentinel").unwrap().ability.is_some());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = temp_dir("missing");
        let err = FsCatalogSource::new(&dir).load_catalog_data().unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains(SCRIPT_ROLES_FILE));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = temp_dir("malformed");
        write_required(&dir);
        fs::write(dir.join(NIGHT_SHEET_FILE), "[").unwrap();
        let err = FsCatalogSource::new(&dir).load_catalog_data().unwrap_err();
        assert!(matches!(err, AssetError::Parse { ref path, .. } if path.ends_with(NIGHT_SHEET_FILE)));
    }

    #[test]
    fn bundled_assets_load() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("assets")
            .join("data");
        let catalog = Catalog::load(&FsCatalogSource::new(dir)).unwrap();
        assert!(catalog.contains("fortuneteller"));
        assert!(catalog.contains("baron"));
    }
}
