//! Asset catalog: logical look keys → image files under the asset root.
//!
//! Simulation code only ever names a look (`Visual::asset("coin")`). The render side resolves
//! the key here. Startup checks that every file exists so a missing image fails fast instead
//! of showing up as an invisible sprite mid-run.

use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

/// Foreground colour: walls, bullets, HUD text.
pub const FOREGROUND: Color = Color::srgb(252.0 / 255.0, 247.0 / 255.0, 190.0 / 255.0);
/// Clear colour.
pub const BACKGROUND: Color = Color::srgb(24.0 / 255.0, 28.0 / 255.0, 25.0 / 255.0);

#[derive(Resource, Debug, Clone)]
pub struct AssetCatalog {
    entries: Vec<(&'static str, &'static str)>,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                ("player", "player.png"),
                ("player-hurt", "player-hurt.png"),
                ("player-critical", "player-critical.png"),
                ("turret-1", "turret-1.png"),
                ("turret-2", "turret-2.png"),
                ("coin", "coin.png"),
                ("aid-kit", "aid-kit.png"),
                ("item-spawner", "item-spawner.png"),
                ("fire", "fire.png"),
                ("spikes", "spikes.png"),
            ],
        }
    }
}

impl AssetCatalog {
    /// File name for `key`, relative to the asset root.
    pub fn file(&self, key: &str) -> Option<&'static str> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, f)| *f)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Fails on the first key whose file is absent under `root`.
    pub fn verify(&self, root: impl AsRef<Path>) -> Result<(), AssetError> {
        let root = root.as_ref();
        for (key, file) in &self.entries {
            let path = root.join(file);
            if !path.is_file() {
                return Err(AssetError::Missing { key, path });
            }
        }
        debug!("{} assets present under {}", self.entries.len(), root.display());
        Ok(())
    }
}

#[derive(Debug)]
pub enum AssetError {
    Missing { key: &'static str, path: PathBuf },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Missing { key, path } => write!(f, "asset `{key}` not found at {}", path.display()),
        }
    }
}

impl std::error::Error for AssetError {}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn populate(root: &Path, catalog: &AssetCatalog, skip: Option<&str>) {
        for key in catalog.keys().filter(|k| Some(*k) != skip) {
            fs::write(root.join(catalog.file(key).unwrap()), b"png").unwrap();
        }
    }

    #[test]
    fn every_look_used_by_the_game_is_catalogued() {
        let catalog = AssetCatalog::default();
        for key in ["player", "player-hurt", "player-critical", "turret-1", "turret-2", "coin", "aid-kit", "item-spawner", "fire", "spikes"] {
            assert!(catalog.file(key).is_some(), "{key}");
        }
        assert_eq!(catalog.file("wall"), None);
    }

    #[test]
    fn complete_root_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = AssetCatalog::default();
        populate(dir.path(), &catalog, None);
        assert!(catalog.verify(dir.path()).is_ok());
    }

    #[test]
    fn missing_file_names_its_key() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = AssetCatalog::default();
        populate(dir.path(), &catalog, Some("fire"));

        let err = catalog.verify(dir.path()).unwrap_err();
        let AssetError::Missing { key, path } = &err;
        assert_eq!(*key, "fire");
        assert_eq!(path, &dir.path().join("fire.png"));
        assert!(err.to_string().contains("`fire`"));
    }
}
