use bevy::prelude::*;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::season::saved_data::DATA_IDENTIFIER;
use crate::season::{DimensionId, SeasonSavedData};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// `<root>/<dimension>/data/seasons.dat`. Namespace separators are not valid in
/// every file system, so `:` becomes `_`.
pub fn season_data_path(root: &Path, dimension: &DimensionId) -> PathBuf {
    root.join(dimension.as_str().replace(':', "_"))
        .join("data")
        .join(format!("{}.dat", DATA_IDENTIFIER))
}

pub fn save_season_data(
    root: &Path,
    dimension: &DimensionId,
    data: &SeasonSavedData,
) -> Result<(), PersistenceError> {
    let path = season_data_path(root, dimension);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let encoded = bincode::serialize(data)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&encoded)?;
    let compressed = encoder.finish()?;
    fs::write(path, compressed)?;
    Ok(())
}

/// `Ok(None)` when the level has never been saved.
pub fn read_season_data(
    root: &Path,
    dimension: &DimensionId,
) -> Result<Option<SeasonSavedData>, PersistenceError> {
    let path = season_data_path(root, dimension);
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(&path)?;
    let mut decoder = GzDecoder::new(&data[..]);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(Some(bincode::deserialize(&decompressed)?))
}

/// Saved data for a level, or `None` if there is none or it cannot be read.
pub fn load_season_data(root: &Path, dimension: &DimensionId) -> Option<SeasonSavedData> {
    match read_season_data(root, dimension) {
        Ok(data) => data,
        Err(e) => {
            warn!("[SEASONS] Failed to load season data for {}: {}", dimension, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("seasons-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        root
    }

    #[test]
    fn path_uses_fixed_key() {
        let path = season_data_path(Path::new("saves/world"), &DimensionId::new("minecraft:overworld"));
        assert_eq!(path, PathBuf::from("saves/world/minecraft_overworld/data/seasons.dat"));
    }

    #[test]
    fn saved_counter_loads_back_clean() {
        let root = temp_root("persist");
        let overworld = DimensionId::overworld();
        let mut data = SeasonSavedData::new(98_765);
        data.set_dirty();

        save_season_data(&root, &overworld, &data).unwrap();
        let loaded = load_season_data(&root, &overworld).unwrap();
        assert_eq!(loaded.season_cycle_ticks, 98_765);
        assert!(!loaded.is_dirty());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_save_is_none() {
        let root = temp_root("missing");
        assert!(read_season_data(&root, &DimensionId::overworld()).unwrap().is_none());
    }

    #[test]
    fn corrupt_save_is_an_error_and_loads_as_none() {
        let root = temp_root("corrupt");
        let overworld = DimensionId::overworld();
        let path = season_data_path(&root, &overworld);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"definitely not gzip").unwrap();

        assert!(read_season_data(&root, &overworld).is_err());
        assert!(load_season_data(&root, &overworld).is_none());

        let _ = fs::remove_dir_all(&root);
    }
}
