//! Saved tile directory.
//!
//! Tiles live as LSEC `*.bin` files in one flat directory. The listing is
//! sorted by file name so numbered selections are stable between runs.

use std::path::{Path, PathBuf};

use landsim_sector::{Sector, SectorIoError};

use crate::console::LoadTarget;

const APP_NAME: &str = "landsim";
const TILE_EXTENSION: &str = "bin";

/// Errors from the tile directory.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The OS did not provide a data directory and none was configured.
    #[error("could not determine a directory for saved tiles")]
    NoDataDir,
    /// Directory listing or creation failed.
    #[error("tile directory {path}: {source}")]
    Io {
        /// Directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Reading or writing a tile failed.
    #[error(transparent)]
    Sector(#[from] SectorIoError),
    /// A numbered selection past the end of the listing.
    #[error("no saved tile #{index} ({count} available)")]
    NoSuchIndex {
        /// Requested 1-based index.
        index: usize,
        /// Tiles available.
        count: usize,
    },
    /// A file name that would escape the tile directory.
    #[error("invalid tile file name `{0}`")]
    InvalidName(String),
}

/// Platform data directory for saved tiles.
pub fn default_tiles_dir() -> Result<PathBuf, StoreError> {
    let base = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
    Ok(base.join(APP_NAME).join("tiles"))
}

/// A directory of saved tiles.
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    /// Opens `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted file names of every saved tile.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.root.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != TILE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Writes `sector` under its default file name and returns the path.
    pub fn save(&self, sector: &Sector) -> Result<PathBuf, StoreError> {
        Ok(sector.save_to_dir(&self.root)?)
    }

    /// Resolves a selection to a path inside the store.
    pub fn resolve(&self, target: &LoadTarget) -> Result<PathBuf, StoreError> {
        match target {
            LoadTarget::Index(index) => {
                let names = self.list()?;
                let count = names.len();
                index
                    .checked_sub(1)
                    .and_then(|i| names.into_iter().nth(i))
                    .map(|name| self.root.join(name))
                    .ok_or(StoreError::NoSuchIndex {
                        index: *index,
                        count,
                    })
            }
            LoadTarget::File(name) => {
                let candidate = Path::new(name);
                if candidate.file_name() != Some(candidate.as_os_str()) {
                    return Err(StoreError::InvalidName(name.clone()));
                }
                Ok(self.root.join(candidate))
            }
        }
    }

    /// Loads the selected tile.
    pub fn load(&self, target: &LoadTarget) -> Result<Sector, StoreError> {
        let path = self.resolve(target)?;
        Ok(Sector::load_from_file(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landsim_sector::{CellCoord, SectorParams};

    fn sector(name: &str, lon: i32) -> Sector {
        Sector::new(
            CellCoord::new(lon, 0),
            SectorParams {
                name: name.to_string(),
                radius: 5.0,
                detail: 2,
                cell_size_deg: 1.0,
            },
        )
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        let store = TileStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::open(dir.path()).unwrap();
        store.save(&sector("Zeta", 0)).unwrap();
        store.save(&sector("Alpha", 3)).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("dir.bin")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["Alpha_3_0.bin", "Zeta_0_0.bin"]);
    }

    #[test]
    fn test_load_by_index_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::open(dir.path()).unwrap();
        store.save(&sector("Beta", 1)).unwrap();
        store.save(&sector("Alpha", 2)).unwrap();

        let first = store.load(&LoadTarget::Index(1)).unwrap();
        assert_eq!(first.params().name, "Alpha");
        assert_eq!(first.cell(), CellCoord::new(2, 0));

        let named = store
            .load(&LoadTarget::File("Beta_1_0.bin".to_string()))
            .unwrap();
        assert_eq!(named.cell(), CellCoord::new(1, 0));
    }

    #[test]
    fn test_bad_selections_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::open(dir.path()).unwrap();
        store.save(&sector("Only", 0)).unwrap();

        assert!(matches!(
            store.load(&LoadTarget::Index(2)),
            Err(StoreError::NoSuchIndex { index: 2, count: 1 })
        ));
        assert!(matches!(
            store.resolve(&LoadTarget::File("../escape.bin".to_string())),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.load(&LoadTarget::File("missing.bin".to_string())),
            Err(StoreError::Sector(SectorIoError::Io { .. }))
        ));
    }

    #[test]
    fn test_corrupt_tile_reports_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("junk.bin"), b"NOPE").unwrap();
        assert!(matches!(
            store.load(&LoadTarget::Index(1)),
            Err(StoreError::Sector(SectorIoError::Format { .. }))
        ));
    }
}
