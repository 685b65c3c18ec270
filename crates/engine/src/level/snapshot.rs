use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::grid::{GridCell, Tile};
use super::Level;
use crate::app::Rect;
use crate::atomic_io::write_text_atomic;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable view of a level's painted cells; empty cells are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub version: u32,
    pub cols: u16,
    pub rows: u16,
    pub tile_size: u16,
    pub tiles: Vec<SnapshotTile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTile {
    pub col: i32,
    pub row: i32,
    pub source: Rect,
    pub solid: bool,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode level snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to parse level snapshot at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to access level snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported snapshot version: expected {expected}, got {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error(
        "snapshot is {found_cols}x{found_rows}@{found_tile_size}, level is {cols}x{rows}@{tile_size}"
    )]
    DimensionMismatch {
        cols: u16,
        rows: u16,
        tile_size: u16,
        found_cols: u16,
        found_rows: u16,
        found_tile_size: u16,
    },
    #[error("snapshot cell ({col}, {row}) is outside the level")]
    CellOutOfRange { col: i32, row: i32 },
}

pub fn encode_snapshot(snapshot: &LevelSnapshot) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(snapshot).map_err(SnapshotError::Encode)
}

pub fn decode_snapshot(raw: &str) -> Result<LevelSnapshot, SnapshotError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LevelSnapshot>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        SnapshotError::Decode {
            path,
            source: error.into_inner(),
        }
    })
}

pub fn save_snapshot(path: &Path, snapshot: &LevelSnapshot) -> Result<(), SnapshotError> {
    let json = encode_snapshot(snapshot)?;
    write_text_atomic(path, &json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        tiles = snapshot.tiles.len(),
        "snapshot_saved"
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<LevelSnapshot, SnapshotError> {
    let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_snapshot(&raw)
}

impl Level {
    pub fn snapshot(&self) -> LevelSnapshot {
        let tiles = self
            .grid
            .iter()
            .filter(|(_, tile)| !tile.is_empty())
            .map(|(cell, tile)| SnapshotTile {
                col: cell.col,
                row: cell.row,
                source: tile.source,
                solid: tile.solid,
            })
            .collect();
        LevelSnapshot {
            version: SNAPSHOT_VERSION,
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            tile_size: self.grid.tile_size(),
            tiles,
        }
    }

    /// Replaces every tile with the snapshot's contents. The level is left
    /// untouched when validation fails. Returns the number of painted cells.
    pub fn apply_snapshot(&mut self, snapshot: &LevelSnapshot) -> Result<usize, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        let grid = &self.grid;
        if (snapshot.cols, snapshot.rows, snapshot.tile_size)
            != (grid.cols(), grid.rows(), grid.tile_size())
        {
            return Err(SnapshotError::DimensionMismatch {
                cols: grid.cols(),
                rows: grid.rows(),
                tile_size: grid.tile_size(),
                found_cols: snapshot.cols,
                found_rows: snapshot.rows,
                found_tile_size: snapshot.tile_size,
            });
        }
        if let Some(outside) = snapshot
            .tiles
            .iter()
            .find(|tile| !grid.contains(GridCell::new(tile.col, tile.row)))
        {
            return Err(SnapshotError::CellOutOfRange {
                col: outside.col,
                row: outside.row,
            });
        }

        self.grid.clear();
        for record in &snapshot.tiles {
            let cell = GridCell::new(record.col, record.row);
            let tile = Tile {
                source: record.source,
                dest: self.grid.tile_rect(cell),
                solid: record.solid,
            };
            // Validated above.
            let _ = self.grid.set(cell, tile);
        }
        Ok(snapshot.tiles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Viewport;
    use crate::level::{level_init, Brush, LevelArena, LevelConfig, TextureHandle, TextureId};
    use tempfile::TempDir;

    fn level(cols: u16, rows: u16) -> Level {
        level_init(
            &mut LevelArena::default(),
            cols,
            rows,
            18,
            TextureHandle {
                id: TextureId(1),
                width: 90,
                height: 54,
            },
            Viewport {
                width: 320,
                height: 240,
            },
            LevelConfig::default(),
        )
        .expect("level")
    }

    fn painted_level() -> Level {
        let mut level = level(20, 15);
        let mut brush = Brush::new(18.0);
        brush.select_source(Rect::new(18.0, 0.0, 36.0, 18.0), 18.0);
        brush.paint(&mut level.grid, GridCell::new(2, 3));
        brush.paint(&mut level.grid, GridCell::new(19, 14));
        level
    }

    #[test]
    fn snapshot_lists_only_painted_cells() {
        let snapshot = painted_level().snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!((snapshot.cols, snapshot.rows, snapshot.tile_size), (20, 15, 18));
        assert_eq!(snapshot.tiles.len(), 3);
        assert_eq!(
            snapshot.tiles[0],
            SnapshotTile {
                col: 2,
                row: 3,
                source: Rect::new(18.0, 0.0, 18.0, 18.0),
                solid: true,
            }
        );
    }

    #[test]
    fn save_then_load_restores_tiles() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("saves").join("level.json");
        let original = painted_level();
        save_snapshot(&path, &original.snapshot()).expect("save");

        let mut restored = level(20, 15);
        let loaded = load_snapshot(&path).expect("load");
        assert_eq!(restored.apply_snapshot(&loaded).expect("apply"), 3);
        for ((cell, a), (_, b)) in original.grid().iter().zip(restored.grid().iter()) {
            assert_eq!(a, b, "mismatch at {cell:?}");
        }
    }

    #[test]
    fn apply_rejects_mismatched_dimensions_without_mutation() {
        let snapshot = painted_level().snapshot();
        let mut other = level(10, 10);
        let error = other.apply_snapshot(&snapshot).expect_err("mismatch");
        assert!(matches!(error, SnapshotError::DimensionMismatch { .. }));
        assert!(other.grid().iter().all(|(_, tile)| tile.is_empty()));
    }

    #[test]
    fn apply_rejects_out_of_range_cells_and_bad_versions() {
        let mut level = painted_level();
        let mut snapshot = level.snapshot();
        snapshot.tiles.push(SnapshotTile {
            col: 20,
            row: 0,
            source: Rect::ZERO,
            solid: true,
        });
        assert!(matches!(
            level.apply_snapshot(&snapshot),
            Err(SnapshotError::CellOutOfRange { col: 20, row: 0 })
        ));

        let mut snapshot = level.snapshot();
        snapshot.version = 99;
        assert!(matches!(
            level.apply_snapshot(&snapshot),
            Err(SnapshotError::VersionMismatch { found: 99, .. })
        ));
        assert_eq!(level.snapshot().tiles.len(), 3);
    }

    #[test]
    fn decode_reports_field_path() {
        let raw = r#"{"version":1,"cols":2,"rows":2,"tile_size":18,"tiles":[{"col":0,"row":0,"source":{"x":0,"y":0,"width":"wide","height":18},"solid":true}]}"#;
        match decode_snapshot(raw) {
            Err(SnapshotError::Decode { path, .. }) => {
                assert_eq!(path, "tiles[0].source.width");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().expect("tempdir");
        let error = load_snapshot(&temp.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, SnapshotError::Io { .. }));
    }
}
