use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stage_engine::ObjectDesc;
use thiserror::Error;

pub(crate) const LEVEL_VERSION: u32 = 1;

const BUILTIN_LEVEL_JSON: &str = include_str!("../../levels/demo.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ViewportDesc {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for ViewportDesc {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Level {
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) viewport: ViewportDesc,
    #[serde(default)]
    pub(crate) objects: Vec<ObjectDesc>,
}

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("failed to read level '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level json{}: {source}", at_path(.json_path))]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported level version: expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u32, actual: u32 },
    #[error("viewport must be non-zero, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },
}

fn at_path(json_path: &str) -> String {
    if json_path.is_empty() || json_path == "." {
        String::new()
    } else {
        format!(" at {json_path}")
    }
}

/// Where a level came from; relative asset paths resolve against `asset_root`.
#[derive(Debug, Clone)]
pub(crate) struct LoadedLevel {
    pub(crate) level: Level,
    pub(crate) asset_root: PathBuf,
}

pub(crate) fn load_level_file(path: &Path) -> Result<LoadedLevel, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let level = parse_level_json(&raw)?;
    let asset_root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(LoadedLevel { level, asset_root })
}

pub(crate) fn builtin_level() -> Result<LoadedLevel, LevelError> {
    Ok(LoadedLevel {
        level: parse_level_json(BUILTIN_LEVEL_JSON)?,
        asset_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels"),
    })
}

pub(crate) fn parse_level_json(raw: &str) -> Result<Level, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let level: Level =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            LevelError::Parse {
                json_path,
                source: error.into_inner(),
            }
        })?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &Level) -> Result<(), LevelError> {
    if level.version != LEVEL_VERSION {
        return Err(LevelError::UnsupportedVersion {
            expected: LEVEL_VERSION,
            actual: level.version,
        });
    }
    let ViewportDesc { width, height } = level.viewport;
    if width == 0 || height == 0 {
        return Err(LevelError::EmptyViewport { width, height });
    }
    Ok(())
}
