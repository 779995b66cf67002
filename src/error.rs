//! Level loading errors.
//!
//! A malformed level set is fatal at load time: the session refuses to start
//! rather than running a partially built level.

use std::fmt;

/// Why a level set could not be turned into a playable session
#[derive(Debug)]
pub enum LevelError {
    /// The level sequence is empty.
    NoLevels,

    /// A level has no player spawn point.
    MissingPlayerSpawn {
        /// Ordinal of the offending level (1-based).
        level: u32,
    },

    /// A level has no enemies, so it could never be cleared.
    NoEnemies { level: u32 },

    /// The player spawn point lies outside the playfield.
    SpawnOutOfBounds { level: u32, x: f32, y: f32 },

    /// An obstacle entry is unusable (non-positive size, zero durability, ...).
    InvalidObstacle {
        level: u32,
        /// Position of the obstacle in the level's obstacle list.
        index: usize,
        reason: &'static str,
    },

    /// An enemy entry is unusable.
    InvalidEnemy {
        level: u32,
        index: usize,
        reason: &'static str,
    },

    /// The descriptor text is not valid level JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NoLevels => write!(f, "level set is empty"),
            LevelError::MissingPlayerSpawn { level } => {
                write!(f, "level {} has no player spawn point", level)
            }
            LevelError::NoEnemies { level } => write!(f, "level {} has no enemies", level),
            LevelError::SpawnOutOfBounds { level, x, y } => write!(
                f,
                "level {} player spawn ({}, {}) is outside the playfield",
                level, x, y
            ),
            LevelError::InvalidObstacle {
                level,
                index,
                reason,
            } => write!(f, "level {} obstacle #{}: {}", level, index, reason),
            LevelError::InvalidEnemy {
                level,
                index,
                reason,
            } => write!(f, "level {} enemy #{}: {}", level, index, reason),
            LevelError::Parse(err) => write!(f, "malformed level data: {}", err),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Parse(err)
    }
}

/// Convenience alias: a `Result` using `LevelError` as the error type.
pub type LevelResult<T> = Result<T, LevelError>;
