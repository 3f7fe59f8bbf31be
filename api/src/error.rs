//! Errors raised by the write path. The points table never fails; everything
//! here means a requested change was refused and nothing was applied.

use std::fmt;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Structurally invalid input, e.g. a match against itself or 11 wickets.
    #[error("{0}")]
    Validation(String),
    /// A referenced tournament, team, player or match does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    /// The caller does not own the tournament it is trying to change.
    #[error("permission denied: {0}")]
    Permission(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tournament,
    Team,
    Player,
    Match,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tournament => "tournament",
            EntityKind::Team => "team",
            EntityKind::Player => "player",
            EntityKind::Match => "match",
        };
        f.write_str(name)
    }
}
