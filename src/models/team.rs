//! Team data structure.

use serde::{Deserialize, Serialize};

/// Persisted team identifier. Zero means the team has not been saved yet.
pub type TeamId = u32;

/// A team occupying a match slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Whether the team has a persisted id.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Identity check by id. Two unsaved (zero id) teams are never the same team,
    /// not even a zero-id team compared with itself.
    pub fn same_as(&self, other: &Team) -> bool {
        self.is_persisted() && self.id == other.id
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
