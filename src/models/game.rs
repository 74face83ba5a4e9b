//! Match node, its identity, and slot helpers.

use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted match identifier. Zero means the match has not been saved yet.
pub type MatchId = u32;

/// Handle of a match node inside its bracket's arena.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity of a match: its persisted id, or a transient id for unsaved in-progress state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    Persisted(MatchId),
    Transient(Uuid),
}

impl MatchKey {
    /// Key for a wire id; id 0 gets a fresh transient identity.
    pub fn from_id(id: MatchId) -> Self {
        if id == 0 {
            MatchKey::Transient(Uuid::new_v4())
        } else {
            MatchKey::Persisted(id)
        }
    }

    pub fn persisted_id(&self) -> Option<MatchId> {
        match self {
            MatchKey::Persisted(id) => Some(*id),
            MatchKey::Transient(_) => None,
        }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKey::Persisted(id) => write!(f, "match {}", id),
            MatchKey::Transient(uuid) => write!(f, "unsaved match {}", uuid),
        }
    }
}

/// Which team slot of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    A,
    B,
}

/// A single match: two team slots, each filled directly or by the winner of a source match.
#[derive(Clone, Debug, Serialize)]
pub struct GameMatch {
    pub key: MatchKey,
    /// None means TBD.
    pub slot_a: Option<Team>,
    pub slot_b: Option<Team>,
    /// None if not yet decided.
    pub winner: Option<Team>,
    pub complete: bool,
    /// Match whose winner fills `slot_a`.
    pub source_1: Option<NodeId>,
    /// Match whose winner fills `slot_b`.
    pub source_2: Option<NodeId>,
}

impl GameMatch {
    pub fn new(key: MatchKey) -> Self {
        Self {
            key,
            slot_a: None,
            slot_b: None,
            winner: None,
            complete: false,
            source_1: None,
            source_2: None,
        }
    }

    pub fn id(&self) -> Option<MatchId> {
        self.key.persisted_id()
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Option<Team> {
        match slot {
            Slot::A => &mut self.slot_a,
            Slot::B => &mut self.slot_b,
        }
    }

    /// Slots fed by `source` (both, if the same match is wired into each).
    pub fn slots_fed_by(&self, source: NodeId) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(2);
        if self.source_1 == Some(source) {
            slots.push(Slot::A);
        }
        if self.source_2 == Some(source) {
            slots.push(Slot::B);
        }
        slots
    }

    /// The team in either slot with this (non-zero) id.
    pub fn team_in_slots(&self, team_id: TeamId) -> Option<&Team> {
        if team_id == 0 {
            return None;
        }
        self.slot_a
            .iter()
            .chain(self.slot_b.iter())
            .find(|t| t.id == team_id)
    }

    /// Whether the recorded winner (if any) still sits in one of the slots.
    pub fn winner_is_valid(&self) -> bool {
        match &self.winner {
            None => true,
            Some(w) => self.team_in_slots(w.id).is_some(),
        }
    }
}

/// Slot contents compare equal when both are TBD or both hold the same team.
pub fn same_slot(a: &Option<Team>, b: &Option<Team>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.same_as(y),
        _ => false,
    }
}
