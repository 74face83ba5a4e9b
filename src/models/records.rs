//! Wire records exchanged with the persistence API.
//!
//! Input records nest source matches recursively and may repeat the same match
//! under several parents; the builder collapses them. Output records are flat.

use crate::models::bracket::{BracketFormat, BracketId, RoundId};
use crate::models::game::{GameMatch, MatchId};
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    #[serde(default)]
    pub team_id: TeamId,
    #[serde(default)]
    pub name: String,
}

impl From<&TeamRecord> for Team {
    fn from(r: &TeamRecord) -> Self {
        Team::new(r.team_id, r.name.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// 0 (or absent) for a match that has not been persisted.
    #[serde(default)]
    pub match_id: MatchId,
    #[serde(default)]
    pub team1: Option<TeamRecord>,
    #[serde(default)]
    pub team2: Option<TeamRecord>,
    #[serde(default)]
    pub winner: Option<TeamRecord>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub source_match1: Option<Box<MatchRecord>>,
    #[serde(default)]
    pub source_match2: Option<Box<MatchRecord>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(default)]
    pub round_id: RoundId,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRecord {
    #[serde(default)]
    pub bracket_id: BracketId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub format: BracketFormat,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

/// Outgoing update for one match after its slots or winner changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub winner_id: Option<TeamId>,
}

impl MatchUpdate {
    pub fn from_match(m: &GameMatch) -> Self {
        Self {
            team1_id: m.slot_a.as_ref().map(|t| t.id),
            team2_id: m.slot_b.as_ref().map(|t| t.id),
            winner_id: m.winner.as_ref().map(|t| t.id),
        }
    }
}

/// Full replacement of a tournament's standings: team id to points.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsReplace {
    pub standings_map: BTreeMap<TeamId, u32>,
}

impl StandingsReplace {
    /// Manual edit of one team's points. Negative input is stored as 0.
    pub fn set_points(&mut self, team_id: TeamId, points: i64) {
        let points = points.clamp(0, i64::from(u32::MAX)) as u32;
        self.standings_map.insert(team_id, points);
    }

    /// Apply a batch of manual edits on top of the current points.
    pub fn apply_edits(&mut self, edits: &BTreeMap<TeamId, i64>) {
        for (&team_id, &points) in edits {
            self.set_points(team_id, points);
        }
    }

    pub fn points(&self, team_id: TeamId) -> Option<u32> {
        self.standings_map.get(&team_id).copied()
    }
}
