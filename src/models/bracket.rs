//! Bracket, Round, BracketFormat and BracketError.

use crate::models::game::{GameMatch, MatchId, MatchKey, NodeId};
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Errors that can occur while building or operating on a bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Two rounds share the same (non-zero) round id.
    DuplicateRound(RoundId),
    /// A match is listed directly more than once (in one round or across rounds).
    MatchListedTwice(MatchKey),
    /// A match is (transitively) its own source.
    CyclicSource(MatchKey),
    /// A source match sits in a round that is not strictly earlier than its target's.
    SourceNotInEarlierRound { source: MatchKey, target: MatchKey },
    /// The winner is neither of the match's slot teams.
    WinnerNotInMatch { key: MatchKey, team_id: TeamId },
    /// A team with id 0 was given as a winner.
    UnsetTeamId(MatchKey),
    /// An operation needing persisted ids met a match without one.
    UnpersistedMatch(MatchKey),
    /// No match with this id in the bracket.
    UnknownMatch(MatchId),
    /// The node handle does not belong to this bracket.
    UnknownNode(NodeId),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::DuplicateRound(id) => write!(f, "Round {} appears more than once", id),
            BracketError::MatchListedTwice(key) => {
                write!(f, "{} is listed in more than one place", key)
            }
            BracketError::CyclicSource(key) => write!(f, "{} is its own source", key),
            BracketError::SourceNotInEarlierRound { source, target } => {
                write!(f, "Source {} of {} is not in an earlier round", source, target)
            }
            BracketError::WinnerNotInMatch { key, team_id } => {
                write!(f, "Team {} is not playing in {}", team_id, key)
            }
            BracketError::UnsetTeamId(key) => {
                write!(f, "Invalid team id (0) for the winner of {}", key)
            }
            BracketError::UnpersistedMatch(key) => write!(f, "{} has no id", key),
            BracketError::UnknownMatch(id) => write!(f, "Match {} not found", id),
            BracketError::UnknownNode(node) => write!(f, "Node {} is not in this bracket", node.index()),
        }
    }
}

impl std::error::Error for BracketError {}

/// Persisted bracket identifier.
pub type BracketId = u32;

/// Persisted round identifier; increases with tournament progression.
pub type RoundId = u32;

/// Format of a bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketFormat {
    #[default]
    SingleElimination,
    SingleEliminationSeeded,
    RoundRobin,
    Other,
}

/// One stage of the bracket: matches played at the same point of the tournament.
#[derive(Clone, Debug, Serialize)]
pub struct Round {
    pub id: RoundId,
    /// Storage order, not visual order.
    pub matches: Vec<NodeId>,
}

impl Round {
    pub fn new(id: RoundId) -> Self {
        Self {
            id,
            matches: Vec::new(),
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.matches.contains(&node)
    }
}

/// A bracket: rounds in round-id order over an arena that owns every match node.
///
/// Rounds and source links refer to nodes by [`NodeId`], so a match reachable from
/// several places is one node and edits through any path are seen by all.
#[derive(Clone, Debug, Serialize)]
pub struct Bracket {
    pub id: BracketId,
    pub name: String,
    pub format: BracketFormat,
    pub complete: bool,
    rounds: Vec<Round>,
    nodes: Vec<GameMatch>,
}

impl Bracket {
    /// Create an empty bracket (no rounds).
    pub fn new(id: BracketId, name: impl Into<String>, format: BracketFormat) -> Self {
        Self {
            id,
            name: name.into(),
            format,
            complete: false,
            rounds: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn get(&self, node: NodeId) -> Option<&GameMatch> {
        self.nodes.get(node.0)
    }

    pub(crate) fn get_mut(&mut self, node: NodeId) -> Option<&mut GameMatch> {
        self.nodes.get_mut(node.0)
    }

    /// Every match node, including sources that are not listed in any round.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GameMatch)> {
        self.nodes.iter().enumerate().map(|(i, m)| (NodeId(i), m))
    }

    pub fn match_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node of the match with this persisted id.
    pub fn find_by_id(&self, id: MatchId) -> Option<NodeId> {
        if id == 0 {
            return None;
        }
        self.nodes().find(|(_, m)| m.id() == Some(id)).map(|(n, _)| n)
    }

    /// Zero-based position of the round listing this match.
    pub fn round_of(&self, node: NodeId) -> Option<usize> {
        self.rounds.iter().position(|r| r.contains(node))
    }

    /// Matches of the round at `position`, in storage order.
    pub fn round_matches(&self, position: usize) -> impl Iterator<Item = (NodeId, &GameMatch)> {
        self.rounds
            .get(position)
            .map(|r| r.matches.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&n| self.get(n).map(|m| (n, m)))
    }

    pub(crate) fn push_node(&mut self, m: GameMatch) -> NodeId {
        self.nodes.push(m);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn push_round(&mut self, round: Round) {
        self.rounds.push(round);
    }
}
