//! Data structures for brackets: teams, matches, rounds, and wire records.

mod bracket;
mod game;
mod records;
mod team;

pub use bracket::{Bracket, BracketError, BracketFormat, BracketId, Round, RoundId};
pub use game::{same_slot, GameMatch, MatchId, MatchKey, NodeId, Slot};
pub use records::{
    BracketRecord, MatchRecord, MatchUpdate, RoundRecord, StandingsReplace, TeamRecord,
};
pub use team::{Team, TeamId};
