//! Tournament bracket engine: library with models and bracket logic.
//!
//! The library does no I/O. Callers hand it wire records, get back a [`Bracket`]
//! they own, and serialize whatever it returns. One bracket must only be mutated
//! by one caller at a time.

pub mod logic;
pub mod models;

pub use logic::{
    apply_winner, build_bracket, generate_points, match_updates, points_for_rank,
    propagate_winner, rank_teams, record_winner, set_winner, set_winner_cascading, sync_slots,
    visual_order, Propagation,
};
pub use models::{
    same_slot, Bracket, BracketError, BracketFormat, BracketId, BracketRecord, GameMatch,
    MatchId, MatchKey, MatchRecord, MatchUpdate, NodeId, Round, RoundId, RoundRecord, Slot,
    StandingsReplace, Team, TeamId, TeamRecord,
};
