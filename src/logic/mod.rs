//! Bracket operations: graph building, winner propagation, ordering, standings.

mod builder;
mod ordering;
mod propagation;
mod standings;

pub use builder::build_bracket;
pub use ordering::visual_order;
pub use propagation::{
    apply_winner, match_updates, propagate_winner, record_winner, set_winner,
    set_winner_cascading, sync_slots, Propagation,
};
pub use standings::{generate_points, points_for_rank, rank_teams};
