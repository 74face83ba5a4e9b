//! Final standings: rank every team in a bracket and turn ranks into points.

use crate::models::{Bracket, BracketError, StandingsReplace, Team, TeamId};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Points per rank step.
const POINTS_PER_RANK: u32 = 10;

/// Per-team statistics gathered from the bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct TeamProgress {
    /// 1-based position of the last round the team appeared in.
    max_round: usize,
    wins: u32,
}

/// Rank every team that appears in a match (1 = best).
///
/// 1. Each team's deepest round (1-based round position) and its win count over
///    completed matches.
/// 2. Sort: finalists first (by wins), then everyone else by deepest round, then wins.
///    Teams that compare equal keep first-appearance order.
/// 3. Ranks are positional; a second-placed finalist is rank 2, and any other team
///    shares the previous team's rank when it went out in the same round.
///
/// Every match must have a persisted id. Teams with id 0 are not counted.
pub fn rank_teams(bracket: &Bracket) -> Result<BTreeMap<TeamId, u32>, BracketError> {
    let mut stats: HashMap<TeamId, TeamProgress> = HashMap::new();
    let mut order: Vec<TeamId> = Vec::new();

    for position in 0..bracket.rounds().len() {
        let round_number = position + 1;
        for (_, m) in bracket.round_matches(position) {
            if m.id().is_none() {
                return Err(BracketError::UnpersistedMatch(m.key));
            }

            for team in m.slot_a.iter().chain(m.slot_b.iter()) {
                if !team.is_persisted() {
                    warn!("Ignoring unsaved team '{}' in {}", team.name, m.key);
                    continue;
                }
                let entry = stats.entry(team.id).or_insert_with(|| {
                    order.push(team.id);
                    TeamProgress::default()
                });
                entry.max_round = entry.max_round.max(round_number);
            }

            if let Some(winner) = m.winner.as_ref().filter(|_| m.complete) {
                if let Some(entry) = stats.get_mut(&winner.id) {
                    entry.wins += 1;
                }
            }
        }
    }

    let final_round = bracket.rounds().len();
    let summary = |id: &TeamId| stats.get(id).copied().unwrap_or_default();
    order.sort_by(|a, b| compare_teams(summary(a), summary(b), final_round));

    let mut rankings = BTreeMap::new();
    let mut rank = 0u32;
    let mut previous_round: Option<usize> = None;
    for (i, id) in order.iter().enumerate() {
        let current_round = summary(id).max_round;
        if i == 0 {
            rank = 1;
        } else if i == 1 && current_round == final_round {
            rank = 2;
            previous_round = Some(current_round);
        } else {
            if previous_round != Some(current_round) {
                rank = i as u32 + 1;
            }
            previous_round = Some(current_round);
        }
        rankings.insert(*id, rank);
    }

    debug!("Ranked {} team(s) in '{}'", rankings.len(), bracket.name);
    Ok(rankings)
}

fn compare_teams(a: TeamProgress, b: TeamProgress, final_round: usize) -> Ordering {
    let a_final = a.max_round == final_round;
    let b_final = b.max_round == final_round;
    match (a_final, b_final) {
        (true, true) => b.wins.cmp(&a.wins),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b
            .max_round
            .cmp(&a.max_round)
            .then_with(|| b.wins.cmp(&a.wins)),
    }
}

/// Points for a rank out of `total_teams`: `(total - rank + 1) * 10`, 0 past the last rank.
/// Saturates at `u32::MAX` for very large fields.
pub fn points_for_rank(rank: u32, total_teams: u32) -> u32 {
    if total_teams == 0 || rank > total_teams {
        return 0;
    }
    (total_teams - rank)
        .saturating_add(1)
        .saturating_mul(POINTS_PER_RANK)
}

/// Points for every team on the roster from this bracket's ranking.
///
/// Teams the bracket never ranked are placed just past the last ranked team and
/// so score 0.
pub fn generate_points(
    bracket: &Bracket,
    roster: &[Team],
) -> Result<StandingsReplace, BracketError> {
    let rankings = rank_teams(bracket)?;
    let ranked = (rankings.len() as u32).max(1);

    let mut standings = StandingsReplace::default();
    for team in roster {
        let rank = rankings.get(&team.id).copied().unwrap_or(ranked + 1);
        standings
            .standings_map
            .insert(team.id, points_for_rank(rank, ranked));
    }
    Ok(standings)
}
