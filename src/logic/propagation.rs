//! Winner propagation: recording a match winner and filling the slots it feeds.

use crate::models::{
    same_slot, Bracket, BracketError, MatchId, MatchUpdate, NodeId, TeamId,
};
use log::{debug, warn};
use std::collections::VecDeque;

/// How far a winner change travels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Propagation {
    /// One scan: only the matches fed directly by the edited match.
    #[default]
    Explicit,
    /// Keep scanning through every match that changed until nothing changes.
    Cascading,
}

/// Record (or clear, with `None`) the winner of one match.
///
/// The winner must be a persisted team sitting in one of the match's slots; a
/// rejected call leaves the match untouched. Setting a winner marks the match
/// complete, clearing it marks it incomplete.
pub fn record_winner(
    bracket: &mut Bracket,
    node: NodeId,
    winner: Option<TeamId>,
) -> Result<(), BracketError> {
    let m = bracket
        .get_mut(node)
        .ok_or(BracketError::UnknownNode(node))?;
    match winner {
        None => {
            m.winner = None;
            m.complete = false;
        }
        Some(0) => return Err(BracketError::UnsetTeamId(m.key)),
        Some(team_id) => {
            let team = m
                .team_in_slots(team_id)
                .cloned()
                .ok_or(BracketError::WinnerNotInMatch {
                    key: m.key,
                    team_id,
                })?;
            m.winner = Some(team);
            m.complete = true;
        }
    }
    debug!("Recorded winner {:?} for {}", winner, m.key);
    Ok(())
}

/// Copy the winner of `node` (or TBD) into every slot it feeds.
///
/// One scan over the whole bracket. A target whose own winner no longer plays in
/// it loses that winner. Returns the targets that changed, in arena order.
pub fn propagate_winner(bracket: &mut Bracket, node: NodeId) -> Vec<NodeId> {
    let Some(source) = bracket.get(node) else {
        warn!("Skipping propagation from unknown node {}", node.index());
        return Vec::new();
    };
    let winner = source.winner.clone();

    let targets: Vec<_> = bracket
        .nodes()
        .filter(|(n, _)| *n != node)
        .filter_map(|(n, m)| {
            let slots = m.slots_fed_by(node);
            (!slots.is_empty()).then_some((n, slots))
        })
        .collect();

    let mut changed = Vec::new();
    for (target, slots) in targets {
        let Some(m) = bracket.get_mut(target) else { continue };
        let mut touched = false;
        for slot in slots {
            let current = m.slot_mut(slot);
            if !same_slot(current, &winner) {
                *current = winner.clone();
                touched = true;
            }
        }
        if !touched {
            continue;
        }
        if !m.winner_is_valid() {
            debug!("Clearing stale winner of {}", m.key);
            m.winner = None;
            m.complete = false;
        }
        changed.push(target);
    }
    changed
}

/// Record a winner, then run one propagation scan. Returns the changed targets.
pub fn set_winner(
    bracket: &mut Bracket,
    node: NodeId,
    winner: Option<TeamId>,
) -> Result<Vec<NodeId>, BracketError> {
    record_winner(bracket, node, winner)?;
    Ok(propagate_winner(bracket, node))
}

/// Record a winner, then propagate through every match that changes as a result,
/// round after round. Returns all changed matches, each once.
pub fn set_winner_cascading(
    bracket: &mut Bracket,
    node: NodeId,
    winner: Option<TeamId>,
) -> Result<Vec<NodeId>, BracketError> {
    record_winner(bracket, node, winner)?;
    Ok(cascade_from(bracket, node))
}

/// Dispatch on the propagation style.
pub fn apply_winner(
    bracket: &mut Bracket,
    node: NodeId,
    winner: Option<TeamId>,
    style: Propagation,
) -> Result<Vec<NodeId>, BracketError> {
    match style {
        Propagation::Explicit => set_winner(bracket, node, winner),
        Propagation::Cascading => set_winner_cascading(bracket, node, winner),
    }
}

fn cascade_from(bracket: &mut Bracket, node: NodeId) -> Vec<NodeId> {
    let mut changed: Vec<NodeId> = Vec::new();
    let mut queue = VecDeque::from([node]);
    while let Some(next) = queue.pop_front() {
        for target in propagate_winner(bracket, next) {
            if !changed.contains(&target) {
                changed.push(target);
            }
            queue.push_back(target);
        }
    }
    changed
}

/// Re-derive every source-fed slot from its source's current winner.
///
/// Sources outside any round go first, then rounds in order, so each scan sees
/// already-synced sources. Returns all changed matches, each once.
pub fn sync_slots(bracket: &mut Bracket) -> Vec<NodeId> {
    let listed: Vec<NodeId> = bracket
        .rounds()
        .iter()
        .flat_map(|r| r.matches.iter().copied())
        .collect();
    let unlisted: Vec<NodeId> = bracket
        .nodes()
        .map(|(n, _)| n)
        .filter(|n| !listed.contains(n))
        .collect();

    let mut changed: Vec<NodeId> = Vec::new();
    for node in unlisted.into_iter().chain(listed) {
        for target in propagate_winner(bracket, node) {
            if !changed.contains(&target) {
                changed.push(target);
            }
        }
    }
    if !changed.is_empty() {
        debug!("Slot sync changed {} match(es) in '{}'", changed.len(), bracket.name);
    }
    changed
}

/// Outgoing update records for changed matches. Every match must have a persisted id.
pub fn match_updates(
    bracket: &Bracket,
    nodes: &[NodeId],
) -> Result<Vec<(MatchId, MatchUpdate)>, BracketError> {
    nodes
        .iter()
        .map(|&node| {
            let m = bracket.get(node).ok_or(BracketError::UnknownNode(node))?;
            let id = m.id().ok_or(BracketError::UnpersistedMatch(m.key))?;
            Ok((id, MatchUpdate::from_match(m)))
        })
        .collect()
}
