//! Match graph builder: flat round/match records to a bracket of shared match nodes.

use crate::models::{
    Bracket, BracketError, BracketRecord, GameMatch, MatchId, MatchKey, MatchRecord, NodeId,
    Round, RoundRecord,
};
use log::debug;
use std::collections::HashMap;

/// Build a bracket from its wire record.
///
/// 1. Sort rounds by round id; reject duplicate (non-zero) ids.
/// 2. Walk every listed match and its nested sources depth-first with an explicit
///    stack, interning persisted ids so repeated records share one node.
/// 3. Validate: no match listed twice, no source cycles, sources in earlier
///    rounds, and recorded winners playing in their match.
///
/// Records with id 0 each get their own transient node.
pub fn build_bracket(record: &BracketRecord) -> Result<Bracket, BracketError> {
    let mut rounds: Vec<&RoundRecord> = record.rounds.iter().collect();
    rounds.sort_by_key(|r| r.round_id);
    if let Some(pair) = rounds
        .windows(2)
        .find(|pair| pair[0].round_id != 0 && pair[0].round_id == pair[1].round_id)
    {
        return Err(BracketError::DuplicateRound(pair[0].round_id));
    }

    let mut bracket = Bracket::new(record.bracket_id, record.name.clone(), record.format);
    let mut table = NodeTable::default();
    let mut listed: HashMap<NodeId, usize> = HashMap::new();

    for (position, round_record) in rounds.iter().enumerate() {
        let mut round = Round::new(round_record.round_id);
        for match_record in &round_record.matches {
            let node = table.resolve(&mut bracket, match_record);
            if listed.insert(node, position).is_some() {
                if let Some(m) = bracket.get(node) {
                    return Err(BracketError::MatchListedTwice(m.key));
                }
            }
            round.matches.push(node);
        }
        bracket.push_round(round);
    }

    check_acyclic(&bracket)?;
    check_round_order(&bracket, &listed)?;
    check_winners(&bracket)?;

    debug!(
        "Built bracket '{}': {} rounds, {} match nodes ({} persisted ids)",
        bracket.name,
        bracket.rounds().len(),
        bracket.match_count(),
        table.by_id.len()
    );
    Ok(bracket)
}

/// Persisted match id to its node.
#[derive(Default)]
struct NodeTable {
    by_id: HashMap<MatchId, NodeId>,
}

impl NodeTable {
    /// Existing node for a persisted id, or a fresh node.
    fn intern(&mut self, bracket: &mut Bracket, id: MatchId) -> NodeId {
        if let Some(&node) = self.by_id.get(&id) {
            return node;
        }
        let node = bracket.push_node(GameMatch::new(MatchKey::from_id(id)));
        if id != 0 {
            self.by_id.insert(id, node);
        }
        node
    }

    /// Resolve a record and everything nested under it; returns the record's node.
    fn resolve(&mut self, bracket: &mut Bracket, record: &MatchRecord) -> NodeId {
        let root = self.intern(bracket, record.match_id);
        let mut stack: Vec<(&MatchRecord, NodeId)> = vec![(record, root)];

        while let Some((rec, node)) = stack.pop() {
            let source_1 = rec
                .source_match1
                .as_deref()
                .map(|s| (s, self.intern(bracket, s.match_id)));
            let source_2 = rec
                .source_match2
                .as_deref()
                .map(|s| (s, self.intern(bracket, s.match_id)));

            if let Some(m) = bracket.get_mut(node) {
                merge_record(m, rec, source_1.map(|(_, n)| n), source_2.map(|(_, n)| n));
            }

            // Pushed in reverse so source 1 is walked first.
            stack.extend(source_2);
            stack.extend(source_1);
        }
        root
    }
}

/// Apply one record onto its node. The completion flag always follows the latest
/// record; teams, winner and sources only when the record carries them.
fn merge_record(
    m: &mut GameMatch,
    rec: &MatchRecord,
    source_1: Option<NodeId>,
    source_2: Option<NodeId>,
) {
    m.complete = rec.complete;
    if let Some(t) = &rec.team1 {
        m.slot_a = Some(t.into());
    }
    if let Some(t) = &rec.team2 {
        m.slot_b = Some(t.into());
    }
    if let Some(t) = &rec.winner {
        m.winner = Some(t.into());
    }
    if source_1.is_some() {
        m.source_1 = source_1;
    }
    if source_2.is_some() {
        m.source_2 = source_2;
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Iterative depth-first search over source links.
fn check_acyclic(bracket: &Bracket) -> Result<(), BracketError> {
    let mut marks = vec![Mark::Unvisited; bracket.match_count()];

    for (start, _) in bracket.nodes() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        // (node, sources already pushed)
        let mut stack = vec![(start, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                marks[node.index()] = Mark::Done;
                continue;
            }
            if marks[node.index()] != Mark::Unvisited {
                continue;
            }
            marks[node.index()] = Mark::OnPath;
            stack.push((node, true));

            let Some(m) = bracket.get(node) else { continue };
            for source in m.source_1.into_iter().chain(m.source_2) {
                match marks[source.index()] {
                    Mark::OnPath => return Err(BracketError::CyclicSource(m.key)),
                    Mark::Unvisited => stack.push((source, false)),
                    Mark::Done => {}
                }
            }
        }
    }
    Ok(())
}

/// Every listed source must sit in a strictly earlier round. Unlisted sources are
/// broken references and are left for the orderer to skip.
fn check_round_order(
    bracket: &Bracket,
    listed: &HashMap<NodeId, usize>,
) -> Result<(), BracketError> {
    for (position, round) in bracket.rounds().iter().enumerate() {
        for &node in &round.matches {
            let Some(m) = bracket.get(node) else { continue };
            for source in m.source_1.into_iter().chain(m.source_2) {
                let Some(&source_position) = listed.get(&source) else { continue };
                if source_position >= position {
                    let source_key = bracket.get(source).map_or(m.key, |s| s.key);
                    return Err(BracketError::SourceNotInEarlierRound {
                        source: source_key,
                        target: m.key,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_winners(bracket: &Bracket) -> Result<(), BracketError> {
    for (_, m) in bracket.nodes() {
        if let Some(w) = &m.winner {
            if !m.winner_is_valid() {
                return Err(BracketError::WinnerNotInMatch {
                    key: m.key,
                    team_id: w.id,
                });
            }
        }
    }
    Ok(())
}
