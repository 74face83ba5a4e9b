//! Visual ordering of matches for left-to-right bracket rendering.

use crate::models::{Bracket, NodeId};
use log::debug;

/// Order each round's matches so they line up under the match they feed.
///
/// The last round keeps its storage order. Walking backward, round `i` takes the
/// sources of round `i + 1` in that round's visual order (source 1, then source 2),
/// and matches nobody feeds from (byes, broken links) are appended in storage order.
/// The bracket itself is not modified.
pub fn visual_order(bracket: &Bracket) -> Vec<Vec<NodeId>> {
    let rounds = bracket.rounds();
    let mut ordered: Vec<Vec<NodeId>> = rounds.iter().map(|r| r.matches.clone()).collect();
    if ordered.len() < 2 {
        return ordered;
    }

    for i in (0..ordered.len() - 1).rev() {
        let current = &rounds[i].matches;
        let mut sorted: Vec<NodeId> = Vec::with_capacity(current.len());

        for &next in &ordered[i + 1] {
            let Some(m) = bracket.get(next) else { continue };
            for source in m.source_1.into_iter().chain(m.source_2) {
                if !current.contains(&source) {
                    debug!(
                        "{}: source outside round {} left to default order",
                        m.key,
                        rounds[i].id
                    );
                    continue;
                }
                if !sorted.contains(&source) {
                    sorted.push(source);
                }
            }
        }

        for &node in current {
            if !sorted.contains(&node) {
                sorted.push(node);
            }
        }
        ordered[i] = sorted;
    }
    ordered
}
