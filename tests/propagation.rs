//! Integration tests for winner recording and propagation.

mod common;

use common::{build, elimination_json, four_team_json, four_team_played_json, node, team};
use serde_json::json;
use tournament_bracket_web::{
    apply_winner, match_updates, propagate_winner, rank_teams, record_winner, set_winner,
    set_winner_cascading, sync_slots, Bracket, BracketError, MatchKey, MatchUpdate, Propagation,
};

fn slot_ids(bracket: &Bracket, match_id: u32) -> (Option<u32>, Option<u32>) {
    let m = bracket.get(node(bracket, match_id)).unwrap();
    (
        m.slot_a.as_ref().map(|t| t.id),
        m.slot_b.as_ref().map(|t| t.id),
    )
}

fn winner_id(bracket: &Bracket, match_id: u32) -> Option<u32> {
    let m = bracket.get(node(bracket, match_id)).unwrap();
    m.winner.as_ref().map(|t| t.id)
}

/// Every match's slots and winner, in arena order.
fn snapshot(bracket: &Bracket) -> Vec<(MatchUpdate, bool)> {
    bracket
        .nodes()
        .map(|(_, m)| (MatchUpdate::from_match(m), m.complete))
        .collect()
}

#[test]
fn winner_fills_the_slot_it_feeds() {
    let mut bracket = build(four_team_json());
    let m3 = node(&bracket, 3);
    let m4 = node(&bracket, 4);

    let changed = set_winner(&mut bracket, m3, Some(2)).unwrap();
    assert_eq!(changed, vec![node(&bracket, 5)]);
    assert_eq!(slot_ids(&bracket, 5), (Some(2), None));
    assert!(bracket.get(m3).unwrap().complete);

    set_winner(&mut bracket, m4, Some(3)).unwrap();
    assert_eq!(slot_ids(&bracket, 5), (Some(2), Some(3)));
}

#[test]
fn setting_the_same_winner_twice_changes_nothing_more() {
    let mut bracket = build(four_team_json());
    let m3 = node(&bracket, 3);

    set_winner(&mut bracket, m3, Some(1)).unwrap();
    let once = snapshot(&bracket);
    let changed = set_winner(&mut bracket, m3, Some(1)).unwrap();
    assert!(changed.is_empty());
    assert_eq!(snapshot(&bracket), once);
}

#[test]
fn clearing_then_resetting_restores_the_propagated_state() {
    let mut bracket = build(four_team_json());
    let m3 = node(&bracket, 3);
    set_winner(&mut bracket, m3, Some(1)).unwrap();
    let decided = snapshot(&bracket);

    set_winner(&mut bracket, m3, None).unwrap();
    assert_eq!(slot_ids(&bracket, 5), (None, None));
    assert!(!bracket.get(m3).unwrap().complete);

    set_winner(&mut bracket, m3, Some(1)).unwrap();
    assert_eq!(snapshot(&bracket), decided);
}

#[test]
fn resetting_a_semifinal_leaves_a_decided_final_undecided() {
    let mut bracket = build(four_team_played_json());
    let m3 = node(&bracket, 3);
    let m5 = node(&bracket, 5);

    set_winner_cascading(&mut bracket, m3, None).unwrap();
    assert_eq!(slot_ids(&bracket, 5), (None, Some(3)));
    assert_eq!(winner_id(&bracket, 5), None);
    assert!(!bracket.get(m5).unwrap().complete);

    // The same team comes back into the final, but its result is not restored.
    set_winner_cascading(&mut bracket, m3, Some(1)).unwrap();
    assert_eq!(slot_ids(&bracket, 5), (Some(1), Some(3)));
    assert_eq!(winner_id(&bracket, 5), None);
    assert!(!bracket.get(m5).unwrap().complete);

    let rankings = rank_teams(&bracket).unwrap();
    let expected: Vec<(u32, u32)> = vec![(1, 1), (2, 3), (3, 2), (4, 3)];
    assert_eq!(rankings.into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn winner_outside_the_match_is_rejected_and_nothing_changes() {
    let mut bracket = build(four_team_json());
    let m3 = node(&bracket, 3);
    set_winner(&mut bracket, m3, Some(1)).unwrap();
    let before = snapshot(&bracket);

    let err = set_winner(&mut bracket, m3, Some(4)).unwrap_err();
    assert_eq!(
        err,
        BracketError::WinnerNotInMatch {
            key: MatchKey::Persisted(3),
            team_id: 4,
        }
    );
    assert_eq!(snapshot(&bracket), before);
    assert_eq!(winner_id(&bracket, 3), Some(1));
}

#[test]
fn unsaved_team_cannot_win() {
    let mut bracket = build(json!({
        "rounds": [{ "roundId": 1, "matches": [{
            "matchId": 1, "team1": { "teamId": 0, "name": "New" }, "team2": team(2)
        }] }]
    }));
    let m1 = node(&bracket, 1);
    assert_eq!(
        record_winner(&mut bracket, m1, Some(0)).unwrap_err(),
        BracketError::UnsetTeamId(MatchKey::Persisted(1))
    );
    assert_eq!(winner_id(&bracket, 1), None);
}

#[test]
fn bye_match_only_fills_the_sourced_slot() {
    let m1 = json!({ "matchId": 1, "team1": team(1), "team2": team(2) });
    let mut bracket = build(json!({
        "rounds": [
            { "roundId": 1, "matches": [m1.clone()] },
            { "roundId": 2, "matches": [{ "matchId": 2, "sourceMatch1": m1 }] },
        ]
    }));
    let m1 = node(&bracket, 1);
    set_winner(&mut bracket, m1, Some(1)).unwrap();
    assert_eq!(slot_ids(&bracket, 2), (Some(1), None));
}

/// 8 teams: quarterfinals 100-103, semifinals 104 (100, 101) and 105, final 106.
fn eight_team_with_first_semifinal_played() -> Bracket {
    let mut bracket = build(elimination_json(8));
    for (match_id, team_id) in [(100, 1), (101, 3), (104, 1)] {
        let n = node(&bracket, match_id);
        set_winner(&mut bracket, n, Some(team_id)).unwrap();
    }
    assert_eq!(slot_ids(&bracket, 106), (Some(1), None));
    bracket
}

#[test]
fn explicit_propagation_goes_one_level_deep() {
    let mut bracket = eight_team_with_first_semifinal_played();

    let qf = node(&bracket, 100);
    let changed = set_winner(&mut bracket, qf, Some(2)).unwrap();
    assert_eq!(changed, vec![node(&bracket, 104)]);
    assert_eq!(slot_ids(&bracket, 104), (Some(2), Some(3)));
    // Team 1 no longer plays in the semifinal, so its win there is gone.
    assert_eq!(winner_id(&bracket, 104), None);
    // The final still shows team 1 until the semifinal is propagated in turn.
    assert_eq!(slot_ids(&bracket, 106), (Some(1), None));

    let semi = node(&bracket, 104);
    let changed = propagate_winner(&mut bracket, semi);
    assert_eq!(changed, vec![node(&bracket, 106)]);
    assert_eq!(slot_ids(&bracket, 106), (None, None));
}

#[test]
fn cascading_propagation_reaches_later_rounds() {
    let mut bracket = eight_team_with_first_semifinal_played();

    let qf = node(&bracket, 100);
    let changed = set_winner_cascading(&mut bracket, qf, Some(2)).unwrap();
    assert_eq!(changed, vec![node(&bracket, 104), node(&bracket, 106)]);
    assert_eq!(slot_ids(&bracket, 104), (Some(2), Some(3)));
    assert_eq!(slot_ids(&bracket, 106), (None, None));
}

#[test]
fn cascading_clear_turns_dependents_to_tbd() {
    let mut bracket = eight_team_with_first_semifinal_played();

    let qf = node(&bracket, 100);
    apply_winner(&mut bracket, qf, None, Propagation::Cascading).unwrap();
    assert_eq!(slot_ids(&bracket, 104), (None, Some(3)));
    assert_eq!(winner_id(&bracket, 104), None);
    assert_eq!(slot_ids(&bracket, 106), (None, None));
}

#[test]
fn both_styles_agree_when_nothing_downstream_is_decided() {
    let mut explicit = build(elimination_json(8));
    let mut cascading = build(elimination_json(8));
    for (match_id, team_id) in [(100, 2), (101, 4), (102, 5), (103, 8), (104, 4)] {
        let n = node(&explicit, match_id);
        apply_winner(&mut explicit, n, Some(team_id), Propagation::Explicit).unwrap();
        let n = node(&cascading, match_id);
        apply_winner(&mut cascading, n, Some(team_id), Propagation::Cascading).unwrap();
    }
    assert_eq!(snapshot(&explicit), snapshot(&cascading));
    assert_eq!(slot_ids(&explicit, 106), (Some(4), None));
}

#[test]
fn match_updates_describe_changed_matches() {
    let mut bracket = build(four_team_json());
    let m3 = node(&bracket, 3);
    let changed = set_winner(&mut bracket, m3, Some(2)).unwrap();

    let updates = match_updates(&bracket, &changed).unwrap();
    assert_eq!(
        updates,
        vec![(
            5,
            MatchUpdate {
                team1_id: Some(2),
                team2_id: None,
                winner_id: None,
            }
        )]
    );
}

#[test]
fn match_updates_reject_unsaved_matches() {
    let mut bracket = build(json!({
        "rounds": [{ "roundId": 1, "matches": [{ "team1": team(1), "team2": team(2) }] }]
    }));
    let (unsaved, _) = bracket.nodes().next().unwrap();
    set_winner(&mut bracket, unsaved, Some(1)).unwrap();
    assert!(matches!(
        match_updates(&bracket, &[unsaved]),
        Err(BracketError::UnpersistedMatch(MatchKey::Transient(_)))
    ));
}

#[test]
fn sync_fills_slots_left_empty_in_the_input() {
    let m1 = json!({
        "matchId": 1, "team1": team(1), "team2": team(2), "winner": team(2), "complete": true
    });
    let m2 = json!({ "matchId": 2, "team1": team(3), "team2": team(4) });
    let mut bracket = build(json!({
        "rounds": [
            { "roundId": 1, "matches": [m1.clone(), m2.clone()] },
            { "roundId": 2, "matches": [{ "matchId": 3, "sourceMatch1": m1, "sourceMatch2": m2 }] },
        ]
    }));
    assert_eq!(slot_ids(&bracket, 3), (None, None));

    let changed = sync_slots(&mut bracket);
    assert_eq!(changed, vec![node(&bracket, 3)]);
    assert_eq!(slot_ids(&bracket, 3), (Some(2), None));
    assert!(sync_slots(&mut bracket).is_empty());
}
