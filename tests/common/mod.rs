//! Shared bracket fixtures for the integration tests, written as wire JSON.

#![allow(dead_code)]

use serde_json::{json, Value};
use tournament_bracket_web::{build_bracket, Bracket, BracketRecord, NodeId};

pub fn team(id: u32) -> Value {
    json!({ "teamId": id, "name": format!("Team {id}") })
}

pub fn record(value: Value) -> BracketRecord {
    serde_json::from_value(value).expect("valid bracket record")
}

pub fn build(value: Value) -> Bracket {
    build_bracket(&record(value)).expect("bracket builds")
}

/// Node of a persisted match id.
pub fn node(bracket: &Bracket, match_id: u32) -> NodeId {
    bracket
        .find_by_id(match_id)
        .unwrap_or_else(|| panic!("match {match_id} in bracket"))
}

/// 4-team single elimination: match 3 (teams 1 v 2) and match 4 (teams 3 v 4)
/// feed match 5. Rounds are listed final first, and match 5 repeats its sources
/// verbatim the way the API nests them.
pub fn four_team_json() -> Value {
    let m3 = json!({ "matchId": 3, "team1": team(1), "team2": team(2) });
    let m4 = json!({ "matchId": 4, "team1": team(3), "team2": team(4) });
    let m5 = json!({ "matchId": 5, "sourceMatch1": m3.clone(), "sourceMatch2": m4.clone() });
    json!({
        "bracketId": 1,
        "name": "Spring Cup",
        "type": "SINGLE_ELIMINATION",
        "rounds": [
            { "roundId": 20, "matches": [m5] },
            { "roundId": 10, "matches": [m3, m4] },
        ]
    })
}

/// 4-team bracket already played: team 1 beat 2, team 3 beat 4, team 1 won the final.
pub fn four_team_played_json() -> Value {
    let m3 = json!({
        "matchId": 3, "team1": team(1), "team2": team(2), "winner": team(1), "complete": true
    });
    let m4 = json!({
        "matchId": 4, "team1": team(3), "team2": team(4), "winner": team(3), "complete": true
    });
    let m5 = json!({
        "matchId": 5, "team1": team(1), "team2": team(3), "winner": team(1), "complete": true,
        "sourceMatch1": m3.clone(), "sourceMatch2": m4.clone()
    });
    json!({
        "bracketId": 2,
        "name": "Played Cup",
        "type": "SINGLE_ELIMINATION",
        "rounds": [
            { "roundId": 1, "matches": [m3, m4] },
            { "roundId": 2, "matches": [m5] },
        ]
    })
}

/// Undecided single elimination for `team_count` teams (a power of two).
///
/// Teams are numbered from 1, first-round match `k` pairs teams `2k+1` and `2k+2`.
/// Match ids count up from 100 round by round; round ids are 10, 20, ...
pub fn elimination_json(team_count: u32) -> Value {
    let mut next_id = 100;
    let mut previous: Vec<Value> = (0..team_count / 2)
        .map(|k| {
            next_id += 1;
            json!({ "matchId": next_id - 1, "team1": team(2 * k + 1), "team2": team(2 * k + 2) })
        })
        .collect();
    let mut rounds = vec![previous.clone()];
    while previous.len() > 1 {
        let current: Vec<Value> = previous
            .chunks(2)
            .map(|pair| {
                next_id += 1;
                json!({
                    "matchId": next_id - 1,
                    "sourceMatch1": pair[0].clone(),
                    "sourceMatch2": pair[1].clone()
                })
            })
            .collect();
        rounds.push(current.clone());
        previous = current;
    }
    let rounds: Vec<Value> = rounds
        .into_iter()
        .enumerate()
        .map(|(i, matches)| json!({ "roundId": (i as u32 + 1) * 10, "matches": matches }))
        .collect();
    json!({ "bracketId": 9, "name": "Generated", "type": "SINGLE_ELIMINATION", "rounds": rounds })
}
