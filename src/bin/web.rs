//! Single binary web server: loads brackets into memory and serves ordering,
//! winner edits and standings as a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 127.0.0.1), PORT (e.g. 8080). Log level via RUST_LOG.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tournament_bracket_web::{
    apply_winner, build_bracket, generate_points, match_updates, rank_teams, visual_order,
    Bracket, BracketError, BracketFormat, BracketRecord, MatchId, MatchUpdate, NodeId,
    Propagation, RoundId, StandingsReplace, Team, TeamId,
};
use uuid::Uuid;

/// Key of one loaded bracket.
type SessionId = Uuid;

/// Loaded bracket, its working standings, and last activity time (for auto-cleanup).
struct BracketEntry {
    bracket: Bracket,
    /// Last generated points plus any manual edits, ready to be saved.
    standings: StandingsReplace,
    last_activity: Instant,
}

/// In-memory state: loaded brackets by session id. The write lock serializes edits.
type AppState = Data<RwLock<HashMap<SessionId, BracketEntry>>>;

/// Inactivity threshold: brackets not accessed for this long are dropped.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchView {
    match_id: Option<MatchId>,
    team1: Option<Team>,
    team2: Option<Team>,
    winner: Option<Team>,
    complete: bool,
    source_match1: Option<MatchId>,
    source_match2: Option<MatchId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundView {
    round_id: RoundId,
    matches: Vec<MatchView>,
}

/// Bracket with each round's matches in visual order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BracketView {
    session_id: SessionId,
    bracket_id: u32,
    name: String,
    #[serde(rename = "type")]
    format: BracketFormat,
    complete: bool,
    rounds: Vec<RoundView>,
}

impl BracketView {
    fn new(session_id: SessionId, bracket: &Bracket) -> Self {
        let source_id = |n: Option<NodeId>| n.and_then(|n| bracket.get(n)).and_then(|m| m.id());
        let rounds = bracket
            .rounds()
            .iter()
            .zip(visual_order(bracket))
            .map(|(round, order)| RoundView {
                round_id: round.id,
                matches: order
                    .into_iter()
                    .filter_map(|n| bracket.get(n))
                    .map(|m| MatchView {
                        match_id: m.id(),
                        team1: m.slot_a.clone(),
                        team2: m.slot_b.clone(),
                        winner: m.winner.clone(),
                        complete: m.complete,
                        source_match1: source_id(m.source_1),
                        source_match2: source_id(m.source_2),
                    })
                    .collect(),
            })
            .collect();
        Self {
            session_id,
            bracket_id: bracket.id,
            name: bracket.name.clone(),
            format: bracket.format,
            complete: bracket.complete,
            rounds,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetWinnerBody {
    /// None clears the winner.
    team_id: Option<TeamId>,
    /// Propagate through every later round instead of one scan.
    #[serde(default)]
    cascade: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchUpdateEntry {
    match_id: MatchId,
    update: MatchUpdate,
}

#[derive(Serialize)]
struct SetWinnerResponse {
    updates: Vec<MatchUpdateEntry>,
    bracket: BracketView,
}

/// Manual point edits: team id to points. Negative values are stored as 0.
#[derive(Deserialize)]
struct PointsEditBody {
    points: BTreeMap<TeamId, i64>,
}

#[derive(Deserialize)]
struct PointsBody {
    /// Every team of the tournament; teams outside the bracket score 0.
    teams: Vec<Team>,
}

/// Path segment: session id (e.g. /api/brackets/{id})
#[derive(Deserialize)]
struct BracketPath {
    id: SessionId,
}

/// Path segments: session id and persisted match id.
#[derive(Deserialize)]
struct BracketMatchPath {
    id: SessionId,
    match_id: MatchId,
}

fn no_bracket() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" }))
}

fn bad_request(e: BracketError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-bracket-web",
    })
}

/// Load a bracket from its wire record (returns it with a session id for later requests).
#[post("/api/brackets")]
async fn api_load_bracket(state: AppState, body: Json<BracketRecord>) -> HttpResponse {
    let bracket = match build_bracket(&body) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("Rejected bracket '{}': {}", body.name, e);
            return bad_request(e);
        }
    };
    let id = Uuid::new_v4();
    let view = BracketView::new(id, &bracket);
    state.write().await.insert(
        id,
        BracketEntry {
            bracket,
            standings: StandingsReplace::default(),
            last_activity: Instant::now(),
        },
    );
    log::info!("Loaded bracket '{}' as {}", view.name, id);
    HttpResponse::Ok().json(view)
}

/// Get a bracket in visual order (404 if not loaded). Touching it refreshes last_activity.
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let mut g = state.write().await;
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(BracketView::new(path.id, &entry.bracket))
        }
        None => no_bracket(),
    }
}

/// Set (or clear) a match winner, propagate it, and return the match updates to persist.
#[put("/api/brackets/{id}/matches/{match_id}/winner")]
async fn api_set_winner(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<SetWinnerBody>,
) -> HttpResponse {
    let mut g = state.write().await;
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let bracket = &mut entry.bracket;

    let node = match bracket.find_by_id(path.match_id) {
        Some(n) => n,
        None => return bad_request(BracketError::UnknownMatch(path.match_id)),
    };
    let style = if body.cascade {
        Propagation::Cascading
    } else {
        Propagation::Explicit
    };
    let changed = match apply_winner(bracket, node, body.team_id, style) {
        Ok(changed) => changed,
        Err(e) => return bad_request(e),
    };

    let (persisted, unsaved): (Vec<NodeId>, Vec<NodeId>) = std::iter::once(node)
        .chain(changed)
        .partition(|&n| bracket.get(n).and_then(|m| m.id()).is_some());
    if !unsaved.is_empty() {
        log::warn!("{} changed match(es) have no id; not reported", unsaved.len());
    }
    let updates = match match_updates(bracket, &persisted) {
        Ok(updates) => updates,
        Err(e) => return bad_request(e),
    };
    log::info!(
        "Match {} winner set to {:?}; {} match update(s)",
        path.match_id,
        body.team_id,
        updates.len()
    );
    HttpResponse::Ok().json(SetWinnerResponse {
        updates: updates
            .into_iter()
            .map(|(match_id, update)| MatchUpdateEntry { match_id, update })
            .collect(),
        bracket: BracketView::new(path.id, bracket),
    })
}

/// Rank of every team in the bracket (team id -> rank).
#[get("/api/brackets/{id}/standings")]
async fn api_standings(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let mut g = state.write().await;
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    match rank_teams(&entry.bracket) {
        Ok(ranks) => HttpResponse::Ok().json(ranks),
        Err(e) => bad_request(e),
    }
}

/// Points for the given roster from the bracket's standings, as a full standings replacement.
#[post("/api/brackets/{id}/points")]
async fn api_generate_points(
    state: AppState,
    path: Path<BracketPath>,
    body: Json<PointsBody>,
) -> HttpResponse {
    let mut g = state.write().await;
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    match generate_points(&entry.bracket, &body.teams) {
        Ok(standings) => {
            entry.standings = standings;
            HttpResponse::Ok().json(&entry.standings)
        }
        Err(e) => bad_request(e),
    }
}

/// Apply manual point edits to the working standings; returns the full replacement.
#[put("/api/brackets/{id}/standings")]
async fn api_edit_standings(
    state: AppState,
    path: Path<BracketPath>,
    body: Json<PointsEditBody>,
) -> HttpResponse {
    let mut g = state.write().await;
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    entry.standings.apply_edits(&body.points);
    log::info!(
        "Applied {} manual point edit(s) to bracket '{}'",
        body.points.len(),
        entry.bracket.name
    );
    HttpResponse::Ok().json(&entry.standings)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<SessionId, BracketEntry>::new()));

    // Background task: every 30 minutes, drop brackets inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = state_cleanup.write().await;
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive bracket(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_load_bracket)
            .service(api_get_bracket)
            .service(api_set_winner)
            .service(api_standings)
            .service(api_generate_points)
            .service(api_edit_standings)
    })
    .bind(bind)?
    .run()
    .await
}
