//! HTTP adapter: routes, bearer-token extraction, JSON error bodies, and
//! static-file serving. Handlers validate and translate; every game
//! operation goes through the strand and the engine only ever sees
//! structured values.

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tower_http::services::ServeDir;

use crate::app::{DogSnapshot, Strand, StrandClosed};
use crate::dog::Direction;
use crate::error::Error;
use crate::map::{Building, Map, MapId, Office, Road};

#[derive(Clone)]
pub struct ApiState {
    strand: Strand,
    manual_tick: bool,
}

/// Builds the full application router: the game API plus a static-file
/// fallback rooted at `www_root`.
pub fn router(strand: Strand, manual_tick: bool, www_root: PathBuf) -> Router {
    let state = ApiState {
        strand,
        manual_tick,
    };
    Router::new()
        .route("/api/v1/maps", get(list_maps).fallback(method_not_allowed_get))
        .route(
            "/api/v1/maps/{id}",
            get(get_map).fallback(method_not_allowed_get),
        )
        .route(
            "/api/v1/game/join",
            post(join_game).fallback(method_not_allowed_post),
        )
        .route(
            "/api/v1/game/players",
            get(list_players).fallback(method_not_allowed_get),
        )
        .route(
            "/api/v1/game/state",
            get(game_state).fallback(method_not_allowed_get),
        )
        .route(
            "/api/v1/game/player/action",
            post(player_action).fallback(method_not_allowed_post),
        )
        .route(
            "/api/v1/game/tick",
            post(game_tick).fallback(method_not_allowed_post),
        )
        .route("/api", any(api_fallback))
        .route("/api/{*rest}", any(api_fallback))
        .fallback_service(ServeDir::new(www_root))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn list_maps(State(state): State<ApiState>) -> Response {
    match state.strand.list_maps().await {
        Ok(maps) => {
            let body: Vec<Value> = maps.iter().map(|m| map_json(m, true)).collect();
            Json(Value::Array(body)).into_response()
        }
        Err(StrandClosed) => strand_closed(),
    }
}

async fn get_map(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.strand.find_map(MapId::new(id)).await {
        Ok(Some(map)) => Json(map_json(&map, false)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "mapNotFound", "Map not found"),
        Err(StrandClosed) => strand_closed(),
    }
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    #[serde(rename = "userName")]
    user_name: String,
    #[serde(rename = "mapId")]
    map_id: String,
}

async fn join_game(State(state): State<ApiState>, body: String) -> Response {
    let Ok(request) = serde_json::from_str::<JoinRequest>(&body) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalidArgument",
            "Join game request parse error",
        );
    };
    match state
        .strand
        .join_game(MapId::new(request.map_id), request.user_name)
        .await
    {
        Ok(Ok(result)) => Json(json!({
            "authToken": result.token,
            "playerId": result.player_id,
        }))
        .into_response(),
        Ok(Err(e)) => engine_error(e),
        Err(StrandClosed) => strand_closed(),
    }
}

async fn list_players(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let Some(token) = extract_token(&headers) else {
        return engine_error(Error::InvalidToken);
    };
    match state.strand.session_dogs(token).await {
        Ok(Ok(dogs)) => {
            let mut body = serde_json::Map::new();
            for dog in &dogs {
                body.insert(dog.id.to_string(), json!({ "name": dog.name }));
            }
            Json(Value::Object(body)).into_response()
        }
        Ok(Err(e)) => engine_error(e),
        Err(StrandClosed) => strand_closed(),
    }
}

async fn game_state(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let Some(token) = extract_token(&headers) else {
        return engine_error(Error::InvalidToken);
    };
    match state.strand.session_dogs(token).await {
        Ok(Ok(dogs)) => {
            let mut players = serde_json::Map::new();
            for dog in &dogs {
                players.insert(dog.id.to_string(), dog_state_json(dog));
            }
            Json(json!({ "players": players })).into_response()
        }
        Ok(Err(e)) => engine_error(e),
        Err(StrandClosed) => strand_closed(),
    }
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    #[serde(rename = "move")]
    move_command: String,
}

async fn player_action(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !has_json_content_type(&headers) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalidArgument",
            "Invalid content type",
        );
    }
    let Some(token) = extract_token(&headers) else {
        return engine_error(Error::InvalidToken);
    };
    let Ok(request) = serde_json::from_str::<ActionRequest>(&body) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalidArgument",
            "Failed to parse action",
        );
    };
    let command = match request.move_command.as_str() {
        "" => None,
        s => match s.parse::<Direction>() {
            Ok(direction) => Some(direction),
            Err(()) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalidArgument",
                    "Failed to parse action",
                )
            }
        },
    };
    match state.strand.move_player(token, command).await {
        Ok(Ok(())) => Json(json!({})).into_response(),
        Ok(Err(e)) => engine_error(e),
        Err(StrandClosed) => strand_closed(),
    }
}

#[derive(Debug, Deserialize)]
struct TickRequest {
    #[serde(rename = "timeDelta")]
    time_delta: u64,
}

async fn game_tick(State(state): State<ApiState>, headers: HeaderMap, body: String) -> Response {
    if !state.manual_tick {
        return error_response(StatusCode::BAD_REQUEST, "badRequest", "Invalid endpoint");
    }
    if !has_json_content_type(&headers) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalidArgument",
            "Invalid content type",
        );
    }
    let Ok(request) = serde_json::from_str::<TickRequest>(&body) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalidArgument",
            "Failed to parse tick request JSON",
        );
    };
    match state
        .strand
        .tick(Duration::from_millis(request.time_delta))
        .await
    {
        Ok(Ok(())) => Json(json!({})).into_response(),
        Ok(Err(e)) => engine_error(e),
        Err(StrandClosed) => strand_closed(),
    }
}

async fn api_fallback() -> Response {
    error_response(StatusCode::BAD_REQUEST, "badRequest", "Bad request")
}

async fn method_not_allowed_get() -> Response {
    method_not_allowed("GET, HEAD")
}

async fn method_not_allowed_post() -> Response {
    method_not_allowed("POST")
}

fn method_not_allowed(allow: &'static str) -> Response {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "invalidMethod",
        "Invalid method",
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}

/// Pulls the bearer token out of the `Authorization` header. The scheme is
/// matched case-insensitively; the credential must be exactly 32 hex
/// digits. Anything else reads as a missing token.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    if token.len() == 32 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(token.to_string())
    } else {
        None
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "application/json")
}

fn engine_error(error: Error) -> Response {
    let (status, code) = match &error {
        Error::MapNotFound => (StatusCode::NOT_FOUND, "mapNotFound"),
        Error::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalidArgument"),
        Error::InvalidToken => (StatusCode::UNAUTHORIZED, "invalidToken"),
        Error::UnknownToken => (StatusCode::UNAUTHORIZED, "unknownToken"),
        Error::DuplicateMap(_) | Error::DuplicateOffice(_) | Error::TickFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internalError")
        }
    };
    error_response(status, code, &error.to_string())
}

/// The application task is gone; the request was in flight during
/// shutdown and is abandoned with a bare 500.
fn strand_closed() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "code": code, "message": message })),
    )
        .into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    info!("request received: method={method} uri={uri}");
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "response sent: status={} uri={uri} response_time_ms={}",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

fn map_json(map: &Map, brief: bool) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("id".to_string(), json!(map.id().as_str()));
    obj.insert("name".to_string(), json!(map.name()));
    if brief {
        return Value::Object(obj);
    }
    obj.insert(
        "roads".to_string(),
        Value::Array(map.roads().iter().map(road_json).collect()),
    );
    obj.insert(
        "buildings".to_string(),
        Value::Array(map.buildings().iter().map(building_json).collect()),
    );
    obj.insert(
        "offices".to_string(),
        Value::Array(map.offices().iter().map(office_json).collect()),
    );
    Value::Object(obj)
}

fn road_json(road: &Road) -> Value {
    let start = road.start();
    if road.is_horizontal() {
        json!({ "x0": start.x, "y0": start.y, "x1": road.end().x })
    } else {
        json!({ "x0": start.x, "y0": start.y, "y1": road.end().y })
    }
}

fn building_json(building: &Building) -> Value {
    let bounds = building.bounds();
    json!({
        "x": bounds.position.x,
        "y": bounds.position.y,
        "w": bounds.size.width,
        "h": bounds.size.height,
    })
}

fn office_json(office: &Office) -> Value {
    json!({
        "id": office.id().as_str(),
        "x": office.position().x,
        "y": office.position().y,
        "offsetX": office.offset().dx,
        "offsetY": office.offset().dy,
    })
}

fn dog_state_json(dog: &DogSnapshot) -> Value {
    json!({
        "pos": [dog.position.x, dog.position.y],
        "speed": [dog.speed.u, dog.speed.v],
        "dir": dog.direction.as_str(),
    })
}
