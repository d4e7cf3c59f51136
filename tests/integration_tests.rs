//! Integration tests for the dogwalk server
//!
//! These tests drive the engine through the application façade and the
//! strand, and exercise the HTTP surface end to end through the router.

use std::time::Duration;

use assert_approx_eq::assert_approx_eq;
use dogwalk::app::{Application, Strand};
use dogwalk::dog::Direction;
use dogwalk::game::Game;
use dogwalk::geom::Point;
use dogwalk::map::{Map, MapId, Road};
use dogwalk::players::Players;

fn empty_map_game() -> Game {
    let mut game = Game::new();
    game.add_map(Map::new(MapId::new("m0"), "Wasteland")).unwrap();
    game
}

fn one_road_game() -> Game {
    let mut map = Map::new(MapId::new("m1"), "Main street");
    map.add_road(Road::horizontal(Point { x: 0, y: 0 }, 10));
    let mut game = Game::new();
    game.add_map(map).unwrap();
    game
}

fn cross_game() -> Game {
    let mut map = Map::new(MapId::new("m2"), "Crossroads");
    map.add_road(Road::horizontal(Point { x: 0, y: 0 }, 10));
    map.add_road(Road::vertical(Point { x: 5, y: 0 }, 10));
    let mut game = Game::new();
    game.add_map(map).unwrap();
    game
}

fn is_token(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// JOIN AND TOKEN SCENARIOS
mod join_tests {
    use super::*;

    /// Joining a roadless map spawns a standing dog at the origin
    #[test]
    fn join_on_empty_map() {
        let mut app = Application::new(empty_map_game(), Players::new());

        let result = app.join_game(&MapId::new("m0"), "alice").unwrap();
        assert_eq!(result.player_id, 0);
        assert!(is_token(&result.token), "bad token: {}", result.token);

        let dogs = app.session_dogs(&result.token).unwrap();
        assert_eq!(dogs.len(), 1);
        assert_eq!(dogs[0].name, "alice");
        assert_eq!(dogs[0].position.x, 0.0);
        assert_eq!(dogs[0].position.y, 0.0);
        assert!(dogs[0].speed.is_zero());
        assert_eq!(dogs[0].direction, Direction::Up);
    }

    /// The token returned by a join resolves back to the same player
    #[test]
    fn token_round_trip() {
        let mut app = Application::new(one_road_game(), Players::new());

        let result = app.join_game(&MapId::new("m1"), "bob").unwrap();
        let dog_id = app.find_by_token(&result.token).unwrap();
        assert_eq!(dog_id.value(), result.player_id);
    }

    /// A thousand joins yield a thousand distinct well-formed tokens
    #[test]
    fn a_thousand_tokens_are_distinct() {
        let mut app = Application::new(one_road_game(), Players::new());

        let mut seen = std::collections::HashSet::new();
        for i in 0..1000u64 {
            let result = app
                .join_game(&MapId::new("m1"), &format!("dog-{i}"))
                .unwrap();
            assert_eq!(result.player_id, i);
            assert!(is_token(&result.token), "bad token: {}", result.token);
            assert!(seen.insert(result.token), "token collision at join {i}");
        }
    }
}

/// MOVEMENT SCENARIOS
mod movement_tests {
    use super::*;

    fn joined(game: Game, map: &str) -> (Application, String) {
        let mut app = Application::new(game, Players::new());
        let token = app.join_game(&MapId::new(map), "rex").unwrap().token;
        (app, token)
    }

    /// One second of rightward movement at the default speed
    #[test]
    fn linear_move() {
        let (mut app, token) = joined(one_road_game(), "m1");

        app.move_player(&token, Some(Direction::Right)).unwrap();
        app.tick(Duration::from_millis(1000)).unwrap();

        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_approx_eq!(dog.position.x, 1.0);
        assert_approx_eq!(dog.position.y, 0.0);
        assert_eq!(dog.speed.u, 1.0);
        assert_eq!(dog.direction, Direction::Right);
    }

    /// A long tick clamps the dog half a road-width past the endpoint and
    /// stops it
    #[test]
    fn clamp_at_road_end() {
        let (mut app, token) = joined(one_road_game(), "m1");

        app.move_player(&token, Some(Direction::Right)).unwrap();
        app.tick(Duration::from_millis(100_000)).unwrap();

        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_approx_eq!(dog.position.x, 10.4);
        assert_approx_eq!(dog.position.y, 0.0);
        assert!(dog.speed.is_zero());
        assert_eq!(dog.direction, Direction::Right);
    }

    /// Moving across the road reaches only the band edge
    #[test]
    fn perpendicular_rejection() {
        let (mut app, token) = joined(one_road_game(), "m1");

        app.move_player(&token, Some(Direction::Down)).unwrap();
        app.tick(Duration::from_millis(1000)).unwrap();

        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_approx_eq!(dog.position.x, 0.0);
        assert_approx_eq!(dog.position.y, 0.4);
        assert!(dog.speed.is_zero());
        assert_eq!(dog.direction, Direction::Down);
    }

    /// At the junction the vertical road offers more reach than the
    /// horizontal one, so the dog turns onto it
    #[test]
    fn junction_progression() {
        let (mut app, token) = joined(cross_game(), "m2");

        app.move_player(&token, Some(Direction::Right)).unwrap();
        app.tick(Duration::from_millis(5000)).unwrap();
        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_approx_eq!(dog.position.x, 5.0);
        assert_approx_eq!(dog.position.y, 0.0);

        app.move_player(&token, Some(Direction::Down)).unwrap();
        app.tick(Duration::from_millis(2000)).unwrap();

        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_approx_eq!(dog.position.x, 5.0);
        assert_approx_eq!(dog.position.y, 2.0);
        assert_eq!(dog.direction, Direction::Down);
    }

    /// A zero-length tick changes nothing but the facing direction
    #[test]
    fn move_then_zero_tick() {
        let (mut app, token) = joined(one_road_game(), "m1");

        app.move_player(&token, Some(Direction::Left)).unwrap();
        app.tick(Duration::ZERO).unwrap();

        let dogs = app.session_dogs(&token).unwrap();
        let dog = &dogs[0];
        assert_eq!(dog.position.x, 0.0);
        assert_eq!(dog.position.y, 0.0);
        assert_eq!(dog.direction, Direction::Left);
    }

    /// Ticks never carry a dog off the road network, whatever the command
    /// sequence
    #[test]
    fn dogs_never_leave_the_road_network() {
        let (mut app, token) = joined(cross_game(), "m2");
        let commands = [
            Some(Direction::Right),
            Some(Direction::Down),
            None,
            Some(Direction::Up),
            Some(Direction::Left),
            Some(Direction::Down),
            Some(Direction::Right),
            None,
            Some(Direction::Up),
        ];

        let roads = [
            Road::horizontal(Point { x: 0, y: 0 }, 10),
            Road::vertical(Point { x: 5, y: 0 }, 10),
        ];
        for (step, command) in commands.iter().cycle().take(60).enumerate() {
            app.move_player(&token, *command).unwrap();
            app.tick(Duration::from_millis(700)).unwrap();

            let dogs = app.session_dogs(&token).unwrap();
            let dog = &dogs[0];
            let on_road = roads.iter().any(|r| r.contains(dog.position));
            assert!(on_road, "step {step}: dog off-road at {:?}", dog.position);
        }
    }
}

/// HTTP API SCENARIOS
mod api_tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router(manual_tick: bool) -> Router {
        let mut game = one_road_game();
        game.add_map(Map::new(MapId::new("m0"), "Wasteland")).unwrap();
        let strand = Strand::spawn(Application::new(game, Players::new()));
        dogwalk::api::router(strand, manual_tick, std::env::temp_dir())
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json_with_token(uri: &str, token: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn join(router: &Router, map: &str, name: &str) -> String {
        let (status, body) = call(
            router,
            post_json("/api/v1/game/join", &json!({"userName": name, "mapId": map})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["authToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn maps_are_listed_with_id_and_name() {
        let router = test_router(true);
        let (status, body) = call(&router, get("/api/v1/maps")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"id": "m1", "name": "Main street"},
                {"id": "m0", "name": "Wasteland"}
            ])
        );
    }

    #[tokio::test]
    async fn single_map_is_served_in_full() {
        let router = test_router(true);
        let (status, body) = call(&router, get("/api/v1/maps/m1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "m1");
        assert_eq!(body["roads"], json!([{"x0": 0, "y0": 0, "x1": 10}]));
    }

    #[tokio::test]
    async fn unknown_map_is_a_404() {
        let router = test_router(true);
        let (status, body) = call(&router, get("/api/v1/maps/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "mapNotFound");
    }

    #[tokio::test]
    async fn join_returns_token_and_player_id() {
        let router = test_router(true);
        let (status, body) = call(
            &router,
            post_json(
                "/api/v1/game/join",
                &json!({"userName": "alice", "mapId": "m1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["playerId"], 0);
        assert!(is_token(body["authToken"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn join_rejects_garbage_bodies() {
        let router = test_router(true);
        for body in [
            json!({"userName": "alice"}),
            json!({"mapId": "m1"}),
            json!({"userName": 5, "mapId": "m1"}),
        ] {
            let (status, response) = call(&router, post_json("/api/v1/game/join", &body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
            assert_eq!(response["code"], "invalidArgument");
        }
    }

    #[tokio::test]
    async fn join_rejects_empty_names_and_unknown_maps() {
        let router = test_router(true);

        let (status, body) = call(
            &router,
            post_json("/api/v1/game/join", &json!({"userName": "", "mapId": "m1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalidArgument");

        let (status, body) = call(
            &router,
            post_json(
                "/api/v1/game/join",
                &json!({"userName": "alice", "mapId": "nowhere"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "mapNotFound");
    }

    #[tokio::test]
    async fn players_requires_a_token() {
        let router = test_router(true);

        let (status, body) = call(&router, get("/api/v1/game/players")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalidToken");

        let (status, body) = call(
            &router,
            get_with_token("/api/v1/game/players", "0123456789abcdef0123456789abcdef"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unknownToken");
    }

    #[tokio::test]
    async fn players_lists_the_session_roster() {
        let router = test_router(true);
        let token = join(&router, "m1", "alice").await;
        join(&router, "m1", "bob").await;
        join(&router, "m0", "stranger").await;

        let (status, body) = call(&router, get_with_token("/api/v1/game/players", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"0": {"name": "alice"}, "1": {"name": "bob"}})
        );
    }

    #[tokio::test]
    async fn move_and_manual_tick_update_the_state() {
        let router = test_router(true);
        let token = join(&router, "m1", "alice").await;

        let (status, body) = call(
            &router,
            post_json_with_token("/api/v1/game/player/action", &token, &json!({"move": "R"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, _) = call(
            &router,
            post_json("/api/v1/game/tick", &json!({"timeDelta": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, get_with_token("/api/v1/game/state", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["players"]["0"],
            json!({"pos": [1.0, 0.0], "speed": [1.0, 0.0], "dir": "R"})
        );
    }

    #[tokio::test]
    async fn action_validates_command_and_content_type() {
        let router = test_router(true);
        let token = join(&router, "m1", "alice").await;

        let (status, body) = call(
            &router,
            post_json_with_token("/api/v1/game/player/action", &token, &json!({"move": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalidArgument");

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/api/v1/game/player/action")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(r#"{"move": "R"}"#))
            .unwrap();
        let (status, body) = call(&router, no_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalidArgument");
    }

    #[tokio::test]
    async fn stopping_preserves_the_direction() {
        let router = test_router(true);
        let token = join(&router, "m1", "alice").await;

        for command in ["R", ""] {
            let (status, _) = call(
                &router,
                post_json_with_token(
                    "/api/v1/game/player/action",
                    &token,
                    &json!({"move": command}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = call(&router, get_with_token("/api/v1/game/state", &token)).await;
        assert_eq!(body["players"]["0"]["speed"], json!([0.0, 0.0]));
        assert_eq!(body["players"]["0"]["dir"], "R");
    }

    #[tokio::test]
    async fn tick_is_rejected_when_the_server_ticks_itself() {
        let router = test_router(false);
        let (status, body) = call(
            &router,
            post_json("/api/v1/game/tick", &json!({"timeDelta": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "badRequest");
    }

    #[tokio::test]
    async fn tick_rejects_malformed_deltas() {
        let router = test_router(true);
        for body in [json!({"timeDelta": -5}), json!({"timeDelta": "soon"}), json!({})] {
            let (status, response) = call(&router, post_json("/api/v1/game/tick", &body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
            assert_eq!(response["code"], "invalidArgument");
        }
    }

    #[tokio::test]
    async fn wrong_methods_get_an_allow_header() {
        let router = test_router(true);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/maps")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");

        let response = router.clone().oneshot(get("/api/v1/game/join")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }

    #[tokio::test]
    async fn unknown_api_targets_are_bad_requests() {
        let router = test_router(true);
        let (status, body) = call(&router, get("/api/v1/game/nonsense")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "badRequest");
    }

    #[tokio::test]
    async fn head_requests_are_accepted_on_reads() {
        let router = test_router(true);
        let request = Request::builder()
            .method("HEAD")
            .uri("/api/v1/maps")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
