#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bests_api::config::ServerConfig;
use bests_api::router::build_app_router;
use bests_api::state::AppState;
use bests_speedrun::gateway::Gateway;
use bests_speedrun::memory::MemoryTransport;
use bests_speedrun::service::ProgressionService;

pub const GAME_PATH: &str = "games/wc2?embed=categories,levels";
pub const ANY_RUNS_PATH: &str =
    "runs?game=g1&status=verified&orderby=date&direction=asc&max=200&embed=players&category=any";
pub const GAME_RUNS_PATH: &str = "runs?game=g1&orderby=date&direction=asc&max=200&embed=players";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        api_root_url: "http://leaderboard.test/api/v1/".to_string(),
        api_max_pages: 4,
        api_page_size: 200,
        api_cache_ttl_secs: 300,
    }
}

/// Build the full application router over canned leaderboard responses.
pub fn build_test_app(transport: MemoryTransport) -> Router {
    let config = test_config();
    let gateway = Gateway::new(Arc::new(transport), config.gateway_config());
    let state = AppState {
        config: Arc::new(config.clone()),
        service: Arc::new(ProgressionService::new(Arc::new(gateway))),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One full-game category (`any`) and no levels.
pub fn game_body() -> Value {
    json!({ "data": {
        "id": "g1",
        "names": { "international": "Warcraft II" },
        "abbreviation": "wc2",
        "weblink": "https://example.test/wc2",
        "categories": { "data": [
            { "id": "any", "name": "Any%", "type": "per-game", "weblink": "https://example.test/any" }
        ]},
        "levels": { "data": [] }
    }})
}

pub fn user_body() -> Value {
    json!({ "data": {
        "id": "u-zpr",
        "names": { "international": "ZPR" },
        "weblink": "https://example.test/users/ZPR"
    }})
}

/// Three `any` runs: ZPR 1:40, a guest 1:30, ZPR 1:35.
pub fn runs_body() -> Value {
    let zpr = json!({ "data": [{
        "rel": "user", "id": "u-zpr",
        "names": { "international": "ZPR" },
        "weblink": "https://example.test/users/ZPR"
    }]});
    let guest = json!([{ "rel": "guest", "name": "Banks" }]);
    json!({
        "data": [
            {
                "id": "r1", "category": "any", "date": "2017-01-01",
                "players": zpr, "times": { "primary": "PT1M40S", "primary_t": 100 }
            },
            {
                "id": "r2", "category": "any", "date": "2017-02-01",
                "players": guest, "times": { "primary": "PT1M30S", "primary_t": 90 }
            },
            {
                "id": "r3", "category": "any", "date": "2017-03-01",
                "players": zpr, "times": { "primary": "PT1M35.250S", "primary_t": 95.25 }
            }
        ],
        "pagination": { "max": 200, "links": [] }
    })
}

/// A transport serving the game, the competitor and the runs above.
pub fn leaderboard() -> MemoryTransport {
    MemoryTransport::new()
        .respond(GAME_PATH, game_body())
        .respond("users/ZPR", user_body())
        .respond(ANY_RUNS_PATH, runs_body())
        .respond(GAME_RUNS_PATH, runs_body())
}
