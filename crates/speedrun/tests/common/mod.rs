#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use bests_speedrun::gateway::{Gateway, GatewayConfig};
use bests_speedrun::memory::MemoryTransport;
use bests_speedrun::service::ProgressionService;

pub const GAME_PATH: &str = "games/wc2?embed=categories,levels";

/// Per-unit run listing path for a full-game category of `o1y9wo6q`.
pub fn unit_runs_path(category: &str) -> String {
    format!(
        "runs?game=o1y9wo6q&status=verified&orderby=date&direction=asc&max=200&embed=players&category={category}"
    )
}

/// Per-unit run listing path for a level of `o1y9wo6q`.
pub fn level_runs_path(category: &str, level: &str) -> String {
    format!("{}&level={level}", unit_runs_path(category))
}

/// Game-wide run listing path for `o1y9wo6q`.
pub const GAME_RUNS_PATH: &str =
    "runs?game=o1y9wo6q&orderby=date&direction=asc&max=200&embed=players";

/// A game with two full-game categories and one level category.
pub fn game_body() -> Value {
    json!({ "data": {
        "id": "o1y9wo6q",
        "names": { "international": "Warcraft II" },
        "abbreviation": "wc2",
        "weblink": "https://www.speedrun.com/wc2",
        "assets": { "icon": { "uri": "https://example.test/wc2.png" } },
        "categories": { "data": [
            { "id": "any", "name": "Any%", "type": "per-game", "weblink": "https://example.test/any" },
            { "id": "all", "name": "All Missions", "type": "per-game", "weblink": "https://example.test/all" },
            { "id": "il", "name": "Fastest", "type": "per-level", "weblink": "https://example.test/il" }
        ]},
        "levels": { "data": [
            { "id": "h01", "name": "Human 01", "weblink": "https://example.test/h01" }
        ]}
    }})
}

pub fn user_body(id: &str, name: &str) -> Value {
    json!({ "data": {
        "id": id,
        "names": { "international": name },
        "weblink": format!("https://example.test/users/{name}")
    }})
}

/// A run by an embedded registered user.
pub fn run(id: &str, category: &str, user: (&str, &str), seconds: f64, date: &str) -> Value {
    json!({
        "id": id,
        "weblink": format!("https://example.test/run/{id}"),
        "category": category,
        "level": null,
        "date": date,
        "submitted": format!("{date}T12:00:00Z"),
        "players": { "data": [{
            "rel": "user",
            "id": user.0,
            "names": { "international": user.1 },
            "weblink": format!("https://example.test/users/{}", user.1)
        }]},
        "times": { "primary": iso_duration(seconds), "primary_t": seconds },
        "status": { "status": "verified" }
    })
}

/// `PT{m}M{s}[.ms]S` text for a duration under an hour.
pub fn iso_duration(seconds: f64) -> String {
    let whole = seconds.trunc() as u64;
    let millis = ((seconds - seconds.trunc()) * 1000.0).round() as u64;
    let (m, s) = (whole / 60, whole % 60);
    if millis == 0 {
        format!("PT{m}M{s}S")
    } else {
        format!("PT{m}M{s}.{millis:03}S")
    }
}

/// A single page with no further links.
pub fn page(items: Vec<Value>) -> Value {
    json!({ "data": items, "pagination": { "max": 200, "links": [] } })
}

pub fn service(transport: MemoryTransport) -> (ProgressionService, Arc<MemoryTransport>) {
    let transport = Arc::new(transport);
    let gateway = Gateway::new(transport.clone(), GatewayConfig::default());
    (ProgressionService::new(Arc::new(gateway)), transport)
}

pub fn slow(transport: MemoryTransport) -> MemoryTransport {
    transport.with_latency(Duration::from_millis(20))
}
