//! Raw speedrun.com API payloads.
//!
//! These mirror the JSON the API returns and are only ever deserialized.
//! Unknown fields are ignored; [`crate::normalize`] turns them into the
//! canonical [`bests_core::entities`] types.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::gateway::GatewayError;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Top-level document of every API response.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Present only on failures, usually an HTTP status code.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl Envelope {
    /// The API-reported failure, if this document is one.
    pub fn failure(&self) -> Option<GatewayError> {
        let status = self.status.as_ref()?;
        let status = match status {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(GatewayError::ApiStatus {
            status,
            message: self.message.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Page size the API applied to this response.
    #[serde(default)]
    pub max: u64,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.links.iter().any(|l| l.rel == "next")
    }
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub rel: String,
    #[serde(default)]
    pub uri: String,
}

/// An embedded collection, `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
pub struct Embedded<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNames {
    pub international: String,
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// `games/{slug}?embed=categories,levels`
#[derive(Debug, Deserialize)]
pub struct RawGame {
    pub id: String,
    pub names: RawNames,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub weblink: String,
    #[serde(default)]
    pub assets: Option<RawAssets>,
    #[serde(default)]
    pub categories: Option<Embedded<RawCategory>>,
    #[serde(default)]
    pub levels: Option<Embedded<RawLevel>>,
}

#[derive(Debug, Deserialize)]
pub struct RawAssets {
    #[serde(default)]
    pub icon: Option<RawAsset>,
}

#[derive(Debug, Deserialize)]
pub struct RawAsset {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryKind {
    PerGame,
    PerLevel,
}

#[derive(Debug, Deserialize)]
pub struct RawCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weblink: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

#[derive(Debug, Deserialize)]
pub struct RawLevel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weblink: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// `users/{slug}`
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub names: RawNames,
    #[serde(default)]
    pub weblink: Option<String>,
}

/// One entry of `users/{slug}/personal-bests`.
#[derive(Debug, Deserialize)]
pub struct RawPersonalBest {
    #[serde(default)]
    pub place: Option<u64>,
    pub run: RawRecordRef,
}

/// The unit coordinates of a personal best.
#[derive(Debug, Deserialize)]
pub struct RawRecordRef {
    pub game: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// One entry of `runs?...`.
#[derive(Debug, Deserialize)]
pub struct RawRun {
    pub id: String,
    #[serde(default)]
    pub weblink: String,
    pub category: String,
    #[serde(default)]
    pub level: Option<String>,
    /// `YYYY-MM-DD`, when the run was performed.
    #[serde(default)]
    pub date: Option<String>,
    /// RFC 3339 submission timestamp.
    #[serde(default)]
    pub submitted: Option<String>,
    pub players: RawPlayers,
    pub times: RawTimes,
    #[serde(default)]
    pub status: Option<RawRunStatus>,
}

impl RawRun {
    pub fn is_rejected(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.status == "rejected")
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTimes {
    /// ISO 8601 duration text, e.g. `PT1H2M3.450S`.
    pub primary: String,
    pub primary_t: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawRunStatus {
    pub status: String,
}

/// Player list of a run: embedded profiles with `embed=players`, bare
/// references otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPlayers {
    Embedded { data: Vec<RawPlayer> },
    Bare(Vec<RawPlayer>),
}

impl RawPlayers {
    pub fn as_slice(&self) -> &[RawPlayer] {
        match self {
            RawPlayers::Embedded { data } => data,
            RawPlayers::Bare(players) => players,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "rel", rename_all = "lowercase")]
pub enum RawPlayer {
    /// A registered account. `names` is only present when embedded.
    User {
        id: String,
        #[serde(default)]
        names: Option<RawNames>,
        #[serde(default)]
        weblink: Option<String>,
    },
    Guest { name: String },
}

/// Deserialize one gateway record, naming `path` on failure.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
