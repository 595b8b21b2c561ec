//! Conversion of raw API payloads into canonical entities.
//!
//! Everything here is synchronous. Registered players whose profile was
//! not embedded come back as [`CompetitorSource::Lookup`]; resolving them
//! through the gateway is left to [`crate::service`].

use std::collections::HashSet;

use bests_core::duration::normalize_duration_text;
use bests_core::entities::{CompetitiveUnit, Competitor, Game, NamedRef, NewGame, NewRun, Run};
use bests_core::error::CoreError;
use bests_core::types::{RunDate, Timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::payload::{
    CategoryKind, RawGame, RawPersonalBest, RawPlayer, RawRun, RawUser,
};

// ---------------------------------------------------------------------------
// Games and units
// ---------------------------------------------------------------------------

pub fn game(raw: &RawGame) -> Result<Game, CoreError> {
    Game::new(NewGame {
        id: raw.id.clone(),
        name: raw.names.international.clone(),
        abbreviation: raw.abbreviation.clone(),
        url: raw.weblink.clone(),
        icon_url: raw
            .assets
            .as_ref()
            .and_then(|a| a.icon.as_ref())
            .and_then(|i| i.uri.clone()),
    })
}

/// Enumerate the competitive units of a game with embedded categories
/// and levels.
///
/// Per-game categories come first, in API order, followed by every
/// level paired with each per-level category.
pub fn competitive_units(raw: &RawGame) -> Result<Vec<CompetitiveUnit>, CoreError> {
    let categories = raw.categories.as_ref().map(|c| c.data.as_slice()).unwrap_or_default();
    let levels = raw.levels.as_ref().map(|l| l.data.as_slice()).unwrap_or_default();

    let mut units = Vec::new();
    for category in categories.iter().filter(|c| c.kind == CategoryKind::PerGame) {
        units.push(CompetitiveUnit::per_game(
            &raw.id,
            NamedRef::new(&category.id, &category.name),
            &category.weblink,
        )?);
    }

    let level_categories: Vec<_> = categories
        .iter()
        .filter(|c| c.kind == CategoryKind::PerLevel)
        .collect();
    for level in levels {
        for category in &level_categories {
            units.push(CompetitiveUnit::per_level(
                &raw.id,
                NamedRef::new(&level.id, &level.name),
                NamedRef::new(&category.id, &category.name),
                &level.weblink,
            )?);
        }
    }

    Ok(units)
}

// ---------------------------------------------------------------------------
// Competitors
// ---------------------------------------------------------------------------

/// Where a run's competitor comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CompetitorSource {
    Ready(Competitor),
    /// A registered account whose profile must be fetched from `users/{id}`.
    Lookup { user_id: String },
}

pub fn competitor_from_user(raw: &RawUser) -> Result<Competitor, CoreError> {
    Competitor::registered(&raw.id, &raw.names.international, raw.weblink.clone())
}

/// Resolve the credited players of a run.
///
/// Anything other than exactly one player becomes a group placeholder.
pub fn competitor_source(players: &[RawPlayer]) -> Result<CompetitorSource, CoreError> {
    let [player] = players else {
        return Ok(CompetitorSource::Ready(Competitor::group(players.len())));
    };

    match player {
        RawPlayer::User {
            id,
            names: Some(names),
            weblink,
        } => Ok(CompetitorSource::Ready(Competitor::registered(
            id,
            &names.international,
            weblink.clone(),
        )?)),
        RawPlayer::User { id, names: None, .. } => {
            Ok(CompetitorSource::Lookup { user_id: id.clone() })
        }
        RawPlayer::Guest { name } => Ok(CompetitorSource::Ready(Competitor::guest(name)?)),
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Build a [`Run`] from its payload and already-resolved competitor.
pub fn run(raw: RawRun, competitor: Competitor) -> Result<Run, CoreError> {
    let duration_text = normalize_duration_text(&raw.times.primary)?;
    let date = parse_date(&raw.id, raw.date.as_deref())?;
    let submitted = parse_timestamp(&raw.id, raw.submitted.as_deref())?;

    Run::new(NewRun {
        id: raw.id,
        competitor,
        duration_seconds: raw.times.primary_t,
        duration_text,
        date,
        submitted,
        category_id: raw.category,
        level_id: raw.level,
        url: raw.weblink,
    })
}

fn parse_date(run_id: &str, date: Option<&str>) -> Result<Option<RunDate>, CoreError> {
    date.map(|d| {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|e| {
            CoreError::Validation(format!("Run {run_id} has an invalid date {d:?}: {e}"))
        })
    })
    .transpose()
}

fn parse_timestamp(run_id: &str, submitted: Option<&str>) -> Result<Option<Timestamp>, CoreError> {
    submitted
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    CoreError::Validation(format!(
                        "Run {run_id} has an invalid submission time {s:?}: {e}"
                    ))
                })
        })
        .transpose()
}

// ---------------------------------------------------------------------------
// Personal-best scope
// ---------------------------------------------------------------------------

/// Games and units a competitor holds personal bests in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonalBestScope {
    pub game_ids: Vec<String>,
    /// Unit slugs as accepted by [`CompetitiveUnit::matches_slug`].
    pub unit_slugs: Vec<String>,
}

/// Collect the distinct games and unit slugs, in first-seen order.
pub fn personal_best_scope(entries: &[RawPersonalBest]) -> PersonalBestScope {
    let mut scope = PersonalBestScope::default();
    let mut seen_games = HashSet::new();
    let mut seen_units = HashSet::new();

    for entry in entries {
        let record = &entry.run;
        if seen_games.insert(record.game.as_str()) {
            scope.game_ids.push(record.game.clone());
        }

        let slug = match (record.category.as_deref(), record.level.as_deref()) {
            (Some(category), Some(level)) => format!("{category}-{level}"),
            (None, Some(level)) => level.to_string(),
            (Some(category), None) => category.to_string(),
            (None, None) => continue,
        };
        if seen_units.insert(slug.clone()) {
            scope.unit_slugs.push(slug);
        }
    }

    scope
}
