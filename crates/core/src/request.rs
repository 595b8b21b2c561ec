//! Validated progression requests.
//!
//! A request names one or more games and, for a personal-record view,
//! exactly one competitor. The compact descriptor form is
//! `game[+game...][@competitor]`, e.g. `wc2+wc2btdp@ZPR`.

use serde::Serialize;

use crate::error::CoreError;

const GAME_SEPARATOR: char = '+';
const COMPETITOR_SEPARATOR: char = '@';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionRequest {
    game_slugs: Vec<String>,
    competitor_slug: Option<String>,
    unit_filter: Option<String>,
}

impl ProgressionRequest {
    /// Build a request, rejecting a missing game or a blank competitor.
    ///
    /// Blank game slugs are skipped; at least one must remain.
    pub fn new(
        game_slugs: impl IntoIterator<Item = String>,
        competitor_slug: Option<String>,
    ) -> Result<Self, CoreError> {
        let game_slugs: Vec<String> = game_slugs
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if game_slugs.is_empty() {
            return Err(CoreError::InvalidRequest("no game(s) requested".to_string()));
        }

        let competitor_slug = match competitor_slug {
            Some(slug) if slug.trim().is_empty() => {
                return Err(CoreError::InvalidRequest(
                    "personal records requested without a competitor".to_string(),
                ));
            }
            other => other.map(|s| s.trim().to_string()),
        };

        Ok(Self {
            game_slugs,
            competitor_slug,
            unit_filter: None,
        })
    }

    /// Parse the `games@competitor` descriptor form.
    pub fn parse(descriptor: &str) -> Result<Self, CoreError> {
        let mut parts = descriptor.split(COMPETITOR_SEPARATOR);
        let games = parts.next().unwrap_or_default();
        let competitor = parts.next();
        if parts.next().is_some() {
            return Err(CoreError::InvalidRequest(format!(
                "exactly one competitor may be named, got {descriptor:?}"
            )));
        }

        Self::new(
            games.split(GAME_SEPARATOR).map(str::to_string),
            competitor.map(str::to_string),
        )
    }

    /// Restrict the report to units matching `selector` (see
    /// [`CompetitiveUnit::matches_slug`](crate::entities::CompetitiveUnit::matches_slug)).
    pub fn with_unit_filter(mut self, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        self.unit_filter = (!selector.is_empty()).then_some(selector);
        self
    }

    pub fn game_slugs(&self) -> &[String] {
        &self.game_slugs
    }

    pub fn competitor_slug(&self) -> Option<&str> {
        self.competitor_slug.as_deref()
    }

    pub fn unit_filter(&self) -> Option<&str> {
        self.unit_filter.as_deref()
    }
}
