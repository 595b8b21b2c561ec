//! Canonical leaderboard entities.
//!
//! Every entity is an immutable value: fields are private, construction
//! goes through a validating constructor, and there are no setters. Raw
//! API payloads are turned into these types by the leaderboard crate's
//! normalizer; nothing else builds them from untrusted data.

use serde::Serialize;
use validator::Validate;

use crate::error::CoreError;
use crate::slug::slugify;
use crate::types::{RunDate, Seconds, Timestamp};

// ---------------------------------------------------------------------------
// Competitor
// ---------------------------------------------------------------------------

/// How a competitor is known to the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompetitorIdentity {
    /// A registered account with a stable id.
    Registered { user_id: String },
    /// A guest entry identified only by the name typed on submission.
    Guest,
    /// A run credited to several players at once. Never matches anyone.
    Group { players: usize },
}

/// A player (or group of players) credited with a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Validate)]
pub struct Competitor {
    identity: CompetitorIdentity,
    #[validate(length(min = 1))]
    name: String,
    url: Option<String>,
}

impl Competitor {
    /// A registered account resolved from the leaderboard's user profile.
    pub fn registered(
        user_id: impl Into<String>,
        name: impl Into<String>,
        url: Option<String>,
    ) -> Result<Self, CoreError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(CoreError::Validation(
                "Registered competitor must have a user id".to_string(),
            ));
        }
        let competitor = Self {
            identity: CompetitorIdentity::Registered { user_id },
            name: name.into(),
            url,
        };
        competitor.validate()?;
        Ok(competitor)
    }

    /// An unregistered guest known only by name.
    pub fn guest(name: impl Into<String>) -> Result<Self, CoreError> {
        let competitor = Self {
            identity: CompetitorIdentity::Guest,
            name: name.into(),
            url: None,
        };
        competitor.validate()?;
        Ok(competitor)
    }

    /// Placeholder for a run with several co-players, labeled `"{n} players"`.
    pub fn group(players: usize) -> Self {
        Self {
            identity: CompetitorIdentity::Group { players },
            name: format!("{players} players"),
            url: None,
        }
    }

    pub fn identity(&self) -> &CompetitorIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.identity, CompetitorIdentity::Registered { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.identity {
            CompetitorIdentity::Registered { user_id } => Some(user_id),
            _ => None,
        }
    }

    /// Whether two competitors denote the same person.
    ///
    /// Registered accounts match by user id, guests by name. Group
    /// placeholders have no identity and match nothing, themselves included.
    pub fn is_same_competitor(&self, other: &Competitor) -> bool {
        match (&self.identity, &other.identity) {
            (
                CompetitorIdentity::Registered { user_id: a },
                CompetitorIdentity::Registered { user_id: b },
            ) => a == b,
            (CompetitorIdentity::Guest, CompetitorIdentity::Guest) => self.name == other.name,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Input for [`Game::new`].
#[derive(Debug, Clone)]
pub struct NewGame {
    pub id: String,
    pub name: String,
    /// Short abbreviation; the slug falls back to the id when absent.
    pub abbreviation: Option<String>,
    pub url: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct Game {
    #[validate(length(min = 1))]
    id: String,
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1))]
    slug: String,
    url: String,
    icon_url: Option<String>,
}

impl Game {
    pub fn new(input: NewGame) -> Result<Self, CoreError> {
        let slug = input
            .abbreviation
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| input.id.clone());
        let game = Self {
            id: input.id,
            name: input.name,
            slug,
            url: input.url,
            icon_url: input.icon_url,
        };
        game.validate()?;
        Ok(game)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Competitive unit
// ---------------------------------------------------------------------------

/// An id together with its display name (a category or a level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

impl NamedRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A scoring category, optionally narrowed to one level.
///
/// Records are tracked independently per unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Validate)]
pub struct CompetitiveUnit {
    #[validate(length(min = 1))]
    game_id: String,
    #[validate(length(min = 1))]
    category_id: String,
    category_name: String,
    level_id: Option<String>,
    level_name: Option<String>,
    name: String,
    url: String,
    slug: String,
    name_slug: String,
}

impl CompetitiveUnit {
    /// A full-game category. The display name is the category name.
    pub fn per_game(
        game_id: impl Into<String>,
        category: NamedRef,
        url: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let name = category.name.clone();
        Self::build(game_id.into(), category, None, name, url.into())
    }

    /// A per-level category scoped to `level`, named `"{level} ({category})"`.
    pub fn per_level(
        game_id: impl Into<String>,
        level: NamedRef,
        category: NamedRef,
        url: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let name = format!("{} ({})", level.name, category.name);
        Self::build(game_id.into(), category, Some(level), name, url.into())
    }

    fn build(
        game_id: String,
        category: NamedRef,
        level: Option<NamedRef>,
        name: String,
        url: String,
    ) -> Result<Self, CoreError> {
        let (level_id, level_name) = match level {
            Some(level) => (Some(level.id), Some(level.name)),
            None => (None, None),
        };

        let slug = join_present([Some(category.id.as_str()), level_id.as_deref()]);
        let name_slug = slugify(&join_present([
            Some(category.name.as_str()),
            level_name.as_deref(),
        ]));

        let unit = Self {
            game_id,
            category_id: category.id,
            category_name: category.name,
            level_id,
            level_name,
            name,
            url,
            slug,
            name_slug,
        };
        unit.validate()?;
        Ok(unit)
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn level_id(&self) -> Option<&str> {
        self.level_id.as_deref()
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level_name.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Composite `{category_id}-{level_id}` slug (just the category id for
    /// full-game units).
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Human-readable slug built from the category and level names.
    pub fn name_slug(&self) -> &str {
        &self.name_slug
    }

    /// Whether a user-supplied selector refers to this unit.
    ///
    /// Accepted, in order: the composite slug, the bare category id, the
    /// bare level id, the slugified level name, the slugified category
    /// name, and the combined name slug.
    pub fn matches_slug(&self, selector: &str) -> bool {
        if selector == self.slug || selector == self.category_id {
            return true;
        }
        if self.level_id.as_deref() == Some(selector) {
            return true;
        }
        if let Some(level_name) = &self.level_name {
            if slugify(level_name) == selector {
                return true;
            }
        }
        if slugify(&self.category_name) == selector {
            return true;
        }
        self.level_name.is_some() && self.name_slug == selector
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Input for [`Run::new`].
#[derive(Debug, Clone)]
pub struct NewRun {
    pub id: String,
    pub competitor: Competitor,
    pub duration_seconds: Seconds,
    /// Already-normalized display text (see [`crate::duration`]).
    pub duration_text: String,
    pub date: Option<RunDate>,
    pub submitted: Option<Timestamp>,
    pub category_id: String,
    pub level_id: Option<String>,
    pub url: String,
}

/// A verified leaderboard submission.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct Run {
    #[validate(length(min = 1))]
    id: String,
    #[validate(nested)]
    competitor: Competitor,
    #[validate(range(min = 0.0))]
    duration_seconds: Seconds,
    duration_text: String,
    date: Option<RunDate>,
    submitted: Option<Timestamp>,
    #[validate(length(min = 1))]
    category_id: String,
    level_id: Option<String>,
    url: String,
}

impl Run {
    pub fn new(input: NewRun) -> Result<Self, CoreError> {
        if !input.duration_seconds.is_finite() {
            return Err(CoreError::Validation(format!(
                "Run {} has a non-finite duration",
                input.id
            )));
        }
        let run = Self {
            id: input.id,
            competitor: input.competitor,
            duration_seconds: input.duration_seconds,
            duration_text: input.duration_text,
            date: input.date,
            submitted: input.submitted,
            category_id: input.category_id,
            level_id: input.level_id.filter(|l| !l.is_empty()),
            url: input.url,
        };
        run.validate()?;
        Ok(run)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn competitor(&self) -> &Competitor {
        &self.competitor
    }

    pub fn duration_seconds(&self) -> Seconds {
        self.duration_seconds
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    pub fn date(&self) -> Option<RunDate> {
        self.date
    }

    pub fn submitted(&self) -> Option<Timestamp> {
        self.submitted
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn level_id(&self) -> Option<&str> {
        self.level_id.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sort key for submission order: performed date, then submission time.
    pub fn chronological_key(&self) -> (Option<RunDate>, Option<Timestamp>) {
        (self.date, self.submitted)
    }

    pub fn belongs_to(&self, unit: &CompetitiveUnit) -> bool {
        self.category_id == unit.category_id() && self.level_id() == unit.level_id()
    }
}
