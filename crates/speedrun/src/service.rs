//! Progression service: from slugs to bar-encoded record timelines.
//!
//! Fetches games, competitors and runs through a shared [`Gateway`],
//! normalizes them, and computes one [`UnitProgression`] per competitive
//! unit. Fetches fan out across games and units, alongside the competitor
//! lookup; a failure in one unit or game is reported in place and does
//! not affect its siblings.

use std::sync::Arc;

use bests_core::entities::{CompetitiveUnit, Competitor, Game, Run};
use bests_core::error::CoreError;
use bests_core::progression::{compute_progression, sort_chronologically};
use bests_core::request::ProgressionRequest;
use bests_core::scale::{encode, Timeline};
use bests_core::standings::{current_standings, standing_of, Standing};
use futures::future::{join_all, try_join_all};
use serde::Serialize;

use crate::gateway::{Gateway, GatewayError};
use crate::normalize::{self, CompetitorSource, PersonalBestScope};
use crate::payload::{RawGame, RawPersonalBest, RawRun, RawUser};

/// Errors from assembling progressions.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no competitive unit of {game} matches {selector:?}")]
    UnitNotFound { game: String, selector: String },
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Record timeline of one unit plus its current leaderboard highlights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitProgression {
    pub timeline: Timeline,
    /// Current first place.
    pub world_record: Option<Standing>,
    /// Current standing of the requested competitor, if they have a run.
    pub competitor_best: Option<Standing>,
    pub run_count: usize,
}

impl UnitProgression {
    /// Compute from a unit's runs, already in submission order.
    pub fn from_runs(runs: &[Run], competitor: Option<&Competitor>) -> Self {
        let standings = current_standings(runs);
        Self {
            timeline: encode(compute_progression(runs, competitor)),
            world_record: standings.first().cloned(),
            competitor_best: competitor
                .and_then(|c| standing_of(&standings, c))
                .cloned(),
            run_count: runs.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub unit: CompetitiveUnit,
    #[serde(flatten)]
    pub outcome: UnitOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitOutcome {
    Ready { progression: UnitProgression },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct GameSection {
    pub game: Game,
    pub units: Vec<UnitReport>,
}

#[derive(Debug, Serialize)]
pub struct GameReport {
    /// The slug as requested.
    pub slug: String,
    #[serde(flatten)]
    pub outcome: GameOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameOutcome {
    Ready { section: GameSection },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct ProgressionReport {
    pub competitor: Option<Competitor>,
    pub games: Vec<GameReport>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct ProgressionService {
    gateway: Arc<Gateway>,
}

impl ProgressionService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn game(&self, slug: &str) -> Result<Game, ServiceError> {
        Ok(normalize::game(&self.raw_game(slug).await?)?)
    }

    /// Units of a game: per-game categories, then level × category pairs.
    pub async fn competitive_units(&self, slug: &str) -> Result<Vec<CompetitiveUnit>, ServiceError> {
        Ok(normalize::competitive_units(&self.raw_game(slug).await?)?)
    }

    pub async fn game_with_units(
        &self,
        slug: &str,
    ) -> Result<(Game, Vec<CompetitiveUnit>), ServiceError> {
        let raw = self.raw_game(slug).await?;
        Ok((normalize::game(&raw)?, normalize::competitive_units(&raw)?))
    }

    /// Resolve a competitor by user id or name slug.
    pub async fn competitor(&self, slug: &str) -> Result<Competitor, ServiceError> {
        let raw: RawUser = self.gateway.fetch_one_as(&format!("users/{slug}")).await?;
        Ok(normalize::competitor_from_user(&raw)?)
    }

    /// Games and units the competitor holds personal bests in.
    pub async fn personal_best_scope(&self, slug: &str) -> Result<PersonalBestScope, ServiceError> {
        let entries: Vec<RawPersonalBest> = self
            .gateway
            .fetch_as(&format!("users/{slug}/personal-bests"))
            .await?;
        Ok(normalize::personal_best_scope(&entries))
    }

    /// Verified runs of one unit, in submission order.
    pub async fn unit_runs(&self, unit: &CompetitiveUnit) -> Result<Vec<Run>, ServiceError> {
        let mut path = format!(
            "{}&category={}",
            self.runs_path(unit.game_id(), true),
            unit.category_id()
        );
        if let Some(level_id) = unit.level_id() {
            path.push_str(&format!("&level={level_id}"));
        }

        let mut runs: Vec<Run> = self
            .runs_from(&path)
            .await?
            .into_iter()
            .filter(|run| run.belongs_to(unit))
            .collect();
        sort_chronologically(&mut runs);
        Ok(runs)
    }

    /// Every non-rejected run of a game in one listing, partitioned by unit.
    ///
    /// Unlike [`unit_runs`](Self::unit_runs) this includes runs still
    /// awaiting review. Runs of no listed unit are dropped.
    pub async fn runs_by_unit(
        &self,
        game_id: &str,
        units: Vec<CompetitiveUnit>,
    ) -> Result<Vec<(CompetitiveUnit, Vec<Run>)>, ServiceError> {
        let runs = self.runs_from(&self.runs_path(game_id, false)).await?;

        Ok(units
            .into_iter()
            .map(|unit| {
                let mut unit_runs: Vec<Run> =
                    runs.iter().filter(|r| r.belongs_to(&unit)).cloned().collect();
                sort_chronologically(&mut unit_runs);
                (unit, unit_runs)
            })
            .collect())
    }

    /// Record timeline of the unit of `game_slug` matching `selector`.
    pub async fn unit_progression(
        &self,
        game_slug: &str,
        selector: &str,
        competitor: Option<&Competitor>,
    ) -> Result<(CompetitiveUnit, UnitProgression), ServiceError> {
        let unit = self
            .competitive_units(game_slug)
            .await?
            .into_iter()
            .find(|u| u.matches_slug(selector))
            .ok_or_else(|| ServiceError::UnitNotFound {
                game: game_slug.to_string(),
                selector: selector.to_string(),
            })?;

        let runs = self.unit_runs(&unit).await?;
        let progression = UnitProgression::from_runs(&runs, competitor);
        Ok((unit, progression))
    }

    /// Timelines for every unit of a game from a single run listing.
    pub async fn game_progressions(
        &self,
        game_slug: &str,
        competitor: Option<&Competitor>,
    ) -> Result<Vec<(CompetitiveUnit, UnitProgression)>, ServiceError> {
        let (game, units) = self.game_with_units(game_slug).await?;
        let partitioned = self.runs_by_unit(game.id(), units).await?;
        Ok(partitioned
            .into_iter()
            .map(|(unit, runs)| {
                let progression = UnitProgression::from_runs(&runs, competitor);
                (unit, progression)
            })
            .collect())
    }

    /// Assemble the full report for a request.
    ///
    /// Only resolving the competitor can fail the whole report; game and
    /// unit failures are recorded in their sections.
    pub async fn report(&self, request: &ProgressionRequest) -> Result<ProgressionReport, ServiceError> {
        tracing::info!(
            games = ?request.game_slugs(),
            competitor = ?request.competitor_slug(),
            unit = ?request.unit_filter(),
            "Building progression report"
        );

        let competitor = async {
            match request.competitor_slug() {
                Some(slug) => self.competitor(slug).await.map(Some),
                None => Ok(None),
            }
        };
        let fetched = join_all(
            request
                .game_slugs()
                .iter()
                .map(|slug| self.fetch_game(slug, request.unit_filter())),
        );

        let (competitor, fetched) =
            futures::try_join!(competitor, async { Ok::<_, ServiceError>(fetched.await) })?;

        let games = request
            .game_slugs()
            .iter()
            .zip(fetched)
            .map(|(slug, fetched)| game_report(slug, fetched, competitor.as_ref()))
            .collect();

        Ok(ProgressionReport { competitor, games })
    }

    // ---- private helpers ----

    async fn raw_game(&self, slug: &str) -> Result<RawGame, ServiceError> {
        Ok(self
            .gateway
            .fetch_one_as(&format!("games/{slug}?embed=categories,levels"))
            .await?)
    }

    fn runs_path(&self, game_id: &str, verified_only: bool) -> String {
        let status = if verified_only { "&status=verified" } else { "" };
        format!(
            "runs?game={game_id}{status}&orderby=date&direction=asc&max={}&embed=players",
            self.gateway.config().page_size
        )
    }

    async fn runs_from(&self, path: &str) -> Result<Vec<Run>, ServiceError> {
        let raw_runs: Vec<RawRun> = self.gateway.fetch_as(path).await?;
        let total = raw_runs.len();
        let pending: Vec<_> = raw_runs
            .into_iter()
            .filter(|raw| !raw.is_rejected())
            .map(|raw| self.normalize_run(raw))
            .collect();
        if pending.len() < total {
            tracing::debug!(path, rejected = total - pending.len(), "Dropped rejected runs");
        }
        try_join_all(pending).await
    }

    async fn normalize_run(&self, raw: RawRun) -> Result<Run, ServiceError> {
        let competitor = match normalize::competitor_source(raw.players.as_slice())? {
            CompetitorSource::Ready(competitor) => competitor,
            CompetitorSource::Lookup { user_id } => self.competitor(&user_id).await?,
        };
        Ok(normalize::run(raw, competitor)?)
    }

    /// A game's units with their run listings, each listing kept apart so
    /// one failing unit leaves the others intact.
    async fn fetch_game(&self, slug: &str, unit_filter: Option<&str>) -> Result<FetchedGame, ServiceError> {
        let (game, units) = self.game_with_units(slug).await?;
        let units: Vec<_> = units
            .into_iter()
            .filter(|u| unit_filter.map_or(true, |selector| u.matches_slug(selector)))
            .collect();

        let runs = join_all(units.iter().map(|unit| self.unit_runs(unit))).await;
        Ok((game, units.into_iter().zip(runs).collect()))
    }
}

type FetchedGame = (Game, Vec<(CompetitiveUnit, Result<Vec<Run>, ServiceError>)>);

fn game_report(slug: &str, fetched: Result<FetchedGame, ServiceError>, competitor: Option<&Competitor>) -> GameReport {
    let outcome = match fetched {
        Ok((game, units)) => GameOutcome::Ready {
            section: GameSection {
                game,
                units: units
                    .into_iter()
                    .map(|(unit, runs)| unit_report(unit, runs, competitor))
                    .collect(),
            },
        },
        Err(e) => {
            tracing::warn!(game = slug, error = %e, "Game failed");
            GameOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    GameReport {
        slug: slug.to_string(),
        outcome,
    }
}

fn unit_report(
    unit: CompetitiveUnit,
    runs: Result<Vec<Run>, ServiceError>,
    competitor: Option<&Competitor>,
) -> UnitReport {
    let outcome = match runs {
        Ok(runs) => UnitOutcome::Ready {
            progression: UnitProgression::from_runs(&runs, competitor),
        },
        Err(e) => {
            tracing::warn!(unit = unit.slug(), error = %e, "Unit failed");
            UnitOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    UnitReport { unit, outcome }
}

