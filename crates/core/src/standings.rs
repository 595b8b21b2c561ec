//! Current leaderboard standings of a competitive unit.
//!
//! Each entrant is represented by their best run; entrants are ranked by
//! duration and share a rank on ties (`1, 1, 3, ...`).

use std::collections::HashMap;

use serde::Serialize;

use crate::entities::{Competitor, CompetitorIdentity, Run};
use crate::scale::ordinal;

/// One row of the current leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// Tied rank, starting at 1.
    pub rank: u64,
    /// Rank with its ordinal suffix, e.g. `"3rd"`.
    pub placement: String,
    pub run: Run,
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum EntrantKey<'a> {
    Account(&'a str),
    Guest(&'a str),
    /// Group runs have no shared identity; each stands alone.
    Single(&'a str),
}

fn entrant_key(run: &Run) -> EntrantKey<'_> {
    match run.competitor().identity() {
        CompetitorIdentity::Registered { user_id } => EntrantKey::Account(user_id),
        CompetitorIdentity::Guest => EntrantKey::Guest(run.competitor().name()),
        CompetitorIdentity::Group { .. } => EntrantKey::Single(run.id()),
    }
}

fn is_better(candidate: &Run, current: &Run) -> bool {
    match candidate
        .duration_seconds()
        .total_cmp(&current.duration_seconds())
    {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => candidate.chronological_key() < current.chronological_key(),
    }
}

/// Rank every entrant by their best run in `runs`.
///
/// On equal durations the earlier submission is listed first, but both
/// entrants share the rank.
pub fn current_standings(runs: &[Run]) -> Vec<Standing> {
    let mut best: HashMap<EntrantKey<'_>, &Run> = HashMap::new();
    for run in runs {
        best.entry(entrant_key(run))
            .and_modify(|current| {
                if is_better(run, *current) {
                    *current = run;
                }
            })
            .or_insert(run);
    }

    let mut ranked: Vec<&Run> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        a.duration_seconds()
            .total_cmp(&b.duration_seconds())
            .then_with(|| a.chronological_key().cmp(&b.chronological_key()))
            .then_with(|| a.id().cmp(b.id()))
    });

    let mut standings: Vec<Standing> = Vec::with_capacity(ranked.len());
    for (index, run) in ranked.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.run.duration_seconds() == run.duration_seconds() => prev.rank,
            _ => index as u64 + 1,
        };
        standings.push(Standing {
            rank,
            placement: ordinal(rank),
            run: run.clone(),
        });
    }
    standings
}

/// The standing held by `competitor`, if they have any run in the unit.
pub fn standing_of<'a>(standings: &'a [Standing], competitor: &Competitor) -> Option<&'a Standing> {
    standings
        .iter()
        .find(|s| s.run.competitor().is_same_competitor(competitor))
}
