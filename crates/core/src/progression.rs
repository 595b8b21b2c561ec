//! World-record and personal-record progressions for one competitive unit.
//!
//! Both streams are computed from the same chronologically ordered run
//! list. They differ in how ties are treated: every run that equals the
//! standing world record is a new world-record event, while a personal
//! record only counts when it strictly improves on the competitor's
//! previous best.

use std::collections::HashSet;

use crate::entities::{Competitor, Run};

/// A run that set a world record, a personal record, or both at the time
/// it was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMark {
    pub run: Run,
    pub is_world_record: bool,
    pub is_personal_record: bool,
}

/// Outcome of [`compute_progression`].
#[derive(Debug, Clone, PartialEq)]
pub enum Progression {
    /// The unit has no record history at all.
    Empty,
    /// Record events in chronological order. Never empty.
    Records(Vec<RecordMark>),
}

impl Progression {
    pub fn is_empty(&self) -> bool {
        matches!(self, Progression::Empty)
    }

    pub fn marks(&self) -> &[RecordMark] {
        match self {
            Progression::Empty => &[],
            Progression::Records(marks) => marks,
        }
    }
}

/// Stable-sort runs into submission order (date, then submission time).
///
/// Runs with an unknown date sort before dated ones.
pub fn sort_chronologically(runs: &mut [Run]) {
    runs.sort_by(|a, b| a.chronological_key().cmp(&b.chronological_key()));
}

/// Runs that tied or improved the standing world record when submitted.
///
/// The result is non-increasing in duration.
pub fn world_record_stream(runs: &[Run]) -> Vec<&Run> {
    let mut best: Option<f64> = None;
    runs.iter()
        .filter(|run| {
            let duration = run.duration_seconds();
            let is_record = best.map_or(true, |b| duration <= b);
            if is_record {
                best = Some(duration);
            }
            is_record
        })
        .collect()
}

/// Runs by `target` that strictly improved their previous best.
///
/// The result is strictly decreasing in duration.
pub fn personal_record_stream<'a>(runs: &'a [Run], target: &Competitor) -> Vec<&'a Run> {
    let mut best: Option<f64> = None;
    runs.iter()
        .filter(|run| run.competitor().is_same_competitor(target))
        .filter(|run| {
            let duration = run.duration_seconds();
            let is_record = best.map_or(true, |b| duration < b);
            if is_record {
                best = Some(duration);
            }
            is_record
        })
        .collect()
}

/// Merge both record streams into one chronological timeline.
///
/// `runs` must already be in submission order (see
/// [`sort_chronologically`]). A run appearing in both streams is emitted
/// once with both flags set.
pub fn compute_progression(runs: &[Run], target: Option<&Competitor>) -> Progression {
    let world: HashSet<&str> = world_record_stream(runs).into_iter().map(Run::id).collect();
    let personal: HashSet<&str> = match target {
        Some(target) => personal_record_stream(runs, target)
            .into_iter()
            .map(Run::id)
            .collect(),
        None => HashSet::new(),
    };

    let mut seen = HashSet::new();
    let mut marks = Vec::new();
    for run in runs {
        let id = run.id();
        let is_world_record = world.contains(id);
        let is_personal_record = personal.contains(id);
        if (is_world_record || is_personal_record) && seen.insert(id) {
            marks.push(RecordMark {
                run: run.clone(),
                is_world_record,
                is_personal_record,
            });
        }
    }

    if marks.is_empty() {
        Progression::Empty
    } else {
        Progression::Records(marks)
    }
}
