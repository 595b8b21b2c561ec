//! Shared progress scale and bar encoding for record timelines.
//!
//! One [`Scale`] is derived per competitive unit from the durations of
//! its record events. Durations map onto a bar of cells: the fastest
//! record gets a short floor (longer for slow categories), the slowest
//! gets the full width (wider for runs beyond half an hour).

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::entities::Run;
use crate::progression::Progression;
use crate::types::Seconds;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Cells available to the progress range before fudging.
pub const BASELINE_CELLS: i64 = 16;

/// Durations at or above this many seconds stop earning linear extra cells.
const LINEAR_GROWTH_CAP_SECS: f64 = 30.0 * 60.0;

/// One extra cell per this many seconds of the slowest record, up to the cap.
const SECS_PER_EXTRA_CELL: f64 = 2.0 * 60.0;

/// Records slower than an hour earn logarithmic extra cells on top.
const LOG_GROWTH_START_SECS: f64 = 60.0 * 60.0;

/// Base of the logarithmic growth beyond an hour.
const LOG_GROWTH_BASE: f64 = 1.5;

/// Lower bound applied before taking logarithms (the API's 1 ms resolution).
const LOG_FLOOR_SECS: f64 = 0.001;

pub const WORLD_RECORD_GLYPH: char = '█';
pub const PERSONAL_RECORD_GLYPH: char = '▐';

// ---------------------------------------------------------------------------
// Scale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub min_record: Seconds,
    pub max_record: Seconds,
    /// Cells folded into the fixed floor; negative for very short records.
    pub magnitude_fudge: i64,
    /// Extra cells granted to long records.
    pub maxnitude_fudge: i64,
    /// A single event, or several with identical durations.
    degenerate: bool,
}

impl Scale {
    /// Derive the scale for a set of record durations.
    ///
    /// Returns `None` for an empty set: there is no range to scale.
    pub fn from_durations(durations: impl IntoIterator<Item = Seconds>) -> Option<Self> {
        let mut count = 0usize;
        let mut min_record = f64::INFINITY;
        let mut max_record = f64::NEG_INFINITY;
        for duration in durations {
            count += 1;
            min_record = min_record.min(duration);
            max_record = max_record.max(duration);
        }
        if count == 0 {
            return None;
        }

        let magnitude_fudge =
            ((min_record.max(LOG_FLOOR_SECS).ln() - 16f64.ln()) / 2f64.ln()).ceil() as i64;

        let log_growth =
            (max_record.max(LOG_FLOOR_SECS).ln() - LOG_GROWTH_START_SECS.ln()).max(0.0)
                / LOG_GROWTH_BASE.ln();
        let maxnitude_fudge = (max_record.min(LINEAR_GROWTH_CAP_SECS) / SECS_PER_EXTRA_CELL
            + log_growth)
            .floor() as i64;

        Some(Self {
            min_record,
            max_record,
            magnitude_fudge,
            maxnitude_fudge,
            degenerate: count == 1 || max_record <= min_record,
        })
    }

    /// Cells spanned by the progress range.
    pub fn range_cells(&self) -> i64 {
        BASELINE_CELLS - self.magnitude_fudge + self.maxnitude_fudge
    }

    /// Position of `duration` within `[min_record, max_record]`, in `0..=1`.
    ///
    /// A degenerate scale reports every duration as fully elapsed.
    pub fn progress(&self, duration: Seconds) -> f64 {
        if self.degenerate {
            return 1.0;
        }
        ((duration - self.min_record) / (self.max_record - self.min_record)).clamp(0.0, 1.0)
    }

    /// Number of bar cells for `duration`.
    pub fn bar_length(&self, duration: Seconds) -> usize {
        let cells = (self.progress(duration) * self.range_cells() as f64
            + self.magnitude_fudge as f64)
            .ceil();
        if cells <= 0.0 {
            0
        } else {
            cells as usize
        }
    }
}

// ---------------------------------------------------------------------------
// Bar encoding
// ---------------------------------------------------------------------------

/// Two overlapping bar channels for one record event.
///
/// The world-record channel draws over the personal-record channel; only
/// the personal cells extending past the world-record bar stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarEncoding {
    /// Length of the latest world-record bar up to this event.
    pub world_cells: usize,
    /// Length of the latest personal-record bar up to this event.
    pub personal_cells: usize,
    /// This event is itself the competitor's newest personal record.
    pub personal_is_current: bool,
}

impl BarEncoding {
    pub fn width(&self) -> usize {
        self.world_cells.max(self.personal_cells)
    }

    pub fn world_segment(&self) -> String {
        std::iter::repeat(WORLD_RECORD_GLYPH)
            .take(self.world_cells)
            .collect()
    }

    /// Personal-record cells not covered by the world-record channel.
    pub fn personal_segment(&self) -> String {
        std::iter::repeat(PERSONAL_RECORD_GLYPH)
            .take(self.personal_cells.saturating_sub(self.world_cells))
            .collect()
    }

    pub fn render(&self) -> String {
        self.world_segment() + &self.personal_segment()
    }
}

impl Serialize for BarEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BarEncoding", 5)?;
        state.serialize_field("world_cells", &self.world_cells)?;
        state.serialize_field("personal_cells", &self.personal_cells)?;
        state.serialize_field("personal_is_current", &self.personal_is_current)?;
        state.serialize_field("world", &self.world_segment())?;
        state.serialize_field("personal", &self.personal_segment())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// A record run positioned on its unit's scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordEvent {
    pub run: Run,
    pub is_world_record: bool,
    pub is_personal_record: bool,
    pub progress: f64,
    pub bar: BarEncoding,
}

/// Bar-annotated record history of one competitive unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timeline {
    /// No runs; nothing was scaled.
    Empty,
    Records {
        scale: Scale,
        events: Vec<RecordEvent>,
    },
}

impl Timeline {
    pub fn events(&self) -> &[RecordEvent] {
        match self {
            Timeline::Empty => &[],
            Timeline::Records { events, .. } => events,
        }
    }
}

/// Place every record event of `progression` on a shared scale.
///
/// Each event carries forward the most recent bar of each stream, so a
/// world record that is not a personal record still shows the last
/// personal-record bar beneath it.
pub fn encode(progression: Progression) -> Timeline {
    let marks = match progression {
        Progression::Empty => return Timeline::Empty,
        Progression::Records(marks) => marks,
    };
    let Some(scale) = Scale::from_durations(marks.iter().map(|m| m.run.duration_seconds())) else {
        return Timeline::Empty;
    };

    let mut world_cells = 0;
    let mut personal_cells = 0;
    let events = marks
        .into_iter()
        .map(|mark| {
            let duration = mark.run.duration_seconds();
            let cells = scale.bar_length(duration);
            if mark.is_world_record {
                world_cells = cells;
            }
            if mark.is_personal_record {
                personal_cells = cells;
            }
            RecordEvent {
                progress: scale.progress(duration),
                bar: BarEncoding {
                    world_cells,
                    personal_cells,
                    personal_is_current: mark.is_personal_record,
                },
                run: mark.run,
                is_world_record: mark.is_world_record,
                is_personal_record: mark.is_personal_record,
            }
        })
        .collect();

    Timeline::Records { scale, events }
}

// ---------------------------------------------------------------------------
// Ordinals
// ---------------------------------------------------------------------------

/// English ordinal suffix for a placement: `st`, `nd`, `rd` or `th`.
pub fn ordinal_suffix(n: u64) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    }
}

/// `n` followed by its ordinal suffix, e.g. `"21st"`.
pub fn ordinal(n: u64) -> String {
    format!("{n}{}", ordinal_suffix(n))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entities::{Competitor, NewRun};
    use crate::progression::compute_progression;

    fn run(id: &str, competitor: &Competitor, duration: f64, day: u32) -> Run {
        Run::new(NewRun {
            id: id.to_string(),
            competitor: competitor.clone(),
            duration_seconds: duration,
            duration_text: format!("{duration}s"),
            date: NaiveDate::from_ymd_opt(2021, 3, day),
            submitted: None,
            category_id: "cat".to_string(),
            level_id: None,
            url: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(102), "102nd");
        assert_eq!(ordinal(112), "112th");
    }

    #[test]
    fn empty_durations_have_no_scale() {
        assert!(Scale::from_durations(Vec::new()).is_none());
    }

    #[test]
    fn short_category_fudges() {
        let scale = Scale::from_durations([100.0, 90.0]).unwrap();
        assert_eq!(scale.magnitude_fudge, 3);
        assert_eq!(scale.maxnitude_fudge, 0);
        assert_eq!(scale.range_cells(), 13);
        assert_eq!(scale.bar_length(100.0), 16);
        assert_eq!(scale.bar_length(90.0), 3);
    }

    #[test]
    fn long_category_earns_extra_cells() {
        let scale = Scale::from_durations([3600.0, 7200.0]).unwrap();
        assert_eq!(scale.magnitude_fudge, 8);
        assert_eq!(scale.maxnitude_fudge, 16);
        assert_eq!(scale.bar_length(7200.0), 32);
        assert_eq!(scale.bar_length(3600.0), 8);
    }

    #[test]
    fn very_short_records_clamp_at_zero_cells() {
        let scale = Scale::from_durations([1.5, 3.0]).unwrap();
        assert_eq!(scale.magnitude_fudge, -3);
        assert_eq!(scale.range_cells(), 19);
        assert_eq!(scale.bar_length(1.5), 0);
        assert_eq!(scale.bar_length(2.25), 7);
        assert_eq!(scale.bar_length(3.0), 16);
    }

    #[test]
    fn single_event_is_fully_elapsed() {
        let scale = Scale::from_durations([30.0]).unwrap();
        assert_eq!(scale.progress(30.0), 1.0);
        assert_eq!(scale.bar_length(30.0), 16);
    }

    #[test]
    fn identical_durations_do_not_divide_by_zero() {
        let scale = Scale::from_durations([42.0, 42.0]).unwrap();
        assert_eq!(scale.progress(42.0), 1.0);
    }

    #[test]
    fn zero_duration_records_stay_finite() {
        let scale = Scale::from_durations([0.0, 10.0]).unwrap();
        assert!(scale.progress(5.0).is_finite());
        assert_eq!(scale.bar_length(0.0), 0);
    }

    #[test]
    fn progress_is_clamped() {
        let scale = Scale::from_durations([10.0, 20.0]).unwrap();
        assert_eq!(scale.progress(5.0), 0.0);
        assert_eq!(scale.progress(25.0), 1.0);
        assert_eq!(scale.progress(15.0), 0.5);
    }

    #[test]
    fn empty_progression_encodes_to_empty_timeline() {
        assert_eq!(encode(Progression::Empty), Timeline::Empty);
    }

    #[test]
    fn bars_carry_the_latest_personal_record_forward() {
        let me = Competitor::registered("me", "Me", None).unwrap();
        let rival = Competitor::registered("rival", "Rival", None).unwrap();
        let runs = vec![run("a", &me, 100.0, 1), run("b", &rival, 90.0, 2)];

        let timeline = encode(compute_progression(&runs, Some(&me)));
        let events = timeline.events();
        assert_eq!(events.len(), 2);

        assert!(events[0].is_world_record && events[0].is_personal_record);
        assert_eq!(events[0].bar.world_cells, 16);
        assert_eq!(events[0].bar.personal_cells, 16);
        assert!(events[0].bar.personal_is_current);
        assert_eq!(events[0].bar.render(), "█".repeat(16));

        assert!(events[1].is_world_record && !events[1].is_personal_record);
        assert_eq!(events[1].bar.world_cells, 3);
        assert_eq!(events[1].bar.personal_cells, 16);
        assert!(!events[1].bar.personal_is_current);
        assert_eq!(events[1].bar.world_segment(), "███");
        assert_eq!(events[1].bar.personal_segment(), "▐".repeat(13));
    }

    #[test]
    fn bar_serializes_segments() {
        let bar = BarEncoding {
            world_cells: 2,
            personal_cells: 3,
            personal_is_current: true,
        };
        let json = serde_json::to_value(bar).unwrap();
        assert_eq!(json["world"], "██");
        assert_eq!(json["personal"], "▐");
        assert_eq!(json["personal_is_current"], true);
    }
}
