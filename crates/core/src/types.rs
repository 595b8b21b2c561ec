/// All submission timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date a run was performed on, as reported by the leaderboard.
pub type RunDate = chrono::NaiveDate;

/// Run durations are compared in (fractional) seconds.
pub type Seconds = f64;
