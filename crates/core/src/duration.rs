//! Run duration text normalization.
//!
//! The leaderboard reports durations as ISO-8601-like strings such as
//! `PT1H30M30.5S` or `PT45.250S`. [`normalize_duration_text`] turns them
//! into fixed-layout display strings suitable for monospace columns.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// `PREFIX[hours]H[minutes]M[seconds[.fraction]]S`, case-insensitive.
pub const DURATION_PATTERN: &str =
    r"(?i)^([A-Z]{2})(?:([0-9]+)H)?(?:([0-9]{1,2})M)?(?:([0-9]{1,2})(?:\.([0-9]{1,3}))?S)?$";

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DURATION_PATTERN).expect("valid regex"));

/// Normalize a duration string into its display form.
///
/// - hours appear only when present, zero-padded to two digits
/// - minutes appear when hours or minutes are present, zero-padded
/// - seconds always appear; zero-padded after a larger unit, otherwise
///   space-padded to two columns
/// - milliseconds appear only when hours are absent, as a count
///   zero-padded to three digits
///
/// # Examples
///
/// ```
/// use bests_core::duration::normalize_duration_text;
///
/// assert_eq!(normalize_duration_text("PT1H30M30.5S").unwrap(), "01h30m30s");
/// assert_eq!(normalize_duration_text("PT45.250S").unwrap(), "45.250s");
/// assert_eq!(normalize_duration_text("PT2M3S").unwrap(), "02m03s");
/// assert_eq!(normalize_duration_text("PT5.25S").unwrap(), " 5.025s");
/// ```
pub fn normalize_duration_text(text: &str) -> Result<String, CoreError> {
    let caps = DURATION_RE
        .captures(text)
        .ok_or_else(|| CoreError::DurationParse(text.to_string()))?;

    let number = |index: usize| -> Result<Option<u64>, CoreError> {
        caps.get(index)
            .map(|m| {
                m.as_str()
                    .parse::<u64>()
                    .map_err(|_| CoreError::DurationParse(text.to_string()))
            })
            .transpose()
    };

    let hours = number(2)?;
    let minutes = number(3)?;
    let seconds = number(4)?.unwrap_or(0);
    // The digits after the dot are a millisecond count: ".25" is 25 ms.
    let millis = number(5)?;

    let mut out = String::new();
    if let Some(h) = hours {
        out.push_str(&format!("{h:02}h"));
    }
    if hours.is_some() || minutes.is_some() {
        out.push_str(&format!("{:02}m", minutes.unwrap_or(0)));
    }
    if out.is_empty() {
        out.push_str(&format!("{seconds:>2}"));
    } else {
        out.push_str(&format!("{seconds:02}"));
    }
    if hours.is_none() {
        if let Some(ms) = millis {
            out.push_str(&format!(".{ms:03}"));
        }
    }
    out.push('s');

    Ok(out)
}
