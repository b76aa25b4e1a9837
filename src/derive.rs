//! Derived-field resolution: hour -> period of day, month token -> month
//! number and semester.
//!
//! Two period-boundary policies circulated in earlier iterations of this
//! analysis (a three-way split and a four-way split with a dawn bucket).
//! This module pins the three-way policy; the boundaries are constants so
//! the choice stays auditable.

use std::fmt;

use serde::Serialize;

/// Inclusive hour ranges for the period buckets. Hours outside both ranges
/// fall into [`Period::Night`].
pub const MORNING_HOURS: (i64, i64) = (6, 11);
pub const AFTERNOON_HOURS: (i64, i64) = (12, 17);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
    Morning,
    Afternoon,
    Night,
    Undefined,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "MORNING",
            Period::Afternoon => "AFTERNOON",
            Period::Night => "NIGHT",
            Period::Undefined => "UNDEFINED",
        }
    }

    /// Case-insensitive parse of a period name, for user-supplied filters.
    pub fn parse(value: &str) -> Option<Period> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MORNING" => Some(Period::Morning),
            "AFTERNOON" => Some(Period::Afternoon),
            "NIGHT" => Some(Period::Night),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets an hour into a period of day. A missing hour is `Undefined`;
/// any numeric hour outside the morning/afternoon ranges is `Night`.
pub fn period_of_day(hour: Option<i64>) -> Period {
    let Some(h) = hour else {
        return Period::Undefined;
    };
    if (MORNING_HOURS.0..=MORNING_HOURS.1).contains(&h) {
        Period::Morning
    } else if (AFTERNOON_HOURS.0..=AFTERNOON_HOURS.1).contains(&h) {
        Period::Afternoon
    } else {
        Period::Night
    }
}

/// Fixed three-letter month tokens as they appear in the exports.
const MONTH_TOKENS: &[(&str, u32)] = &[
    ("JAN", 1),
    ("FEV", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAI", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SET", 9),
    ("OUT", 10),
    ("NOV", 11),
    ("DEZ", 12),
];

/// Maps a month token to its 1-12 number; unknown tokens map to `None` and
/// the row drops out of month- and semester-based queries.
pub fn month_number(token: &str) -> Option<u32> {
    let needle = token.trim().to_ascii_uppercase();
    MONTH_TOKENS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, number)| *number)
}

/// Semester (1 or 2) for a month token, `None` when the token is unknown.
pub fn semester_of(token: &str) -> Option<u8> {
    month_number(token).map(|m| if m <= 6 { 1 } else { 2 })
}

/// Coerces a raw hour cell to an integer hour. Accepts plain integers,
/// `HH:MM[:SS]` clock strings (hour component only), and floats (truncated).
pub fn parse_hour(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let hour_part = trimmed.split(':').next().unwrap_or(trimmed);
    if let Ok(parsed) = hour_part.parse::<i64>() {
        return Some(parsed);
    }
    hour_part.parse::<f64>().ok().map(|f| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_boundaries() {
        for h in 6..=11 {
            assert_eq!(period_of_day(Some(h)), Period::Morning, "hour {h}");
        }
        for h in 12..=17 {
            assert_eq!(period_of_day(Some(h)), Period::Afternoon, "hour {h}");
        }
        for h in (0..=5).chain(18..=23) {
            assert_eq!(period_of_day(Some(h)), Period::Night, "hour {h}");
        }
        assert_eq!(period_of_day(None), Period::Undefined);
    }

    #[test]
    fn semester_splits_the_year_in_half() {
        for token in ["jan", "fev", "mar", "abr", "mai", "jun"] {
            assert_eq!(semester_of(token), Some(1), "token {token}");
        }
        for token in ["jul", "ago", "set", "out", "nov", "dez"] {
            assert_eq!(semester_of(token), Some(2), "token {token}");
        }
        assert_eq!(semester_of("xyz"), None);
        assert_eq!(semester_of(""), None);
    }

    #[test]
    fn month_lookup_is_case_insensitive() {
        assert_eq!(month_number("jan"), Some(1));
        assert_eq!(month_number("JAN"), Some(1));
        assert_eq!(month_number(" dez "), Some(12));
        assert_eq!(month_number("january"), None);
    }

    #[test]
    fn parse_hour_handles_clock_strings_and_floats() {
        assert_eq!(parse_hour("14"), Some(14));
        assert_eq!(parse_hour("14:30"), Some(14));
        assert_eq!(parse_hour("08:15:59"), Some(8));
        assert_eq!(parse_hour("9.0"), Some(9));
        assert_eq!(parse_hour(""), None);
        assert_eq!(parse_hour("noon"), None);
    }

    #[test]
    fn period_parse_round_trips_names() {
        for period in [Period::Morning, Period::Afternoon, Period::Night] {
            assert_eq!(Period::parse(period.as_str()), Some(period));
            assert_eq!(Period::parse(&period.as_str().to_lowercase()), Some(period));
        }
        assert_eq!(Period::parse("dawn"), None);
        assert_eq!(Period::parse("UNDEFINED"), None);
    }
}
