//! # Time Span Selection
//!
//! The time section of the filter panel offers four named spans relative to
//! "now" plus a custom span built from two date/time pickers. Named spans
//! always win over whatever is left in the pickers.
//!
//! | Mode | Code | Start |
//! |------|------|-------|
//! | Last Hour | 1 | now - 1 hour |
//! | Last Day | 2 | now - 1 day |
//! | Last Week | 3 | now - 7 days |
//! | Last Month | 4 | now - 1 calendar month |
//! | Custom | 5 | picker values |
//!
//! The codes are the values stored in persisted panel state.

use super::error::SelectorError;
use chrono::{Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Field name used when reporting time span validation errors.
pub const TIME_SPAN_FIELD: &str = "timeSpan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeSpanMode {
    LastHour,
    LastDay,
    LastWeek,
    LastMonth,
    #[default]
    Custom,
}

impl TimeSpanMode {
    pub const ALL: [TimeSpanMode; 5] = [
        TimeSpanMode::LastHour,
        TimeSpanMode::LastDay,
        TimeSpanMode::LastWeek,
        TimeSpanMode::LastMonth,
        TimeSpanMode::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeSpanMode::LastHour => "Last Hour",
            TimeSpanMode::LastDay => "Last Day",
            TimeSpanMode::LastWeek => "Last Week",
            TimeSpanMode::LastMonth => "Last Month",
            TimeSpanMode::Custom => "Manual Selection",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            TimeSpanMode::LastHour => 1,
            TimeSpanMode::LastDay => 2,
            TimeSpanMode::LastWeek => 3,
            TimeSpanMode::LastMonth => 4,
            TimeSpanMode::Custom => 5,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Start of the span for named modes, `None` for custom.
    fn start_from(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TimeSpanMode::LastHour => Some(now - Duration::hours(1)),
            TimeSpanMode::LastDay => Some(now - Duration::days(1)),
            TimeSpanMode::LastWeek => Some(now - Duration::days(7)),
            TimeSpanMode::LastMonth => Some(
                now.checked_sub_months(Months::new(1))
                    .unwrap_or(now - Duration::days(30)),
            ),
            TimeSpanMode::Custom => None,
        }
    }
}

impl TryFrom<u8> for TimeSpanMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.code() == code)
            .ok_or_else(|| format!("unknown time span code {code}"))
    }
}

impl From<TimeSpanMode> for u8 {
    fn from(mode: TimeSpanMode) -> Self {
        mode.code()
    }
}

/// Time span selection as the user left it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSpan {
    pub mode: TimeSpanMode,
    pub from_date: Option<NaiveDate>,
    pub from_time: Option<NaiveTime>,
    pub to_date: Option<NaiveDate>,
    pub to_time: Option<NaiveTime>,
}

/// Concrete bounds sent to the data endpoint. Blank pickers stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSpan {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}

impl ResolvedSpan {
    pub fn start_date_text(&self) -> String {
        format_date(self.start_date)
    }

    pub fn start_time_text(&self) -> String {
        format_time(self.start_time)
    }

    pub fn end_date_text(&self) -> String {
        format_date(self.end_date)
    }

    pub fn end_time_text(&self) -> String {
        format_time(self.end_time)
    }
}

impl TimeSpan {
    pub fn named(mode: TimeSpanMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Resolve the span against `now`.
    ///
    /// Named modes ignore the pickers. Custom mode returns the picker values
    /// untouched, rejecting a start that lies after the end.
    pub fn resolve(&self, now: NaiveDateTime) -> Result<ResolvedSpan, SelectorError> {
        if let Some(start) = self.mode.start_from(now) {
            return Ok(ResolvedSpan {
                start_date: Some(start.date()),
                start_time: Some(truncate_to_minute(start.time())),
                end_date: Some(now.date()),
                end_time: Some(truncate_to_minute(now.time())),
            });
        }

        self.validate()?;
        Ok(ResolvedSpan {
            start_date: self.from_date,
            start_time: self.from_time,
            end_date: self.to_date,
            end_time: self.to_time,
        })
    }

    /// Check custom pickers for an inverted interval.
    pub fn validate(&self) -> Result<(), SelectorError> {
        if self.mode != TimeSpanMode::Custom {
            return Ok(());
        }
        if self.from_date.is_none() && self.from_time.is_some()
            || self.to_date.is_none() && self.to_time.is_some()
        {
            return Err(SelectorError::validation(
                TIME_SPAN_FIELD,
                "a time was picked without a date",
            ));
        }
        if let (Some(from), Some(to)) = (self.from_datetime(), self.to_datetime()) {
            if from > to {
                return Err(SelectorError::validation(
                    TIME_SPAN_FIELD,
                    format!(
                        "start {} is after end {}",
                        from.format("%Y-%m-%d %H:%M"),
                        to.format("%Y-%m-%d %H:%M")
                    ),
                ));
            }
        }
        Ok(())
    }

    fn from_datetime(&self) -> Option<NaiveDateTime> {
        let time = self.from_time.unwrap_or(NaiveTime::MIN);
        self.from_date.map(|d| d.and_time(time))
    }

    fn to_datetime(&self) -> Option<NaiveDateTime> {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        let time = self.to_time.unwrap_or(end_of_day);
        self.to_date.map(|d| d.and_time(time))
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    use chrono::Timelike;
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a picker date; blank text means "not picked".
pub fn parse_date(text: &str) -> Result<Option<NaiveDate>, SelectorError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| SelectorError::validation(TIME_SPAN_FIELD, format!("invalid date: {text}")))
}

/// Parse a picker time; blank text means "not picked".
pub fn parse_time(text: &str) -> Result<Option<NaiveTime>, SelectorError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map(Some)
        .map_err(|_| SelectorError::validation(TIME_SPAN_FIELD, format!("invalid time: {text}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
            .expect("valid datetime")
    }

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, DATE_FORMAT).expect("valid date")
    }

    #[test]
    fn test_last_week_ignores_stale_pickers() {
        let now = at("2024-03-15", "10:30");
        let span = TimeSpan {
            mode: TimeSpanMode::LastWeek,
            from_date: Some(date("2001-01-01")),
            from_time: None,
            to_date: Some(date("2001-01-02")),
            to_time: None,
        };

        let resolved = span.resolve(now).expect("resolve");
        assert_eq!(resolved.start_date, Some(date("2024-03-08")));
        assert_eq!(resolved.start_time_text(), "10:30");
        assert_eq!(resolved.end_date, Some(date("2024-03-15")));
        assert_eq!(resolved.end_time_text(), "10:30");
    }

    #[test]
    fn test_last_hour_crosses_midnight() {
        let now = at("2024-03-15", "00:20");
        let resolved = TimeSpan::named(TimeSpanMode::LastHour)
            .resolve(now)
            .expect("resolve");
        assert_eq!(resolved.start_date_text(), "2024-03-14");
        assert_eq!(resolved.start_time_text(), "23:20");
    }

    #[test]
    fn test_last_month_uses_calendar_month() {
        let now = at("2024-03-31", "12:00");
        let resolved = TimeSpan::named(TimeSpanMode::LastMonth)
            .resolve(now)
            .expect("resolve");
        // March 31st minus one month clamps to the end of February
        assert_eq!(resolved.start_date_text(), "2024-02-29");
    }

    #[test]
    fn test_custom_span_passes_pickers_through() {
        let span = TimeSpan {
            mode: TimeSpanMode::Custom,
            from_date: Some(date("2024-01-01")),
            from_time: parse_time("08:00").expect("time"),
            to_date: None,
            to_time: None,
        };
        let resolved = span.resolve(at("2024-03-15", "10:30")).expect("resolve");
        assert_eq!(resolved.start_date_text(), "2024-01-01");
        assert_eq!(resolved.start_time_text(), "08:00");
        assert_eq!(resolved.end_date_text(), "");
        assert_eq!(resolved.end_time_text(), "");
    }

    #[test]
    fn test_custom_span_rejects_inverted_interval() {
        let span = TimeSpan {
            mode: TimeSpanMode::Custom,
            from_date: Some(date("2024-02-01")),
            from_time: None,
            to_date: Some(date("2024-01-01")),
            to_time: None,
        };
        let err = span
            .resolve(at("2024-03-15", "10:30"))
            .expect_err("inverted span must fail");
        assert_eq!(err.field(), Some(TIME_SPAN_FIELD));
    }

    #[test]
    fn test_custom_span_same_day_uses_end_of_day() {
        let span = TimeSpan {
            mode: TimeSpanMode::Custom,
            from_date: Some(date("2024-02-01")),
            from_time: parse_time("18:00").expect("time"),
            to_date: Some(date("2024-02-01")),
            to_time: None,
        };
        assert!(span.validate().is_ok());
    }

    #[test]
    fn test_mode_codes_roundtrip_through_serde() {
        for mode in TimeSpanMode::ALL {
            let json = serde_json::to_string(&mode).expect("serialize");
            assert_eq!(json, mode.code().to_string());
            let back: TimeSpanMode = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, mode);
        }
        assert!(serde_json::from_str::<TimeSpanMode>("9").is_err());
    }

    #[test]
    fn test_mode_cycling() {
        assert_eq!(TimeSpanMode::Custom.next(), TimeSpanMode::LastHour);
        assert_eq!(TimeSpanMode::LastHour.previous(), TimeSpanMode::Custom);
    }

    #[test]
    fn test_parse_picker_values() {
        assert_eq!(parse_date("").expect("blank"), None);
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(parse_time(" ").expect("blank"), None);
        assert!(parse_time("25:00").is_err());
    }
}
