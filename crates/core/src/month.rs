//! Calendar months and fiscal-year date ranges.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use salesdesk_shared::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Month and date parsing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    /// Value is not `YYYY-MM`.
    #[error("invalid month format (YYYY-MM): {0}")]
    InvalidMonth(String),

    /// Value is neither `YYYY-MM` nor `YYYY-MM-DD`.
    #[error("invalid date (YYYY-MM or YYYY-MM-DD): {0}")]
    InvalidDate(String),

    /// Range start is after range end.
    #[error("from must not be after to")]
    InvertedRange,

    /// Timezone name is not a known IANA zone.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

impl From<MonthError> for AppError {
    fn from(err: MonthError) -> Self {
        match err {
            MonthError::UnknownTimezone(_) => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Parses a strict `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// Returns `MonthError::InvalidMonth` for any other shape.
    pub fn parse(value: &str) -> Result<Self, MonthError> {
        let value = value.trim();
        if value.len() != 7 {
            return Err(MonthError::InvalidMonth(value.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| MonthError::InvalidMonth(value.to_string()))
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// First day of the month, as stored in `DATE` columns.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.0
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.0)
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month number, 1 to 12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl std::str::FromStr for YearMonth {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses `YYYY-MM` (first of month) or `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `MonthError::InvalidDate` for anything else.
pub fn parse_month_or_date(value: &str) -> Result<NaiveDate, MonthError> {
    let value = value.trim();
    if value.len() == 7 {
        return YearMonth::parse(value)
            .map(YearMonth::first_day)
            .map_err(|_| MonthError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| MonthError::InvalidDate(value.to_string()))
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `MonthError::InvalidDate` for anything else.
pub fn parse_date(value: &str) -> Result<NaiveDate, MonthError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| MonthError::InvalidDate(value.to_string()))
}

/// Resolves an IANA timezone name.
///
/// # Errors
///
/// Returns `MonthError::UnknownTimezone` when the name is not recognized.
pub fn parse_timezone(name: &str) -> Result<Tz, MonthError> {
    name.parse::<Tz>()
        .map_err(|_| MonthError::UnknownTimezone(name.to_string()))
}

/// Today's date in the given timezone.
#[must_use]
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Inclusive date range used to filter monthly rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalRange {
    /// First day included.
    pub from: NaiveDate,
    /// Last day included.
    pub to: NaiveDate,
}

impl FiscalRange {
    /// January 1st to December 31st of `year`.
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
            to: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    /// Resolves optional `from`/`to` query values against `today`.
    ///
    /// Both empty selects the current year. `from` snaps to the start of its
    /// month and `to` to the end of its month. A single side clamps the other
    /// side to the same year.
    ///
    /// # Errors
    ///
    /// Returns `MonthError::InvalidDate` for unparsable input and
    /// `MonthError::InvertedRange` when `from` ends up after `to`.
    pub fn resolve(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, MonthError> {
        let from = from.map(str::trim).filter(|s| !s.is_empty());
        let to = to.map(str::trim).filter(|s| !s.is_empty());

        let range = match (from, to) {
            (None, None) => Self::year(today.year()),
            (Some(from), None) => {
                let start = YearMonth::from_date(parse_month_or_date(from)?);
                Self {
                    from: start.first_day(),
                    to: Self::year(start.year()).to,
                }
            }
            (None, Some(to)) => {
                let end = YearMonth::from_date(parse_month_or_date(to)?);
                Self {
                    from: Self::year(end.year()).from,
                    to: end.last_day(),
                }
            }
            (Some(from), Some(to)) => Self {
                from: YearMonth::from_date(parse_month_or_date(from)?).first_day(),
                to: YearMonth::from_date(parse_month_or_date(to)?).last_day(),
            },
        };

        if range.from > range.to {
            return Err(MonthError::InvertedRange);
        }
        Ok(range)
    }
}
