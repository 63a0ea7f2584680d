//! Hebrew calendar dates: free-text parsing, Gregorian conversion, and the
//! location/zmanim glue around them.
//!
//! ```
//! use hebdate::{HebrewDate, hebrew_to_gregorian};
//!
//! let date: HebrewDate = "7 Elul 5785".parse().unwrap();
//! let converted = hebrew_to_gregorian(date).unwrap();
//! assert_eq!(converted.gregorian.to_string(), "2025-08-31");
//! ```

mod consts;
mod prelude;
mod types;

pub mod calendar;
pub mod config;
pub mod convert;
pub mod gematriya;
pub mod geocoding;
pub mod location;
pub mod names;
pub mod parser;
pub mod zmanim;

pub use calendar::{
    CalendarError, CalendarProvider, GematriyaCodec, HebrewCalendar, days_in_month, days_in_year,
    is_leap_year, months_in_year,
};
pub use consts::*;
pub use convert::{
    Converter, GregorianDate, HebrewLabel, ToGregorian, gregorian_to_hebrew, hebrew_to_gregorian,
};
pub use parser::{HebrewDateParser, parse_hebrew_date};
pub use types::{Day, Month, Year};

use crate::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A validated date in the Hebrew calendar.
///
/// Months use Nissan-based numbering (Nissan = 1, Tishrei = 7, Adar = 12,
/// Adar II = 13); ordering follows the civil year, which starts at Tishrei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HebrewDate {
    year:  Year,
    month: Month,
    day:   Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Empty date string")]
    EmptyInput,
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Unrecognized month name: {_0}")]
    UnknownMonth(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Month {month} does not exist in year {year}")]
    InvalidMonth { month: u8, year: u16 },
    #[display(fmt = "Invalid day {day} for month {month} of year {year}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Conversion rejected: {_0}")]
    ConversionRejected(String),
}

impl std::error::Error for ParseError {}

impl HebrewDate {
    /// Creates a date, checking the year range, that the month exists in the
    /// year, and that the day fits the month.
    ///
    /// # Errors
    /// Returns `InvalidYear`, `InvalidMonth` or `InvalidDay`.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        let year_typed = Year::new(year)?;
        let month_typed = Month::new_in_year(month, year)?;
        let day_typed = Day::new(day, year, month)?;
        Ok(Self {
            year:  year_typed,
            month: month_typed,
            day:   day_typed,
        })
    }

    /// Returns the year component
    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    /// Returns the month component (Nissan-based)
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// Returns the day component
    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    /// Returns the Year type
    pub const fn year_typed(&self) -> Year {
        self.year
    }

    /// Returns the Month type
    pub const fn month_typed(&self) -> Month {
        self.month
    }

    /// Returns the Day type
    pub const fn day_typed(&self) -> Day {
        self.day
    }

    /// Month counted from Tishrei (Tishrei = 1, Elul = 12 or 13)
    pub fn tishrei_month(&self) -> u8 {
        self.month.tishrei_ordinal(self.year.get())
    }

    pub fn is_leap_year(&self) -> bool {
        self.year.is_leap()
    }

    /// Transliterated month name, e.g. "Elul" or "Adar II"
    pub fn month_name(&self) -> &'static str {
        names::month_name(self.month(), self.year())
    }

    /// The following day, or `None` past the end of `MAX_YEAR`.
    pub fn succ(&self) -> Option<Self> {
        let next = HebrewCalendar.to_gregorian(*self).ok()?.succ_opt()?;
        HebrewCalendar.from_gregorian(next).ok()
    }

    /// The preceding day, or `None` before 1 Tishrei AM 1.
    pub fn pred(&self) -> Option<Self> {
        let previous = HebrewCalendar.to_gregorian(*self).ok()?.pred_opt()?;
        HebrewCalendar.from_gregorian(previous).ok()
    }
}

impl fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{LABEL_SEPARATOR}{}{LABEL_SEPARATOR}{}",
            self.day,
            self.month_name(),
            self.year
        )
    }
}

impl FromStr for HebrewDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hebrew_date(s)
    }
}

impl PartialOrd for HebrewDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HebrewDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.tishrei_month().cmp(&other.tishrei_month()))
            .then_with(|| self.day.cmp(&other.day))
    }
}

impl TryFrom<(u16, u8, u8)> for HebrewDate {
    type Error = ParseError;

    fn try_from(value: (u16, u8, u8)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1, value.2)
    }
}

impl serde::Serialize for HebrewDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for HebrewDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: u16, month: u8, day: u8) -> HebrewDate {
        HebrewDate::new(year, month, day).unwrap()
    }

    #[test]
    fn test_new_validates_components() {
        assert!(HebrewDate::new(5785, ELUL, 29).is_ok());
        assert!(matches!(
            HebrewDate::new(0, ELUL, 1),
            Err(ParseError::InvalidYear(0))
        ));
        assert!(matches!(
            HebrewDate::new(5785, 14, 1),
            Err(ParseError::InvalidMonth { month: 14, .. })
        ));
        assert!(matches!(
            HebrewDate::new(5785, ELUL, 30),
            Err(ParseError::InvalidDay { day: 30, .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let d = date(5784, ADAR_II, 14);
        assert_eq!(d.year(), 5784);
        assert_eq!(d.month(), 13);
        assert_eq!(d.day(), 14);
        assert_eq!(d.year_typed(), Year::new(5784).unwrap());
        assert_eq!(d.month_typed(), Month::new(13).unwrap());
        assert!(d.is_leap_year());
        assert_eq!(d.tishrei_month(), 7);
        assert_eq!(d.month_name(), "Adar II");
    }

    #[test]
    fn test_display() {
        assert_eq!(date(5785, ELUL, 7).to_string(), "7 Elul 5785");
        assert_eq!(date(5784, ADAR, 1).to_string(), "1 Adar I 5784");
        assert_eq!(date(5785, SHEVAT, 15).to_string(), "15 Sh'vat 5785");
    }

    #[test]
    fn test_display_parses_back() {
        let mut d = date(5784, TISHREI, 1);
        let end = date(5786, TISHREI, 1);
        while d < end {
            assert_eq!(d.to_string().parse::<HebrewDate>().unwrap(), d);
            d = d.succ().unwrap();
        }
    }

    #[test]
    fn test_from_str() {
        let d: HebrewDate = "26 Av 5784".parse().unwrap();
        assert_eq!(d, date(5784, AV, 26));
        assert!("".parse::<HebrewDate>().is_err());
    }

    #[test]
    fn test_ordering_follows_civil_year() {
        // Tishrei opens the year, so Elul 5785 comes before Tishrei 5786
        // but after Nissan 5785, which comes after Tishrei 5785.
        assert!(date(5785, TISHREI, 1) < date(5785, NISSAN, 1));
        assert!(date(5785, NISSAN, 1) < date(5785, ELUL, 29));
        assert!(date(5785, ELUL, 29) < date(5786, TISHREI, 1));
        assert!(date(5784, ADAR, 30) < date(5784, ADAR_II, 1));
    }

    #[test]
    fn test_succ_and_pred() {
        assert_eq!(date(5785, ELUL, 29).succ(), Some(date(5786, TISHREI, 1)));
        assert_eq!(date(5784, ADAR, 30).succ(), Some(date(5784, ADAR_II, 1)));
        assert_eq!(date(5784, ADAR_II, 29).succ(), Some(date(5784, NISSAN, 1)));
        assert_eq!(date(5786, TISHREI, 1).pred(), Some(date(5785, ELUL, 29)));
        assert_eq!(date(1, TISHREI, 1).pred(), None);
        assert_eq!(date(MAX_YEAR, ELUL, 29).succ(), None);
    }

    #[test]
    fn test_try_from_tuple() {
        let d: HebrewDate = (5785, ELUL, 7).try_into().unwrap();
        assert_eq!(d, date(5785, ELUL, 7));

        let result: Result<HebrewDate, _> = (5785, ADAR_II, 1).try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde() {
        let d = date(5784, ADAR_II, 1);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"1 Adar II 5784\"");

        let parsed: HebrewDate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);

        let result: Result<HebrewDate, _> = serde_json::from_str("\"30 Elul 5785\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(ParseError::EmptyInput.to_string(), "Empty date string");
        assert_eq!(
            ParseError::InvalidYear(0).to_string(),
            "Invalid year: 0 (must be 1-9999)"
        );
        assert_eq!(
            ParseError::UnknownMonth("Foo".to_owned()).to_string(),
            "Unrecognized month name: Foo"
        );
        assert_eq!(
            ParseError::InvalidDay {
                year:  5785,
                month: 6,
                day:   30,
            }
            .to_string(),
            "Invalid day 30 for month 6 of year 5785"
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_YEAR, 9999);
        assert_eq!(NISSAN, 1);
        assert_eq!(TISHREI, 7);
        assert_eq!(ADAR_II, 13);
    }
}
