use crate::ParseError;
use crate::calendar::{days_in_month, is_leap_year, months_in_year};
use crate::consts::{LONG_MONTH_DAYS, MAX_YEAR, MIN_DAY, MONTHS_IN_LEAP_YEAR, TISHREI};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;
use std::num::NonZeroU16;

/// A Hebrew year guaranteed to be in the range `1..=MAX_YEAR` (1..=9999)
/// Uses `NonZeroU16` internally, so 0 is not a valid year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Year(NonZeroU16);

impl Year {
    /// Creates a new Year, validating that it's non-zero and <= `MAX_YEAR`
    ///
    /// # Errors
    /// Returns `ParseError::InvalidYear` if the value is 0 or > `MAX_YEAR`.
    pub fn new(value: u16) -> Result<Self, ParseError> {
        let non_zero = NonZeroU16::new(value).ok_or(ParseError::InvalidYear(value))?;
        if value > MAX_YEAR {
            return Err(ParseError::InvalidYear(value));
        }
        Ok(Self(non_zero))
    }

    /// Returns the year value as u16
    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    /// Whether this year carries Adar II
    #[inline]
    pub fn is_leap(self) -> bool {
        is_leap_year(self.0.get())
    }
}

impl TryFrom<u16> for Year {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0.get()
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A month number in Nissan-based numbering (Nissan = 1 .. Adar = 12, Adar II = 13)
/// Uses `NonZeroU8` internally, so 0 is not a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(NonZeroU8);

impl Month {
    /// Creates a new Month, validating that it's in `1..=13`
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` if the value is 0 or > 13.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        let non_zero = NonZeroU8::new(value).ok_or(ParseError::InvalidMonth {
            month: value,
            year:  0,
        })?;
        if value > MONTHS_IN_LEAP_YEAR {
            return Err(ParseError::InvalidMonth {
                month: value,
                year:  0,
            });
        }
        Ok(Self(non_zero))
    }

    /// Creates a new Month that must exist in the given year
    ///
    /// # Errors
    /// Returns `ParseError::InvalidMonth` for 0, values > 13, or Adar II in a
    /// common year.
    pub fn new_in_year(value: u8, year: u16) -> Result<Self, ParseError> {
        if value == 0 || value > months_in_year(year) {
            return Err(ParseError::InvalidMonth { month: value, year });
        }
        Self::new(value)
    }

    /// Returns the month value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Position of this month in a year counted from Tishrei (Tishrei = 1)
    pub fn tishrei_ordinal(self, year: u16) -> u8 {
        tishrei_ordinal(year, self.0.get())
    }
}

impl TryFrom<u8> for Month {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A day value guaranteed to be valid for a given year and month
/// Uses `NonZeroU8` internally, so 0 is not a valid day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Day(NonZeroU8);

impl Day {
    /// Creates a new Day, validating that it's non-zero and valid for the given year and month
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDay` if the value is 0 or past the end of the month.
    pub fn new(value: u8, year: u16, month: u8) -> Result<Self, ParseError> {
        let invalid = ParseError::InvalidDay {
            year,
            month,
            day: value,
        };
        let non_zero = NonZeroU8::new(value).ok_or_else(|| invalid.clone())?;

        if value > days_in_month(year, month) {
            return Err(invalid);
        }

        Ok(Self(non_zero))
    }

    /// Returns the day value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for Day {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        // No year/month context here, only the outer bounds can be checked
        if !(MIN_DAY..=LONG_MONTH_DAYS).contains(&value) {
            return Err(ParseError::InvalidDay {
                year:  0,
                month: 0,
                day:   value,
            });
        }
        let non_zero = NonZeroU8::new(value).ok_or(ParseError::InvalidDay {
            year:  0,
            month: 0,
            day:   value,
        })?;
        Ok(Self(non_zero))
    }
}

impl From<Day> for u8 {
    fn from(day: Day) -> Self {
        day.0.get()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a Nissan-based month number to its position counted from Tishrei.
pub fn tishrei_ordinal(year: u16, month: u8) -> u8 {
    if month >= TISHREI {
        month - TISHREI + 1
    } else {
        month + months_in_year(year) - TISHREI + 1
    }
}
