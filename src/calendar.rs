//! Hebrew/Gregorian conversion and the conversion-provider boundary.
//!
//! The calendar arithmetic comes from `icu_calendar`'s Hebrew calendar. This
//! module maps its Tishrei-ordered months onto the crate's Nissan-based
//! numbering and exposes the year and month lengths it reports.

use chrono::{Datelike, NaiveDate};
use icu_calendar::hebrew::Hebrew;
use icu_calendar::{Date, Iso};
use tracing::trace;

use crate::consts::{
    ADAR, ADAR_II, AV, CHESHVAN, ELUL, IYAR, KISLEV, MAX_YEAR, MONTHS_IN_COMMON_YEAR,
    MONTHS_IN_LEAP_YEAR, NISSAN, SHEVAT, SIVAN, TAMMUZ, TEVET, TISHREI,
};
use crate::types::tishrei_ordinal;
use crate::{HebrewDate, ParseError, gematriya};

/// ICU month codes and their Nissan-based numbers. In leap years `M05L` is
/// Adar I and `M06` is Adar II.
const MONTH_CODES: [(&str, u8); 13] = [
    ("M01", TISHREI),
    ("M02", CHESHVAN),
    ("M03", KISLEV),
    ("M04", TEVET),
    ("M05", SHEVAT),
    ("M05L", ADAR),
    ("M06", ADAR),
    ("M07", NISSAN),
    ("M08", IYAR),
    ("M09", SIVAN),
    ("M10", TAMMUZ),
    ("M11", AV),
    ("M12", ELUL),
];

/// Errors raised by a [`CalendarProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The Gregorian date has no counterpart inside the supported Hebrew years.
    #[error("Date {0} is outside the supported Hebrew calendar range")]
    OutOfRange(NaiveDate),

    /// The provider produced or was handed an invalid Hebrew date.
    #[error(transparent)]
    InvalidDate(#[from] ParseError),

    /// The calendar library refused the date.
    #[error("Calendar library error: {0}")]
    Library(String),
}

impl From<icu_calendar::CalendarError> for CalendarError {
    fn from(err: icu_calendar::CalendarError) -> Self {
        Self::Library(err.to_string())
    }
}

/// Bidirectional Hebrew/Gregorian conversion.
pub trait CalendarProvider {
    /// Gregorian civil date containing the daytime portion of `date`.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the result cannot be represented.
    fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError>;

    /// Hebrew date whose daytime portion falls on `date`.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` before AM 1 or after `MAX_YEAR`.
    fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError>;

    /// Gematriya encode/decode support, if the provider has it.
    fn gematriya(&self) -> Option<&dyn GematriyaCodec> {
        None
    }
}

/// Hebrew-script rendering and parsing of dates.
pub trait GematriyaCodec {
    /// Renders `date` with Hebrew numerals and the Hebrew month name.
    fn encode(&self, date: &HebrewDate) -> String;

    /// Parses a Hebrew-script date string.
    ///
    /// # Errors
    /// Returns a `ParseError` describing why the text is not a valid date.
    fn decode(&self, text: &str) -> Result<HebrewDate, ParseError>;
}

/// The built-in provider: ICU's Hebrew calendar plus the gematriya codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HebrewCalendar;

impl CalendarProvider for HebrewCalendar {
    fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError> {
        let iso = icu_date(date.year(), date.month(), date.day())?.to_iso();
        let gregorian = NaiveDate::from_ymd_opt(
            iso.year().number,
            iso.month().ordinal,
            iso.day_of_month().0,
        )
        .ok_or(CalendarError::OutOfRange(NaiveDate::MAX))?;
        trace!(%date, %gregorian, "Converted Hebrew date");
        Ok(gregorian)
    }

    fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError> {
        let out_of_range = || CalendarError::OutOfRange(date);
        let month = u8::try_from(date.month()).map_err(|_| out_of_range())?;
        let day = u8::try_from(date.day()).map_err(|_| out_of_range())?;
        let iso: Date<Iso> = Date::try_new_iso_date(date.year(), month, day)?;
        let converted = iso.to_calendar(Hebrew::new());

        let year = u16::try_from(converted.year().number)
            .ok()
            .filter(|y| (1..=MAX_YEAR).contains(y))
            .ok_or_else(out_of_range)?;
        let leap = converted.months_in_year() == MONTHS_IN_LEAP_YEAR;
        let code = converted.month().code;
        let month = month_from_code(code.0.as_str(), leap)
            .ok_or_else(|| CalendarError::Library(format!("Unknown month code {}", code.0)))?;
        let day = u8::try_from(converted.day_of_month().0).map_err(|_| out_of_range())?;

        let hebrew = HebrewDate::new(year, month, day)?;
        trace!(%date, %hebrew, "Converted Gregorian date");
        Ok(hebrew)
    }

    fn gematriya(&self) -> Option<&dyn GematriyaCodec> {
        Some(self)
    }
}

impl GematriyaCodec for HebrewCalendar {
    fn encode(&self, date: &HebrewDate) -> String {
        gematriya::encode_date(date)
    }

    fn decode(&self, text: &str) -> Result<HebrewDate, ParseError> {
        gematriya::decode_date(text)
    }
}

fn month_from_code(code: &str, leap: bool) -> Option<u8> {
    let (_, month) = MONTH_CODES.iter().find(|(c, _)| *c == code)?;
    match (code, leap) {
        ("M06", true) => Some(ADAR_II),
        _ => Some(*month),
    }
}

/// ICU date for a Nissan-based month. ICU counts months from Tishrei.
fn icu_date(year: u16, month: u8, day: u8) -> Result<Date<Hebrew>, icu_calendar::CalendarError> {
    Date::try_new_hebrew_date(i32::from(year), tishrei_ordinal(year, month), day)
}

/// 12, or 13 when the year carries Adar II.
pub fn months_in_year(year: u16) -> u8 {
    icu_date(year, TISHREI, 1).map_or(MONTHS_IN_COMMON_YEAR, |d| d.months_in_year())
}

pub fn is_leap_year(year: u16) -> bool {
    months_in_year(year) == MONTHS_IN_LEAP_YEAR
}

/// Number of days in `month` of `year`. Months outside the year have 0 days.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 0 || month > months_in_year(year) {
        return 0;
    }
    icu_date(year, month, 1).map_or(0, |d| d.days_in_month())
}

/// Length of `year` in days.
pub fn days_in_year(year: u16) -> u16 {
    icu_date(year, TISHREI, 1).map_or(0, |d| d.days_in_year())
}
