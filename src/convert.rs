//! Hebrew/Gregorian conversion and the text rendered for each direction.

use chrono::{Datelike, NaiveDate, NaiveTime, SecondsFormat};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::calendar::{CalendarError, CalendarProvider, GematriyaCodec, HebrewCalendar};
use crate::consts::COPY_ALL_SEPARATOR;
use crate::parser::{HebrewDateParser, help_text};
use crate::{HebrewDate, ParseError};

/// Attached to every Hebrew → Gregorian result.
pub const SUNSET_NOTE: &str =
    "Note: This returns the civil daytime date. Hebrew days begin at sunset.";

/// Tooltip for the "today" label.
pub const TODAY_TOOLTIP: &str = "Hebrew date (simple after-sunset approximation)";

/// A Gregorian calendar date, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct GregorianDate(NaiveDate);

impl GregorianDate {
    /// Returns `None` for an impossible year/month/day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub const fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// `YYYY-MM-DD`
    pub fn ymd(self) -> String {
        self.to_string()
    }

    /// Midnight UTC in ISO 8601, e.g. `2025-08-31T00:00:00.000Z`
    pub fn iso8601(self) -> String {
        self.0
            .and_time(NaiveTime::default())
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The next calendar day, or `None` at the end of chrono's range.
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl From<NaiveDate> for GregorianDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<GregorianDate> for NaiveDate {
    fn from(date: GregorianDate) -> Self {
        date.0
    }
}

impl From<GregorianDate> for String {
    fn from(date: GregorianDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for GregorianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Result of converting a Hebrew date to its Gregorian civil date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToGregorian {
    /// Text as entered, when the date came from parsed input.
    pub input:     Option<String>,
    pub hebrew:    HebrewDate,
    pub gregorian: GregorianDate,
    /// Always [`SUNSET_NOTE`].
    pub note:      &'static str,
}

impl ToGregorian {
    pub fn to_markdown(&self) -> String {
        let input = self
            .input
            .clone()
            .unwrap_or_else(|| self.hebrew.to_string());
        format!(
            "# Hebrew → Gregorian\n\n**Input:** {input}\n\n**Gregorian:** {}\n\n> {}",
            self.gregorian, self.note
        )
    }
}

/// A Gregorian date expressed in the Hebrew calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HebrewLabel {
    pub date:           HebrewDate,
    pub day:            u8,
    pub month_name:     &'static str,
    pub year:           u16,
    /// Nissan-based month number
    pub month_number:   u8,
    /// Month counted from Tishrei
    pub tishrei_month:  u8,
    /// `"<day> <monthName> <year>"`
    pub transliterated: String,
    /// Present only when the provider renders gematriya
    pub gematriya_text: Option<String>,
}

impl HebrewLabel {
    fn new(date: HebrewDate, codec: Option<&dyn GematriyaCodec>) -> Self {
        Self {
            date,
            day: date.day(),
            month_name: date.month_name(),
            year: date.year(),
            month_number: date.month(),
            tishrei_month: date.tishrei_month(),
            transliterated: date.to_string(),
            gematriya_text: codec.map(|c| c.encode(&date)),
        }
    }

    /// Gematriya rendering, or the transliterated label when unavailable.
    pub fn gematriya_or_transliterated(&self) -> &str {
        self.gematriya_text
            .as_deref()
            .unwrap_or(&self.transliterated)
    }

    /// Labelled result rows in display order.
    pub fn lines(&self) -> [(&'static str, String); 3] {
        [
            ("Transliterated", self.transliterated.clone()),
            ("Gematriya", self.gematriya_or_transliterated().to_owned()),
            ("Month (Tishrei-based #)", self.tishrei_month.to_string()),
        ]
    }

    /// Row values joined for a single clipboard entry.
    pub fn copy_all(&self) -> String {
        self.lines()
            .iter()
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join(COPY_ALL_SEPARATOR)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Gregorian → Hebrew\n");
        for (label, value) in self.lines() {
            md.push_str(&format!("\n**{label}:** {value}"));
        }
        md
    }
}

/// Detail shown when input could not be parsed.
pub fn failure_markdown(input: &str) -> String {
    format!(
        "# Hebrew → Gregorian\n\n**Error:** Could not parse \"{input}\".\n\n{}",
        help_text()
    )
}

/// Converts in both directions through a [`CalendarProvider`].
pub struct Converter<'a> {
    provider:  &'a dyn CalendarProvider,
    gematriya: Option<&'a dyn GematriyaCodec>,
}

impl fmt::Debug for Converter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("gematriya", &self.gematriya.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Converter<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        Self {
            provider,
            gematriya: provider.gematriya(),
        }
    }

    pub fn parser(&self) -> HebrewDateParser<'a> {
        HebrewDateParser::new(self.provider)
    }

    /// Gregorian civil date holding the daytime portion of `date`.
    ///
    /// # Errors
    /// Propagates the provider's `CalendarError`.
    pub fn hebrew_to_gregorian(&self, date: HebrewDate) -> Result<ToGregorian, CalendarError> {
        let gregorian = self.provider.to_gregorian(date)?.into();
        Ok(ToGregorian {
            input: None,
            hebrew: date,
            gregorian,
            note: SUNSET_NOTE,
        })
    }

    /// Parses `input` and converts it. Conversion failures are reported as
    /// `ParseError::ConversionRejected`.
    ///
    /// # Errors
    /// Any parse failure, or a rejected conversion.
    pub fn parse_and_convert(&self, input: &str) -> Result<ToGregorian, ParseError> {
        let hebrew = self.parser().parse(input)?;
        let mut result = self
            .hebrew_to_gregorian(hebrew)
            .map_err(|e| ParseError::ConversionRejected(e.to_string()))?;
        result.input = Some(input.trim().to_owned());
        Ok(result)
    }

    /// Hebrew date for `date`. With `after_sunset_shift` the whole civil day
    /// is advanced by one before converting, a coarse stand-in for the sunset
    /// boundary.
    ///
    /// # Errors
    /// `CalendarError::OutOfRange` if the (shifted) date has no Hebrew
    /// counterpart.
    pub fn gregorian_to_hebrew(
        &self,
        date: GregorianDate,
        after_sunset_shift: bool,
    ) -> Result<HebrewLabel, CalendarError> {
        let target = if after_sunset_shift {
            date.succ()
                .ok_or(CalendarError::OutOfRange(date.naive()))?
        } else {
            date
        };
        debug!(%date, %target, after_sunset_shift, "Converting Gregorian date");

        let hebrew = self.provider.from_gregorian(target.naive())?;
        Ok(HebrewLabel::new(hebrew, self.gematriya))
    }

    /// Short label for a status display, e.g. `"7 Elul 5785"`.
    ///
    /// # Errors
    /// See [`Converter::gregorian_to_hebrew`].
    pub fn today_label(
        &self,
        today: GregorianDate,
        after_sunset_shift: bool,
    ) -> Result<String, CalendarError> {
        self.gregorian_to_hebrew(today, after_sunset_shift)
            .map(|label| label.transliterated)
    }
}

/// [`Converter::hebrew_to_gregorian`] with the built-in calendar.
///
/// # Errors
/// See [`Converter::hebrew_to_gregorian`].
pub fn hebrew_to_gregorian(date: HebrewDate) -> Result<ToGregorian, CalendarError> {
    Converter::new(&HebrewCalendar).hebrew_to_gregorian(date)
}

/// [`Converter::gregorian_to_hebrew`] with the built-in calendar.
///
/// # Errors
/// See [`Converter::gregorian_to_hebrew`].
pub fn gregorian_to_hebrew(
    date: GregorianDate,
    after_sunset_shift: bool,
) -> Result<HebrewLabel, CalendarError> {
    Converter::new(&HebrewCalendar).gregorian_to_hebrew(date, after_sunset_shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ADAR_II, AV, ELUL, TAMMUZ, TISHREI};

    struct PlainCalendar;

    impl CalendarProvider for PlainCalendar {
        fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError> {
            HebrewCalendar.to_gregorian(date)
        }

        fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError> {
            HebrewCalendar.from_gregorian(date)
        }
    }

    fn greg(year: i32, month: u32, day: u32) -> GregorianDate {
        GregorianDate::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn test_gregorian_date_formats() {
        let date = greg(2025, 8, 31);
        assert_eq!(date.to_string(), "2025-08-31");
        assert_eq!(date.ymd(), "2025-08-31");
        assert_eq!(date.iso8601(), "2025-08-31T00:00:00.000Z");
        assert_eq!((date.year(), date.month(), date.day()), (2025, 8, 31));
        assert_eq!(greg(2024, 2, 29).succ(), Some(greg(2024, 3, 1)));
        assert!(GregorianDate::from_ymd(2025, 2, 29).is_none());
    }

    #[test]
    fn test_hebrew_to_gregorian_carries_note() {
        let date = HebrewDate::new(5785, ELUL, 7).unwrap();
        let result = hebrew_to_gregorian(date).unwrap();
        assert_eq!(result.gregorian, greg(2025, 8, 31));
        assert_eq!(result.note, SUNSET_NOTE);
        assert!(result.to_markdown().contains(SUNSET_NOTE));
        assert!(result.to_markdown().contains("**Gregorian:** 2025-08-31"));
    }

    #[test]
    fn test_parse_and_convert() {
        let converter = Converter::new(&HebrewCalendar);
        let result = converter.parse_and_convert("  26 Av 5784 ").unwrap();
        assert_eq!(result.input.as_deref(), Some("26 Av 5784"));
        assert_eq!(result.hebrew, HebrewDate::new(5784, AV, 26).unwrap());
        assert_eq!(result.gregorian, greg(2024, 8, 30));

        let result = converter.parse_and_convert("כ״ז בתמוז תשפ״ג").unwrap();
        assert_eq!(result.gregorian, greg(2023, 7, 16));

        assert_eq!(converter.parse_and_convert(""), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_gregorian_to_hebrew() {
        let label = gregorian_to_hebrew(greg(2025, 8, 31), false).unwrap();
        assert_eq!(label.day, 7);
        assert_eq!(label.month_name, "Elul");
        assert_eq!(label.year, 5785);
        assert_eq!(label.month_number, ELUL);
        assert_eq!(label.tishrei_month, 12);
        assert_eq!(label.transliterated, "7 Elul 5785");
        assert_eq!(label.gematriya_text.as_deref(), Some("ז׳ אלול תשפ״ה"));
    }

    #[test]
    fn test_after_sunset_shift_equals_next_day() {
        let mut date = greg(2023, 9, 1);
        let end = greg(2024, 10, 15);
        while date < end {
            let next = date.succ().unwrap();
            assert_eq!(
                gregorian_to_hebrew(date, true).unwrap(),
                gregorian_to_hebrew(next, false).unwrap(),
                "{date}"
            );
            date = next;
        }
    }

    #[test]
    fn test_after_sunset_shift_crosses_new_year() {
        let label = gregorian_to_hebrew(greg(2025, 9, 22), true).unwrap();
        assert_eq!((label.year, label.month_number, label.day), (5786, TISHREI, 1));
    }

    #[test]
    fn test_gematriya_falls_back_to_transliterated() {
        let converter = Converter::new(&PlainCalendar);
        let label = converter.gregorian_to_hebrew(greg(2024, 3, 11), false).unwrap();
        assert_eq!(label.month_number, ADAR_II);
        assert_eq!(label.gematriya_text, None);
        assert_eq!(label.gematriya_or_transliterated(), "1 Adar II 5784");
    }

    #[test]
    fn test_label_lines_and_copy_all() {
        let label = gregorian_to_hebrew(greg(2023, 7, 16), false).unwrap();
        assert_eq!(label.month_number, TAMMUZ);
        let lines = label.lines();
        assert_eq!(lines[0], ("Transliterated", "27 Tamuz 5783".to_owned()));
        assert_eq!(lines[1], ("Gematriya", "כ״ז תמוז תשפ״ג".to_owned()));
        assert_eq!(lines[2], ("Month (Tishrei-based #)", "10".to_owned()));
        assert_eq!(label.copy_all(), "27 Tamuz 5783 | כ״ז תמוז תשפ״ג | 10");
        assert!(label.to_markdown().starts_with("# Gregorian → Hebrew"));
        assert!(label.to_markdown().contains("**Gematriya:** כ״ז תמוז תשפ״ג"));
    }

    #[test]
    fn test_today_label() {
        let converter = Converter::new(&HebrewCalendar);
        assert_eq!(converter.today_label(greg(2026, 10, 19), false).unwrap(), "8 Cheshvan 5787");
        assert_eq!(converter.today_label(greg(2026, 10, 19), true).unwrap(), "9 Cheshvan 5787");
    }

    #[test]
    fn test_failure_markdown() {
        let md = failure_markdown("7 Foo 5785");
        assert!(md.contains("Could not parse \"7 Foo 5785\""));
        assert!(md.contains("`7 Elul 5785`"));
    }

    #[test]
    fn test_out_of_range() {
        let too_early = greg(-3761, 1, 1);
        assert!(matches!(
            gregorian_to_hebrew(too_early, false),
            Err(CalendarError::OutOfRange(_))
        ));
    }
}
