//! Free-text Hebrew date parsing.
//!
//! Two dialects are tried in order, first success wins:
//! 1. Hebrew-script gematriya (`כ״ז בתמוז תשפ״ג`), when the calendar provider
//!    can decode it.
//! 2. Transliterated (`7 Elul 5785`, `1-Adar II-5784`): day first, year last,
//!    month name in between. The month may also be written in Hebrew
//!    (`7 אלול 5785`).

use tracing::debug;

use crate::calendar::{CalendarProvider, GematriyaCodec, HebrewCalendar};
use crate::consts::INPUT_SEPARATORS;
use crate::gematriya::contains_hebrew;
use crate::names::{SUPPORTED_MONTHS, month_from_hebrew, month_from_name};
use crate::{HebrewDate, ParseError};

/// Shown when input cannot be parsed.
pub const HELP_EXAMPLES: [&str; 2] = ["7 Elul 5785", "כ״ז בתמוז תשפ״ג"];

/// Help text listing example inputs and the month vocabulary.
pub fn help_text() -> String {
    let examples: Vec<String> = HELP_EXAMPLES.iter().map(|e| format!("- `{e}`")).collect();
    format!(
        "Examples:\n{}\n\nSupported months: {SUPPORTED_MONTHS}",
        examples.join("\n")
    )
}

/// Parses free text into a [`HebrewDate`] using a calendar provider.
///
/// The provider's gematriya capability is looked up once, when the parser is
/// built.
pub struct HebrewDateParser<'a> {
    gematriya: Option<&'a dyn GematriyaCodec>,
}

impl std::fmt::Debug for HebrewDateParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HebrewDateParser")
            .field("gematriya", &self.gematriya.is_some())
            .finish()
    }
}

impl<'a> HebrewDateParser<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        Self {
            gematriya: provider.gematriya(),
        }
    }

    /// Whether Hebrew-script input is understood.
    pub const fn supports_gematriya(&self) -> bool {
        self.gematriya.is_some()
    }

    /// Parses `input`.
    ///
    /// # Errors
    /// `ParseError::EmptyInput` for blank input; otherwise the failure of the
    /// Hebrew-script stage if the input contains Hebrew letters, or of the
    /// transliterated stage if it does not.
    pub fn parse(&self, input: &str) -> Result<HebrewDate, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let gematriya = match self.parse_gematriya(trimmed) {
            Some(Ok(date)) => return Ok(date),
            Some(Err(e)) => Some(e),
            None => None,
        };

        match Self::parse_transliterated(trimmed) {
            Ok(date) => Ok(date),
            Err(e) => {
                debug!(input = trimmed, error = %e, "Could not parse Hebrew date");
                match gematriya {
                    Some(gematriya_err) if contains_hebrew(trimmed) => Err(gematriya_err),
                    _ => Err(e),
                }
            },
        }
    }

    /// `None` when the stage does not apply (no codec or no Hebrew letters).
    fn parse_gematriya(&self, input: &str) -> Option<Result<HebrewDate, ParseError>> {
        let codec = self.gematriya?;
        if !contains_hebrew(input) {
            return None;
        }
        Some(codec.decode(input))
    }

    fn parse_transliterated(input: &str) -> Result<HebrewDate, ParseError> {
        let normalized = input.replace(INPUT_SEPARATORS, " ");
        let parts: Vec<&str> = normalized.split_whitespace().collect();

        let [first, middle @ .., last] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(input.to_owned()));
        };
        if middle.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "expected day, month and year, found {} part(s): {input}",
                parts.len()
            )));
        }

        let day = Self::parse_u8(first)?;
        let year = Self::parse_u16(last)?;

        let month_name = middle.join(" ");
        let month = month_from_name(&month_name)
            .or_else(|| month_from_hebrew(&month_name))
            .ok_or(ParseError::UnknownMonth(month_name))?;

        HebrewDate::new(year, month, day)
    }

    /// Helper to parse u8 with better error messages
    fn parse_u8(s: &str) -> Result<u8, ParseError> {
        s.parse::<u8>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }

    /// Helper to parse u16 with better error messages
    fn parse_u16(s: &str) -> Result<u16, ParseError> {
        s.parse::<u16>()
            .map_err(|_| ParseError::InvalidFormat(s.to_owned()))
    }
}

/// Parses `input` with the built-in [`HebrewCalendar`].
///
/// # Errors
/// See [`HebrewDateParser::parse`].
pub fn parse_hebrew_date(input: &str) -> Result<HebrewDate, ParseError> {
    HebrewDateParser::new(&HebrewCalendar).parse(input)
}
