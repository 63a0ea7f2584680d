//! Hebrew numerals and Hebrew-script date strings.
//!
//! Numbers are written with letter values summed (ת = 400, ש = 300, ... א = 1).
//! 15 and 16 are written ט״ו and ט״ז. A gershayim (״) goes before the final
//! letter of a multi-letter number, a geresh (׳) after a single letter.
//! Years drop their thousands: 5785 is written תשפ״ה. Whole thousands keep
//! them as a word, so 5000 is ה׳ אלפים and ה׳ alone stays 5005.

use crate::names::{hebrew_month_name, is_hebrew_punctuation, month_from_hebrew};
use crate::{HebrewDate, ParseError};

const GERESH: char = '\u{05F3}';
const GERSHAYIM: char = '\u{05F4}';

/// Word following the thousands numeral of a whole-thousands year.
const THOUSANDS_WORD: &str = "אלפים";

/// Millennium assumed for years written without thousands.
const DEFAULT_MILLENNIUM: u32 = 5000;

const HUNDREDS: [(u32, char); 4] = [(400, 'ת'), (300, 'ש'), (200, 'ר'), (100, 'ק')];
const TENS: [char; 10] = ['\0', 'י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ'];
const ONES: [char; 10] = ['\0', 'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];

fn letter_value(c: char) -> Option<u32> {
    let value = match c {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' | 'ך' => 20,
        'ל' => 30,
        'מ' | 'ם' => 40,
        'נ' | 'ן' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' | 'ף' => 80,
        'צ' | 'ץ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => return None,
    };
    Some(value)
}

/// True when `text` contains any Hebrew letter.
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{05D0}'..='\u{05EA}').contains(&c))
}

/// Writes `n` in Hebrew numerals with geresh/gershayim punctuation.
/// Zero renders as an empty string.
pub fn encode_number(n: u32) -> String {
    let mut letters = String::new();
    let mut rest = n;

    while rest >= 400 {
        letters.push('ת');
        rest -= 400;
    }
    for (value, letter) in HUNDREDS.iter().skip(1) {
        if rest >= *value {
            letters.push(*letter);
            rest -= value;
        }
    }
    match rest {
        15 => letters.push_str("טו"),
        16 => letters.push_str("טז"),
        _ => {
            if rest >= 10 {
                letters.push(TENS[(rest / 10) as usize]);
            }
            if rest % 10 > 0 {
                letters.push(ONES[(rest % 10) as usize]);
            }
        },
    }

    punctuate(&letters)
}

fn punctuate(letters: &str) -> String {
    let mut chars: Vec<char> = letters.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => {
            chars.push(GERESH);
            chars.into_iter().collect()
        },
        len => {
            chars.insert(len - 1, GERSHAYIM);
            chars.into_iter().collect()
        },
    }
}

/// Writes a Hebrew year without its thousands, or as `<thousands> אלפים`
/// when it is a whole number of thousands.
pub fn encode_year(year: u16) -> String {
    let year = u32::from(year);
    match year % 1000 {
        0 => format!("{} {THOUSANDS_WORD}", encode_number(year / 1000)),
        rem => encode_number(rem),
    }
}

const fn is_geresh(c: char) -> bool {
    c == GERESH || c == '\''
}

/// A lone letter with a geresh, e.g. the `ה׳` of `ה׳ תשפ״ו`.
fn is_thousands_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(mark), None) if letter_value(letter).is_some() && is_geresh(mark)
    )
}

/// Value and whether an explicit thousands prefix (e.g. `ה׳`) was present.
fn decode(text: &str) -> Option<(u32, bool)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(head) = compact.strip_suffix(THOUSANDS_WORD) {
        let (thousands, _) = decode(head)?;
        return (1..10).contains(&thousands).then_some((thousands * 1000, true));
    }

    let chars: Vec<char> = compact.chars().collect();

    let (thousands, digits) = match chars.as_slice() {
        [first, mark, rest @ ..] if is_geresh(*mark) && !rest.is_empty() => {
            (Some(letter_value(*first)? * 1000), rest)
        },
        _ => (None, chars.as_slice()),
    };

    let mut value = 0;
    let mut seen = false;
    for &c in digits {
        if is_hebrew_punctuation(c) {
            continue;
        }
        value += letter_value(c)?;
        seen = true;
    }
    if !seen {
        return None;
    }

    Some((value + thousands.unwrap_or(0), thousands.is_some()))
}

/// Reads a Hebrew numeral, ignoring geresh/gershayim punctuation.
pub fn decode_number(text: &str) -> Option<u32> {
    decode(text).map(|(value, _)| value)
}

/// Reads a Hebrew year; years under 1000 without a thousands prefix fall in
/// the sixth millennium.
pub fn decode_year(text: &str) -> Option<u32> {
    decode(text).map(|(value, explicit)| {
        if !explicit && value < 1000 {
            value + DEFAULT_MILLENNIUM
        } else {
            value
        }
    })
}

/// Renders `date` as e.g. `ז׳ אלול תשפ״ה`.
pub fn encode_date(date: &HebrewDate) -> String {
    format!(
        "{} {} {}",
        encode_number(u32::from(date.day())),
        hebrew_month_name(date.month(), date.year()),
        encode_year(date.year())
    )
}

/// Parses a Hebrew-script date such as `כ״ז בתמוז תשפ״ג`.
///
/// # Errors
/// Returns `ParseError::InvalidFormat` for malformed numerals or too few
/// tokens, `ParseError::UnknownMonth` for an unrecognized month, and the
/// validation errors of [`HebrewDate::new`].
pub fn decode_date(text: &str) -> Result<HebrewDate, ParseError> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let [first, middle @ .., last] = tokens.as_slice() else {
        return Err(ParseError::InvalidFormat(text.trim().to_owned()));
    };
    if middle.is_empty() {
        return Err(ParseError::InvalidFormat(text.trim().to_owned()));
    }

    let day = decode_number(first)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| ParseError::InvalidFormat((*first).to_owned()))?;

    // The year may be written with a separate thousands token (ה׳ תשפ״ו),
    // unless that token completes the month name (אדר ב׳).
    let (month, year_text) = match month_from_hebrew(&middle.join(" ")) {
        Some(month) => (Some(month), (*last).to_owned()),
        None => match middle {
            [month_tokens @ .., thousands]
                if !month_tokens.is_empty() && is_thousands_token(thousands) =>
            {
                (
                    month_from_hebrew(&month_tokens.join(" ")),
                    format!("{thousands} {last}"),
                )
            },
            _ => (None, (*last).to_owned()),
        },
    };

    let year =
        decode_year(&year_text).ok_or_else(|| ParseError::InvalidFormat(year_text.clone()))?;
    let year = u16::try_from(year).map_err(|_| ParseError::InvalidYear(u16::MAX))?;
    let month = month.ok_or_else(|| ParseError::UnknownMonth(middle.join(" ")))?;

    HebrewDate::new(year, month, day)
}
