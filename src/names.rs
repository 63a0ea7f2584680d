//! Month vocabulary: transliterated and Hebrew-script names.

use crate::consts::{
    ADAR, ADAR_II, AV, CHESHVAN, ELUL, IYAR, KISLEV, NISSAN, SHEVAT, SIVAN, TAMMUZ, TEVET,
    TISHREI,
};
use crate::calendar::is_leap_year;

/// Accepted transliterated spellings, lowercase with single spaces.
const TRANSLITERATED: &[(&str, u8)] = &[
    ("nissan", NISSAN),
    ("nisan", NISSAN),
    ("iyar", IYAR),
    ("iyyar", IYAR),
    ("sivan", SIVAN),
    ("tammuz", TAMMUZ),
    ("tamuz", TAMMUZ),
    ("av", AV),
    ("elul", ELUL),
    ("tishrei", TISHREI),
    ("tishri", TISHREI),
    ("cheshvan", CHESHVAN),
    ("heshvan", CHESHVAN),
    ("marcheshvan", CHESHVAN),
    ("kislev", KISLEV),
    ("chislev", KISLEV),
    ("tevet", TEVET),
    ("teves", TEVET),
    ("shevat", SHEVAT),
    ("shvat", SHEVAT),
    ("sh'vat", SHEVAT),
    ("adar", ADAR),
    ("adar i", ADAR),
    ("adar 1", ADAR),
    ("adar ii", ADAR_II),
    ("adar 2", ADAR_II),
];

/// Display names indexed by month number (index 0 unused).
const DISPLAY: [&str; 14] = [
    "", "Nisan", "Iyyar", "Sivan", "Tamuz", "Av", "Elul", "Tishrei", "Cheshvan", "Kislev",
    "Tevet", "Sh'vat", "Adar", "Adar II",
];

/// Hebrew-script names indexed by month number (index 0 unused).
const HEBREW: [&str; 14] = [
    "", "ניסן", "אייר", "סיון", "תמוז", "אב", "אלול", "תשרי", "חשון", "כסלו", "טבת", "שבט",
    "אדר", "אדר ב׳",
];

/// Alternate Hebrew spellings accepted when decoding.
const HEBREW_ALIASES: &[(&str, u8)] = &[
    ("סיוון", SIVAN),
    ("איר", IYAR),
    ("חשוון", CHESHVAN),
    ("מרחשון", CHESHVAN),
    ("מרחשוון", CHESHVAN),
    ("כסליו", KISLEV),
    ("אדר א", ADAR),
    ("אדר ב", ADAR_II),
];

/// Month vocabulary listed in help output.
pub const SUPPORTED_MONTHS: &str = "Nissan, Iyar, Sivan, Tammuz, Av, Elul, Tishrei, Cheshvan, \
                                    Kislev, Tevet (Teves), Shevat, Adar, Adar I, Adar II";

/// Resolves a transliterated month name, ignoring case and repeated whitespace.
pub fn month_from_name(name: &str) -> Option<u8> {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    TRANSLITERATED
        .iter()
        .find(|(candidate, _)| *candidate == normalized)
        .map(|&(_, month)| month)
}

/// Transliterated display name; month 12 is "Adar I" in leap years.
pub fn month_name(month: u8, year: u16) -> &'static str {
    if month == ADAR && is_leap_year(year) {
        return "Adar I";
    }
    DISPLAY.get(usize::from(month)).copied().unwrap_or_default()
}

/// Hebrew-script name; month 12 is "אדר א׳" in leap years.
pub fn hebrew_month_name(month: u8, year: u16) -> &'static str {
    if month == ADAR && is_leap_year(year) {
        return "אדר א׳";
    }
    HEBREW.get(usize::from(month)).copied().unwrap_or_default()
}

/// Resolves a Hebrew-script month name. Accepts a leading "ב" ("in") and
/// ignores geresh/quote punctuation.
pub fn month_from_hebrew(name: &str) -> Option<u8> {
    let cleaned: String = name
        .chars()
        .filter(|c| !is_hebrew_punctuation(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    lookup_hebrew(&cleaned).or_else(|| cleaned.strip_prefix('ב').and_then(lookup_hebrew))
}

fn lookup_hebrew(name: &str) -> Option<u8> {
    HEBREW
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, candidate)| strip_punctuation(candidate) == name)
        .and_then(|(month, _)| u8::try_from(month).ok())
        .or_else(|| {
            HEBREW_ALIASES
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|&(_, month)| month)
        })
}

fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !is_hebrew_punctuation(*c)).collect()
}

/// Geresh, gershayim and their ASCII stand-ins.
pub(crate) const fn is_hebrew_punctuation(c: char) -> bool {
    matches!(c, '\u{05F3}' | '\u{05F4}' | '\'' | '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_from_name_table() {
        let expected = [
            ("nissan", 1),
            ("iyar", 2),
            ("sivan", 3),
            ("tammuz", 4),
            ("av", 5),
            ("elul", 6),
            ("tishrei", 7),
            ("cheshvan", 8),
            ("kislev", 9),
            ("tevet", 10),
            ("teves", 10),
            ("shevat", 11),
            ("adar", 12),
            ("adar i", 12),
            ("adar ii", 13),
        ];
        for (name, month) in expected {
            assert_eq!(month_from_name(name), Some(month), "{name}");
        }
    }

    #[test]
    fn test_month_from_name_is_case_insensitive() {
        assert_eq!(month_from_name("ELUL"), Some(ELUL));
        assert_eq!(month_from_name("Adar  II"), Some(ADAR_II));
        assert_eq!(month_from_name("aDaR i"), Some(ADAR));
    }

    #[test]
    fn test_month_from_name_unknown() {
        assert_eq!(month_from_name("foo"), None);
        assert_eq!(month_from_name("adar iii"), None);
        assert_eq!(month_from_name(""), None);
    }

    #[test]
    fn test_display_names_resolve_back() {
        for year in [5784, 5785] {
            for month in 1..=13 {
                let name = month_name(month, year);
                if name.is_empty() {
                    continue;
                }
                assert_eq!(month_from_name(name), Some(month), "{name}");
            }
        }
    }

    #[test]
    fn test_month_name_adar_in_leap_year() {
        assert_eq!(month_name(ADAR, 5785), "Adar");
        assert_eq!(month_name(ADAR, 5784), "Adar I");
        assert_eq!(month_name(ADAR_II, 5784), "Adar II");
        assert_eq!(month_name(0, 5784), "");
    }

    #[test]
    fn test_month_from_hebrew() {
        assert_eq!(month_from_hebrew("תמוז"), Some(TAMMUZ));
        assert_eq!(month_from_hebrew("בתמוז"), Some(TAMMUZ));
        assert_eq!(month_from_hebrew("חשוון"), Some(CHESHVAN));
        assert_eq!(month_from_hebrew("אדר ב׳"), Some(ADAR_II));
        assert_eq!(month_from_hebrew("באדר א'"), Some(ADAR));
        assert_eq!(month_from_hebrew("אב"), Some(AV));
        assert_eq!(month_from_hebrew("באב"), Some(AV));
        assert_eq!(month_from_hebrew("שלום"), None);
    }

    #[test]
    fn test_hebrew_names_resolve_back() {
        for month in 1..=13 {
            let name = hebrew_month_name(month, 5784);
            assert_eq!(month_from_hebrew(name), Some(month), "{name}");
        }
    }
}
