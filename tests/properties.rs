//! Round-trip properties over whole years of dates.

use chrono::NaiveDate;

use hebdate::names::month_name;
use hebdate::{
    GregorianDate, HebrewDate, days_in_month, gregorian_to_hebrew, hebrew_to_gregorian,
    months_in_year, parse_hebrew_date,
};

/// Every valid date of `years`, in Nissan-based month order.
fn every_date(years: std::ops::Range<u16>) -> Vec<HebrewDate> {
    let mut dates = Vec::new();
    for year in years {
        for month in 1..=months_in_year(year) {
            for day in 1..=days_in_month(year, month) {
                dates.push(HebrewDate::new(year, month, day).unwrap());
            }
        }
    }
    dates
}

#[test]
fn test_text_to_gregorian_and_back() {
    for date in every_date(5770..5800) {
        let text = format!("{} {} {}", date.day(), month_name(date.month(), date.year()), date.year());
        let parsed = parse_hebrew_date(&text).unwrap();
        assert_eq!(parsed, date, "{text}");

        let gregorian = hebrew_to_gregorian(parsed).unwrap().gregorian;
        let back = gregorian_to_hebrew(gregorian, false).unwrap();
        assert_eq!(back.date, date, "{text} -> {gregorian}");
    }
}

#[test]
fn test_gematriya_label_parses_back() {
    for date in every_date(5783..5786) {
        let gregorian = hebrew_to_gregorian(date).unwrap().gregorian;
        let label = gregorian_to_hebrew(gregorian, false).unwrap();
        let text = label.gematriya_text.unwrap();
        assert_eq!(parse_hebrew_date(&text).unwrap(), date, "{text}");
    }
}

#[test]
fn test_consecutive_days_are_consecutive() {
    let dates = every_date(5780..5790);
    let mut sorted = dates.clone();
    sorted.sort();

    let mut previous: Option<NaiveDate> = None;
    for date in sorted {
        let gregorian = hebrew_to_gregorian(date).unwrap().gregorian.naive();
        if let Some(prev) = previous {
            assert_eq!(prev.succ_opt(), Some(gregorian), "{date}");
        }
        previous = Some(gregorian);
    }
}

#[test]
fn test_after_sunset_is_next_day() {
    let mut date = GregorianDate::from_ymd(2020, 1, 1).unwrap();
    let end = GregorianDate::from_ymd(2030, 1, 1).unwrap();
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
fn test_known_anchors() {
    struct TestCase {
        hebrew:    &'static str,
        gregorian: (i32, u32, u32),
    }

    let cases = [
        TestCase {
            hebrew:    "1 Tishrei 5785",
            gregorian: (2024, 10, 3),
        },
        TestCase {
            hebrew:    "1 Tishrei 5786",
            gregorian: (2025, 9, 23),
        },
        TestCase {
            hebrew:    "15 Nissan 5784",
            gregorian: (2024, 4, 23),
        },
        TestCase {
            hebrew:    "14 Adar II 5784",
            gregorian: (2024, 3, 24),
        },
        TestCase {
            hebrew:    "25 Kislev 5785",
            gregorian: (2024, 12, 25),
        },
        TestCase {
            hebrew:    "7 Elul 5785",
            gregorian: (2025, 8, 31),
        },
    ];

    for case in &cases {
        let date = parse_hebrew_date(case.hebrew).unwrap();
        let (y, m, d) = case.gregorian;
        assert_eq!(
            hebrew_to_gregorian(date).unwrap().gregorian,
            GregorianDate::from_ymd(y, m, d).unwrap(),
            "{}",
            case.hebrew
        );
    }
}
