//! Halachic times (zmanim) reports.
//!
//! Reports come from a [`ZmanimProvider`]: [`SunriseZmanim`] computes them
//! from sunrise and sunset, or a report produced elsewhere is read with
//! [`ZmanimReport::from_json`]. This module flattens reports into searchable
//! key/value pairs and renders timestamps in a location's zone.

use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strsim::jaro_winkler;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::location::LocationRecord;

/// Maximum score (0 = exact, 1 = unrelated) kept by [`search`].
pub const SEARCH_THRESHOLD: f64 = 0.4;

/// Key prefix of metadata pairs.
pub const METADATA_PREFIX: &str = "meta:";

/// Key of the row [`ZmanimReport::today_pairs`] prepends.
pub const HEBREW_DATE_KEY: &str = "Hebrew Date";

/// Placeholder the zmanim library uses for times that do not occur.
const NOT_AVAILABLE: &str = "N/A";

const LOCAL_TIME_FORMAT: &str = "%b %-d, %Y, %-I:%M:%S %p";

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_DAY: i64 = 86_400;

/// Dawn before sunrise and nightfall after sunset, in minutes.
const TWILIGHT_MINUTES: i64 = 72;

/// Candle lighting before sunset, in minutes.
const CANDLE_LIGHTING_MINUTES: i64 = 18;

/// Times reported when `complex_zmanim` is off.
const BASIC_ZMANIM: [&str; 3] = ["Sunrise", "Chatzos", "Sunset"];

#[derive(Debug, Error)]
pub enum ZmanimError {
    /// The report is not the expected JSON shape
    #[error("Invalid zmanim report: {0}")]
    InvalidReport(#[from] serde_json::Error),

    /// The provider could not compute the times
    #[error("Zmanim calculation failed: {0}")]
    Provider(String),
}

/// Request for a zmanim calculation, in the shape the library expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZmanimOptions {
    pub date:           NaiveDate,
    pub location_name:  String,
    pub latitude:       f64,
    pub longitude:      f64,
    pub time_zone_id:   String,
    pub elevation:      f64,
    pub complex_zmanim: bool,
}

impl ZmanimOptions {
    /// Options for `location` on `date`, with the full set of opinions.
    pub fn from_location(location: &LocationRecord, date: NaiveDate) -> Self {
        Self {
            date,
            location_name: location.display_name().to_string(),
            latitude: location.lat,
            longitude: location.lon,
            time_zone_id: location.tz.clone(),
            elevation: location.elevation(),
            complex_zmanim: true,
        }
    }
}

/// Computes zmanim reports.
pub trait ZmanimProvider {
    /// # Errors
    /// Whatever the implementation cannot compute.
    fn compute(&self, options: &ZmanimOptions) -> Result<ZmanimReport, ZmanimError>;
}

/// Zmanim from sea-level sunrise and sunset.
///
/// Daytime times count proportional hours (a twelfth of sunrise to sunset,
/// per the GRA). Dawn and nightfall sit a fixed 72 minutes out. The
/// elevation is reported but not applied. Days without a sunrise or sunset
/// report every time as `N/A`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SunriseZmanim;

impl ZmanimProvider for SunriseZmanim {
    #[instrument(skip(self), fields(date = %options.date, location = %options.location_name))]
    fn compute(&self, options: &ZmanimOptions) -> Result<ZmanimReport, ZmanimError> {
        let tz: Tz = options.time_zone_id.parse().map_err(|_| {
            ZmanimError::Provider(format!("Unknown time zone: {}", options.time_zone_id))
        })?;

        let date = options.date;
        let (rise, set) = sunrise::sunrise_sunset(
            options.latitude,
            options.longitude,
            date.year(),
            date.month(),
            date.day(),
        );
        let daylight = (rise < set && set - rise < SECONDS_PER_DAY).then_some((rise, set));
        if daylight.is_none() {
            debug!("No sunrise or sunset on this day");
        }

        let mut zmanim = Map::new();
        for (name, offset) in ZMANIM {
            if !options.complex_zmanim && !BASIC_ZMANIM.contains(&name) {
                continue;
            }
            let value = daylight
                .map(|(rise, set)| offset.resolve(rise, set))
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map_or_else(
                    || NOT_AVAILABLE.to_string(),
                    |utc| utc.with_timezone(&tz).to_rfc3339(),
                );
            zmanim.insert(name.to_string(), Value::String(value));
        }

        let mut metadata = Map::new();
        metadata.insert("date".to_string(), Value::String(date.to_string()));
        let calendar_type = if options.complex_zmanim {
            "ComplexZmanimCalendar"
        } else {
            "AstronomicalCalendar"
        };
        metadata.insert("type".to_string(), Value::String(calendar_type.to_string()));
        metadata.insert(
            "location".to_string(),
            Value::String(options.location_name.clone()),
        );
        metadata.insert("latitude".to_string(), Value::from(options.latitude));
        metadata.insert("longitude".to_string(), Value::from(options.longitude));
        metadata.insert("elevation".to_string(), Value::from(options.elevation));
        metadata.insert(
            "timeZoneID".to_string(),
            Value::String(options.time_zone_id.clone()),
        );

        Ok(ZmanimReport { metadata, zmanim })
    }
}

/// Where a time falls relative to the day.
#[derive(Debug, Clone, Copy)]
enum Offset {
    /// Minutes from sunrise
    Sunrise(i64),
    /// Minutes from sunset
    Sunset(i64),
    /// Quarter proportional hours after sunrise
    QuarterHours(i64),
}

impl Offset {
    const fn resolve(self, rise: i64, set: i64) -> i64 {
        match self {
            Self::Sunrise(minutes) => rise + minutes * SECONDS_PER_MINUTE,
            Self::Sunset(minutes) => set + minutes * SECONDS_PER_MINUTE,
            Self::QuarterHours(quarters) => rise + (set - rise) * quarters / 48,
        }
    }
}

/// Report keys in chronological order.
const ZMANIM: [(&str, Offset); 11] = [
    ("Alos72", Offset::Sunrise(-TWILIGHT_MINUTES)),
    ("Sunrise", Offset::Sunrise(0)),
    ("SofZmanShmaGRA", Offset::QuarterHours(12)),
    ("SofZmanTfilaGRA", Offset::QuarterHours(16)),
    ("Chatzos", Offset::QuarterHours(24)),
    ("MinchaGedola", Offset::QuarterHours(26)),
    ("MinchaKetana", Offset::QuarterHours(38)),
    ("PlagHamincha", Offset::QuarterHours(43)),
    ("CandleLighting", Offset::Sunset(-CANDLE_LIGHTING_MINUTES)),
    ("Sunset", Offset::Sunset(0)),
    ("Tzais72", Offset::Sunset(TWILIGHT_MINUTES)),
];

/// A computed report: free-form metadata and named times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZmanimReport {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, rename = "Zmanim")]
    pub zmanim:   Map<String, Value>,
}

impl ZmanimReport {
    /// # Errors
    /// `ZmanimError::InvalidReport` if `json` is not a report object.
    pub fn from_json(json: &str) -> Result<Self, ZmanimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Metadata pairs (keys prefixed with [`METADATA_PREFIX`]) followed by
    /// the times, each in report order.
    pub fn pairs(&self) -> Vec<ZmanPair> {
        let metadata = self.metadata.iter().map(|(k, v)| ZmanPair {
            key:   format!("{METADATA_PREFIX}{k}"),
            value: value_text(v),
        });
        let zmanim = self.zmanim.iter().map(|(k, v)| ZmanPair {
            key:   k.clone(),
            value: value_text(v),
        });
        metadata.chain(zmanim).collect()
    }

    /// [`pairs`](Self::pairs) with a leading Hebrew date row.
    pub fn today_pairs(&self, hebrew_label: &str) -> Vec<ZmanPair> {
        let mut pairs = vec![ZmanPair {
            key:   HEBREW_DATE_KEY.to_string(),
            value: hebrew_label.to_string(),
        }];
        pairs.extend(self.pairs());
        pairs
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One row of a flattened report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZmanPair {
    pub key:   String,
    pub value: String,
}

impl ZmanPair {
    pub fn is_metadata(&self) -> bool {
        self.key.starts_with(METADATA_PREFIX)
    }

    /// Key without the metadata prefix.
    pub fn title(&self) -> &str {
        self.key
            .strip_prefix(METADATA_PREFIX)
            .unwrap_or(&self.key)
    }

    pub fn name_and_time(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }
}

/// Score of `query` (already lowercased) against one field.
fn field_score(field: &str, query: &str) -> f64 {
    let field = field.to_lowercase();
    if field.contains(query) {
        return 0.0;
    }

    let whole = jaro_winkler(&field, query);
    let prefix: String = field.chars().take(query.chars().count()).collect();
    let head = jaro_winkler(&prefix, query);
    1.0 - whole.max(head)
}

/// Fuzzy filter over keys and values.
///
/// A blank query returns every pair. Otherwise pairs scoring at most
/// [`SEARCH_THRESHOLD`] are returned best first, ties keeping their order.
pub fn search(pairs: &[ZmanPair], query: &str) -> Vec<ZmanPair> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return pairs.to_vec();
    }

    let mut scored: Vec<(f64, &ZmanPair)> = pairs
        .iter()
        .map(|pair| {
            let score = field_score(&pair.key, &query).min(field_score(&pair.value, &query));
            (score, pair)
        })
        .filter(|(score, _)| *score <= SEARCH_THRESHOLD)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, pair)| pair.clone()).collect()
}

/// Renders an RFC 3339 timestamp in `tz`; anything else is returned as is.
pub fn format_local(value: &str, tz: Tz) -> String {
    if value.is_empty() || value == NOT_AVAILABLE {
        return value.to_string();
    }
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| value.to_string(),
        |dt| dt.with_timezone(&tz).format(LOCAL_TIME_FORMAT).to_string(),
    )
}

/// Pretty JSON object of key to value, in pair order.
///
/// # Errors
/// Serialization failures.
pub fn pairs_to_json(pairs: &[ZmanPair]) -> Result<String, ZmanimError> {
    let object: Map<String, Value> = pairs
        .iter()
        .map(|p| (p.key.clone(), Value::String(p.value.clone())))
        .collect();
    Ok(serde_json::to_string_pretty(&object)?)
}
