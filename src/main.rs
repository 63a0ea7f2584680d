//! hebdate CLI
//!
//! Hebrew/Gregorian date conversion, saved location management and zmanim.
//! Results go to stdout, logs to stderr.

#![allow(clippy::print_stdout)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hebdate::HebrewCalendar;
use hebdate::config::Settings;
use hebdate::convert::{Converter, GregorianDate, TODAY_TOOLTIP, failure_markdown};
use hebdate::geocoding::{GeocodeCandidate, GeocodingClient, NominatimGeocodingClient};
use hebdate::location::{JsonFileStore, LastLocation, LocationRecord};
use hebdate::zmanim::{
    self, SunriseZmanim, ZmanPair, ZmanimOptions, ZmanimProvider, ZmanimReport,
};

const NO_SAVED_LOCATION: &str =
    "No saved location; set one with `hebdate location set` or `hebdate location search --pick`";

/// hebdate CLI
#[derive(Debug, Parser)]
#[command(name = "hebdate")]
#[command(author, version, about = "Hebrew calendar dates and zmanim", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: ./hebdate.toml if present)
    #[arg(long, global = true, env = "HEBDATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a Hebrew date to its Gregorian civil date
    ///
    /// Example: hebdate to-gregorian 7 Elul 5785
    /// Example: hebdate to-gregorian "כ״ז בתמוז תשפ״ג"
    ToGregorian {
        /// Date text, transliterated or in Hebrew script
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print only YYYY-MM-DD
        #[arg(long, conflicts_with = "iso")]
        plain: bool,

        /// Print only the ISO 8601 timestamp (midnight UTC)
        #[arg(long)]
        iso: bool,
    },

    /// Convert a Gregorian date (default: today) to the Hebrew calendar
    ToHebrew {
        /// Date as YYYY-MM-DD
        date: Option<NaiveDate>,

        /// Treat the date as after sunset (the following Hebrew day)
        #[arg(long)]
        after_sunset: bool,

        /// Print all values on one line
        #[arg(long)]
        copy_all: bool,
    },

    /// Print today's Hebrew date label
    Today {
        /// Treat now as after sunset
        #[arg(long)]
        after_sunset: bool,
    },

    /// Manage the saved location
    Location {
        #[command(subcommand)]
        action: LocationCommand,
    },

    /// Zmanim for the saved location (or the default one)
    ///
    /// Computed from sunrise and sunset unless --report supplies a JSON
    /// report with "metadata" and "Zmanim" objects.
    Zmanim {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long, conflicts_with_all = ["report", "today"])]
        date: Option<NaiveDate>,

        /// Report file to render instead, or - for stdin
        #[arg(long)]
        report: Option<PathBuf>,

        /// Fuzzy filter (e.g. alos, netz, shkia, tzais)
        #[arg(short, long)]
        query: Option<String>,

        /// Print the filtered pairs as a JSON object
        #[arg(long)]
        json: bool,

        /// Today's times with the Hebrew date first; needs a saved location
        #[arg(long)]
        today: bool,
    },
}

#[derive(Debug, Subcommand)]
enum LocationCommand {
    /// Show the saved location (or the default)
    Show,

    /// Save a location
    Set {
        #[arg(long)]
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// IANA time zone, e.g. America/New_York
        #[arg(long)]
        tz: String,

        /// Elevation in meters
        #[arg(long, allow_negative_numbers = true)]
        elev: Option<f64>,
    },

    /// Search places by name; --pick saves one of the results
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Result to save: its 1-based number or its `lat|lon|name` value
        #[arg(long)]
        pick: Option<Pick>,

        /// Time zone for the picked place (default: looked up from its coordinates)
        #[arg(long, requires = "pick")]
        tz: Option<String>,
    },

    /// Forget the saved location
    Clear,
}

/// A `--pick` argument.
#[derive(Debug, Clone, PartialEq)]
enum Pick {
    Index(usize),
    Value(GeocodeCandidate),
}

impl FromStr for Pick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.trim().parse() {
            return Ok(Self::Index(index));
        }
        GeocodeCandidate::from_dropdown_value(s)
            .map(Self::Value)
            .ok_or_else(|| format!("expected a result number or a lat|lon|name value, got {s:?}"))
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn today() -> GregorianDate {
    Local::now().date_naive().into()
}

fn last_location(settings: &Settings) -> Result<LastLocation<JsonFileStore>> {
    let path = settings.store_path()?;
    debug!(path = %path.display(), "Using location store");
    Ok(LastLocation::new(JsonFileStore::new(path)))
}

fn render_location(record: &LocationRecord, saved: bool) -> String {
    let mut lines = vec![
        format!("Name:      {}", record.display_name()),
        format!("Latitude:  {}", record.lat),
        format!("Longitude: {}", record.lon),
        format!("Time zone: {}", record.tz),
        format!("Elevation: {} m", record.elevation()),
    ];
    if !saved {
        lines.push("(default location; nothing saved)".to_string());
    }
    lines.join("\n")
}

/// Numbered results, each followed by its `--pick` value.
fn render_candidates(candidates: &[GeocodeCandidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{:>2}. {} ({}, {})\n    --pick \"{}\"",
                i + 1,
                c.display_name,
                c.latitude,
                c.longitude,
                c.dropdown_value()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pick_candidate(candidates: &[GeocodeCandidate], pick: usize) -> Result<&GeocodeCandidate> {
    pick.checked_sub(1)
        .and_then(|i| candidates.get(i))
        .with_context(|| format!("No result #{pick}; {} found", candidates.len()))
}

/// Record for a picked place; `tz` wins over the zone at its coordinates.
fn picked_location(candidate: &GeocodeCandidate, tz: Option<String>) -> Result<LocationRecord> {
    let tz = match tz {
        Some(tz) => tz,
        None => candidate.timezone().with_context(|| {
            format!("No time zone found for {}; pass --tz", candidate.display_name)
        })?,
    };
    Ok(candidate.to_location(&tz)?)
}

/// Zmanim first, then metadata, each row with its local-time rendering.
fn render_pairs(pairs: &[ZmanPair], tz: Tz, location_name: &str) -> String {
    let (metadata, times): (Vec<&ZmanPair>, Vec<&ZmanPair>) =
        pairs.iter().partition(|p| p.is_metadata());

    let mut lines = vec![format!("Zmanim - {location_name}")];
    lines.extend(times.into_iter().map(|pair| {
        let local = zmanim::format_local(&pair.value, tz);
        if local == pair.value {
            format!("  {}: {}", pair.title(), pair.value)
        } else {
            format!("  {}: {} ({local})", pair.title(), pair.value)
        }
    }));
    if !metadata.is_empty() {
        lines.push(String::new());
        lines.push("Metadata".to_string());
        lines.extend(
            metadata
                .into_iter()
                .map(|pair| format!("  {}: {}", pair.title(), pair.value)),
        );
    }
    lines.join("\n")
}

fn read_report(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read report from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))
}

async fn search_places(settings: &Settings, query: &str) -> Result<Vec<GeocodeCandidate>> {
    let client = NominatimGeocodingClient::new(&settings.geocoding)?;
    Ok(client.search(query).await?)
}

async fn run_location(settings: &Settings, action: LocationCommand) -> Result<()> {
    let mut last = last_location(settings)?;

    match action {
        LocationCommand::Show => {
            let saved = last.load()?;
            let saved_flag = saved.is_some();
            println!("{}", render_location(&saved.unwrap_or_default(), saved_flag));
        },
        LocationCommand::Set {
            name,
            lat,
            lon,
            tz,
            elev,
        } => {
            let record = LocationRecord::new(name, lat, lon, tz, elev)?;
            last.save(&record)?;
            info!(name = record.display_name(), "Saved location");
            println!("{}", render_location(&record, true));
        },
        LocationCommand::Search { query, pick, tz } => {
            let query = query.join(" ");
            let candidate = match pick {
                Some(Pick::Value(candidate)) => candidate,
                Some(Pick::Index(index)) => {
                    let candidates = search_places(settings, &query).await?;
                    pick_candidate(&candidates, index)?.clone()
                },
                None => {
                    let candidates = search_places(settings, &query).await?;
                    if candidates.is_empty() {
                        println!("No places found for \"{query}\"");
                    } else {
                        println!("{}", render_candidates(&candidates));
                    }
                    return Ok(());
                },
            };

            let record = picked_location(&candidate, tz)?;
            last.save(&record)?;
            info!(name = record.display_name(), "Saved location");
            println!("{}", render_location(&record, true));
        },
        LocationCommand::Clear => {
            last.clear()?;
            println!("Saved location cleared");
        },
    }
    Ok(())
}

/// Flags of the `zmanim` command.
struct ZmanimArgs {
    date:   Option<NaiveDate>,
    report: Option<PathBuf>,
    query:  Option<String>,
    json:   bool,
    today:  bool,
}

/// The saved location; only `--today` refuses to fall back to the default.
fn zmanim_location(saved: Option<LocationRecord>, with_today: bool) -> Result<LocationRecord> {
    match saved {
        Some(location) => Ok(location),
        None if with_today => anyhow::bail!(NO_SAVED_LOCATION),
        None => Ok(LocationRecord::default()),
    }
}

fn zmanim_report(
    provider: &dyn ZmanimProvider,
    location: &LocationRecord,
    date: NaiveDate,
    report: Option<&Path>,
) -> Result<ZmanimReport> {
    if let Some(path) = report {
        return Ok(ZmanimReport::from_json(&read_report(path)?)?);
    }
    Ok(provider.compute(&ZmanimOptions::from_location(location, date))?)
}

fn run_zmanim(settings: &Settings, args: ZmanimArgs) -> Result<()> {
    let location = zmanim_location(last_location(settings)?.load()?, args.today)?;
    let tz = location.timezone()?;
    let date = args.date.unwrap_or_else(|| today().naive());
    let report = zmanim_report(&SunriseZmanim, &location, date, args.report.as_deref())?;

    let pairs = if args.today {
        let converter = Converter::new(&HebrewCalendar);
        let label = converter.today_label(today(), settings.menu_after_sunset_shift)?;
        report.today_pairs(&label)
    } else {
        report.pairs()
    };
    let filtered = zmanim::search(&pairs, args.query.as_deref().unwrap_or_default());
    debug!(total = pairs.len(), shown = filtered.len(), "Filtered zmanim");

    if args.json {
        println!("{}", zmanim::pairs_to_json(&filtered)?);
    } else {
        println!("{}", render_pairs(&filtered, tz, location.display_name()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load(cli.config.as_deref())?;
    let converter = Converter::new(&HebrewCalendar);

    match cli.command {
        Commands::ToGregorian { text, plain, iso } => {
            let input = text.join(" ");
            match converter.parse_and_convert(&input) {
                Ok(result) if plain => println!("{}", result.gregorian.ymd()),
                Ok(result) if iso => println!("{}", result.gregorian.iso8601()),
                Ok(result) => println!("{}", result.to_markdown()),
                Err(e) => {
                    info!(error = %e, "Conversion failed");
                    println!("{}", failure_markdown(&input));
                    return Ok(ExitCode::FAILURE);
                },
            }
        },
        Commands::ToHebrew {
            date,
            after_sunset,
            copy_all,
        } => {
            let date = date.map_or_else(today, GregorianDate::from);
            let label =
                converter.gregorian_to_hebrew(date, after_sunset || settings.after_sunset_shift)?;
            if copy_all {
                println!("{}", label.copy_all());
            } else {
                for (name, value) in label.lines() {
                    println!("{name}: {value}");
                }
            }
        },
        Commands::Today { after_sunset } => {
            let shift = after_sunset || settings.menu_after_sunset_shift;
            let label = converter.today_label(today(), shift)?;
            debug!(tooltip = TODAY_TOOLTIP, shift, "Today label");
            println!("{label}");
        },
        Commands::Location { action } => run_location(&settings, action).await?,
        Commands::Zmanim {
            date,
            report,
            query,
            json,
            today,
        } => {
            let args = ZmanimArgs {
                date,
                report,
                query,
                json,
                today,
            };
            run_zmanim(&settings, args)?;
        },
    }

    Ok(ExitCode::SUCCESS)
}
