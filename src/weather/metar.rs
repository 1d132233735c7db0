//! METAR report parsing: temperature and a single condition phrase
//!
//! Only the main body is inspected. Remarks and trend groups (`RMK`, `TEMPO`,
//! `BECMG`, `NOSIG`) describe other times or are free text and are ignored.

use regex::Regex;
use std::sync::LazyLock;

/// `TT/DD` with `M` marking negative values; dewpoint may be missing
static TEMPERATURE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(M?\d{1,2})/(M?\d{1,2})?$").expect("valid temperature regex"));

const BODY_TERMINATORS: [&str; 4] = ["RMK", "TEMPO", "BECMG", "NOSIG"];

const DESCRIPTORS: [&str; 8] = ["MI", "PR", "BC", "DR", "BL", "SH", "TS", "FZ"];

const PHENOMENA: [&str; 22] = [
    "DZ", "RA", "SN", "SG", "IC", "PL", "GR", "GS", "UP", "BR", "FG", "FU", "VA", "DU", "SA",
    "HZ", "PY", "PO", "SQ", "FC", "SS", "DS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intensity {
    Light,
    Moderate,
    Heavy,
}

/// A present-weather group such as `-SHRA` or `+TSRA`
#[derive(Debug)]
struct WeatherGroup<'a> {
    intensity: Intensity,
    codes: Vec<&'a str>,
}

impl WeatherGroup<'_> {
    fn has(&self, code: &str) -> bool {
        self.codes.contains(&code)
    }

    fn has_rain(&self) -> bool {
        self.has("RA")
    }
}

type WeatherRule = (&'static str, fn(&WeatherGroup<'_>) -> bool);

/// Precipitation and obscuration, highest priority first
const WEATHER_RULES: [WeatherRule; 10] = [
    ("Thunderstorm", |g| g.has("TS")),
    ("Heavy Rain", |g| g.has_rain() && g.intensity == Intensity::Heavy),
    ("Rain", |g| g.has_rain() && g.intensity == Intensity::Moderate),
    ("Light Rain", |g| g.has_rain() && g.intensity == Intensity::Light),
    ("Drizzle", |g| g.has("DZ")),
    ("Snow", |g| g.has("SN") || g.has("SG")),
    ("Sleet", |g| g.has("PL")),
    ("Hail", |g| g.has("GR") || g.has("GS")),
    ("Fog", |g| g.has("FG")),
    ("Mist", |g| g.has("BR")),
];

/// Sky cover prefixes, densest first
const SKY_RULES: [(&str, &[&str]); 4] = [
    ("Overcast", &["OVC", "VV"]),
    ("Mostly Cloudy", &["BKN"]),
    ("Partly Cloudy", &["SCT"]),
    ("Clear", &["FEW", "SKC", "CLR", "NSC", "NCD", "CAVOK"]),
];

/// Values extracted from one report
#[derive(Debug, Clone, PartialEq)]
pub struct MetarSummary {
    pub station: Option<String>,
    pub temperature_celsius: Option<i32>,
    pub condition: &'static str,
}

/// Pick the report line out of a provider response.
///
/// Some providers prefix the report with a timestamp line; prefer the line
/// naming `station`, otherwise the last non-empty line.
#[must_use]
pub fn extract_report<'a>(body: &'a str, station: &str) -> Option<&'a str> {
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|line| {
            line.split_whitespace()
                .find(|t| *t != "METAR" && *t != "SPECI")
                .is_some_and(|t| t.eq_ignore_ascii_case(station))
        })
        .or_else(|| lines.last())
        .copied()
}

/// Parse temperature and condition from a raw report
#[must_use]
pub fn parse(report: &str) -> MetarSummary {
    let (station, body) = split_body(report);
    MetarSummary {
        station: station.map(str::to_string),
        temperature_celsius: temperature(&body),
        condition: condition(&body),
    }
}

/// Split off the report type and station, keep tokens up to the first remark/trend marker
fn split_body(report: &str) -> (Option<&str>, Vec<&str>) {
    let mut tokens = report
        .split_whitespace()
        .skip_while(|t| *t == "METAR" || *t == "SPECI");
    let station = tokens.next();
    let body = tokens
        .take_while(|t| !BODY_TERMINATORS.contains(t))
        .collect();
    (station, body)
}

fn temperature(body: &[&str]) -> Option<i32> {
    body.iter().find_map(|token| {
        let captures = TEMPERATURE_GROUP.captures(token)?;
        parse_signed(captures.get(1)?.as_str())
    })
}

fn parse_signed(value: &str) -> Option<i32> {
    match value.strip_prefix('M') {
        Some(magnitude) => magnitude.parse::<i32>().ok().map(|v| -v),
        None => value.parse().ok(),
    }
}

fn condition(body: &[&str]) -> &'static str {
    let groups: Vec<WeatherGroup<'_>> = body.iter().filter_map(|t| weather_group(t)).collect();

    if let Some((name, _)) = WEATHER_RULES
        .iter()
        .find(|(_, rule)| groups.iter().any(|g| rule(g)))
    {
        return *name;
    }

    SKY_RULES
        .iter()
        .find(|(_, prefixes)| {
            body.iter()
                .any(|t| prefixes.iter().any(|p| t.starts_with(p)))
        })
        .map_or("Unknown", |(name, _)| *name)
}

fn weather_group(token: &str) -> Option<WeatherGroup<'_>> {
    let (intensity, rest) = if let Some(rest) = token.strip_prefix('+') {
        (Intensity::Heavy, rest)
    } else if let Some(rest) = token.strip_prefix('-') {
        (Intensity::Light, rest)
    } else if let Some(rest) = token.strip_prefix("VC") {
        (Intensity::Moderate, rest)
    } else {
        (Intensity::Moderate, token)
    };

    if rest.is_empty() || rest.len() % 2 != 0 || !rest.is_ascii() {
        return None;
    }

    let codes: Vec<&str> = (0..rest.len()).step_by(2).map(|i| &rest[i..i + 2]).collect();
    codes
        .iter()
        .all(|c| DESCRIPTORS.contains(c) || PHENOMENA.contains(c))
        .then_some(WeatherGroup { intensity, codes })
}
