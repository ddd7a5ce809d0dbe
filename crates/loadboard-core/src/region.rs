//! Host regions and the units they display.
//!
//! The loadboard is served from one host per marketplace. The host decides
//! the distance unit used in payloads and on screen, and the currency a new
//! order is priced in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marketplace a host serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Us,
    Uk,
    De,
    Es,
    Fr,
    It,
    Pl,
    In,
    Cz,
    Jp,
}

impl Region {
    pub fn code(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Uk => "UK",
            Region::De => "DE",
            Region::Es => "ES",
            Region::Fr => "FR",
            Region::It => "IT",
            Region::Pl => "PL",
            Region::In => "IN",
            Region::Cz => "CZ",
            Region::Jp => "JP",
        }
    }

    /// ISO currency code orders are priced in.
    pub fn currency(&self) -> &'static str {
        match self {
            Region::Us => "USD",
            Region::Uk => "GBP",
            Region::De | Region::Es | Region::Fr | Region::It => "EUR",
            Region::Pl => "PLN",
            Region::In => "INR",
            Region::Cz => "CZK",
            Region::Jp => "JPY",
        }
    }

    /// Thousands and decimal separators of the region's locale.
    fn separators(&self) -> (&'static str, char) {
        match self {
            Region::Us | Region::Uk | Region::In | Region::Jp => (",", '.'),
            Region::De | Region::Es | Region::It => (".", ','),
            Region::Fr | Region::Pl | Region::Cz => ("\u{a0}", ','),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Unit distances and radii are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "MILES")]
    Miles,
    #[serde(rename = "KILOMETERS")]
    Kilometers,
}

impl DistanceUnit {
    /// Unit name as the host API spells it.
    pub fn as_wire(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "MILES",
            DistanceUnit::Kilometers => "KILOMETERS",
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "km",
        }
    }
}

/// What a host implies for display and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainInfo {
    pub region: Region,
    pub unit: DistanceUnit,
}

impl DomainInfo {
    /// Looks up `host`. Hosts not in [`SUPPORTED_DOMAINS`] get the US entry.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        SUPPORTED_DOMAINS
            .iter()
            .find(|(domain, _)| *domain == host)
            .map(|(_, info)| *info)
            .unwrap_or(SUPPORTED_DOMAINS[0].1)
    }

    /// `"25 miles"`, `"40 km"`.
    pub fn format_distance(&self, value: f64) -> String {
        format!("{} {}", trim_number(value), self.unit.label())
    }

    /// Two-decimal amount grouped the way the region's locale groups it.
    pub fn format_currency(&self, value: f64) -> String {
        let (group, decimal) = self.region.separators();
        let fixed = format!("{:.2}", value.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let grouped = if self.region == Region::In {
            group_indian(whole, group)
        } else {
            group_thousands(whole, group)
        };
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}{grouped}{decimal}{cents}")
    }
}

const fn entry(region: Region, unit: DistanceUnit) -> DomainInfo {
    DomainInfo { region, unit }
}

/// Hosts the loadboard is served from. The first entry is the fallback.
pub const SUPPORTED_DOMAINS: [(&str, DomainInfo); 10] = [
    ("relay.amazon.com", entry(Region::Us, DistanceUnit::Miles)),
    ("relay.amazon.co.uk", entry(Region::Uk, DistanceUnit::Kilometers)),
    ("relay.amazon.de", entry(Region::De, DistanceUnit::Kilometers)),
    ("relay.amazon.es", entry(Region::Es, DistanceUnit::Kilometers)),
    ("relay.amazon.fr", entry(Region::Fr, DistanceUnit::Kilometers)),
    ("relay.amazon.it", entry(Region::It, DistanceUnit::Kilometers)),
    ("relay.amazon.pl", entry(Region::Pl, DistanceUnit::Kilometers)),
    ("relay.amazon.in", entry(Region::In, DistanceUnit::Kilometers)),
    ("relay.amazon.cz", entry(Region::Cz, DistanceUnit::Kilometers)),
    ("relay.amazon.co.jp", entry(Region::Jp, DistanceUnit::Kilometers)),
];

/// Stem-time choices offered when posting a truck, in minutes.
pub const STEM_TIME_OPTIONS: [u32; 14] = [5, 15, 30, 45, 60, 90, 120, 150, 180, 210, 240, 480, 720, 1440];

/// `45 min`, `2 hr`, `1 hr 30 min`.
pub fn format_stem_time(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours} hr"),
        rest => format!("{hours} hr {rest} min"),
    }
}

/// Drops a trailing `.0` so whole values read as integers.
pub(crate) fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

/// Lakh grouping: last three digits, then pairs.
fn group_indian(digits: &str, separator: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::new();
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out.push_str(separator);
    out.push_str(tail);
    out
}
