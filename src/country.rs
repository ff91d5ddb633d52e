//! Country detection and grouping for channel lists
//!
//! Channels are assigned to a country by keywords found in their name or
//! group title. Short ASCII keywords such as `uk` or `de` only match whole
//! words, so "Discovery" or "Sky Sports" stay uncategorised.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Channel;

/// Code of the bucket collecting channels without a detected country
pub const OTHER_CODE: &str = "OTHER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    /// ISO-like code, `UK` rather than `GB`
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

pub const OTHER: CountryInfo = CountryInfo {
    code: OTHER_CODE,
    name: "Other",
    flag: "🌍",
};

struct CountryEntry {
    info: CountryInfo,
    keywords: &'static [&'static str],
}

macro_rules! country {
    ($code:literal, $name:literal, $flag:literal, [$($kw:literal),+ $(,)?]) => {
        CountryEntry {
            info: CountryInfo { code: $code, name: $name, flag: $flag },
            keywords: &[$($kw),+],
        }
    };
}

/// Detection order; the first country with a matching keyword wins
static COUNTRIES: &[CountryEntry] = &[
    // Middle East
    country!("IL", "Israel", "🇮🇱", ["israel", "israeli", "hebrew", "עברית", "ישראל", "il", "isr"]),
    country!("PS", "Palestine", "🇵🇸", ["palestine", "palestinian", "فلسطين", "ps"]),
    country!("LB", "Lebanon", "🇱🇧", ["lebanon", "lebanese", "لبنان", "lb"]),
    country!("JO", "Jordan", "🇯🇴", ["jordan", "jordanian", "الأردن", "jo"]),
    country!("SY", "Syria", "🇸🇾", ["syria", "syrian", "سوريا", "sy"]),
    country!("IQ", "Iraq", "🇮🇶", ["iraq", "iraqi", "العراق", "iq"]),
    country!("SA", "Saudi Arabia", "🇸🇦", ["saudi", "السعودية", "ksa", "sa"]),
    country!("AE", "UAE", "🇦🇪", ["uae", "emirates", "الإمارات", "dubai", "ae"]),
    country!("EG", "Egypt", "🇪🇬", ["egypt", "egyptian", "مصر", "eg"]),
    // Europe
    country!("UK", "United Kingdom", "🇬🇧", ["uk", "united kingdom", "british", "england", "gb"]),
    country!("FR", "France", "🇫🇷", ["france", "french", "français", "fr"]),
    country!("DE", "Germany", "🇩🇪", ["germany", "german", "deutsch", "de"]),
    country!("IT", "Italy", "🇮🇹", ["italy", "italian", "italiano", "it"]),
    country!("ES", "Spain", "🇪🇸", ["spain", "spanish", "español", "es"]),
    country!("PT", "Portugal", "🇵🇹", ["portugal", "portuguese", "pt"]),
    country!("NL", "Netherlands", "🇳🇱", ["netherlands", "dutch", "nl"]),
    country!("BE", "Belgium", "🇧🇪", ["belgium", "belgian", "be"]),
    country!("GR", "Greece", "🇬🇷", ["greece", "greek", "gr"]),
    country!("TR", "Turkey", "🇹🇷", ["turkey", "turkish", "türk", "tr"]),
    // Americas
    country!("US", "United States", "🇺🇸", ["usa", "us", "united states", "american", "america"]),
    country!("CA", "Canada", "🇨🇦", ["canada", "canadian", "ca"]),
    country!("MX", "Mexico", "🇲🇽", ["mexico", "mexican", "mx"]),
    country!("BR", "Brazil", "🇧🇷", ["brazil", "brazilian", "br", "brasil"]),
    country!("AR", "Argentina", "🇦🇷", ["argentina", "argentinian", "ar"]),
    // Asia
    country!("IN", "India", "🇮🇳", ["india", "indian", "in"]),
    country!("CN", "China", "🇨🇳", ["china", "chinese", "中国", "cn"]),
    country!("JP", "Japan", "🇯🇵", ["japan", "japanese", "日本", "jp"]),
    country!("KR", "South Korea", "🇰🇷", ["korea", "korean", "한국", "kr"]),
    country!("PK", "Pakistan", "🇵🇰", ["pakistan", "pakistani", "pk"]),
    // Other
    country!("AU", "Australia", "🇦🇺", ["australia", "australian", "aussie", "au"]),
    country!("RU", "Russia", "🇷🇺", ["russia", "russian", "русский", "ru"]),
];

/// Channels sharing a detected country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryGroup<'a> {
    pub country: CountryInfo,
    pub channels: Vec<&'a Channel>,
}

/// Detect the country of a channel from its name and group title
pub fn detect_country(name: &str, group: Option<&str>) -> Option<CountryInfo> {
    let haystack = format!("{} {}", name, group.unwrap_or_default()).to_lowercase();
    let words: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    COUNTRIES
        .iter()
        .find(|entry| {
            entry.keywords.iter().any(|keyword| {
                if keyword.is_ascii() && keyword.len() <= 3 {
                    words.contains(keyword)
                } else {
                    haystack.contains(keyword)
                }
            })
        })
        .map(|entry| entry.info)
}

/// Look up a country by code, case-insensitively
pub fn country_info(code: &str) -> Option<CountryInfo> {
    let code = code.trim().to_ascii_uppercase();
    COUNTRIES
        .iter()
        .map(|entry| entry.info)
        .find(|info| info.code == code)
}

pub fn all_countries() -> Vec<CountryInfo> {
    COUNTRIES.iter().map(|entry| entry.info).collect()
}

/// Bucket channels by detected country; undetected ones go under [`OTHER_CODE`]
pub fn group_channels_by_country(channels: &[Channel]) -> BTreeMap<&'static str, CountryGroup<'_>> {
    let mut grouped: BTreeMap<&'static str, CountryGroup<'_>> = BTreeMap::new();

    for channel in channels {
        let country = detect_country(&channel.name, channel.group.as_deref()).unwrap_or(OTHER);
        grouped
            .entry(country.code)
            .or_insert_with(|| CountryGroup {
                country,
                channels: Vec::new(),
            })
            .channels
            .push(channel);
    }

    grouped
}

/// Order groups for display: `priority` codes first in the given order,
/// then the rest by name, with [`OTHER_CODE`] last
pub fn sort_countries<'a, S: AsRef<str>>(
    grouped: BTreeMap<&'static str, CountryGroup<'a>>,
    priority: &[S],
) -> Vec<CountryGroup<'a>> {
    let rank = |code: &str| {
        priority
            .iter()
            .position(|p| p.as_ref().eq_ignore_ascii_case(code))
    };

    let mut other = None;
    let mut ranked = Vec::new();
    let mut regular = Vec::new();

    for (code, group) in grouped {
        if code == OTHER_CODE {
            other = Some(group);
        } else if let Some(position) = rank(code) {
            ranked.push((position, group));
        } else {
            regular.push(group);
        }
    }

    ranked.sort_by_key(|(position, _)| *position);
    regular.sort_by(|a, b| a.country.name.cmp(b.country.name));

    ranked
        .into_iter()
        .map(|(_, group)| group)
        .chain(regular)
        .chain(other)
        .collect()
}
