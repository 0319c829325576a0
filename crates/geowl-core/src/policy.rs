//! Country and region allow-list.

use crate::{GeoWlError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A permitted country, optionally narrowed to one region
///
/// Written in configuration as `COUNTRY` or `COUNTRY/REGION`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoRule {
    country: String,
    region: Option<String>,
}

impl GeoRule {
    /// Permit a whole country
    #[must_use]
    pub fn country(code: &str) -> Self {
        Self {
            country: normalize_country(code),
            region: None,
        }
    }

    /// Permit a single region of a country
    #[must_use]
    pub fn region(code: &str, region: &str) -> Self {
        Self {
            country: normalize_country(code),
            region: Some(region.trim().to_string()),
        }
    }

    /// Parse `COUNTRY` or `COUNTRY/REGION`
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let mut parts = trimmed.split('/');
        let country = parts.next().unwrap_or_default().trim();
        let region = parts.next().map(str::trim);

        if parts.next().is_some() {
            return Err(GeoWlError::Config(format!(
                "geo entry {trimmed:?} has more than one '/'"
            )));
        }
        if country.is_empty() {
            return Err(GeoWlError::Config(format!(
                "geo entry {trimmed:?} has no country code"
            )));
        }

        match region {
            None => Ok(Self::country(country)),
            Some("") => Err(GeoWlError::Config(format!(
                "geo entry {trimmed:?} has an empty region"
            ))),
            Some(region) => Ok(Self::region(country, region)),
        }
    }

    /// Upper-case country code
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country
    }

    /// Region, if the rule is narrowed to one
    #[must_use]
    pub fn region_name(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl FromStr for GeoRule {
    type Err = GeoWlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GeoRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}/{region}", self.country),
            None => f.write_str(&self.country),
        }
    }
}

fn normalize_country(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// How much of a permitted country is allowed
#[derive(Debug, Clone, PartialEq, Eq)]
enum CountryScope {
    Whole,
    Regions(HashSet<String>),
}

/// Result of checking a location against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoOutcome {
    /// Country (and region, if restricted) is permitted
    Allowed,
    /// Country is not in the table
    CountryDenied,
    /// Country is region-restricted and the region is not listed
    RegionDenied,
    /// Country is region-restricted and no region was reported
    RegionUnknown,
}

impl GeoOutcome {
    /// Returns true for [`GeoOutcome::Allowed`]
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// The set of permitted countries and regions
///
/// A whole-country rule wins over any region rule for the same country,
/// whichever order they are added in.
#[derive(Debug, Clone, Default)]
pub struct GeoPolicyTable {
    countries: HashMap<String, CountryScope>,
}

impl GeoPolicyTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    pub fn insert(&mut self, rule: GeoRule) {
        let GeoRule { country, region } = rule;
        let Some(region) = region else {
            self.countries.insert(country, CountryScope::Whole);
            return;
        };

        match self
            .countries
            .entry(country)
            .or_insert_with(|| CountryScope::Regions(HashSet::new()))
        {
            CountryScope::Whole => {}
            CountryScope::Regions(regions) => {
                regions.insert(region);
            }
        }
    }

    /// Check a location against the table
    #[must_use]
    pub fn evaluate(&self, country: &str, region: Option<&str>) -> GeoOutcome {
        match self.countries.get(&normalize_country(country)) {
            None => GeoOutcome::CountryDenied,
            Some(CountryScope::Whole) => GeoOutcome::Allowed,
            Some(CountryScope::Regions(regions)) => match region.map(str::trim) {
                None | Some("") => GeoOutcome::RegionUnknown,
                Some(region) if regions.contains(region) => GeoOutcome::Allowed,
                Some(_) => GeoOutcome::RegionDenied,
            },
        }
    }

    /// Returns true if the location is permitted
    #[must_use]
    pub fn permits(&self, country: &str, region: Option<&str>) -> bool {
        self.evaluate(country, region).is_allowed()
    }

    /// Permitted country codes
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    /// Permitted regions for a country; empty when the whole country is permitted
    #[must_use]
    pub fn regions(&self, country: &str) -> HashSet<&str> {
        match self.countries.get(&normalize_country(country)) {
            Some(CountryScope::Regions(regions)) => regions.iter().map(String::as_str).collect(),
            _ => HashSet::new(),
        }
    }

    /// Returns true if no country is permitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl FromIterator<GeoRule> for GeoPolicyTable {
    fn from_iter<I: IntoIterator<Item = GeoRule>>(iter: I) -> Self {
        let mut table = Self::new();
        for rule in iter {
            table.insert(rule);
        }
        table
    }
}
