use serde::{Deserialize, Serialize};

/// Location reported by the geo service for one address
///
/// Only `country_code` and `region` drive decisions; the rest is kept for
/// logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLookupResult {
    /// Two-letter country code (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub country_code: Option<String>,

    /// Region/state name
    #[serde(default)]
    pub region: Option<String>,

    /// City name
    #[serde(default)]
    pub city: Option<String>,

    /// Full country name
    #[serde(default)]
    pub country: Option<String>,
}

impl GeoLookupResult {
    /// Build a result from a country code and optional region
    #[must_use]
    pub fn new(country_code: impl Into<String>, region: Option<&str>) -> Self {
        Self {
            country_code: Some(country_code.into()),
            region: region.map(String::from),
            ..Self::default()
        }
    }

    /// Country code, if present and non-empty
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        non_empty(self.country_code.as_deref())
    }

    /// Region, if present and non-empty
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        non_empty(self.region.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
