//! Runtime configuration
//!
//! Holds the API credentials and endpoint, plus the per-country CPM table.
//! The CPM table is kept for reference: the estimator uses the flat RPM bands
//! in [`crate::estimator`] regardless of country or category.

use std::collections::HashMap;

use crate::data::youtube::YOUTUBE_API_BASE_URL;
use crate::error::{Error, Result};

/// A CPM band in USD per 1000 impressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpmRange {
    pub min: f64,
    pub max: f64,
}

impl CpmRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// CPM bands for one country, with optional per-category overrides
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCpm {
    pub base: CpmRange,
    pub categories: HashMap<String, CpmRange>,
}

/// Country code to CPM bands
#[derive(Debug, Clone, PartialEq)]
pub struct CpmTable {
    countries: HashMap<String, CountryCpm>,
}

impl Default for CpmTable {
    fn default() -> Self {
        let kr = CountryCpm {
            base: CpmRange::new(0.5, 4.0),
            categories: HashMap::from([
                ("gaming".to_string(), CpmRange::new(1.0, 5.0)),
                ("education".to_string(), CpmRange::new(2.0, 6.0)),
                ("entertainment".to_string(), CpmRange::new(1.5, 4.5)),
            ]),
        };

        Self {
            countries: HashMap::from([("KR".to_string(), kr)]),
        }
    }
}

impl CpmTable {
    /// Looks up the band for a country, preferring the category override
    ///
    /// Country codes are matched case-insensitively. Unknown categories fall
    /// back to the country's base band; unknown countries return `None`.
    pub fn lookup(&self, country: &str, category: Option<&str>) -> Option<CpmRange> {
        let country = self.countries.get(&country.to_ascii_uppercase())?;
        let by_category = category.and_then(|c| country.categories.get(&c.to_ascii_lowercase()));
        Some(by_category.copied().unwrap_or(country.base))
    }
}

/// Validated process configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub cpm_table: CpmTable,
}

impl Config {
    /// Builds a configuration, refusing a missing or blank API key
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::Config("YOUTUBE_API_KEY is not set; pass --api-key or set the variable".into())
            })?;

        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| YOUTUBE_API_BASE_URL.to_string()),
            cpm_table: CpmTable::default(),
        })
    }
}
