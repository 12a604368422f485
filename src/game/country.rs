//! Country entities and the validated reference set rounds are drawn from.

use std::collections::HashSet;

use derive_getters::Getters;
use tracing::{debug, info, instrument};

use crate::config::ConfigError;
use crate::game::rules::OPTION_COUNT;

/// Base URL for flag images, keyed by lowercase ISO 3166-1 alpha-2 code.
const FLAG_CDN: &str = "https://flagcdn.com/w640";

/// Built-in reference set as `(code, name)` pairs.
const COUNTRIES: &[(&str, &str)] = &[
    ("ar", "Argentina"),
    ("au", "Australia"),
    ("at", "Austria"),
    ("bd", "Bangladesh"),
    ("be", "Belgium"),
    ("br", "Brazil"),
    ("ca", "Canada"),
    ("cl", "Chile"),
    ("cn", "China"),
    ("co", "Colombia"),
    ("hr", "Croatia"),
    ("cz", "Czechia"),
    ("dk", "Denmark"),
    ("eg", "Egypt"),
    ("ee", "Estonia"),
    ("et", "Ethiopia"),
    ("fi", "Finland"),
    ("fr", "France"),
    ("de", "Germany"),
    ("gh", "Ghana"),
    ("gr", "Greece"),
    ("hu", "Hungary"),
    ("is", "Iceland"),
    ("in", "India"),
    ("id", "Indonesia"),
    ("ie", "Ireland"),
    ("il", "Israel"),
    ("it", "Italy"),
    ("jm", "Jamaica"),
    ("jp", "Japan"),
    ("ke", "Kenya"),
    ("mx", "Mexico"),
    ("ma", "Morocco"),
    ("np", "Nepal"),
    ("nl", "Netherlands"),
    ("nz", "New Zealand"),
    ("ng", "Nigeria"),
    ("no", "Norway"),
    ("pk", "Pakistan"),
    ("pe", "Peru"),
    ("ph", "Philippines"),
    ("pl", "Poland"),
    ("pt", "Portugal"),
    ("ro", "Romania"),
    ("sa", "Saudi Arabia"),
    ("za", "South Africa"),
    ("kr", "South Korea"),
    ("es", "Spain"),
    ("se", "Sweden"),
    ("ch", "Switzerland"),
    ("th", "Thailand"),
    ("tr", "Turkey"),
    ("ua", "Ukraine"),
    ("gb", "United Kingdom"),
    ("us", "United States"),
    ("vn", "Vietnam"),
];

/// A candidate answer: a country identified by its code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct Country {
    /// Lowercase ISO 3166-1 alpha-2 code.
    code: String,
    /// Display name.
    name: String,
}

impl Country {
    /// Creates a new country.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Returns true if `other` names the same country.
    pub fn same_as(&self, other: &Country) -> bool {
        self.code == other.code
    }

    /// URL of the 640px-wide flag image for this country.
    pub fn flag_url(&self) -> String {
        format!("{}/{}.png", FLAG_CDN, self.code)
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Reference set of countries, validated to support a full round.
///
/// A catalog always holds at least [`OPTION_COUNT`] countries with
/// distinct codes, so round generation never runs short of distractors.
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: Vec<Country>,
}

impl CountryCatalog {
    /// Validates and wraps a reference set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the set is smaller than [`OPTION_COUNT`]
    /// or contains a duplicate code.
    #[instrument(skip(countries), fields(count = countries.len()))]
    pub fn new(countries: Vec<Country>) -> Result<Self, ConfigError> {
        if countries.len() < OPTION_COUNT {
            return Err(ConfigError::new(format!(
                "Reference set has {} countries, need at least {}",
                countries.len(),
                OPTION_COUNT
            )));
        }

        let mut seen = HashSet::new();
        for country in &countries {
            if !seen.insert(country.code()) {
                return Err(ConfigError::new(format!(
                    "Duplicate country code '{}' in reference set",
                    country.code()
                )));
            }
        }

        debug!("Reference set validated");
        Ok(Self { countries })
    }

    /// Loads the built-in reference set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the built-in table is malformed.
    #[instrument]
    pub fn builtin() -> Result<Self, ConfigError> {
        let countries = COUNTRIES
            .iter()
            .map(|(code, name)| Country::new(*code, *name))
            .collect();
        let catalog = Self::new(countries)?;
        info!(count = catalog.len(), "Loaded built-in country catalog");
        Ok(catalog)
    }

    /// All countries in the catalog.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
