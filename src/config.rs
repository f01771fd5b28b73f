// src/config.rs

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::RawRecord;

static DE_DIGRAPHS: [(char, &str); 4] = [('ä', "ae"), ('ö', "oe"), ('ü', "ue"), ('ß', "ss")];

/// Per-country digraph substitution tables applied by
/// [`alphabetical_key`](crate::alphabetical_key) before diacritics are
/// stripped. Countries without an entry rely solely on transliteration.
static SUBSTITUTIONS: Lazy<HashMap<&'static str, &'static [(char, &'static str)]>> =
    Lazy::new(|| {
        let mut tables: HashMap<&'static str, &'static [(char, &'static str)]> = HashMap::new();
        tables.insert("DE", &DE_DIGRAPHS);
        tables
    });

pub(crate) fn substitutions_for(country: &str) -> Option<&'static [(char, &'static str)]> {
    SUBSTITUTIONS.get(country).copied()
}

/// A predicate excluding certain raw records from name grouping.
///
/// A record matches when *all* set constraints hold; a record is skipped
/// when *any* rule of [`CountryConfig::skip_for_names`] matches. Skipped
/// records still take part in postcode grouping.
///
/// Used for export lines whose names are not real places (PO-box areas,
/// duplicate spellings pinned to odd coordinates and similar data warts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipRule {
    /// Exact name match.
    pub name: Option<String>,
    /// Name prefix match.
    pub name_start: Option<String>,
    /// Exact postcode match.
    pub postcode: Option<String>,
    /// Exact latitude match.
    pub latitude: Option<f64>,
    /// Exact longitude match.
    pub longitude: Option<f64>,
}

impl SkipRule {
    /// True when every set constraint holds for `record`.
    ///
    /// A rule with no constraints matches every record.
    pub fn matches(&self, record: &RawRecord) -> bool {
        if let Some(name) = &self.name {
            if record.name != *name {
                return false;
            }
        }
        if let Some(prefix) = &self.name_start {
            if !record.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(postcode) = &self.postcode {
            if record.postcode != *postcode {
                return false;
            }
        }
        if let Some(latitude) = self.latitude {
            if record.latitude != latitude {
                return false;
            }
        }
        if let Some(longitude) = self.longitude {
            if record.longitude != longitude {
                return false;
            }
        }
        true
    }
}

/// Per-country tuning for parsing and name clustering.
///
/// The owning application typically deserializes one of these per country
/// from its settings file; [`CountryConfig::default`] is a reasonable
/// starting point for countries without specific tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryConfig {
    /// Truncate postcodes at the first occurrence of this character while
    /// parsing (for exports that append box or routing suffixes).
    pub postcode_remove_from: Option<char>,
    /// Records matching any of these rules are excluded from name grouping.
    pub skip_for_names: Vec<SkipRule>,
    /// Base acceptance radius for a name group, in km.
    pub max_distance: f64,
    /// Extra acceptance radius per contributing record, in km. Large,
    /// naturally sprawling groups (a big city with many postcodes) get a
    /// wider bound.
    pub add_distance_per_item: f64,
    /// How many leading postcode characters are available as detail levels
    /// beyond the three admin-hierarchy levels.
    pub name_postcode_chars: u32,
}

impl Default for CountryConfig {
    fn default() -> Self {
        Self {
            postcode_remove_from: None,
            skip_for_names: Vec::new(),
            max_distance: 10.0,
            add_distance_per_item: 0.5,
            name_postcode_chars: 0,
        }
    }
}

impl CountryConfig {
    /// Number of detail levels the name engine may iterate through:
    /// levels `0..detail_levels()`.
    pub(crate) fn detail_levels(&self) -> u32 {
        4 + self.name_postcode_chars
    }

    /// True when `record` is excluded from name grouping.
    pub(crate) fn skips_name_grouping(&self, record: &RawRecord) -> bool {
        self.skip_for_names.iter().any(|rule| rule.matches(record))
    }
}
