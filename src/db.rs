// src/db.rs

//! # Query engine
//!
//! [`PostcodeDb`] holds a per-process cache of loaded [`CountryIndex`]
//! values, keyed by country code, and answers read-only queries against
//! them. The first query for a country triggers a one-time load through
//! the configured [`IndexSource`]; subsequent queries reuse the cached
//! index.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::builder::build_country_index;
use crate::config::CountryConfig;
use crate::error::{PostcodeDbError, Result};
use crate::geo::distance;
use crate::model::{CountryIndex, NameEntry, RawRecord};
use crate::text::alphabetical_key;

/// Where country indices come from.
///
/// This is the seam to the persistence collaborator: an implementation may
/// deserialize a prior build from disk, fetch it from wherever, or build
/// it on the fly like [`BuildSource`] does. A load failure must be
/// reported as [`PostcodeDbError::CountryUnavailable`] with a remediation
/// hint.
pub trait IndexSource {
    fn load(&self, country: &str) -> Result<CountryIndex>;
}

/// An [`IndexSource`] that builds indices on demand from raw records held
/// in memory.
#[derive(Default)]
pub struct BuildSource {
    countries: HashMap<String, (Vec<RawRecord>, CountryConfig)>,
}

impl BuildSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw records and configuration for one country.
    pub fn insert(&mut self, country: &str, records: Vec<RawRecord>, config: CountryConfig) {
        self.countries
            .insert(country.to_string(), (records, config));
    }
}

impl IndexSource for BuildSource {
    fn load(&self, country: &str) -> Result<CountryIndex> {
        let (records, config) = self.countries.get(country).ok_or_else(|| {
            PostcodeDbError::CountryUnavailable {
                country: country.to_string(),
                hint: "register raw records for this country before querying".to_string(),
            }
        })?;
        build_country_index(country, records, config)
    }
}

/// Sort order for [`PostcodeDb::name_autocomplete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Descending by number of associated postcodes, alphabetical-key
    /// tie-break.
    Size,
    /// Ascending by the alphabetical key.
    Alphabetical,
    /// Match order as found; callers must treat it as unspecified.
    Unsorted,
}

/// The in-memory postcode database.
///
/// All query operations are pure reads over immutable per-country indices.
/// Lookup misses within a loaded country are `None`/empty results;
/// a country that cannot be loaded at all is
/// [`PostcodeDbError::CountryUnavailable`].
///
/// Loading twice under a check-then-load race is benign: loads are pure
/// and deterministic, so one result is simply discarded.
pub struct PostcodeDb<S = BuildSource> {
    source: S,
    cache: RwLock<HashMap<String, Arc<CountryIndex>>>,
}

impl<S: IndexSource> PostcodeDb<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The country's index, loading it on first access.
    pub fn index(&self, country: &str) -> Result<Arc<CountryIndex>> {
        check_country_code(country)?;
        if let Some(index) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(country)
        {
            return Ok(index.clone());
        }
        // Load outside the lock; a concurrent duplicate load is discarded.
        let index = Arc::new(self.source.load(country)?);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(country.to_string()).or_insert(index).clone())
    }

    /// Membership test for a postcode.
    pub fn valid_postcode(&self, country: &str, postcode: &str) -> Result<bool> {
        Ok(self.index(country)?.postcodes.contains_key(postcode))
    }

    /// Case-insensitive membership test for a display name.
    pub fn valid_name(&self, country: &str, name: &str) -> Result<bool> {
        Ok(self
            .index(country)?
            .names
            .contains_key(&name.to_lowercase()))
    }

    /// True when `value` is a known postcode or a known name.
    pub fn valid(&self, country: &str, value: &str) -> Result<bool> {
        Ok(self.valid_postcode(country, value)? || self.valid_name(country, value)?)
    }

    /// Centroid of a postcode, or `None` when unknown.
    pub fn coordinates_postcode(
        &self,
        country: &str,
        postcode: &str,
    ) -> Result<Option<(f64, f64)>> {
        Ok(self
            .index(country)?
            .postcodes
            .get(postcode)
            .map(|entry| (entry.latitude, entry.longitude)))
    }

    /// Centroid of a name (case-insensitive), or `None` when unknown.
    pub fn coordinates_name(&self, country: &str, name: &str) -> Result<Option<(f64, f64)>> {
        Ok(self
            .index(country)?
            .names
            .get(&name.to_lowercase())
            .map(|entry| (entry.latitude, entry.longitude)))
    }

    /// Centroid of a postcode or name, trying the postcode interpretation
    /// first.
    pub fn coordinates(&self, country: &str, value: &str) -> Result<Option<(f64, f64)>> {
        if let Some(found) = self.coordinates_postcode(country, value)? {
            return Ok(Some(found));
        }
        self.coordinates_name(country, value)
    }

    /// Names of a postcode, alphabetically sorted; empty when unknown.
    pub fn postcode_names(&self, country: &str, postcode: &str) -> Result<Vec<String>> {
        Ok(self
            .index(country)?
            .postcodes
            .get(postcode)
            .map(|entry| entry.names.clone())
            .unwrap_or_default())
    }

    /// Regions of a postcode, alphabetically sorted; empty when unknown.
    ///
    /// Usually a single region, but postcode boundaries straddling
    /// administrative boundaries legitimately yield several.
    pub fn postcode_regions(&self, country: &str, postcode: &str) -> Result<Vec<String>> {
        Ok(self
            .index(country)?
            .postcodes
            .get(postcode)
            .map(|entry| entry.regions.clone())
            .unwrap_or_default())
    }

    /// Postcodes of a name (case-insensitive), in ascending string order;
    /// empty when unknown.
    pub fn name_postcodes(&self, country: &str, name: &str) -> Result<Vec<String>> {
        Ok(self
            .index(country)?
            .names
            .get(&name.to_lowercase())
            .map(|entry| entry.postcodes.clone())
            .unwrap_or_default())
    }

    /// Every stored display name starting (case-insensitively) with
    /// `prefix`.
    ///
    /// Upper-case positions in the query prefix force upper-case at the
    /// corresponding output position; the remaining characters keep the
    /// stored name's own casing.
    pub fn name_autocomplete(
        &self,
        country: &str,
        prefix: &str,
        sort: Sort,
    ) -> Result<Vec<String>> {
        let index = self.index(country)?;
        let prefix_lower = prefix.to_lowercase();
        let mut matches: Vec<&NameEntry> = index
            .names
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix_lower))
            .map(|(_, entry)| entry)
            .collect();
        match sort {
            Sort::Size => matches.sort_by(|a, b| {
                b.postcodes
                    .len()
                    .cmp(&a.postcodes.len())
                    .then_with(|| {
                        alphabetical_key(country, &a.name)
                            .cmp(&alphabetical_key(country, &b.name))
                    })
            }),
            Sort::Alphabetical => {
                matches.sort_by_cached_key(|entry| alphabetical_key(country, &entry.name));
            }
            Sort::Unsorted => {}
        }
        Ok(matches
            .into_iter()
            .map(|entry| overlay_prefix_casing(&entry.name, prefix))
            .collect())
    }

    /// Postcodes whose centroid lies strictly closer than
    /// `max_distance_km` to the given coordinate, in ascending string
    /// order.
    ///
    /// Intended as a membership filter for a downstream exact query, not
    /// as a precise boundary test.
    pub fn nearby_postcodes(
        &self,
        country: &str,
        latitude: f64,
        longitude: f64,
        max_distance_km: f64,
    ) -> Result<Vec<String>> {
        let index = self.index(country)?;
        let mut out: Vec<String> = index
            .postcodes
            .iter()
            .filter(|(_, entry)| {
                distance(entry.latitude, entry.longitude, latitude, longitude) < max_distance_km
            })
            .map(|(postcode, _)| postcode.clone())
            .collect();
        out.sort();
        Ok(out)
    }

    /// The country's regions, alphabetically sorted.
    pub fn regions(&self, country: &str) -> Result<Vec<String>> {
        Ok(self.index(country)?.regions.clone())
    }
}

/// Overlay the query prefix's casing pattern onto the stored name.
fn overlay_prefix_casing(stored: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(stored.len());
    let mut prefix_chars = prefix.chars();
    for c in stored.chars() {
        match prefix_chars.next() {
            Some(p) if p.is_uppercase() => out.extend(c.to_uppercase()),
            _ => out.push(c),
        }
    }
    out
}

/// Country codes are exactly two upper-case ASCII letters
/// (ISO-3166-alpha-2 shaped; not resolved against an authoritative list).
fn check_country_code(country: &str) -> Result<()> {
    let valid = country.len() == 2 && country.bytes().all(|b| b.is_ascii_uppercase());
    if valid {
        Ok(())
    } else {
        Err(PostcodeDbError::InvalidCountryCode(country.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource(AtomicUsize);

    impl IndexSource for CountingSource {
        fn load(&self, _country: &str) -> Result<CountryIndex> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(CountryIndex {
                regions: Vec::new(),
                postcodes: HashMap::new(),
                names: HashMap::new(),
            })
        }
    }

    #[test]
    fn country_code_shape_is_enforced() {
        let db = PostcodeDb::new(BuildSource::new());
        for bad in ["de", "DEU", "D", "", "D1", "Germany"] {
            assert!(
                matches!(
                    db.valid_postcode(bad, "85716"),
                    Err(PostcodeDbError::InvalidCountryCode(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_country_is_unavailable_not_not_found() {
        let db = PostcodeDb::new(BuildSource::new());
        assert!(matches!(
            db.valid_postcode("DE", "85716"),
            Err(PostcodeDbError::CountryUnavailable { .. })
        ));
    }

    #[test]
    fn loads_once_per_country() {
        let db = PostcodeDb::new(CountingSource(AtomicUsize::new(0)));
        for _ in 0..3 {
            assert!(!db.valid_postcode("DE", "85716").unwrap());
        }
        db.regions("AT").unwrap();
        assert_eq!(db.source.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn casing_overlay_forces_uppercase_only() {
        assert_eq!(overlay_prefix_casing("unterschleißheim", "Untersch"), "Unterschleißheim");
        assert_eq!(overlay_prefix_casing("Unterschleißheim", "untersch"), "Unterschleißheim");
        assert_eq!(overlay_prefix_casing("münchen", "MÜ"), "MÜnchen");
        // Prefix longer casing positions than the name has characters are
        // simply ignored.
        assert_eq!(overlay_prefix_casing("ulm", "ULMER"), "ULM");
    }
}
