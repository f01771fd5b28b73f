// src/builder/mod.rs

//! # Index builder
//!
//! One-shot batch transformation of a country's raw records into a
//! [`CountryIndex`]: postcode aggregation (always accepted as-is) and the
//! name-disambiguation engine (distance-validated, detail-escalating).

use std::collections::BTreeSet;
use tracing::info;

use crate::config::CountryConfig;
use crate::error::{PostcodeDbError, Result};
use crate::model::{CountryIndex, RawRecord};
use crate::text::alphabetical_key;

mod names;
mod postcodes;

/// Build the full index for one country.
///
/// Runs the postcode aggregator over all records, then the name engine
/// over the records not excluded by the configured skip rules, and
/// collects the sorted region list. Deterministic for a given record
/// sequence and configuration.
///
/// Fails when a record violates the non-empty postcode/name invariant or
/// when name clustering cannot resolve every record
/// ([`PostcodeDbError::UnresolvedNames`]); no partial index is ever
/// returned.
pub fn build_country_index(
    country: &str,
    records: &[RawRecord],
    config: &CountryConfig,
) -> Result<CountryIndex> {
    for record in records {
        if record.postcode.is_empty() || record.name.is_empty() {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "empty postcode or name at {},{}",
                record.latitude, record.longitude
            )));
        }
    }

    let mut regions: Vec<String> = records
        .iter()
        .filter_map(|record| record.region.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    regions.sort_by_cached_key(|region| alphabetical_key(country, region));

    let postcodes = postcodes::aggregate(country, records);

    let name_records: Vec<&RawRecord> = records
        .iter()
        .filter(|record| !config.skips_name_grouping(record))
        .collect();
    let names = names::disambiguate(country, name_records, config)?;

    info!(
        country,
        postcodes = postcodes.len(),
        names = names.len(),
        regions = regions.len(),
        "built country index"
    );

    Ok(CountryIndex {
        regions,
        postcodes,
        names,
    })
}

/// Unweighted mean of the records' coordinates.
///
/// Arithmetic rather than geodesic, which is fine for the small spatial
/// extent of one postcode or name group.
fn centroid<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> (f64, f64) {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut count = 0usize;
    for record in records {
        lat_sum += record.latitude;
        lon_sum += record.longitude;
        count += 1;
    }
    (lat_sum / count as f64, lon_sum / count as f64)
}
