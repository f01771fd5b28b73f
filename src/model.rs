// src/model.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{PostcodeDbError, Result};

/// One normalized line of the per-country postal export.
///
/// Immutable once parsed. `postcode` and `name` are guaranteed non-empty;
/// the three admin-hierarchy levels are optional and independent of each
/// other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub postcode: String,
    pub name: String,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub subsubregion: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl RawRecord {
    /// Parse one tab-separated export line for `country`.
    ///
    /// The export format is 12 tab-separated columns: country code,
    /// postcode, place name, region, region code, subregion, subregion
    /// code, subsubregion, subsubregion code, latitude, longitude,
    /// accuracy. Empty admin columns become `None`; the admin code columns
    /// are ignored.
    ///
    /// Raw input is assumed validated upstream, so any violation is fatal:
    /// wrong country column, empty postcode or name, unparsable
    /// coordinates, or an accuracy column that is neither empty nor a
    /// single digit 1–6.
    ///
    /// When `postcode_remove_from` is set the postcode is truncated at the
    /// first occurrence of that character; a configured truncation
    /// character missing from a postcode is also fatal.
    pub fn parse_line(
        country: &str,
        line: &str,
        postcode_remove_from: Option<char>,
    ) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 12 {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "expected 12 tab-separated columns, got {}: {line:?}",
                fields.len()
            )));
        }
        if fields[0] != country {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "country column {:?} does not match {country:?}",
                fields[0]
            )));
        }
        let accuracy = fields[11];
        if !accuracy.is_empty() && !matches!(accuracy, "1" | "2" | "3" | "4" | "5" | "6") {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "bad accuracy column {accuracy:?}"
            )));
        }
        let mut postcode = fields[1].to_string();
        if let Some(stop) = postcode_remove_from {
            match postcode.find(stop) {
                Some(at) => postcode.truncate(at),
                None => {
                    return Err(PostcodeDbError::MalformedRecord(format!(
                        "postcode {postcode:?} lacks configured truncation character {stop:?}"
                    )))
                }
            }
        }
        let latitude = parse_coordinate(fields[9], "latitude")?;
        let longitude = parse_coordinate(fields[10], "longitude")?;
        Self::new(
            postcode,
            fields[2].to_string(),
            optional(fields[3]),
            optional(fields[5]),
            optional(fields[7]),
            latitude,
            longitude,
        )
    }

    /// Build a record, enforcing the non-empty postcode/name invariant.
    pub fn new(
        postcode: String,
        name: String,
        region: Option<String>,
        subregion: Option<String>,
        subsubregion: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self> {
        if postcode.is_empty() {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "empty postcode for {name:?}"
            )));
        }
        if name.is_empty() {
            return Err(PostcodeDbError::MalformedRecord(format!(
                "empty name for postcode {postcode:?}"
            )));
        }
        Ok(Self {
            postcode,
            name,
            region,
            subregion,
            subsubregion,
            latitude,
            longitude,
        })
    }
}

fn optional(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_coordinate(field: &str, what: &str) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| {
        PostcodeDbError::MalformedRecord(format!("bad {what} column {field:?}"))
    })
}

/// Everything known about one postcode.
///
/// `names` and `regions` are deduplicated and sorted by the alphabetical
/// key. The centroid is the unweighted mean of all contributing records'
/// coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcodeEntry {
    pub names: Vec<String>,
    pub regions: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything known about one display name.
///
/// The display name may be detail-augmented (`"Neustadt (Bayern)"`) when
/// the bare name alone was geographically ambiguous. `name` keeps the
/// original casing for presentation; lookups go through the lowercased map
/// key in [`CountryIndex::names`]. `postcodes` is deduplicated and sorted
/// in ascending string order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameEntry {
    pub name: String,
    pub postcodes: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// The two built indices plus the region list for one country.
///
/// Built once by [`build_country_index`](crate::build_country_index) (or
/// deserialized from a prior build) and never mutated afterwards. `names`
/// is keyed by the lowercased display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryIndex {
    pub regions: Vec<String>,
    pub postcodes: HashMap<String, PostcodeEntry>,
    pub names: HashMap<String, NameEntry>,
}
