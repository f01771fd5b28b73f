// src/builder/postcodes.rs

use std::collections::{BTreeSet, HashMap};

use crate::model::{PostcodeEntry, RawRecord};
use crate::text::alphabetical_key;

/// Group records by postcode into one [`PostcodeEntry`] per postcode.
///
/// Unlike name grouping, postcode grouping is always accepted as-is; no
/// geographic tightness check applies. Output is independent of the input
/// record order.
pub(crate) fn aggregate(
    country: &str,
    records: &[RawRecord],
) -> HashMap<String, PostcodeEntry> {
    let mut groups: HashMap<&str, Vec<&RawRecord>> = HashMap::new();
    for record in records {
        groups.entry(&record.postcode).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(postcode, group)| {
            let mut names: Vec<String> = group
                .iter()
                .map(|record| record.name.as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect();
            names.sort_by_cached_key(|name| alphabetical_key(country, name));

            let mut regions: Vec<String> = group
                .iter()
                .filter_map(|record| record.region.as_deref())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect();
            regions.sort_by_cached_key(|region| alphabetical_key(country, region));

            let (latitude, longitude) = super::centroid(group.iter().copied());
            (
                postcode.to_string(),
                PostcodeEntry {
                    names,
                    regions,
                    latitude,
                    longitude,
                },
            )
        })
        .collect()
}
