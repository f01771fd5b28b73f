// src/builder/names.rs

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::CountryConfig;
use crate::error::{FailedGroup, PostcodeDbError, Result};
use crate::geo::distance;
use crate::model::{NameEntry, RawRecord};

/// Group records by display name, escalating administrative detail for
/// groups that are geographically too spread out.
///
/// Level 0 groups by the bare name. A group is accepted when the maximum
/// member distance to the group centroid stays within
/// `max_distance + add_distance_per_item * group_len`; accepted groups
/// freeze into the output immediately and are never revisited. Records of
/// failed groups move on to the next detail level, where their display
/// name gains one more admin component (region, then subregion, then
/// subsubregion, then leading postcode characters).
///
/// Records still failing after the last level abort the build with a full
/// diagnostic dump; an empty working set terminates early as success.
pub(crate) fn disambiguate(
    country: &str,
    records: Vec<&RawRecord>,
    config: &CountryConfig,
) -> Result<HashMap<String, NameEntry>> {
    let mut names: HashMap<String, NameEntry> = HashMap::new();
    let mut pending = records;
    let mut failed: Vec<(String, Vec<&RawRecord>)> = Vec::new();

    for level in 0..config.detail_levels() {
        if pending.is_empty() {
            break;
        }
        debug!(country, level, pending = pending.len(), "name grouping pass");

        // BTreeMap keeps group iteration deterministic.
        let mut groups: BTreeMap<String, Vec<&RawRecord>> = BTreeMap::new();
        for record in pending.drain(..) {
            groups
                .entry(display_name(record, level))
                .or_default()
                .push(record);
        }

        failed.clear();
        for (display, group) in groups {
            let (latitude, longitude) = super::centroid(group.iter().copied());
            let spread = group
                .iter()
                .map(|record| distance(record.latitude, record.longitude, latitude, longitude))
                .fold(0.0, f64::max);
            let allowed = config.max_distance + config.add_distance_per_item * group.len() as f64;
            if spread > allowed {
                failed.push((display, group));
            } else {
                let mut postcodes: Vec<String> = group
                    .iter()
                    .map(|record| record.postcode.clone())
                    .collect();
                postcodes.sort();
                postcodes.dedup();
                names.insert(
                    display.to_lowercase(),
                    NameEntry {
                        name: display,
                        postcodes,
                        latitude,
                        longitude,
                    },
                );
            }
        }
        pending = failed
            .iter()
            .flat_map(|(_, group)| group.iter().copied())
            .collect();
    }

    if !pending.is_empty() {
        return Err(PostcodeDbError::UnresolvedNames(
            failed
                .iter()
                .map(|(name, group)| FailedGroup {
                    name: name.clone(),
                    members: group
                        .iter()
                        .map(|record| {
                            (record.latitude, record.longitude, record.postcode.clone())
                        })
                        .collect(),
                })
                .collect(),
        ));
    }
    Ok(names)
}

/// Display name of `record` at detail level `level`.
///
/// Missing hierarchy fields are omitted rather than failing; a record with
/// no admin data keeps its bare name until the postcode levels kick in.
fn display_name(record: &RawRecord, level: u32) -> String {
    if level == 0 {
        return record.name.clone();
    }
    let postcode_prefix: String;
    let mut details: Vec<&str> = Vec::new();
    if let Some(region) = &record.region {
        details.push(region);
    }
    if level > 1 {
        if let Some(subregion) = &record.subregion {
            details.push(subregion);
        }
    }
    if level > 2 {
        if let Some(subsubregion) = &record.subsubregion {
            details.push(subsubregion);
        }
    }
    if level > 3 {
        postcode_prefix = record
            .postcode
            .chars()
            .take((level - 3) as usize)
            .collect();
        details.push(&postcode_prefix);
    }
    if details.is_empty() {
        record.name.clone()
    } else {
        format!("{} ({})", record.name, details.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::test_support::test_record;
    use crate::model::RawRecord;

    fn full_record() -> RawRecord {
        RawRecord {
            postcode: "85716".to_string(),
            name: "Unterschleißheim".to_string(),
            region: Some("Bayern".to_string()),
            subregion: Some("Oberbayern".to_string()),
            subsubregion: Some("Landkreis München".to_string()),
            latitude: 48.2804,
            longitude: 11.5768,
        }
    }

    #[test]
    fn display_name_escalates_per_level() {
        let record = full_record();
        assert_eq!(display_name(&record, 0), "Unterschleißheim");
        assert_eq!(display_name(&record, 1), "Unterschleißheim (Bayern)");
        assert_eq!(
            display_name(&record, 2),
            "Unterschleißheim (Bayern, Oberbayern)"
        );
        assert_eq!(
            display_name(&record, 3),
            "Unterschleißheim (Bayern, Oberbayern, Landkreis München)"
        );
        assert_eq!(
            display_name(&record, 4),
            "Unterschleißheim (Bayern, Oberbayern, Landkreis München, 8)"
        );
        assert_eq!(
            display_name(&record, 5),
            "Unterschleißheim (Bayern, Oberbayern, Landkreis München, 85)"
        );
    }

    #[test]
    fn missing_hierarchy_fields_are_omitted() {
        let mut record = full_record();
        record.subregion = None;
        assert_eq!(
            display_name(&record, 3),
            "Unterschleißheim (Bayern, Landkreis München)"
        );
        record.region = None;
        record.subsubregion = None;
        assert_eq!(display_name(&record, 3), "Unterschleißheim");
        assert_eq!(display_name(&record, 4), "Unterschleißheim (8)");
    }

    #[test]
    fn distant_same_named_places_split_by_region() {
        let bavaria = test_record("91413", "Neustadt", Some("Bayern"), 49.58, 10.61);
        let holstein = test_record("23730", "Neustadt", Some("Schleswig-Holstein"), 54.10, 10.81);
        let names = disambiguate(
            "DE",
            vec![&bavaria, &holstein],
            &CountryConfig::default(),
        )
        .unwrap();
        assert!(!names.contains_key("neustadt"));
        assert_eq!(names["neustadt (bayern)"].postcodes, vec!["91413"]);
        assert_eq!(
            names["neustadt (schleswig-holstein)"].postcodes,
            vec!["23730"]
        );
        assert_eq!(names["neustadt (bayern)"].name, "Neustadt (Bayern)");
    }

    #[test]
    fn tight_groups_are_accepted_at_level_zero() {
        let a = test_record("85716", "Unterschleißheim", Some("Bayern"), 48.2804, 11.5768);
        let b = test_record("85714", "Unterschleißheim", Some("Bayern"), 48.29, 11.57);
        let names = disambiguate("DE", vec![&a, &b], &CountryConfig::default()).unwrap();
        let entry = &names["unterschleißheim"];
        assert_eq!(entry.postcodes, vec!["85714", "85716"]);
        // Acceptance invariant holds for the frozen group.
        let allowed = 10.0 + 0.5 * 2.0;
        for record in [&a, &b] {
            assert!(
                distance(record.latitude, record.longitude, entry.latitude, entry.longitude)
                    <= allowed
            );
        }
    }

    #[test]
    fn tolerance_scales_with_group_size() {
        // Outer points sit ~12.7 km from the centroid: beyond the bound
        // for a group of two (10 + 1*2 = 12 km) but within it for three.
        let config = CountryConfig {
            add_distance_per_item: 1.0,
            ..CountryConfig::default()
        };
        let west = test_record("11111", "Sprawl", None, 48.0, 11.0);
        let east = test_record("22222", "Sprawl", None, 48.0, 11.34);
        let centre = test_record("33333", "Sprawl", None, 48.0, 11.17);
        let names = disambiguate("DE", vec![&west, &east, &centre], &config).unwrap();
        assert_eq!(
            names["sprawl"].postcodes,
            vec!["11111", "22222", "33333"]
        );
    }

    #[test]
    fn unresolvable_clash_aborts_with_diagnostics() {
        // Same name, same postcode prefix, no admin hierarchy: no detail
        // level can ever split them.
        let a = test_record("10000", "Ghost", None, 48.0, 11.0);
        let b = test_record("10000", "Ghost", None, 54.0, 10.0);
        let err = disambiguate("DE", vec![&a, &b], &CountryConfig::default()).unwrap_err();
        match err {
            PostcodeDbError::UnresolvedNames(groups) => {
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].name, "Ghost");
                assert_eq!(groups[0].members.len(), 2);
            }
            other => panic!("expected UnresolvedNames, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_success() {
        let names = disambiguate("DE", Vec::new(), &CountryConfig::default()).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn postcode_levels_split_admin_less_records() {
        // No admin hierarchy at all; only the postcode prefix can separate
        // these two distant places sharing a name.
        let config = CountryConfig {
            name_postcode_chars: 1,
            ..CountryConfig::default()
        };
        let a = test_record("10115", "Doppelgänger", None, 52.53, 13.38);
        let b = test_record("80331", "Doppelgänger", None, 48.14, 11.58);
        let names = disambiguate("DE", vec![&a, &b], &config).unwrap();
        assert!(!names.contains_key("doppelgänger"));
        assert_eq!(names["doppelgänger (1)"].postcodes, vec!["10115"]);
        assert_eq!(names["doppelgänger (8)"].postcodes, vec!["80331"]);
    }
}
