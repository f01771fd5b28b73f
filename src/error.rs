// src/error.rs

use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PostcodeDbError>;

/// A name group that stayed geographically too spread out at every
/// available detail level.
///
/// Members are `(latitude, longitude, postcode)` triples of the records
/// that could not be clustered under the group's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedGroup {
    pub name: String,
    pub members: Vec<(f64, f64, String)>,
}

/// Errors produced when building or querying the postcode database.
#[derive(Debug, Error)]
pub enum PostcodeDbError {
    /// The country code is not two upper-case ASCII letters.
    #[error("invalid country code {0:?}: expected two upper-case ASCII letters")]
    InvalidCountryCode(String),

    /// No index exists (or could be loaded) for the requested country.
    ///
    /// This is distinct from a plain lookup miss within a loaded country:
    /// lookup misses are represented as `None`/empty results, never as
    /// errors.
    #[error("no postcode data available for {country}: {hint}")]
    CountryUnavailable { country: String, hint: String },

    /// A raw record violated an input invariant.
    ///
    /// Raw input is assumed validated upstream; the build refuses to
    /// proceed rather than guess.
    #[error("malformed raw record: {0}")]
    MalformedRecord(String),

    /// Name clustering could not resolve every record within the
    /// configured detail levels. The build aborts rather than emit a
    /// partially correct index.
    #[error("{}", format_unresolved(.0))]
    UnresolvedNames(Vec<FailedGroup>),
}

fn format_unresolved(groups: &[FailedGroup]) -> String {
    let mut out =
        String::from("combining of the following names and points is out of bounds:\n");
    for group in groups {
        out.push_str(&group.name);
        out.push('\n');
        for (latitude, longitude, postcode) in &group.members {
            out.push_str(&format!("{latitude},{longitude},{postcode}\n"));
        }
    }
    out.push_str("-> abort");
    out
}
