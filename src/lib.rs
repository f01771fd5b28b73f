// src/lib.rs

//! # postcode-db
//!
//! An in-memory postal code database. The builder turns a raw per-country
//! export (one record per postcode/place-name/admin-hierarchy combination,
//! with coordinates) into two compact indices:
//!
//! - postcode → names, regions, centroid
//! - display name → postcodes, centroid
//!
//! Same-named but distant places are disambiguated at build time by
//! appending administrative detail (`"Neustadt (Bayern)"` vs
//! `"Neustadt (Schleswig-Holstein)"`) until every name group is
//! geographically tight. [`PostcodeDb`] then serves lookups, name
//! autocomplete and radius search over the built indices, loading each
//! country lazily on first access.
//!
//! ```
//! use postcode_db::{BuildSource, CountryConfig, PostcodeDb, RawRecord, Sort};
//!
//! fn main() -> postcode_db::Result<()> {
//!     let records = vec![RawRecord::new(
//!         "85716".into(),
//!         "Unterschleißheim".into(),
//!         Some("Bayern".into()),
//!         None,
//!         None,
//!         48.2804,
//!         11.5768,
//!     )?];
//!     let mut source = BuildSource::new();
//!     source.insert("DE", records, CountryConfig::default());
//!     let db = PostcodeDb::new(source);
//!
//!     assert!(db.valid("DE", "85716")?);
//!     assert_eq!(db.coordinates("DE", "Unterschleißheim")?, Some((48.2804, 11.5768)));
//!     assert_eq!(
//!         db.name_autocomplete("DE", "Untersch", Sort::Size)?,
//!         vec!["Unterschleißheim"]
//!     );
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod model;
pub mod text;

// Re-exports
pub use crate::builder::build_country_index;
pub use crate::config::{CountryConfig, SkipRule};
pub use crate::db::{BuildSource, IndexSource, PostcodeDb, Sort};
pub use crate::error::{FailedGroup, PostcodeDbError, Result};
pub use crate::geo::distance;
pub use crate::model::{CountryIndex, NameEntry, PostcodeEntry, RawRecord};
pub use crate::text::alphabetical_key;
