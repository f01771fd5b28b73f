// src/text.rs

use crate::config::substitutions_for;

/// Convert a name into a folded key suitable for alphabetical ordering.
///
/// This performs, in order:
/// 1) lowercase
/// 2) the country's digraph substitution table, when one is configured
///    (for `DE`: `ä→ae`, `ö→oe`, `ü→ue`, `ß→ss`)
/// 3) transliterate remaining Unicode → ASCII (e.g. `Łódź` → `lodz`)
///
/// The transliteration uses the `deunicode` crate. The key is used only for
/// ordering names and regions, never for equality or lookup.
///
/// # Examples
///
/// ```
/// use postcode_db::alphabetical_key;
///
/// assert_eq!(alphabetical_key("DE", "Unterschönau"), "unterschoenau");
/// assert_eq!(alphabetical_key("FR", "Orléans"), "orleans");
/// ```
pub fn alphabetical_key(country: &str, s: &str) -> String {
    let mut key = s.to_lowercase();
    if let Some(table) = substitutions_for(country) {
        for (from, to) in table {
            key = key.replace(*from, to);
        }
    }
    deunicode::deunicode(&key)
}
