//! Stable identity hashes for parsed addresses.
//!
//! Two canonical strings are derived from a record and digested with MD5:
//!
//! * the exact string covers every component, so two records hash equal
//!   only if they name the same place the same way;
//! * the fuzzy string keeps the numbers and zip but reduces the street
//!   name, city and state to their Metaphone codes, so spelling variants
//!   (`"Smith"`/`"Smyth"`) collide.
//!
//! Absent components are written as `"."` so field positions never shift.
//! Both strings are lower-cased and NFC-normalized before hashing.

use address_parser_models::{AddressIdentity, AddressRecord};
use unicode_normalization::UnicodeNormalization as _;

use crate::phonetic::metaphone;

const ABSENT: &str = ".";
const SEPARATOR: &str = "|";

/// The exact canonical string: number, fraction, suite, block flag, street
/// name, direction, type, city, state, zip4.
#[must_use]
pub fn hash_string(record: &AddressRecord) -> String {
    let number = record
        .house_number
        .map(|n| n.to_string())
        .or_else(|| record.multi_number.clone());

    canonical(&[
        number.as_deref(),
        record.fraction.as_deref(),
        record.suite.as_deref(),
        record.is_block.then_some("true"),
        record.street_name.as_deref(),
        record.street_direction.as_deref(),
        record.street_type.as_deref(),
        record.city.as_deref(),
        record.state.as_deref(),
        record.zip4.as_deref(),
    ])
}

/// The fuzzy canonical string: house number, multi-number, then the
/// phonetic street name, city and state, then zip4.
#[must_use]
pub fn fuzzy_hash_string(record: &AddressRecord) -> String {
    let house_number = record.house_number.map(|n| n.to_string());
    let name = record.street_name.as_deref().map(metaphone);
    let city = record.city.as_deref().map(metaphone);
    let state = record.state.as_deref().map(metaphone);

    canonical(&[
        house_number.as_deref(),
        record.multi_number.as_deref(),
        name.as_deref(),
        city.as_deref(),
        state.as_deref(),
        record.zip4.as_deref(),
    ])
}

/// Lower-case hex MD5 of `value`.
#[must_use]
pub fn digest(value: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(value.as_bytes());
    format!("{:x}", context.finalize())
}

/// Computes both canonical strings and their digests.
#[must_use]
pub fn identify(record: &AddressRecord) -> AddressIdentity {
    let hash_string = hash_string(record);
    let fuzzy_hash_string = fuzzy_hash_string(record);

    AddressIdentity {
        hash: digest(&hash_string),
        fuzzy_hash: digest(&fuzzy_hash_string),
        hash_string,
        fuzzy_hash_string,
    }
}

fn canonical(fields: &[Option<&str>]) -> String {
    fields
        .iter()
        .map(|&field| field.filter(|v| !v.is_empty()).unwrap_or(ABSENT))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .to_lowercase()
        .nfc()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AddressRecord {
        AddressRecord {
            house_number: Some(1900),
            street_direction: Some("E".to_string()),
            street_name: Some("Emerald".to_string()),
            city: Some("Chula Vista".to_string()),
            state: Some("CA".to_string()),
            zip: Some("91913".to_string()),
            zip4: Some("91913".to_string()),
            ..AddressRecord::default()
        }
    }

    #[test]
    fn exact_string_marks_absent_fields() {
        assert_eq!(
            hash_string(&record()),
            "1900|.|.|.|emerald|e|.|chula vista|ca|91913"
        );
        assert_eq!(hash_string(&AddressRecord::default()), ".|.|.|.|.|.|.|.|.|.");
    }

    #[test]
    fn exact_string_uses_multi_number_and_block() {
        let record = AddressRecord {
            multi_number: Some("100-102".to_string()),
            is_block: true,
            street_name: Some("Main".to_string()),
            ..AddressRecord::default()
        };
        assert_eq!(hash_string(&record), "100-102|.|.|true|main|.|.|.|.|.");
    }

    #[test]
    fn fuzzy_string_is_phonetic() {
        assert_eq!(fuzzy_hash_string(&record()), "1900|.|emrlt|xl fst|k|91913");

        let mut smith = record();
        smith.street_name = Some("Smith".to_string());
        let mut smyth = record();
        smyth.street_name = Some("Smyth".to_string());
        assert_eq!(identify(&smith).fuzzy_hash, identify(&smyth).fuzzy_hash);
        assert_ne!(identify(&smith).hash, identify(&smyth).hash);
    }

    #[test]
    fn digest_is_md5_hex() {
        assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn normalizes_composed_and_decomposed_forms() {
        let mut composed = record();
        composed.city = Some("San Jos\u{e9}".to_string());
        let mut decomposed = record();
        decomposed.city = Some("San Jose\u{301}".to_string());
        assert_eq!(identify(&composed).hash, identify(&decomposed).hash);
    }

    #[test]
    fn identity_is_deterministic() {
        let first = identify(&record());
        let second = identify(&record());
        assert_eq!(first, second);
        assert_eq!(first.hash, digest(&first.hash_string));
        assert_eq!(first.hash.len(), 32);
    }
}
