#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the free-form address parser.
//!
//! This crate contains only data types and their textual rendering. It has
//! no regex, reference tables, or I/O; the parsing pipeline lives in
//! `address_parser`.

pub mod token;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use token::{Token, TokenKind};

/// A parsed postal address.
///
/// Text fields are normalized as they are extracted: `street_name` and
/// `city` are title-cased, `state` and `street_direction` are upper-cased,
/// and `street_type` holds the lower-case normalized suffix code
/// (`"ave"`, `"st"`, `"highway"`). Absent fields are `None`, never empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Leading house number. Mutually exclusive with `multi_number`.
    pub house_number: Option<u64>,
    /// Combined range number such as `"12-1/2"`, kept verbatim.
    pub multi_number: Option<String>,
    /// Fraction attached to the house number, such as `"1/2"`.
    pub fraction: Option<String>,
    /// Whether "block (of)" filler was stripped from the input.
    pub is_block: bool,
    /// Suite, unit, or apartment designator.
    pub suite: Option<String>,
    /// Street direction (`N`, `SE`, ... or a highway bound like `NB`).
    pub street_direction: Option<String>,
    /// Street name.
    pub street_name: Option<String>,
    /// Normalized street suffix.
    pub street_type: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Two-letter state code.
    pub state: Option<String>,
    /// Zip or zip+4.
    pub zip: Option<String>,
    /// Five-digit zip, without any `-XXXX` extension.
    pub zip4: Option<String>,
    /// The second street of an intersection (`"A St / B Ave"`).
    pub cross_street: Option<Box<AddressRecord>>,
}

impl AddressRecord {
    /// Sets the zip and re-derives `zip4`.
    pub fn set_zip(&mut self, zip: impl Into<String>) {
        let zip = zip.into();
        let zip = zip.trim();
        if zip.is_empty() {
            self.zip = None;
            self.zip4 = None;
            return;
        }
        self.zip4 = zip.split('-').next().map(ToString::to_string);
        self.zip = Some(zip.to_string());
    }

    /// The house number segment: the number (or multi-number) followed by
    /// any fraction.
    #[must_use]
    pub fn number_str(&self) -> Option<String> {
        let number = self
            .house_number
            .map(|n| n.to_string())
            .or_else(|| self.multi_number.clone());

        match (number, &self.fraction) {
            (Some(number), Some(fraction)) => Some(format!("{number} {fraction}")),
            (Some(number), None) => Some(number),
            (None, Some(fraction)) => Some(fraction.clone()),
            (None, None) => None,
        }
    }

    /// Direction and street name, title-cased.
    #[must_use]
    pub fn dir_street(&self) -> String {
        join_present(&[
            self.street_direction.as_deref().map(str::to_uppercase),
            self.street_name.as_deref().map(title_case),
        ])
    }

    /// Direction, street name and type, title-cased. Excludes the number.
    #[must_use]
    pub fn street(&self) -> String {
        join_present(&[
            self.street_direction.as_deref().map(str::to_uppercase),
            self.street_name.as_deref().map(title_case),
            self.street_type.as_deref().map(title_case),
        ])
    }

    /// Number and street, e.g. `"1900 E Emerald St"`.
    #[must_use]
    pub fn street_line(&self) -> String {
        join_present(&[self.number_str(), Some(self.street())])
    }

    /// Arguments in the shape downstream geocoders expect.
    #[must_use]
    pub fn geocode_args(&self) -> GeocodeArgs {
        GeocodeArgs {
            number: self.house_number,
            name: self.street_name.clone(),
            direction: self.street_direction.clone(),
            suffix: self.street_type.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
        }
    }
}

impl fmt::Display for AddressRecord {
    /// Canonical rendering:
    /// `"<number> <direction> <name> <type>, <city>, <STATE> <zip>"`,
    /// omitting absent segments along with their separators. Intersections
    /// append `" / "` and the cross street's rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.street_line();

        if let Some(city) = &self.city {
            out.push_str(", ");
            out.push_str(&title_case(city));
        }

        if let Some(state) = &self.state {
            out.push_str(", ");
            out.push_str(&state.to_uppercase());
        }

        if let Some(zip) = &self.zip {
            out.push(' ');
            out.push_str(zip);
        }

        if let Some(cross) = &self.cross_street {
            out.push_str(" / ");
            out.push_str(&cross.to_string());
        }

        f.write_str(&out)
    }
}

/// Geocoder input derived from a parsed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeArgs {
    /// House number.
    pub number: Option<u64>,
    /// Street name.
    pub name: Option<String>,
    /// Street direction.
    pub direction: Option<String>,
    /// Street suffix code.
    pub suffix: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State code.
    pub state: Option<String>,
    /// Zip code.
    pub zip: Option<String>,
}

/// Content hashes of a parsed record, used for deduplication and fuzzy
/// record linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressIdentity {
    /// The `|`-joined canonical field string that `hash` digests.
    pub hash_string: String,
    /// Hex digest of `hash_string`.
    pub hash: String,
    /// The `|`-joined phonetic field string that `fuzzy_hash` digests.
    pub fuzzy_hash_string: String,
    /// Hex digest of `fuzzy_hash_string`.
    pub fuzzy_hash: String,
}

/// Title-cases `s`: the first letter of every word is upper-cased and the
/// rest lower-cased. A letter starts a word when it follows anything other
/// than a letter or digit, so `"19th"` stays `"19th"` and `"chula-vista"`
/// becomes `"Chula-Vista"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alnum = false;

    for c in s.chars() {
        if c.is_alphabetic() && !prev_alnum {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        prev_alnum = c.is_alphanumeric();
    }

    out
}

fn join_present(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
