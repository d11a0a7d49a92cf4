//! Reference data consumed by the parser: street suffixes, suite keywords,
//! state codes and block-filler words.
//!
//! A default data set is baked into the binary at compile time via
//! [`include_str!`]. Callers with their own tables can deserialize them with
//! [`ReferenceData::from_toml`] or assemble them from
//! [`SuffixTable::new`] and [`SuiteKeywords::new`]. All keys are lower-cased
//! on load, and the tables are never mutated after construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// Default reference data, embedded at compile time.
const EMBEDDED_TOML: &str = include_str!("../reference/reference.toml");

/// Normalized suffix value that marks an alias as a highway designator.
pub const HIGHWAY_CODE: &str = "hwy";

/// Maps a lower-case street suffix alias to its normalized code, e.g.
/// `"boulevard" → "blvd"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct SuffixTable {
    entries: BTreeMap<String, String>,
}

impl SuffixTable {
    /// Builds a table from `(alias, code)` pairs. Both sides are lower-cased.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.as_ref().trim().to_lowercase()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }

    /// Looks up the normalized code for `alias`, ignoring case.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(&alias.to_lowercase()).map(String::as_str)
    }

    /// Returns `true` if `alias` is a known suffix, ignoring case.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// All aliases whose normalized code is [`HIGHWAY_CODE`].
    pub fn highway_words(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, code)| code.as_str() == HIGHWAY_CODE)
            .map(|(alias, _)| alias.as_str())
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no aliases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for SuffixTable {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::new(entries)
    }
}

/// The set of words that introduce a suite or unit designator
/// (`suite`, `apt`, `#`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct SuiteKeywords {
    words: BTreeSet<String>,
}

impl SuiteKeywords {
    /// Builds the keyword set. Keywords are lower-cased.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: lowercase_set(words),
        }
    }

    /// Returns `true` if `word` is a suite keyword, ignoring case.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Iterates the keywords in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Returns `true` if there are no keywords.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<String>> for SuiteKeywords {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}

/// All reference tables a parser instance needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceData {
    /// Street suffix aliases.
    pub suffixes: SuffixTable,
    /// Suite introducer keywords.
    pub suite_keywords: SuiteKeywords,
    /// Two-letter state and territory codes, lower-case.
    #[serde(default, deserialize_with = "deserialize_lowercase_set")]
    pub states: BTreeSet<String>,
    /// Filler words stripped as "block (of)".
    #[serde(
        default = "default_block_words",
        deserialize_with = "deserialize_lowercase_set"
    )]
    pub block_words: BTreeSet<String>,
}

impl ReferenceData {
    /// Assembles reference data from its parts, with the default
    /// block-filler words.
    #[must_use]
    pub fn new<I, S>(suffixes: SuffixTable, suite_keywords: SuiteKeywords, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes,
            suite_keywords,
            states: lowercase_set(states),
            block_words: default_block_words(),
        }
    }

    /// Parses reference data from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or is missing the
    /// `suffixes` table or `suite_keywords` list.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// The default reference data embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the data is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded reference.toml: {e}"))
    }

    /// Returns `true` if `code` is a known state code, ignoring case.
    #[must_use]
    pub fn is_state(&self, code: &str) -> bool {
        self.states.contains(&code.to_lowercase())
    }

    /// Returns `true` if `word` is a block-filler word, ignoring case.
    #[must_use]
    pub fn is_block_word(&self, word: &str) -> bool {
        self.block_words.contains(&word.to_lowercase())
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::embedded()
    }
}

fn default_block_words() -> BTreeSet<String> {
    lowercase_set(["block"])
}

fn lowercase_set<I, S>(words: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn deserialize_lowercase_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let words = Vec::<String>::deserialize(deserializer)?;
    Ok(lowercase_set(words))
}
