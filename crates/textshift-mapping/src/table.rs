//! Ordered mapping table and replacement logic

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::{Error, Result};

/// Default table shipped with the converter: Turkish letters rewritten to
/// the glyphs that occupy their slots in legacy game fonts.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("Ğ", "ß"),
    ("ş", "é"),
    ("İ", "Î"),
    ("Ş", "É"),
    ("ğ", "ê"),
    ("Ç", "Á"),
    ("ı", "ì"),
];

/// How the rules of a table are applied to a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceMode {
    /// One left-to-right scan; at each position the first matching rule in
    /// table order wins and its output is never rescanned.
    #[default]
    Scan,
    /// Each rule is a replace-all pass over the previous rule's output.
    PerRule,
}

/// Ordered `source -> replacement` rules with unique sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<(String, String)>,
}

impl MappingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The default Turkish character table
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_MAPPINGS
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }

    /// Collect a table from edited rows.
    ///
    /// Rows with an empty source or an empty replacement are incomplete and
    /// skipped. A repeated source keeps its first position and takes the
    /// later value.
    pub fn from_pairs<I, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (from, to) in rows {
            let (from, to) = (from.into(), to.into());
            if from.is_empty() || to.is_empty() {
                trace!("Skipping incomplete mapping row");
                continue;
            }
            table.upsert(from, to);
        }
        table
    }

    /// Insert or update a rule, returning the previous replacement.
    ///
    /// An updated rule keeps its position in the table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `from` is empty.
    pub fn insert(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Option<String>> {
        let from = from.into();
        if from.is_empty() {
            return Err(Error::configuration("mapping source must not be empty"));
        }
        Ok(self.upsert(from, to.into()))
    }

    fn upsert(&mut self, from: String, to: String) -> Option<String> {
        match self.entries.iter_mut().find(|(key, _)| *key == from) {
            Some((_, value)) => Some(std::mem::replace(value, to)),
            None => {
                self.entries.push((from, to));
                None
            }
        }
    }

    /// Remove a rule, returning its replacement if it existed
    pub fn remove(&mut self, from: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == from)?;
        Some(self.entries.remove(index).1)
    }

    /// Look up the replacement for a source
    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == from)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate rules in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Apply the table in [`ReplaceMode::Scan`] mode
    pub fn apply(&self, text: &str) -> String {
        self.apply_with(text, ReplaceMode::Scan)
    }

    /// Apply the table with an explicit mode
    pub fn apply_with(&self, text: &str, mode: ReplaceMode) -> String {
        match mode {
            ReplaceMode::Scan => self.apply_scan(text),
            ReplaceMode::PerRule => self.apply_per_rule(text),
        }
    }

    fn apply_scan(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let matched = self
                .entries
                .iter()
                .find(|(from, _)| rest.starts_with(from.as_str()));

            match matched {
                Some((from, to)) => {
                    output.push_str(to);
                    rest = &rest[from.len()..];
                }
                None => {
                    output.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        output
    }

    fn apply_per_rule(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }
}

impl Serialize for MappingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (from, to) in &self.entries {
            map.serialize_entry(from, to)?;
        }
        map.end()
    }
}

struct MappingTableVisitor;

impl<'de> Visitor<'de> for MappingTableVisitor {
    type Value = MappingTable;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a flat object of string to string mappings")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut table = MappingTable {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((from, to)) = access.next_entry::<String, String>()? {
            if from.is_empty() {
                return Err(serde::de::Error::custom("mapping source must not be empty"));
            }
            table.upsert(from, to);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for MappingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(MappingTableVisitor)
    }
}
