// src/search/space.rs

use crate::core::QsimError;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Labeled options with real-valued weights.
///
/// Caller order is kept: it defines which options are neighbours during a
/// tunnelling search. Labels are unique and weights finite. Weights need not
/// be normalised. A space is built whole and never edited entry by entry;
/// replace it to change the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct PossibilitySpace {
    entries: Vec<(String, f64)>,
}

impl PossibilitySpace {
    /// Builds a space from `(label, weight)` pairs.
    ///
    /// # Errors
    /// `InvalidArgument` when the input is empty, a label repeats, or a
    /// weight is NaN or infinite.
    pub fn new<I, K>(entries: I) -> Result<Self, QsimError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let entries: Vec<(String, f64)> = entries.into_iter().map(|(k, w)| (k.into(), w)).collect();
        if entries.is_empty() {
            return Err(QsimError::invalid_argument("possibility space must contain at least one option"));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for (label, weight) in &entries {
            if !seen.insert(label.as_str()) {
                return Err(QsimError::invalid_argument(format!("duplicate label '{}'", label)));
            }
            if !weight.is_finite() {
                return Err(QsimError::invalid_argument(format!("weight of '{}' is not finite: {}", label, weight)));
            }
        }
        Ok(Self { entries })
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label at position `index`.
    pub fn label(&self, index: usize) -> &str {
        &self.entries[index].0
    }

    /// Weight at position `index`.
    pub fn weight(&self, index: usize) -> f64 {
        self.entries[index].1
    }

    /// Weight of `label`, if present.
    pub fn weight_of(&self, label: &str) -> Option<f64> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, w)| *w)
    }

    /// `(label, weight)` pairs in caller order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(l, w)| (l.as_str(), *w))
    }

    /// Labels in caller order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }
}

impl Serialize for PossibilitySpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, weight) in &self.entries {
            map.serialize_entry(label, weight)?;
        }
        map.end()
    }
}

/// Reads a JSON-style object, keeping the document order of its keys.
impl<'de> Deserialize<'de> for PossibilitySpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpaceVisitor;

        impl<'de> Visitor<'de> for SpaceVisitor {
            type Value = PossibilitySpace;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from option label to numeric weight")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, f64)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, weight)) = access.next_entry::<String, f64>()? {
                    entries.push((label, weight));
                }
                PossibilitySpace::new(entries).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(SpaceVisitor)
    }
}
