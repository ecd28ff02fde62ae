//! Sparse time-keyed lookup shared by commentary, tactical frames and events.
//!
//! Entries keep their insertion order (document order when deserialized),
//! which is the iteration order tie-breaking relies on.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::time::Seconds;

/// Mapping from timestamp keys to values, resolved by nearest time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndex<V> {
    entries: Vec<(Seconds, V)>,
}

impl<V> TimeIndex<V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value at `key`.
    ///
    /// Re-inserting an existing key replaces its value in place, keeping the
    /// original position in iteration order.
    pub fn insert(&mut self, key: Seconds, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Seconds, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = Seconds> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Value stored at exactly `time`, if any.
    pub fn exact(&self, time: Seconds) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| *k == time)
            .map(|(_, v)| v)
    }

    /// Entry whose key is closest to `time` in either direction.
    ///
    /// Ties keep the first entry encountered. The query is not clamped, so
    /// times before the first key or after the last one still resolve.
    /// Returns `None` only for an empty index.
    pub fn nearest(&self, time: Seconds) -> Option<(Seconds, &V)> {
        let mut best: Option<(Seconds, &V)> = None;

        for (key, value) in &self.entries {
            match best {
                Some((best_key, _)) if (key - time).abs() >= (best_key - time).abs() => {}
                _ => best = Some((*key, value)),
            }
        }

        best
    }

    /// Entry with the largest key not exceeding `time`.
    pub fn at_or_before(&self, time: Seconds) -> Option<(Seconds, &V)> {
        let mut best: Option<(Seconds, &V)> = None;

        for (key, value) in &self.entries {
            if *key > time {
                continue;
            }
            match best {
                Some((best_key, _)) if *key <= best_key => {}
                _ => best = Some((*key, value)),
            }
        }

        best
    }
}

impl<V> Default for TimeIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(Seconds, V)> for TimeIndex<V> {
    fn from_iter<I: IntoIterator<Item = (Seconds, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, value) in iter {
            index.insert(key, value);
        }
        index
    }
}

impl<V: Serialize> Serialize for TimeIndex<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

struct TimeIndexVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for TimeIndexVisitor<V> {
    type Value = TimeIndex<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by timestamps in seconds")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut index = TimeIndex::new();

        while let Some((raw_key, value)) = access.next_entry::<String, V>()? {
            let key: Seconds = raw_key
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid time key {raw_key:?}")))?;
            if !key.is_finite() {
                return Err(serde::de::Error::custom(format!(
                    "time key {raw_key:?} is not finite"
                )));
            }
            index.insert(key, value);
        }

        Ok(index)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TimeIndex<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TimeIndexVisitor(PhantomData))
    }
}
