//! Feature dictionaries mapping feature keys to dense indices.

use hashbrown::HashMap;

use crate::artifact::{self, ModelLocation, DICTIONARY_SUFFIX};
use crate::errors::{ChunkerError, Result};

/// A growable mapping from feature keys to indices.
///
/// Indices are assigned in first-seen order starting at 0 and are never
/// reused or renumbered, so a key keeps its index for the lifetime of the
/// dictionary.
pub trait FeatureDictionary {
    /// Gets the tag under which this implementation is registered.
    fn tag(&self) -> &'static str;

    /// Looks up `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - A feature key.
    /// * `insert_if_missing` - Assigns the next index to a missing key.
    ///
    /// # Returns
    ///
    /// The index of `key`, or `None` if it is missing and
    /// `insert_if_missing` is false. A miss never modifies the dictionary.
    ///
    /// # Panics
    ///
    /// Panics if inserting would need an index beyond `u32::MAX`.
    fn lookup(&mut self, key: &str, insert_if_missing: bool) -> Option<u32>;

    /// Looks up `key` without inserting it.
    fn get(&self, key: &str) -> Option<u32>;

    /// Gets the number of keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets all `(key, index)` pairs in no particular order.
    fn entries(&self) -> Vec<(String, u32)>;

    /// Clears the dictionary and fills it with `entries`.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::MalformedArtifact`] is returned unless every index in
    /// `0..entries.len()` appears exactly once and no key is repeated. The
    /// dictionary is left unchanged in that case.
    fn replace(&mut self, entries: Vec<(String, u32)>) -> Result<()>;
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len).expect("the feature dictionary exceeds the u32 index space")
}

/// Checks that `entries` is a dense, duplicate-free table.
fn check_table(entries: &[(String, u32)]) -> Result<()> {
    let mut seen = vec![false; entries.len()];
    let mut keys = hashbrown::HashSet::with_capacity(entries.len());
    for (key, index) in entries {
        match seen.get_mut(*index as usize) {
            Some(seen) if !*seen => *seen = true,
            Some(_) => {
                return Err(ChunkerError::malformed_artifact(format!(
                    "feature index {index} is assigned twice"
                )))
            }
            None => {
                return Err(ChunkerError::malformed_artifact(format!(
                    "feature index {index} is out of range for {} features",
                    entries.len()
                )))
            }
        }
        if !keys.insert(key.as_str()) {
            return Err(ChunkerError::malformed_artifact(format!(
                "feature key {key:?} appears twice"
            )));
        }
    }
    Ok(())
}

/// Writes the table of `dict` under `loc`.
pub fn save_table(dict: &dyn FeatureDictionary, loc: ModelLocation) -> Result<()> {
    artifact::write_artifact(
        &loc.path(DICTIONARY_SUFFIX),
        "feature dictionary",
        &dict.entries(),
    )
}

/// Replaces the contents of `dict` with the table stored under `loc`.
pub fn load_table(dict: &mut dyn FeatureDictionary, loc: ModelLocation) -> Result<()> {
    let entries = artifact::read_artifact(&loc.path(DICTIONARY_SUFFIX), "feature dictionary")?;
    dict.replace(entries)
}

/// Dictionary backed by a single hash map.
#[derive(Debug, Default, Clone)]
pub struct HashMapDictionary {
    ids: HashMap<String, u32>,
}

impl HashMapDictionary {
    pub const TAG: &'static str = "hashmap";

    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureDictionary for HashMapDictionary {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn lookup(&mut self, key: &str, insert_if_missing: bool) -> Option<u32> {
        if let Some(&id) = self.ids.get(key) {
            Some(id)
        } else if insert_if_missing {
            let id = next_index(self.ids.len());
            self.ids.insert(key.to_string(), id);
            Some(id)
        } else {
            None
        }
    }

    fn get(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn entries(&self) -> Vec<(String, u32)> {
        self.ids.iter().map(|(k, &v)| (k.clone(), v)).collect()
    }

    fn replace(&mut self, entries: Vec<(String, u32)>) -> Result<()> {
        check_table(&entries)?;
        self.ids = entries.into_iter().collect();
        Ok(())
    }
}

/// Dictionary that also keeps its keys in index order, so an index can be
/// mapped back to its key.
#[derive(Debug, Default, Clone)]
pub struct IndexerDictionary {
    ids: HashMap<String, u32>,
    keys: Vec<String>,
}

impl IndexerDictionary {
    pub const TAG: &'static str = "indexer";

    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the key assigned to `index`.
    pub fn key(&self, index: u32) -> Option<&str> {
        self.keys.get(index as usize).map(String::as_str)
    }

    /// Gets all keys in index order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl FeatureDictionary for IndexerDictionary {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn lookup(&mut self, key: &str, insert_if_missing: bool) -> Option<u32> {
        if let Some(&id) = self.ids.get(key) {
            Some(id)
        } else if insert_if_missing {
            let id = next_index(self.keys.len());
            self.keys.push(key.to_string());
            self.ids.insert(key.to_string(), id);
            Some(id)
        } else {
            None
        }
    }

    fn get(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn entries(&self) -> Vec<(String, u32)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), next_index(i)))
            .collect()
    }

    fn replace(&mut self, mut entries: Vec<(String, u32)>) -> Result<()> {
        check_table(&entries)?;
        entries.sort_unstable_by_key(|&(_, index)| index);
        self.ids = entries.iter().cloned().collect();
        self.keys = entries.into_iter().map(|(key, _)| key).collect();
        Ok(())
    }
}
