//! String Interning Pool
//!
//! Stores element and attribute names once per tree. Names are compared by
//! id during query evaluation, so a name test is resolved with a single
//! `lookup` per step instead of a string comparison per node.
//!
//! Layout:
//! - `entries`: (offset, len) into `data` for each interned string ID
//! - `data`: one buffer holding every distinct name
//! - `hash_index`: hash -> list of IDs (handles rare collisions)

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Interned string identifier; 0 is reserved for "no name"
pub type NameId = u32;

/// String interning pool
#[derive(Debug, Clone)]
pub struct StringPool {
    /// Entries indexed by string ID
    entries: Vec<(u32, u32)>,
    /// Buffer holding all interned strings back to back
    data: String,
    /// Hash of string content -> list of IDs with that hash
    hash_index: HashMap<u64, Vec<NameId>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        StringPool {
            // Entry 0 is reserved for "no string"
            entries: vec![(0, 0)],
            data: String::with_capacity(512),
            hash_index: HashMap::new(),
        }
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning the existing ID when already present
    pub fn intern(&mut self, s: &str) -> NameId {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);
        if let Some(id) = self.find(hash, s) {
            return id;
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);

        let id = self.entries.len() as NameId;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// ID of an already interned string
    pub fn lookup(&self, s: &str) -> Option<NameId> {
        if s.is_empty() {
            return None;
        }
        self.find(Self::compute_hash(s), s)
    }

    fn find(&self, hash: u64, s: &str) -> Option<NameId> {
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.get(id) == Some(s))
    }

    /// Get a string by ID
    pub fn get(&self, id: NameId) -> Option<&str> {
        let &(offset, len) = self.entries.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Number of distinct strings stored (including the reserved entry)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1 // Entry 0 is reserved
    }
}
