//! Chained hash table from citation URL to arena handle.
//!
//! The bucket count is fixed when the index is built and never grows. With
//! the default of 100 buckets lookups stay cheap for a personal
//! bibliography of a few hundred entries; chains simply get longer beyond
//! that.

use crate::arena::Handle;

pub const DEFAULT_BUCKET_COUNT: usize = 100;

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    handle: Handle,
}

#[derive(Debug, Clone)]
pub struct UrlIndex {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl Default for UrlIndex {
    fn default() -> Self {
        Self::with_buckets(DEFAULT_BUCKET_COUNT)
    }
}

impl UrlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index with `bucket_count` chains (at least one).
    pub fn with_buckets(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            buckets: vec![Vec::new(); bucket_count],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket a key hashes to.
    pub fn bucket_of(&self, key: &str) -> usize {
        (djb2(key) as usize) % self.buckets.len()
    }

    /// Appends `key` to its chain. Returns false and leaves the table
    /// untouched if the key is already present.
    pub fn insert(&mut self, key: &str, handle: Handle) -> bool {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        if chain.iter().any(|entry| entry.key == key) {
            return false;
        }
        chain.push(Entry {
            key: key.to_owned(),
            handle,
        });
        self.len += 1;
        true
    }

    pub fn find(&self, key: &str) -> Option<Handle> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.handle)
    }

    /// Excises `key` from its chain, keeping the order of the other entries.
    pub fn remove(&mut self, key: &str) -> bool {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        match chain.iter().position(|entry| entry.key == key) {
            Some(pos) => {
                chain.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// All `(key, handle)` pairs, bucket by bucket.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Handle)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|entry| (entry.key.as_str(), entry.handle))
    }
}

/// Bernstein's djb2: `hash = hash * 33 + byte`, seeded with 5381.
pub fn djb2(key: &str) -> u32 {
    key.bytes().fold(5381u32, |hash, byte| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(byte))
    })
}
