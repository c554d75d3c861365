//! Layered donor index with relaxation lookup
//!
//! The index stores every donor household under all five prefixes of its
//! matching key, one layer per relaxation depth. A lookup starts at the full
//! key and relaxes towards the bare labour pair until it hits a non-empty
//! bucket; build-time validation guarantees that depth 0 is populated for
//! every reachable labour combination, so lookups never come back empty.
//!
//! The index is built once and read-only afterwards; concurrent lookups from
//! query threads need no locking.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use log::info;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::algorithm::keys::{KEY_PARTS, KeyPart, MatchKey, MatchProfile};
use crate::collections::DonorPool;
use crate::config::DonorConfig;
use crate::error::{DonorError, Result};
use crate::models::household::DonorHousehold;
use crate::models::types::LabourPair;

/// Multimap layered by key-prefix length
///
/// Layer `d` maps the first `d + 1` key parts to every value inserted with a
/// key sharing that prefix. One insertion registers the value in every layer,
/// trading memory for a constant-time bucket fetch at each relaxation depth
/// instead of re-filtering a full scan per query.
#[derive(Debug)]
pub struct LayeredMap<K, V> {
    layers: Vec<FxHashMap<SmallVec<[K; KEY_PARTS]>, Vec<V>>>,
}

impl<K: Clone + Eq + Hash, V: Clone> LayeredMap<K, V> {
    /// Create a map with the given number of layers
    #[must_use]
    pub fn new(depths: usize) -> Self {
        Self {
            layers: (0..depths).map(|_| FxHashMap::default()).collect(),
        }
    }

    /// Register a value under every prefix of its key
    ///
    /// The bucket for each prefix is created on first use; a key shorter than
    /// the layer count only reaches the layers its prefixes cover.
    pub fn insert(&mut self, key: &[K], value: V) {
        for (len, layer) in (1..=key.len()).zip(self.layers.iter_mut()) {
            let prefix: SmallVec<[K; KEY_PARTS]> = key[..len].iter().cloned().collect();
            layer.entry(prefix).or_default().push(value.clone());
        }
    }

    /// The bucket at the given depth for a key prefix, if one exists
    #[must_use]
    pub fn bucket(&self, depth: usize, prefix: &[K]) -> Option<&[V]> {
        self.layers.get(depth)?.get(prefix).map(Vec::as_slice)
    }

    /// Deepest non-empty bucket for the key, relaxing one part at a time
    #[must_use]
    pub fn lookup_relaxed(&self, key: &[K]) -> Option<(usize, &[V])> {
        let deepest = self.layers.len().min(key.len());
        for depth in (0..deepest).rev() {
            if let Some(bucket) = self.bucket(depth, &key[..=depth]) {
                if !bucket.is_empty() {
                    return Some((depth, bucket));
                }
            }
        }
        None
    }

    /// Number of buckets at a depth
    #[must_use]
    pub fn bucket_count(&self, depth: usize) -> usize {
        self.layers.get(depth).map_or(0, FxHashMap::len)
    }

    /// Sort every bucket by the given key so lookup results are deterministic
    /// by content irrespective of insertion order
    pub fn sort_buckets_by_key<T: Ord, F: Fn(&V) -> T>(&mut self, f: F) {
        for layer in &mut self.layers {
            for bucket in layer.values_mut() {
                bucket.sort_unstable_by_key(|value| f(value));
            }
        }
    }
}

/// Non-empty candidate set returned by a lookup
#[derive(Debug)]
pub struct Candidates<'a> {
    /// Relaxation depth the candidates were found at; 4 means the full key
    /// matched, 0 means only the labour pair did
    pub depth: usize,
    /// Donor households sharing the key prefix, in ascending id order
    pub households: &'a [Arc<DonorHousehold>],
}

/// The layered donor index
///
/// Built once per simulation run (or per simulated year) from the aggregated
/// pool; immutable once published for querying.
#[derive(Debug)]
pub struct DonorIndex {
    map: LayeredMap<KeyPart, Arc<DonorHousehold>>,
}

impl DonorIndex {
    /// Build the index from every household in the pool
    ///
    /// Fails when any labour combination reachable under the configured
    /// category sets has no donor coverage at depth 0: a simulation that
    /// cannot find any donor for some labour choice cannot proceed.
    pub fn build(pool: &DonorPool, config: &DonorConfig) -> Result<Self> {
        let start_time = Instant::now();
        config.validate()?;

        let mut map = LayeredMap::new(KEY_PARTS);
        for household in pool.households() {
            let key = MatchKey::from_household(household);
            map.insert(key.parts(), Arc::clone(household));
        }
        map.sort_buckets_by_key(|household| household.id);

        let index = Self { map };
        index.validate_coverage(config)?;

        info!(
            "Built donor index over {} households covering {} labour combinations in {:.2?}",
            pool.len(),
            index.map.bucket_count(0),
            start_time.elapsed()
        );
        Ok(index)
    }

    /// Relaxation lookup: the deepest non-empty candidate set for the key
    ///
    /// Guaranteed non-empty for every labour pair the build-time validation
    /// covered; a labour pair outside the validated set is an error, never an
    /// empty result.
    pub fn lookup(&self, key: &MatchKey) -> Result<Candidates<'_>> {
        self.map
            .lookup_relaxed(key.parts())
            .map(|(depth, households)| Candidates { depth, households })
            .ok_or_else(|| DonorError::NoDonorCoverage { pair: key.labour() })
    }

    /// Derive the key from a query profile and look it up
    pub fn lookup_profile(&self, profile: &MatchProfile) -> Result<Candidates<'_>> {
        self.lookup(&MatchKey::from_profile(profile))
    }

    fn validate_coverage(&self, config: &DonorConfig) -> Result<()> {
        for pair in reachable_labour_pairs(config) {
            let prefix = [KeyPart::Labour(pair)];
            let covered = self
                .map
                .bucket(0, &prefix)
                .is_some_and(|bucket| !bucket.is_empty());
            if !covered {
                return Err(DonorError::MissingLabourCoverage { pair });
            }
        }
        Ok(())
    }
}

/// Labour pairs reachable under the configured per-gender category sets
///
/// Couples combine the two category lists; single-adult households pair each
/// category with the absent sentinel.
#[must_use]
pub fn reachable_labour_pairs(config: &DonorConfig) -> Vec<LabourPair> {
    let mut pairs = Vec::new();
    for &male in &config.male_labour_categories {
        for &female in &config.female_labour_categories {
            pairs.push(LabourPair::new(Some(male), Some(female)));
        }
    }
    for &male in &config.male_labour_categories {
        pairs.push(LabourPair::new(Some(male), None));
    }
    for &female in &config.female_labour_categories {
        pairs.push(LabourPair::new(None, Some(female)));
    }
    pairs.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::LabourSupply;

    #[test]
    fn test_layered_map_prefix_buckets() {
        let mut map: LayeredMap<&str, i32> = LayeredMap::new(3);
        map.insert(&["a", "b", "c"], 1);
        map.insert(&["a", "b", "d"], 2);
        map.insert(&["a", "x", "c"], 3);

        assert_eq!(map.bucket(0, &["a"]), Some(&[1, 2, 3][..]));
        assert_eq!(map.bucket(1, &["a", "b"]), Some(&[1, 2][..]));
        assert_eq!(map.bucket(2, &["a", "b", "c"]), Some(&[1][..]));
        assert_eq!(map.bucket(1, &["a", "z"]), None);
        assert_eq!(map.bucket_count(0), 1);
        assert_eq!(map.bucket_count(1), 2);
        assert_eq!(map.bucket_count(2), 3);
    }

    #[test]
    fn test_layered_map_relaxes_to_shorter_prefixes() {
        let mut map: LayeredMap<&str, i32> = LayeredMap::new(3);
        map.insert(&["a", "b", "c"], 1);

        // Exact hit at full depth.
        assert_eq!(map.lookup_relaxed(&["a", "b", "c"]), Some((2, &[1][..])));
        // Last part differs: relax to depth 1.
        assert_eq!(map.lookup_relaxed(&["a", "b", "z"]), Some((1, &[1][..])));
        // Only the first part matches: relax to depth 0.
        assert_eq!(map.lookup_relaxed(&["a", "y", "z"]), Some((0, &[1][..])));
        // Nothing matches at any depth.
        assert_eq!(map.lookup_relaxed(&["q", "b", "c"]), None);
    }

    #[test]
    fn test_sorted_buckets() {
        let mut map: LayeredMap<&str, i32> = LayeredMap::new(1);
        map.insert(&["a"], 9);
        map.insert(&["a"], 3);
        map.insert(&["a"], 7);
        map.sort_buckets_by_key(|&value| value);

        assert_eq!(map.bucket(0, &["a"]), Some(&[3, 7, 9][..]));
    }

    #[test]
    fn test_reachable_pairs_cross_product_plus_singles() {
        let mut config = DonorConfig::new("UK_2019");
        config.male_labour_categories = vec![LabourSupply::Zero, LabourSupply::Forty];
        config.female_labour_categories = vec![LabourSupply::Zero];

        let pairs = reachable_labour_pairs(&config);
        // 2 x 1 couples + 2 single-male + 1 single-female.
        assert_eq!(pairs.len(), 5);
        assert!(pairs.contains(&LabourPair::new(Some(LabourSupply::Forty), None)));
        assert!(pairs.contains(&LabourPair::new(None, Some(LabourSupply::Zero))));
        assert!(!pairs.contains(&LabourPair::new(None, Some(LabourSupply::Forty))));
    }
}
