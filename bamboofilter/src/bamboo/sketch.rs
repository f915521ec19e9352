// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::hash::Hash;
use std::hash::Hasher;
use std::mem;

use crate::bamboo::bucket_table::BucketTable;
use crate::bamboo::bucket_table::Fingerprint;
use crate::bamboo::builder::BambooFilterBuilder;
use crate::common::RandomSource;
use crate::common::XorShift64;
use crate::hash::Fnv1a64;

const FINGERPRINT_BITS: u32 = 16;
const FINGERPRINT_MASK: u64 = (1 << FINGERPRINT_BITS) - 1;

// Odd MurmurHash2 mixing constant. Oddness is what keeps the alternate
// index mapping an involution on power-of-two block widths.
const ALT_INDEX_MIX: usize = 0x5bd1e995;

/// Result of a [`BambooFilter::insert`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key's fingerprint was placed and `size` grew by one.
    Inserted,
    /// The filter already answered positive for this key; nothing changed.
    AlreadyPresent,
    /// Both candidate buckets stayed full within the eviction budget; the
    /// key was not admitted and the placement left the tables as it found
    /// them. (A migration segment may still have been drained by the same
    /// call before placement ran.)
    Overflow,
}

impl InsertOutcome {
    /// Returns whether the key is queryable after the call.
    pub fn is_admitted(self) -> bool {
        !matches!(self, InsertOutcome::Overflow)
    }
}

/// A Bamboo filter: an expanding cuckoo-hash membership filter.
///
/// Provides fast membership queries with:
/// - No false negatives (admitted keys always return `true`)
/// - A small false positive rate bounded by fingerprint collisions
/// - Incremental growth: when occupancy passes the load threshold, a
///   doubled table is allocated and each subsequent insert migrates a
///   short segment of buckets into it, so no insert pays for a full
///   rebuild
///
/// The table is organized in blocks as wide as the initial bucket count.
/// Digest bits choose a bucket inside the block and low fingerprint bits
/// choose the block, one more bit per doubling. Because the block choice
/// is a function of the stored fingerprint alone, a migrating bucket can
/// be rehomed without the original key, and queries re-derive the same
/// spot at every capacity.
///
/// Use [`BambooFilter::builder`] to construct instances.
///
/// # Examples
///
/// ```
/// use bamboofilter::bamboo::BambooFilter;
///
/// let mut filter = BambooFilter::builder().build().unwrap();
/// filter.insert("chr1:10442");
///
/// assert!(filter.contains(&"chr1:10442"));
/// assert!(!filter.contains(&"chr2:733"));
/// ```
#[derive(Debug, Clone)]
pub struct BambooFilter {
    /// The authoritative table.
    table: BucketTable,
    /// Doubled table being filled; present only while a migration runs.
    next_table: Option<BucketTable>,
    /// Next `table` bucket to drain; meaningful only while migrating.
    migrate_cursor: usize,
    /// Block width in buckets, fixed at the initial bucket count. A
    /// fingerprint's two candidate buckets always share one block.
    buckets_per_block: usize,
    /// Count of accepted inserts.
    size: u64,
    /// Fingerprints lost because migration found no slot for them.
    migration_drops: u64,
    load_threshold: f64,
    max_evictions: usize,
    segment_size: usize,
    rng: XorShift64,
}

impl BambooFilter {
    /// Returns a builder for creating a Bamboo filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use bamboofilter::bamboo::BambooFilter;
    ///
    /// let filter = BambooFilter::builder()
    ///     .initial_buckets(2048)
    ///     .load_threshold(0.9)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(filter.capacity(), 2048);
    /// ```
    pub fn builder() -> BambooFilterBuilder {
        BambooFilterBuilder::default()
    }

    pub(super) fn with_config(
        initial_buckets: usize,
        slots_per_bucket: usize,
        load_threshold: f64,
        max_evictions: usize,
        segment_size: usize,
        rng: XorShift64,
    ) -> Self {
        Self {
            table: BucketTable::new(initial_buckets, slots_per_bucket),
            next_table: None,
            migrate_cursor: 0,
            buckets_per_block: initial_buckets,
            size: 0,
            migration_drops: 0,
            load_threshold,
            max_evictions,
            segment_size,
            rng,
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether a key is possibly in the set.
    ///
    /// Returns:
    /// - `true`: the key was **possibly** inserted (or is a false positive)
    /// - `false`: the key was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use bamboofilter::bamboo::BambooFilter;
    /// let mut filter = BambooFilter::builder().build().unwrap();
    /// filter.insert("apple");
    ///
    /// assert!(filter.contains(&"apple"));
    /// assert!(!filter.contains(&"grape"));
    /// ```
    pub fn contains<T: Hash>(&self, key: &T) -> bool {
        self.lookup(digest_of(key))
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts a key into the filter.
    ///
    /// A key the filter already answers positive for is skipped, so feeding
    /// a duplicate-heavy stream does not inflate [`size`](Self::size). If
    /// the filter is past its load threshold the call also advances the
    /// background migration by one segment before placing the fingerprint.
    ///
    /// # Examples
    ///
    /// ```
    /// use bamboofilter::bamboo::BambooFilter;
    /// use bamboofilter::bamboo::InsertOutcome;
    ///
    /// let mut filter = BambooFilter::builder().build().unwrap();
    ///
    /// assert_eq!(filter.insert("apple"), InsertOutcome::Inserted);
    /// assert_eq!(filter.insert("apple"), InsertOutcome::AlreadyPresent);
    /// assert_eq!(filter.size(), 1);
    /// ```
    pub fn insert<T: Hash>(&mut self, key: T) -> InsertOutcome {
        let digest = digest_of(&key);
        if self.lookup(digest) {
            return InsertOutcome::AlreadyPresent;
        }

        self.maybe_begin_expansion();
        self.advance_migration();

        if self.place(digest) {
            self.size += 1;
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Overflow
        }
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the count of accepted inserts.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns whether no insert has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the bucket count: both tables combined while an expansion
    /// is in progress, otherwise the authoritative table alone.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bamboofilter::bamboo::BambooFilter;
    /// let filter = BambooFilter::builder().initial_buckets(256).build().unwrap();
    /// assert_eq!(filter.capacity(), 256);
    /// ```
    pub fn capacity(&self) -> u64 {
        let next = self.next_table.as_ref().map_or(0, BucketTable::num_buckets);
        (self.table.num_buckets() + next) as u64
    }

    /// Returns how many fingerprints each bucket can hold.
    pub fn slots_per_bucket(&self) -> usize {
        self.table.slots_per_bucket()
    }

    /// Returns whether a segment migration is in progress.
    pub fn is_expanding(&self) -> bool {
        self.next_table.is_some()
    }

    /// Returns the current load factor: accepted inserts over total slots,
    /// counting both tables while expanding.
    pub fn load_factor(&self) -> f64 {
        let mut slots = self.table.num_buckets() * self.table.slots_per_bucket();
        if let Some(next) = &self.next_table {
            slots += next.num_buckets() * next.slots_per_bucket();
        }
        self.size as f64 / slots as f64
    }

    /// Returns how many fingerprints migration failed to relocate.
    ///
    /// A dropped key may answer `false` afterwards.
    pub fn migration_drops(&self) -> u64 {
        self.migration_drops
    }

    /// Estimates the current heap usage of the filter in bytes.
    pub fn memory_usage(&self) -> usize {
        let next = self.next_table.as_ref().map_or(0, BucketTable::heap_size);
        mem::size_of::<Self>() + self.table.heap_size() + next
    }

    // ========================================================================
    // Internal: query router
    // ========================================================================

    fn lookup(&self, digest: u64) -> bool {
        let fp = fingerprint_of(digest);
        if self.find_in(&self.table, digest, fp) {
            return true;
        }
        match &self.next_table {
            Some(next) => self.find_in(next, digest, fp),
            None => false,
        }
    }

    /// Probes the candidate pair for `digest` in one table, derived under
    /// that table's capacity.
    fn find_in(&self, table: &BucketTable, digest: u64, fp: Fingerprint) -> bool {
        let i1 = primary_index(digest, fp, self.buckets_per_block, table.num_buckets());
        let i2 = alt_index(i1, fp, self.buckets_per_block);
        table.has(i1, fp) || table.has(i2, fp)
    }

    // ========================================================================
    // Internal: expansion controller
    // ========================================================================

    fn maybe_begin_expansion(&mut self) {
        if self.next_table.is_some() {
            return;
        }

        let slots = self.table.num_buckets() * self.table.slots_per_bucket();
        if self.size as f64 / slots as f64 > self.load_threshold {
            self.next_table = Some(BucketTable::new(
                self.table.num_buckets() * 2,
                self.table.slots_per_bucket(),
            ));
            self.migrate_cursor = 0;
        }
    }

    /// Drains one segment of the old table into the doubled one, and swaps
    /// the tables once the cursor reaches the end.
    fn advance_migration(&mut self) {
        let Some(mut next) = self.next_table.take() else {
            return;
        };

        let buckets_per_block = self.buckets_per_block;
        let max_evictions = self.max_evictions;
        let old_buckets = self.table.num_buckets();
        // Block count of the old table; the fingerprint bit right above
        // the current block bits decides which half of the doubled table a
        // relocated fingerprint belongs to.
        let old_blocks = old_buckets / buckets_per_block;

        let end = usize::min(self.migrate_cursor + self.segment_size, old_buckets);
        for bucket in self.migrate_cursor..end {
            for fp in self.table.take_bucket(bucket) {
                let grown = bucket + old_buckets * ((fp as usize / old_blocks) & 1);
                let alt = alt_index(grown, fp, buckets_per_block);
                let placed = Self::place_into(
                    &mut next,
                    grown,
                    fp,
                    buckets_per_block,
                    max_evictions,
                    &mut self.rng,
                ) || Self::place_into(
                    &mut next,
                    alt,
                    fp,
                    buckets_per_block,
                    max_evictions,
                    &mut self.rng,
                );
                if !placed {
                    self.migration_drops += 1;
                }
            }
        }
        self.migrate_cursor = end;

        if self.migrate_cursor == old_buckets {
            self.table = next;
        } else {
            self.next_table = Some(next);
        }
    }

    // ========================================================================
    // Internal: cuckoo placer
    // ========================================================================

    fn place(&mut self, digest: u64) -> bool {
        let fp = fingerprint_of(digest);
        let buckets_per_block = self.buckets_per_block;
        let max_evictions = self.max_evictions;

        // While expanding, fresh fingerprints go straight into the doubled
        // table; the old table only ever shrinks, so completing the
        // migration cannot strand anything accepted here.
        let rng = &mut self.rng;
        let table = match self.next_table.as_mut() {
            Some(next) => next,
            None => &mut self.table,
        };

        let i1 = primary_index(digest, fp, buckets_per_block, table.num_buckets());
        let i2 = alt_index(i1, fp, buckets_per_block);
        Self::place_into(table, i1, fp, buckets_per_block, max_evictions, rng)
            || Self::place_into(table, i2, fp, buckets_per_block, max_evictions, rng)
    }

    /// Attempts to home `fp` starting at bucket `start`, displacing up to
    /// `max_evictions` victims along the alternate-index chain.
    ///
    /// The walk is a sequence of swaps; on depth exhaustion it is undone
    /// in reverse, so a failed placement leaves the table exactly as it
    /// was found.
    fn place_into<R: RandomSource>(
        table: &mut BucketTable,
        start: usize,
        fp: Fingerprint,
        buckets_per_block: usize,
        max_evictions: usize,
        rng: &mut R,
    ) -> bool {
        if table.try_put(start, fp) {
            return true;
        }

        let mut carry = fp;
        let mut index = start;
        let mut trail: Vec<(usize, usize)> = Vec::new();
        for _ in 0..max_evictions {
            let (victim, slot) = table.swap_random(index, carry, rng);
            trail.push((index, slot));
            // Even when the victim equals the carried fingerprint the walk
            // advances to the alternate bucket, and the depth bound keeps
            // it finite.
            carry = victim;
            index = alt_index(index, carry, buckets_per_block);
            if table.try_put(index, carry) {
                return true;
            }
        }

        for &(index, slot) in trail.iter().rev() {
            carry = table.swap_at(index, slot, carry);
        }
        false
    }
}

/// Hashes a key to the 64-bit digest every projection derives from.
fn digest_of<T: Hash>(key: &T) -> u64 {
    let mut hasher = Fnv1a64::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Low 16 digest bits, with zero remapped so it can stand for "empty".
#[inline]
fn fingerprint_of(digest: u64) -> Fingerprint {
    let fp = (digest & FINGERPRINT_MASK) as Fingerprint;
    if fp == 0 { 1 } else { fp }
}

/// Primary bucket index: digest bits pick the position inside a block,
/// low fingerprint bits pick the block (one bit per doubling), so the
/// block choice survives migrations that only see the fingerprint.
#[inline]
fn primary_index(
    digest: u64,
    fp: Fingerprint,
    buckets_per_block: usize,
    num_buckets: usize,
) -> usize {
    let base = (digest >> FINGERPRINT_BITS) as usize & (buckets_per_block - 1);
    let blocks = num_buckets / buckets_per_block;
    base + buckets_per_block * (fp as usize & (blocks - 1))
}

/// Partner bucket of `index` for `fp`. Flips position bits inside the
/// block, never the block choice, so applying it twice returns `index`
/// at every capacity.
#[inline]
fn alt_index(index: usize, fp: Fingerprint, buckets_per_block: usize) -> usize {
    index ^ ((fp as usize).wrapping_mul(ALT_INDEX_MIX) & (buckets_per_block - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_never_zero() {
        assert_eq!(fingerprint_of(0), 1);
        assert_eq!(fingerprint_of(0xdead_0000), 1);
        assert_eq!(fingerprint_of(0xdead_beef), 0xbeef);
    }

    #[test]
    fn test_primary_index_in_range() {
        let mut rng = XorShift64::seeded(5);
        for _ in 0..1000 {
            let digest = rng.next_u64();
            let fp = fingerprint_of(digest);
            assert!(primary_index(digest, fp, 64, 64) < 64);
            assert!(primary_index(digest, fp, 64, 256) < 256);
        }
    }

    #[test]
    fn test_alt_index_is_involution() {
        let mut rng = XorShift64::seeded(17);
        for _ in 0..10_000 {
            let index = (rng.next_u64() % 1024) as usize;
            let fp = rng.next_u64() as Fingerprint;
            let alt = alt_index(index, fp, 1024);
            assert!(alt < 1024);
            assert_eq!(alt_index(alt, fp, 1024), index);
        }
    }

    #[test]
    fn test_candidate_pair_is_stable_across_doublings() {
        // The pair derived under a doubled capacity must be the old pair
        // shifted by the same block offset, so migrated fingerprints stay
        // on the query path.
        let mut rng = XorShift64::seeded(23);
        for _ in 0..1000 {
            let digest = rng.next_u64();
            let fp = fingerprint_of(digest);
            for (old, new) in [(64, 128), (128, 256), (256, 512)] {
                let i1 = primary_index(digest, fp, 64, old);
                let n1 = primary_index(digest, fp, 64, new);
                let offset = old * ((fp as usize / (old / 64)) & 1);
                assert_eq!(n1, i1 + offset);
                assert_eq!(
                    alt_index(n1, fp, 64),
                    alt_index(i1, fp, 64) + offset
                );
            }
        }
    }

    #[test]
    fn test_insert_then_contains() {
        let mut filter = BambooFilter::builder().seed(1).build().unwrap();
        assert_eq!(filter.insert("banana"), InsertOutcome::Inserted);
        assert!(filter.contains(&"banana"));
        assert_eq!(filter.size(), 1);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_overflow_leaves_filter_unchanged() {
        // Two one-slot buckets and a threshold that never triggers
        // expansion: the third distinct fingerprint must overflow.
        let mut filter = BambooFilter::builder()
            .initial_buckets(2)
            .slots_per_bucket(1)
            .load_threshold(1.0)
            .max_evictions(4)
            .segment_size(1)
            .seed(9)
            .build()
            .unwrap();

        let mut overflowed = false;
        for i in 0..100 {
            let key = format!("key{i}");
            let before = (filter.table.clone(), filter.size);
            if filter.insert(&key) == InsertOutcome::Overflow {
                assert_eq!(filter.table, before.0);
                assert_eq!(filter.size, before.1);
                assert!(!filter.contains(&&key));
                overflowed = true;
                break;
            }
        }
        assert!(overflowed, "a two-slot filter never overflowed");
    }

    #[test]
    fn test_eviction_walk_relocates_instead_of_dropping() {
        // One-slot buckets force every collision through the cuckoo walk.
        let mut filter = BambooFilter::builder()
            .initial_buckets(64)
            .slots_per_bucket(1)
            .load_threshold(1.0)
            .max_evictions(200)
            .segment_size(1)
            .seed(21)
            .build()
            .unwrap();

        let mut admitted = Vec::new();
        for i in 0..24 {
            let key = format!("sample-{i}");
            if filter.insert(&key).is_admitted() {
                admitted.push(key);
            }
        }

        for key in &admitted {
            assert!(filter.contains(key), "lost {key} after evictions");
        }
    }

    #[test]
    fn test_zero_evictions_still_places_in_free_slots() {
        let mut filter = BambooFilter::builder()
            .initial_buckets(16)
            .slots_per_bucket(4)
            .max_evictions(0)
            .seed(2)
            .build()
            .unwrap();

        assert_eq!(filter.insert("a"), InsertOutcome::Inserted);
        assert!(filter.contains(&"a"));
    }
}
