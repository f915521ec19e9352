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

use std::mem;

use crate::common::RandomSource;

/// A 16-bit non-zero tag stored in place of the key it was derived from.
pub(super) type Fingerprint = u16;

/// An ordered run of buckets, each an unordered multiset of fingerprints
/// bounded by the slot count.
///
/// `try_put` is the only operation that grows a bucket, and it enforces
/// the slot bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BucketTable {
    buckets: Vec<Vec<Fingerprint>>,
    slots_per_bucket: usize,
}

impl BucketTable {
    pub fn new(num_buckets: usize, slots_per_bucket: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); num_buckets],
            slots_per_bucket,
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn slots_per_bucket(&self) -> usize {
        self.slots_per_bucket
    }

    /// Linear scan of bucket `index` for `fp`.
    pub fn has(&self, index: usize, fp: Fingerprint) -> bool {
        self.buckets[index].contains(&fp)
    }

    /// Appends `fp` to bucket `index` if a slot is free.
    pub fn try_put(&mut self, index: usize, fp: Fingerprint) -> bool {
        let bucket = &mut self.buckets[index];
        if bucket.len() < self.slots_per_bucket {
            bucket.push(fp);
            true
        } else {
            false
        }
    }

    /// Swaps `fp` with a uniformly random occupied slot of bucket `index`.
    ///
    /// Returns the displaced fingerprint together with the slot it came
    /// from, so a failed eviction walk can be undone with [`swap_at`].
    ///
    /// [`swap_at`]: Self::swap_at
    pub fn swap_random<R: RandomSource>(
        &mut self,
        index: usize,
        fp: Fingerprint,
        rng: &mut R,
    ) -> (Fingerprint, usize) {
        let bucket = &mut self.buckets[index];
        debug_assert!(!bucket.is_empty(), "cannot evict from an empty bucket");
        let slot = rng.next_index(bucket.len());
        (mem::replace(&mut bucket[slot], fp), slot)
    }

    /// Swaps `fp` into a specific slot, returning the previous occupant.
    pub fn swap_at(&mut self, index: usize, slot: usize, fp: Fingerprint) -> Fingerprint {
        mem::replace(&mut self.buckets[index][slot], fp)
    }

    /// Removes and returns the contents of bucket `index`, leaving it empty.
    pub fn take_bucket(&mut self, index: usize) -> Vec<Fingerprint> {
        mem::take(&mut self.buckets[index])
    }

    /// Approximate heap footprint of the table in bytes.
    pub fn heap_size(&self) -> usize {
        let mut total = self.buckets.capacity() * mem::size_of::<Vec<Fingerprint>>();
        for bucket in &self.buckets {
            total += bucket.capacity() * mem::size_of::<Fingerprint>();
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::XorShift64;

    #[test]
    fn test_try_put_enforces_slot_bound() {
        let mut table = BucketTable::new(4, 2);
        assert!(table.try_put(1, 10));
        assert!(table.try_put(1, 11));
        assert!(!table.try_put(1, 12));
        assert!(table.has(1, 10));
        assert!(table.has(1, 11));
        assert!(!table.has(1, 12));
    }

    #[test]
    fn test_duplicate_fingerprints_allowed() {
        let mut table = BucketTable::new(2, 4);
        assert!(table.try_put(0, 7));
        assert!(table.try_put(0, 7));
        assert!(table.has(0, 7));
    }

    #[test]
    fn test_swap_random_displaces_one_occupant() {
        let mut table = BucketTable::new(2, 2);
        table.try_put(0, 1);
        table.try_put(0, 2);

        let mut rng = XorShift64::seeded(3);
        let (displaced, slot) = table.swap_random(0, 9, &mut rng);
        assert!(displaced == 1 || displaced == 2);
        assert!(slot < 2);
        assert!(table.has(0, 9));

        // Undo restores the original occupants.
        let restored = table.swap_at(0, slot, displaced);
        assert_eq!(restored, 9);
        assert!(table.has(0, 1));
        assert!(table.has(0, 2));
    }

    #[test]
    fn test_take_bucket_empties_it() {
        let mut table = BucketTable::new(2, 4);
        table.try_put(1, 5);
        table.try_put(1, 6);

        let drained = table.take_bucket(1);
        assert_eq!(drained.len(), 2);
        assert!(!table.has(1, 5));
        assert!(table.try_put(1, 8));
    }
}
