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

use crate::bamboo::sketch::BambooFilter;
use crate::common::XorShift64;
use crate::error::Error;
use crate::error::ErrorKind;

const DEFAULT_INITIAL_BUCKETS: usize = 1024;
const DEFAULT_SLOTS_PER_BUCKET: usize = 4;
const DEFAULT_LOAD_THRESHOLD: f64 = 0.95;
const DEFAULT_MAX_EVICTIONS: usize = 500;
const DEFAULT_SEGMENT_SIZE: usize = 8;

/// Builder for creating [`BambooFilter`] instances.
///
/// All parameters have working defaults; `build` validates the combination
/// and fails rather than constructing a filter that cannot keep its
/// guarantees.
///
/// # Examples
///
/// ```
/// use bamboofilter::bamboo::BambooFilter;
///
/// let filter = BambooFilter::builder()
///     .initial_buckets(64)
///     .slots_per_bucket(4)
///     .load_threshold(0.9)
///     .max_evictions(500)
///     .segment_size(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(filter.capacity(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct BambooFilterBuilder {
    initial_buckets: usize,
    slots_per_bucket: usize,
    load_threshold: f64,
    max_evictions: usize,
    segment_size: usize,
    seed: Option<u64>,
}

impl Default for BambooFilterBuilder {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
            slots_per_bucket: DEFAULT_SLOTS_PER_BUCKET,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            max_evictions: DEFAULT_MAX_EVICTIONS,
            segment_size: DEFAULT_SEGMENT_SIZE,
            seed: None,
        }
    }
}

impl BambooFilterBuilder {
    /// Sets the initial number of buckets.
    ///
    /// Must be a power of two: the alternate-index mapping is only an
    /// involution for power-of-two table sizes, and expansion doubles the
    /// count, which preserves the property.
    pub fn initial_buckets(mut self, initial_buckets: usize) -> Self {
        self.initial_buckets = initial_buckets;
        self
    }

    /// Sets how many fingerprints each bucket can hold (default 4).
    pub fn slots_per_bucket(mut self, slots_per_bucket: usize) -> Self {
        self.slots_per_bucket = slots_per_bucket;
        self
    }

    /// Sets the load factor, in `(0, 1]`, past which the filter starts
    /// expanding (default 0.95).
    pub fn load_threshold(mut self, load_threshold: f64) -> Self {
        self.load_threshold = load_threshold;
        self
    }

    /// Sets how many victims a single placement may displace before giving
    /// up (default 500). Zero disables eviction entirely.
    pub fn max_evictions(mut self, max_evictions: usize) -> Self {
        self.max_evictions = max_evictions;
        self
    }

    /// Sets how many old-table buckets each insert drains while an
    /// expansion is in progress (default 8).
    pub fn segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    /// Seeds the eviction random source for reproducible runs.
    ///
    /// Without a seed the source is seeded from wall clock and process id,
    /// so victim choices differ across runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use bamboofilter::bamboo::BambooFilter;
    ///
    /// let filter = BambooFilter::builder().seed(42).build().unwrap();
    /// assert!(filter.is_empty());
    /// ```
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] if the bucket count is zero or
    /// not a power of two, the slot count is zero, the load threshold is
    /// outside `(0, 1]`, or the segment size is zero or larger than the
    /// bucket count.
    pub fn build(self) -> Result<BambooFilter, Error> {
        if self.initial_buckets == 0 || !self.initial_buckets.is_power_of_two() {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "bucket count must be a power of two")
                    .with_context("initial_buckets", self.initial_buckets),
            );
        }
        if self.slots_per_bucket == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "buckets must hold at least one slot",
            ));
        }
        if !(self.load_threshold > 0.0 && self.load_threshold <= 1.0) {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "load threshold must be in (0, 1]")
                    .with_context("load_threshold", self.load_threshold),
            );
        }
        if self.segment_size == 0 || self.segment_size > self.initial_buckets {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "segment size must be in 1..=initial_buckets",
            )
            .with_context("segment_size", self.segment_size)
            .with_context("initial_buckets", self.initial_buckets));
        }

        let rng = match self.seed {
            Some(seed) => XorShift64::seeded(seed),
            None => XorShift64::default(),
        };

        Ok(BambooFilter::with_config(
            self.initial_buckets,
            self.slots_per_bucket,
            self.load_threshold,
            self.max_evictions,
            self.segment_size,
            rng,
        ))
    }
}
