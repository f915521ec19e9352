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

//! Bamboo filter implementation for probabilistic set membership testing.
//!
//! A Bamboo filter stores 16-bit fingerprints in buckets addressed by
//! cuckoo hashing: every key has two candidate buckets, and a full bucket
//! is handled by displacing an occupant to its alternate. When occupancy
//! passes a load threshold the filter allocates a doubled table and each
//! subsequent insert drains a short segment of old buckets into it, so
//! growth never stops the world. Queries consult both tables during the
//! migration window.
//!
//! # Usage
//!
//! ```rust
//! use bamboofilter::bamboo::BambooFilter;
//!
//! let mut filter = BambooFilter::builder()
//!     .initial_buckets(1024)
//!     .slots_per_bucket(4)
//!     .build()
//!     .unwrap();
//!
//! filter.insert("apple");
//! filter.insert(b"GATTACA".as_slice());
//!
//! assert!(filter.contains(&"apple"));
//! assert!(!filter.contains(&"grape"));
//! ```
//!
//! # Notes
//!
//! - Queries have no false negatives for admitted keys; false positives
//!   occur at the fingerprint collision rate.
//! - The filter is insert-only and single-writer.

mod bucket_table;
mod builder;
mod sketch;

pub use self::builder::BambooFilterBuilder;
pub use self::sketch::BambooFilter;
pub use self::sketch::InsertOutcome;
