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

//! Bamboo filter: approximate set membership with smooth expansion.
//!
//! A Bamboo filter answers "have I seen this key?" with no false negatives
//! and a small, tunable false positive rate. It stores 16-bit fingerprints
//! in a table of fixed-capacity buckets, places them with cuckoo hashing,
//! and grows by migrating a few buckets at a time into a doubled table as
//! occupancy rises, so no single insert pays for a full rebuild.
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
//!
//! assert!(filter.contains(&"apple"));
//! assert!(!filter.contains(&"grape"));
//! ```

pub mod bamboo;
pub mod common;
pub mod error;
pub mod hash;
