//! # dictfile - random-access bilingual dictionary storage
//!
//! This crate implements the on-disk storage engine for bilingual dictionary
//! files: a versioned, self-describing container that persists a
//! heterogeneous row stream alongside one or more sorted lookup indices, and
//! supports binary search over Unicode-normalized keys without loading the
//! whole dictionary into memory.
//!
//! ## Features
//!
//! - **Demand-paged reads**: every list in the file is an addressable list
//!   with an offset table, so arbitrary entries decode by offset
//! - **Sorted lookup indices**: culture-aware collation (ICU4X) with a
//!   ruleset-driven normalizer and lazy, memoized normalized tokens
//! - **Bounded caching**: decoded elements sit behind per-list LRU caches
//! - **Versioned format**: versions 1-7 are readable; versions 6 and 7 have
//!   writers, including HTML pruning for the legacy layout
//! - **Cooperative cancellation**: searches take an interrupt flag and bail
//!   out between binary-search steps
//!
//! ## Quick Start
//!
//! ### Looking up a word
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use dictfile::Dictionary;
//!
//! # fn main() -> dictfile::Result<()> {
//! let dict = Dictionary::open("de-en.dict")?;
//! let index = &dict.indices()[0];
//!
//! let interrupted = AtomicBool::new(false);
//! if let Some(entry) = index.find_insertion_point("Hund", &interrupted)? {
//!     for row in index.entry_rows(&entry)? {
//!         let data = index.resolve_row(row, &dict)?;
//!         println!("{:?}", data);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a dictionary
//!
//! ```no_run
//! use dictfile::{Dictionary, EntrySource, Index, IndexEntry, Pair, PairEntry, Row, RowKind};
//! use std::collections::BTreeSet;
//! use std::fs::OpenOptions;
//!
//! # fn main() -> dictfile::Result<()> {
//! let mut dict = Dictionary::new("example dictionary");
//! let source = dict.add_source(EntrySource::new("handmade", 1));
//! let pair = dict.add_pair(PairEntry::new(source, vec![Pair::new("dog", "Hund")]))?;
//!
//! let index = Index::new(
//!     "EN", "English", "EN", ":: Lower ;", false, 1, BTreeSet::new(),
//!     vec![IndexEntry::new("dog", 0, 2)?],
//!     vec![Row::new(RowKind::TokenMain, 0), Row::new(RowKind::Pair, pair)],
//! )?;
//! dict.add_index(index);
//!
//! let mut out = OpenOptions::new().create(true).write(true).open("en-de.dict")?;
//! dict.write(&mut out)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`storage`]: the persistence primitives - shared file handle, wire
//!   codecs, addressable lists, and the caching decorator
//! - [`engine`]: the dictionary container, entry and row kinds, and the
//!   sorted lookup index
//! - [`utils`]: the known-language table with its collators, the ruleset
//!   normalizer, and gzip helpers
//!
//! ## Error Handling
//!
//! All fallible operations return a [`Result<T>`], with errors represented
//! by [`DictError`]. The crate uses the `snafu` library for ergonomic error
//! handling with context and backtraces. Cancelled searches are not errors;
//! they return a distinguished `None`.

pub mod engine;
pub mod error;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use engine::dictionary::{Dictionary, CURRENT_VERSION, END_OF_DICTIONARY};
pub use engine::entry::{EntrySource, HtmlBody, HtmlEntry, HtmlRef, Pair, PairEntry, TextEntry};
pub use engine::index::{Index, IndexEntry, SearchResult};
pub use engine::info::{DictionaryInfo, IndexInfo};
pub use engine::row::{Row, RowData, RowKind, ROW_WIDTH};
pub use storage::caching_list::{CachingList, RandomAccess, VecList};
pub use utils::language::Language;
pub use utils::normalizer::Normalizer;

// Re-export error types for convenience
pub use error::{snafu, DictError, Result};
