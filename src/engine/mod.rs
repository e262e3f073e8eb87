// Dictionary semantics
//
// This module implements the dictionary container on top of the storage
// primitives: the versioned file framing, the entry and row kinds with their
// wire codecs, the sorted lookup index, and the metadata views.

pub mod dictionary;
pub mod entry;
pub mod index;
pub mod info;
pub mod row;

pub use dictionary::{Dictionary, CURRENT_VERSION, END_OF_DICTIONARY};
pub use entry::{EntrySource, HtmlBody, HtmlEntry, HtmlRef, Pair, PairEntry, TextEntry};
pub use index::{Index, IndexEntry, SearchResult};
pub use info::{DictionaryInfo, IndexInfo};
pub use row::{Row, RowData, RowKind, ROW_WIDTH};
