//! The sorted lookup index: token entries, binary search, row enumeration.
//!
//! An index is a sorted array of [`IndexEntry`] (token, start row, row count)
//! over one shared row stream, with a language-specific collator and a
//! ruleset-driven normalizer deciding the order. Lookups normalize the query,
//! binary-search the entries through the caching list, and wind back over
//! collator ties so the first matching entry is returned.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::{Seek, Write};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use icu_collator::CollatorBorrowed;
use log::warn;

use crate::engine::dictionary::{Dictionary, ListStore};
use crate::engine::row::{Row, RowData, RowKind, ROW_WIDTH};
use crate::storage::caching_list::{RandomAccess, DEFAULT_CACHE_SIZE};
use crate::storage::dict_file::SectionReader;
use crate::storage::mutf8::{read_bool, read_mutf8, write_bool, write_mutf8};
use crate::storage::raf_list::{self, RafList};
use crate::storage::uniform_list::{self, UniformList};
use crate::utils::language::Language;
use crate::utils::normalizer::Normalizer;
use crate::{DictError, Result};

/// One sorted index entry: a token and the run of rows it anchors.
///
/// The normalized form of the token is computed on first access and
/// memoized; that memo is the only mutable state in a read-opened
/// dictionary, so it uses once-init semantics and is safe under concurrent
/// reads.
#[derive(Debug)]
pub struct IndexEntry {
    pub token: String,
    pub start_row: u32,
    pub num_rows: u32,
    /// Ordinals of HTML entries indexed under this token.
    pub html_refs: Vec<u32>,
    normalized: OnceLock<String>,
}

impl IndexEntry {
    pub fn new<S: Into<String>>(token: S, start_row: u32, num_rows: u32) -> Result<Self> {
        let token = token.into();
        if token.is_empty() || token.trim() != token {
            return Err(DictError::invalid_parameter(format!(
                "index token must be non-empty and trimmed: {:?}",
                token
            )));
        }
        Ok(Self {
            token,
            start_row,
            num_rows,
            html_refs: Vec::new(),
            normalized: OnceLock::new(),
        })
    }

    pub fn with_html_refs(mut self, html_refs: Vec<u32>) -> Self {
        self.html_refs = html_refs;
        self
    }

    /// The memoized normalized form of the token.
    pub fn normalized_token(&self, normalizer: &Normalizer) -> &str {
        self.normalized
            .get_or_init(|| normalizer.normalize(&self.token))
    }

    fn from_reader(reader: &mut SectionReader, version: u32) -> Result<Self> {
        let token = read_mutf8(reader)?;
        let start_row = reader.read_i32::<BigEndian>()? as u32;
        let num_rows = reader.read_i32::<BigEndian>()? as u32;
        let normalized = OnceLock::new();
        let mut html_refs = Vec::new();
        if version >= 6 {
            // The flag is persisted only when normalization changes the
            // token; otherwise the token is its own normalized form.
            if read_bool(reader)? {
                let _ = normalized.set(read_mutf8(reader)?);
            } else {
                let _ = normalized.set(token.clone());
            }
            let refs = RafList::open(
                Arc::clone(reader.file()),
                reader.position(),
                version,
                Box::new(|r: &mut SectionReader, _| Ok(r.read_i32::<BigEndian>()? as u32)),
            )?;
            for i in 0..refs.len() {
                html_refs.push(*refs.get(i)?);
            }
            reader.set_position(refs.end_offset());
        }
        Ok(Self {
            token,
            start_row,
            num_rows,
            html_refs,
            normalized,
        })
    }

    fn write<W: Write + Seek>(
        &self,
        writer: &mut W,
        normalizer: &Normalizer,
        start_row: u32,
        num_rows: u32,
        html_refs: &[u32],
    ) -> Result<()> {
        write_mutf8(writer, &self.token)?;
        writer.write_i32::<BigEndian>(start_row as i32)?;
        writer.write_i32::<BigEndian>(num_rows as i32)?;
        let normalized = self.normalized_token(normalizer);
        let has_normalized = normalized != self.token;
        write_bool(writer, has_normalized)?;
        if has_normalized {
            write_mutf8(writer, normalized)?;
        }
        raf_list::write_items(writer, html_refs, |w, r, _| {
            w.write_i32::<BigEndian>(*r as i32)?;
            Ok(())
        })
    }
}

/// Result of a longest-prefix search.
#[derive(Debug)]
pub struct SearchResult {
    /// Insertion point of the original, unshortened query.
    pub insertion_point: Arc<IndexEntry>,
    /// Entry found for the longest matching prefix.
    pub longest_prefix: Arc<IndexEntry>,
    /// The prefix that matched (normalized form), empty when nothing did.
    pub longest_prefix_string: String,
    /// True only when the unmodified query matched as a prefix.
    pub success: bool,
}

/// A sorted lookup index over the dictionary's row stream.
pub struct Index {
    pub short_name: String,
    pub long_name: String,
    pub sort_language: &'static Language,
    pub normalizer_rules: String,
    pub swap_pair_entries: bool,
    pub main_token_count: u32,
    pub stoplist: BTreeSet<String>,
    /// ISO code exactly as persisted; written back verbatim.
    iso_code: String,
    sorted_entries: ListStore<IndexEntry>,
    rows: ListStore<Row>,
    normalizer: Normalizer,
    collator: CollatorBorrowed<'static>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("short_name", &self.short_name)
            .field("long_name", &self.long_name)
            .field("normalizer_rules", &self.normalizer_rules)
            .field("swap_pair_entries", &self.swap_pair_entries)
            .field("main_token_count", &self.main_token_count)
            .field("stoplist", &self.stoplist)
            .field("iso_code", &self.iso_code)
            .finish_non_exhaustive()
    }
}

impl Index {
    /// Creates an in-memory index for a dictionary under construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new<S: Into<String>, L: Into<String>>(
        short_name: S,
        long_name: L,
        iso_code: &str,
        normalizer_rules: &str,
        swap_pair_entries: bool,
        main_token_count: u32,
        stoplist: BTreeSet<String>,
        sorted_entries: Vec<IndexEntry>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let sort_language = Language::lookup(iso_code)
            .ok_or_else(|| DictError::unsupported_language(iso_code))?;
        let collator = sort_language.collator()?;
        let normalizer = Normalizer::from_rules(normalizer_rules)?;
        for entry in &sorted_entries {
            validate_entry_range(entry, &rows)?;
        }
        Ok(Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
            sort_language,
            normalizer_rules: normalizer_rules.to_string(),
            swap_pair_entries,
            main_token_count,
            stoplist,
            iso_code: iso_code.to_string(),
            sorted_entries: ListStore::from_vec(sorted_entries),
            rows: ListStore::from_vec(rows),
            normalizer,
            collator,
        })
    }

    pub(crate) fn from_reader(reader: &mut SectionReader, version: u32) -> Result<Self> {
        let short_name = read_mutf8(reader)?;
        let long_name = read_mutf8(reader)?;
        let iso_code = read_mutf8(reader)?;
        let normalizer_rules = read_mutf8(reader)?;
        let swap_pair_entries = read_bool(reader)?;
        let main_token_count = if version >= 2 {
            reader.read_i32::<BigEndian>()? as u32
        } else {
            0
        };
        let sort_language = Language::lookup(&iso_code)
            .ok_or_else(|| DictError::unsupported_language(&iso_code))?;
        let collator = sort_language.collator()?;
        let normalizer = Normalizer::from_rules(&normalizer_rules)?;

        let file = Arc::clone(reader.file());
        let entries = RafList::open(
            Arc::clone(&file),
            reader.position(),
            version,
            Box::new(IndexEntry::from_reader),
        )?;
        reader.set_position(entries.end_offset());

        let mut stoplist = BTreeSet::new();
        if version >= 4 {
            let blob_len = reader.read_i32::<BigEndian>()?;
            if blob_len < 0 {
                return Err(DictError::corrupt(format!(
                    "negative stoplist length: {}",
                    blob_len
                )));
            }
            let blob_end = reader.position() + blob_len as u64;
            if version >= 7 {
                let count = reader.read_i32::<BigEndian>()?;
                if count < 0 {
                    return Err(DictError::corrupt(format!(
                        "negative stoplist count: {}",
                        count
                    )));
                }
                for _ in 0..count {
                    stoplist.insert(read_mutf8(reader)?);
                }
            } else {
                // Legacy files embed a platform-serialized set here.
                warn!(
                    "index {}: skipping legacy stoplist blob ({} bytes)",
                    short_name, blob_len
                );
            }
            reader.set_position(blob_end);
        }

        let rows = UniformList::open(
            file,
            reader.position(),
            version,
            ROW_WIDTH,
            Box::new(|r: &mut SectionReader, v| Row::from_reader(r, v)),
        )?;
        reader.set_position(rows.end_offset());

        Ok(Self {
            short_name,
            long_name,
            sort_language,
            normalizer_rules,
            swap_pair_entries,
            main_token_count,
            stoplist,
            iso_code,
            sorted_entries: ListStore::caching(Box::new(entries), DEFAULT_CACHE_SIZE, false)?,
            rows: ListStore::caching(Box::new(rows), DEFAULT_CACHE_SIZE, false)?,
            normalizer,
            collator,
        })
    }

    pub(crate) fn write<W: Write + Seek>(&self, out: &mut W, skip_html: bool) -> Result<()> {
        write_mutf8(out, &self.short_name)?;
        write_mutf8(out, &self.long_name)?;
        write_mutf8(out, &self.iso_code)?;
        write_mutf8(out, &self.normalizer_rules)?;
        write_bool(out, self.swap_pair_entries)?;
        out.write_i32::<BigEndian>(self.main_token_count as i32)?;

        let pruned = if skip_html {
            Some(self.pruned_row_map()?)
        } else {
            None
        };

        raf_list::write_list(out, self.sorted_entries.as_list(), |w, e: &IndexEntry, _| {
            let (start_row, num_rows) = match &pruned {
                Some(map) => renumber(map, e)?,
                None => (e.start_row, e.num_rows),
            };
            let refs: &[u32] = if skip_html { &[] } else { &e.html_refs };
            e.write(w, &self.normalizer, start_row, num_rows, refs)
        })?;

        // Explicit stoplist block inside the legacy byte-length envelope.
        let mut payload = Vec::new();
        payload.write_i32::<BigEndian>(self.stoplist.len() as i32)?;
        for word in &self.stoplist {
            write_mutf8(&mut payload, word)?;
        }
        out.write_i32::<BigEndian>(payload.len() as i32)?;
        out.write_all(&payload)?;

        match &pruned {
            Some(map) => {
                let rows = self.rows.as_list();
                let mut kept = Vec::new();
                for i in 0..rows.len() {
                    if map[i] >= 0 {
                        kept.push(*rows.get(i)?);
                    }
                }
                let kept = ListStore::from_vec(kept);
                uniform_list::write_uniform(out, kept.as_list(), ROW_WIDTH, |w, r| r.to_writer(w))
            }
            None => {
                uniform_list::write_uniform(out, self.rows.as_list(), ROW_WIDTH, |w, r| {
                    r.to_writer(w)
                })
            }
        }
    }

    /// Dense renumbering of the row array with HTML rows elided:
    /// `map[i] == -1` if row `i` is pruned, else its new position.
    fn pruned_row_map(&self) -> Result<Vec<i32>> {
        let rows = self.rows.as_list();
        let mut map = Vec::with_capacity(rows.len());
        let mut kept = 0i32;
        for i in 0..rows.len() {
            if rows.get(i)?.kind == RowKind::Html {
                map.push(-1);
            } else {
                map.push(kept);
                kept += 1;
            }
        }
        Ok(map)
    }

    pub fn sorted_entries(&self) -> &dyn RandomAccess<IndexEntry> {
        self.sorted_entries.as_list()
    }

    pub fn rows(&self) -> &dyn RandomAccess<Row> {
        self.rows.as_list()
    }

    pub fn row(&self, index: usize) -> Result<Row> {
        Ok(*self.rows.get(index)?)
    }

    /// The rows anchored by `entry`: `[start_row, start_row + num_rows)`.
    pub fn entry_rows(&self, entry: &IndexEntry) -> Result<Vec<Row>> {
        let start = entry.start_row as usize;
        let end = start + entry.num_rows as usize;
        if end > self.rows.len() {
            return Err(DictError::corrupt(format!(
                "row range {}..{} outside row array of {}",
                start,
                end,
                self.rows.len()
            )));
        }
        let mut rows = Vec::with_capacity(entry.num_rows as usize);
        for i in start..end {
            rows.push(*self.rows.get(i)?);
        }
        Ok(rows)
    }

    /// Resolves a row to its typed entry through the owning dictionary.
    pub fn resolve_row(&self, row: Row, dict: &Dictionary) -> Result<RowData> {
        Ok(match row.kind {
            RowKind::Pair => RowData::Pair(dict.pair(row.reference)?),
            RowKind::Text => RowData::Text(dict.text(row.reference)?),
            RowKind::Html => RowData::Html(dict.html(row.reference)?),
            RowKind::TokenMain => RowData::Token {
                entry: self.sorted_entries.get(row.reference as usize)?,
                has_main_entry: true,
            },
            RowKind::Token => RowData::Token {
                entry: self.sorted_entries.get(row.reference as usize)?,
                has_main_entry: false,
            },
        })
    }

    /// Applies this index's normalizer to `text`.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Finds the insertion point for `query`.
    ///
    /// Returns the first entry whose normalized token compares equal under
    /// the index collator, or, when nothing matches, the nearest existing
    /// entry (callers that care about direction must compare the query
    /// against the returned normalized token themselves). Returns `None`
    /// when the search is cancelled through `interrupted` or the index is
    /// empty. The flag is checked before any list access on every
    /// binary-search step, so a cancelled search has no side effects.
    pub fn find_insertion_point(
        &self,
        query: &str,
        interrupted: &AtomicBool,
    ) -> Result<Option<Arc<IndexEntry>>> {
        let normalized = self.normalizer.normalize(query);
        self.find_normalized(&normalized, interrupted)
    }

    fn find_normalized(
        &self,
        token: &str,
        interrupted: &AtomicBool,
    ) -> Result<Option<Arc<IndexEntry>>> {
        let entries = self.sorted_entries.as_list();
        let size = entries.len();
        if size == 0 {
            return Ok(None);
        }

        let mut start = 0usize;
        let mut end = size;
        while start < end {
            let mid = (start + end) / 2;
            if interrupted.load(AtomicOrdering::Acquire) {
                return Ok(None);
            }
            let mid_entry = entries.get(mid)?;
            match self
                .collator
                .compare(token, mid_entry.normalized_token(&self.normalizer))
            {
                Ordering::Equal => {
                    let first = self.wind_back(token, mid, interrupted)?;
                    return Ok(Some(entries.get(first)?));
                }
                Ordering::Less => end = mid,
                Ordering::Greater => start = mid + 1,
            }
        }

        // No equal entry: clamp to the nearest existing one and wind back
        // over its own normalized form.
        let nearest = start.min(size - 1);
        let entry = entries.get(nearest)?;
        let normalized = entry.normalized_token(&self.normalizer).to_owned();
        let first = self.wind_back(&normalized, nearest, interrupted)?;
        Ok(Some(entries.get(first)?))
    }

    /// Moves `position` to the first of the entries whose normalized token
    /// equals `token`.
    fn wind_back(
        &self,
        token: &str,
        mut position: usize,
        interrupted: &AtomicBool,
    ) -> Result<usize> {
        let entries = self.sorted_entries.as_list();
        while position > 0 {
            let prev = entries.get(position - 1)?;
            if prev.normalized_token(&self.normalizer) != token {
                break;
            }
            position -= 1;
            if interrupted.load(AtomicOrdering::Acquire) {
                return Ok(position);
            }
        }
        Ok(position)
    }

    /// Repeatedly shortens `query` from the right until some prefix of it
    /// finds an entry that actually starts with that prefix.
    ///
    /// The insertion point of the original query is preserved across
    /// iterations. Returns `None` when cancelled before any result was
    /// obtained, or when the index is empty.
    pub fn find_longest_prefix(
        &self,
        query: &str,
        interrupted: &AtomicBool,
    ) -> Result<Option<SearchResult>> {
        let mut token = self.normalizer.normalize(query);
        let entries = self.sorted_entries.as_list();
        if entries.is_empty() {
            return Ok(None);
        }
        if token.is_empty() {
            let first = entries.get(0)?;
            return Ok(Some(SearchResult {
                insertion_point: Arc::clone(&first),
                longest_prefix: first,
                longest_prefix_string: String::new(),
                success: true,
            }));
        }

        let mut insertion_point: Option<Arc<IndexEntry>> = None;
        let mut unmodified = true;
        while !interrupted.load(AtomicOrdering::Acquire) && !token.is_empty() {
            let result = match self.find_normalized(&token, interrupted)? {
                Some(entry) => entry,
                None => return Ok(None),
            };
            if insertion_point.is_none() {
                insertion_point = Some(Arc::clone(&result));
            }
            if result
                .normalized_token(&self.normalizer)
                .starts_with(token.as_str())
            {
                let insertion_point =
                    insertion_point.unwrap_or_else(|| Arc::clone(&result));
                return Ok(Some(SearchResult {
                    insertion_point,
                    longest_prefix: result,
                    longest_prefix_string: token,
                    success: unmodified,
                }));
            }
            unmodified = false;
            token.pop();
        }
        match insertion_point {
            Some(insertion_point) => Ok(Some(SearchResult {
                insertion_point,
                longest_prefix: entries.get(0)?,
                longest_prefix_string: String::new(),
                success: false,
            })),
            None => Ok(None),
        }
    }
}

fn validate_entry_range(entry: &IndexEntry, rows: &[Row]) -> Result<()> {
    let start = entry.start_row as usize;
    let end = start + entry.num_rows as usize;
    if start >= rows.len() || end > rows.len() {
        return Err(DictError::invalid_parameter(format!(
            "entry {:?} spans rows {}..{} outside row array of {}",
            entry.token,
            start,
            end,
            rows.len()
        )));
    }
    if !rows[start].kind.is_token() {
        return Err(DictError::invalid_parameter(format!(
            "entry {:?} does not start at a token row",
            entry.token
        )));
    }
    Ok(())
}

/// Rewrites an entry's row range through the pruning map. The start row is a
/// token row and thus never pruned.
fn renumber(map: &[i32], entry: &IndexEntry) -> Result<(u32, u32)> {
    let start = entry.start_row as usize;
    let new_start = map
        .get(start)
        .copied()
        .ok_or_else(|| DictError::corrupt("entry start row outside row array"))?;
    if new_start < 0 {
        return Err(DictError::corrupt(format!(
            "entry {:?} starts at a pruned row",
            entry.token
        )));
    }
    let mut num_rows = 1u32;
    for i in 1..entry.num_rows as usize {
        if map.get(start + i).copied().unwrap_or(-1) >= 0 {
            num_rows += 1;
        }
    }
    Ok((new_start as u32, num_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_index(rules: &str, tokens: &[(&str, u32, u32)], rows: Vec<Row>) -> Index {
        let entries = tokens
            .iter()
            .map(|(t, start, num)| IndexEntry::new(*t, *start, *num).expect("entry"))
            .collect();
        Index::new(
            "EN",
            "English",
            "EN",
            rules,
            false,
            tokens.len() as u32,
            BTreeSet::new(),
            entries,
            rows,
        )
        .expect("index")
    }

    /// Apple/banana/Cherry, sorted case-insensitively, one pair row each.
    fn fruit_index() -> Index {
        simple_index(
            ":: Lower ;",
            &[("Apple", 0, 2), ("banana", 2, 2), ("Cherry", 4, 2)],
            vec![
                Row::new(RowKind::TokenMain, 0),
                Row::new(RowKind::Pair, 0),
                Row::new(RowKind::TokenMain, 1),
                Row::new(RowKind::Pair, 1),
                Row::new(RowKind::TokenMain, 2),
                Row::new(RowKind::Pair, 2),
            ],
        )
    }

    fn not_interrupted() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn find_is_case_insensitive_under_lower_rules() {
        let index = fruit_index();
        let flag = not_interrupted();
        let hit = index
            .find_insertion_point("apple", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Apple");
        assert_eq!(hit.start_row, 0);
        let hit = index
            .find_insertion_point("APPLE", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Apple");
    }

    #[test]
    fn find_exact_middle_and_last() {
        let index = fruit_index();
        let flag = not_interrupted();
        let hit = index
            .find_insertion_point("Banana", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "banana");
        assert_eq!(hit.start_row, 2);
        let hit = index
            .find_insertion_point("cherry", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Cherry");
    }

    #[test]
    fn collator_ties_wind_back_to_first_entry() {
        // All three tokens normalize to "cafe"; the first by input order
        // must be returned.
        let index = simple_index(
            ":: NFD ; :: [:Mn:] Remove ; :: Lower ;",
            &[("café", 0, 1), ("cafe", 1, 1), ("Café", 2, 1)],
            vec![
                Row::new(RowKind::TokenMain, 0),
                Row::new(RowKind::TokenMain, 1),
                Row::new(RowKind::TokenMain, 2),
            ],
        );
        let flag = not_interrupted();
        let hit = index
            .find_insertion_point("Cafe", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "café");
        assert_eq!(hit.start_row, 0);
    }

    #[test]
    fn miss_clamps_to_nearest_entry() {
        let index = fruit_index();
        let flag = not_interrupted();
        // Past the end: nearest existing entry is the last one.
        let hit = index
            .find_insertion_point("zzz", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Cherry");
        // Before the start: first entry.
        let hit = index
            .find_insertion_point("aardvark", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Apple");
    }

    #[test]
    fn prefix_monotonicity() {
        let index = fruit_index();
        let flag = not_interrupted();
        let short = index
            .find_insertion_point("ap", &flag)
            .expect("find")
            .expect("entry");
        let long = index
            .find_insertion_point("apple", &flag)
            .expect("find")
            .expect("entry");
        assert!(short.start_row <= long.start_row);
    }

    #[test]
    fn longest_prefix_success_on_unmodified_query() {
        let index = fruit_index();
        let flag = not_interrupted();
        let result = index
            .find_longest_prefix("app", &flag)
            .expect("search")
            .expect("result");
        assert!(result.success);
        assert_eq!(result.longest_prefix.token, "Apple");
        assert_eq!(result.longest_prefix_string, "app");
        assert_eq!(result.insertion_point.token, "Apple");
    }

    #[test]
    fn longest_prefix_shortens_from_the_right() {
        let index = fruit_index();
        let flag = not_interrupted();
        let result = index
            .find_longest_prefix("applesauce", &flag)
            .expect("search")
            .expect("result");
        assert!(!result.success);
        assert_eq!(result.longest_prefix.token, "Apple");
        assert_eq!(result.longest_prefix_string, "apple");
        // Insertion point of the original query is preserved.
        assert_eq!(result.insertion_point.token, "banana");
    }

    #[test]
    fn longest_prefix_total_miss() {
        let index = fruit_index();
        let flag = not_interrupted();
        let result = index
            .find_longest_prefix("zzz", &flag)
            .expect("search")
            .expect("result");
        assert!(!result.success);
        assert_eq!(result.longest_prefix.token, "Apple");
        assert_eq!(result.longest_prefix_string, "");
        assert_eq!(result.insertion_point.token, "Cherry");
    }

    #[test]
    fn cancelled_search_returns_none() {
        let index = fruit_index();
        let flag = AtomicBool::new(true);
        assert!(index
            .find_insertion_point("apple", &flag)
            .expect("find")
            .is_none());
        assert!(index
            .find_longest_prefix("apple", &flag)
            .expect("search")
            .is_none());
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = simple_index(":: Lower ;", &[], Vec::new());
        let flag = not_interrupted();
        assert!(index
            .find_insertion_point("anything", &flag)
            .expect("find")
            .is_none());
    }

    #[test]
    fn entry_rows_are_range_checked() {
        let index = fruit_index();
        let entry = index.sorted_entries().get(2).expect("entry");
        let rows = index.entry_rows(&entry).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::TokenMain);
        assert_eq!(rows[1].kind, RowKind::Pair);

        let bogus = IndexEntry::new("Cherry", 4, 40).expect("entry");
        assert!(index.entry_rows(&bogus).is_err());
    }

    #[test]
    fn normalized_token_is_memoized() {
        let index = fruit_index();
        let entry = index.sorted_entries().get(0).expect("entry");
        let normalizer = Normalizer::from_rules(":: Lower ;").expect("rules");
        let first = entry.normalized_token(&normalizer) as *const str;
        let second = entry.normalized_token(&normalizer) as *const str;
        assert_eq!(first, second);
        assert_eq!(entry.normalized_token(&normalizer), "apple");
    }

    #[test]
    fn unknown_sort_language_is_rejected() {
        let err = Index::new(
            "XX",
            "Unknown",
            "XX",
            ":: Lower ;",
            false,
            0,
            BTreeSet::new(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DictError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn entries_must_anchor_on_token_rows() {
        let err = Index::new(
            "EN",
            "English",
            "EN",
            ":: Lower ;",
            false,
            1,
            BTreeSet::new(),
            vec![IndexEntry::new("dog", 0, 1).expect("entry")],
            vec![Row::new(RowKind::Pair, 0)],
        )
        .unwrap_err();
        assert!(matches!(err, DictError::InvalidParameter { .. }));
    }

    #[test]
    fn tokens_must_be_trimmed_and_non_empty() {
        assert!(IndexEntry::new("", 0, 1).is_err());
        assert!(IndexEntry::new(" dog", 0, 1).is_err());
        assert!(IndexEntry::new("dog ", 0, 1).is_err());
        assert!(IndexEntry::new("dog", 0, 1).is_ok());
    }
}
