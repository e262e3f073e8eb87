//! The top-level dictionary container.
//!
//! A dictionary file is a versioned header followed by addressable lists for
//! the entry stores and the indices, terminated by a known sentinel string.
//! Opening parses the header, pins each list to its absolute offset, and
//! seeks past it; entries are decoded on demand through per-list caches so
//! arbitrary lookups never load the whole file.
//!
//! File layout (current version):
//!
//! ```text
//! i32 version
//! i64 creation_millis
//! MUTF8 dict_info
//! AddressableList<EntrySource>   sources
//! AddressableList<PairEntry>     pairs        (cached, LRU)
//! AddressableList<TextEntry>     texts        (cached, LRU, eager)
//! AddressableList<HtmlEntry>     html titles  (cached, LRU; v5+)
//! AddressableList<HtmlBody>      html bodies  (v7+)
//! AddressableList<Index>         indices      (fully materialized)
//! MUTF8 "END OF DICTIONARY"
//! ```

use std::io::{Seek, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};

use crate::engine::entry::{EntrySource, HtmlBody, HtmlEntry, HtmlRef, PairEntry, TextEntry};
use crate::engine::index::Index;
use crate::engine::info::DictionaryInfo;
use crate::engine::row::RowData;
use crate::storage::caching_list::{CachingList, RandomAccess, VecList, DEFAULT_CACHE_SIZE};
use crate::storage::dict_file::{DictFile, SectionReader};
use crate::storage::mutf8::{read_mutf8, write_mutf8};
use crate::storage::raf_list::{self, RafList};
use crate::{DictError, Result};

/// Current file format version.
pub const CURRENT_VERSION: u32 = 7;

/// The file's last MUTF-8 value; anything else means corruption.
pub const END_OF_DICTIONARY: &str = "END OF DICTIONARY";

/// Entry storage behind one access surface: an in-memory list for
/// dictionaries under construction, or a cached file-backed list for opened
/// ones.
pub(crate) enum ListStore<T> {
    Mem(VecList<T>),
    File(CachingList<T>),
}

impl<T: Send + Sync> ListStore<T> {
    pub fn new_mem() -> Self {
        ListStore::Mem(VecList::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        ListStore::Mem(VecList::from_vec(items))
    }

    pub fn caching(
        inner: Box<dyn RandomAccess<T>>,
        capacity: usize,
        eager: bool,
    ) -> Result<Self> {
        Ok(ListStore::File(CachingList::new(inner, capacity, eager)?))
    }

    pub fn as_list(&self) -> &dyn RandomAccess<T> {
        match self {
            ListStore::Mem(list) => list,
            ListStore::File(list) => list,
        }
    }

    pub fn len(&self) -> usize {
        self.as_list().len()
    }

    pub fn get(&self, index: usize) -> Result<Arc<T>> {
        self.as_list().get(index)
    }

    fn push(&mut self, value: T) -> Result<usize> {
        match self {
            ListStore::Mem(list) => Ok(list.push(value)),
            ListStore::File(_) => Err(DictError::invalid_parameter(
                "opened dictionaries are read-only",
            )),
        }
    }
}

/// A dictionary: entry stores plus one or more sorted lookup indices.
///
/// Written once, then read-only. An opened dictionary may be shared across
/// threads for reads; every mutable surface (caches, normalization memos,
/// the file cursor) is internally guarded.
pub struct Dictionary {
    file: Option<Arc<DictFile>>,
    version: u32,
    creation_millis: i64,
    dict_info: String,
    sources: Vec<EntrySource>,
    pairs: ListStore<PairEntry>,
    texts: ListStore<TextEntry>,
    html_entries: ListStore<HtmlEntry>,
    html_bodies: Option<ListStore<HtmlBody>>,
    indices: Vec<Arc<Index>>,
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("version", &self.version)
            .field("creation_millis", &self.creation_millis)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl Dictionary {
    /// Creates an empty in-memory dictionary meant for writing.
    pub fn new<S: Into<String>>(dict_info: S) -> Self {
        let creation_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self {
            file: None,
            version: CURRENT_VERSION,
            creation_millis,
            dict_info: dict_info.into(),
            sources: Vec::new(),
            pairs: ListStore::new_mem(),
            texts: ListStore::new_mem(),
            html_entries: ListStore::new_mem(),
            html_bodies: None,
            indices: Vec::new(),
        }
    }

    /// Opens a dictionary file read-only.
    ///
    /// Parses the header, constructs each list by offset, seeks past it, and
    /// verifies the terminator. On any error nothing of the partially built
    /// dictionary is observable.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = DictFile::open(path)?;
        let mut reader = SectionReader::new(Arc::clone(&file), 0);

        let version = reader.read_i32::<BigEndian>()?;
        if version < 0 || version > CURRENT_VERSION as i32 {
            return Err(DictError::unsupported_version(version));
        }
        let version = version as u32;
        let creation_millis = reader.read_i64::<BigEndian>()?;
        let dict_info = read_mutf8(&mut reader)?;

        // Sources are few and consulted by ordinal constantly; materialize
        // them, then seek past.
        let source_list = RafList::open(
            Arc::clone(&file),
            reader.position(),
            version,
            Box::new(|r: &mut SectionReader, v| EntrySource::from_reader(r, v)),
        )?;
        let mut sources = Vec::with_capacity(source_list.len());
        for i in 0..source_list.len() {
            sources.push((*source_list.get(i)?).clone());
        }
        reader.set_position(source_list.end_offset());

        debug!("pairs start: {}", reader.position());
        let pair_list = RafList::open(
            Arc::clone(&file),
            reader.position(),
            version,
            Box::new(|r: &mut SectionReader, v| PairEntry::from_reader(r, v)),
        )?;
        reader.set_position(pair_list.end_offset());
        let pairs = ListStore::caching(Box::new(pair_list), DEFAULT_CACHE_SIZE, false)?;

        debug!("texts start: {}", reader.position());
        let text_list = RafList::open(
            Arc::clone(&file),
            reader.position(),
            version,
            Box::new(|r: &mut SectionReader, v| TextEntry::from_reader(r, v)),
        )?;
        reader.set_position(text_list.end_offset());
        let texts = ListStore::caching(Box::new(text_list), DEFAULT_CACHE_SIZE, true)?;

        let html_entries = if version >= 5 {
            debug!("html titles start: {}", reader.position());
            let list = RafList::open(
                Arc::clone(&file),
                reader.position(),
                version,
                Box::new(|r: &mut SectionReader, v| HtmlEntry::from_reader(r, v)),
            )?;
            reader.set_position(list.end_offset());
            ListStore::caching(Box::new(list), DEFAULT_CACHE_SIZE, false)?
        } else {
            ListStore::new_mem()
        };

        let html_bodies = if version >= 7 {
            debug!("html bodies start: {}", reader.position());
            let list = RafList::open(
                Arc::clone(&file),
                reader.position(),
                version,
                Box::new(|r: &mut SectionReader, v| HtmlBody::from_reader(r, v)),
            )?;
            reader.set_position(list.end_offset());
            Some(ListStore::caching(
                Box::new(list),
                DEFAULT_CACHE_SIZE,
                false,
            )?)
        } else {
            None
        };

        debug!("indices start: {}", reader.position());
        let index_list = RafList::open(
            Arc::clone(&file),
            reader.position(),
            version,
            Box::new(Index::from_reader),
        )?;
        let mut indices = Vec::with_capacity(index_list.len());
        for i in 0..index_list.len() {
            indices.push(index_list.get(i)?);
        }
        reader.set_position(index_list.end_offset());

        let end = read_mutf8(&mut reader)?;
        if end != END_OF_DICTIONARY {
            return Err(DictError::corrupt(format!(
                "missing terminator, got {:?}",
                end
            )));
        }

        info!(
            "opened dictionary v{}: {} sources, {} pairs, {} texts, {} html, {} indices",
            version,
            sources.len(),
            pairs.len(),
            texts.len(),
            html_entries.len(),
            indices.len()
        );
        Ok(Self {
            file: Some(file),
            version,
            creation_millis,
            dict_info,
            sources,
            pairs,
            texts,
            html_entries,
            html_bodies,
            indices,
        })
    }

    /// Releases the file handle. Reads through any of the dictionary's lazy
    /// lists afterwards fail with `Closed`. Idempotent; a no-op for
    /// in-memory dictionaries.
    pub fn close(&self) {
        if let Some(file) = &self.file {
            file.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.file.as_ref().is_some_and(|f| f.is_closed())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn creation_millis(&self) -> i64 {
        self.creation_millis
    }

    pub fn dict_info(&self) -> &str {
        &self.dict_info
    }

    pub fn sources(&self) -> &[EntrySource] {
        &self.sources
    }

    pub fn pairs(&self) -> &dyn RandomAccess<PairEntry> {
        self.pairs.as_list()
    }

    pub fn texts(&self) -> &dyn RandomAccess<TextEntry> {
        self.texts.as_list()
    }

    pub fn html_entries(&self) -> &dyn RandomAccess<HtmlEntry> {
        self.html_entries.as_list()
    }

    pub fn indices(&self) -> &[Arc<Index>] {
        &self.indices
    }

    pub fn pair(&self, reference: u32) -> Result<Arc<PairEntry>> {
        self.pairs.get(reference as usize)
    }

    pub fn text(&self, reference: u32) -> Result<Arc<TextEntry>> {
        self.texts.get(reference as usize)
    }

    pub fn html(&self, reference: u32) -> Result<Arc<HtmlEntry>> {
        self.html_entries.get(reference as usize)
    }

    /// Resolves an HTML entry's body to its decompressed text. For v7
    /// dictionaries the body store is authoritative; older layouts carry the
    /// body inline.
    pub fn html_text(&self, entry: &HtmlEntry) -> Result<String> {
        self.html_body(entry)?.text()
    }

    fn html_body(&self, entry: &HtmlEntry) -> Result<Arc<HtmlBody>> {
        match &entry.body {
            HtmlRef::Inline(body) => Ok(Arc::clone(body)),
            HtmlRef::Stored(reference) => match &self.html_bodies {
                Some(store) => store.get(*reference as usize),
                None => Err(DictError::corrupt(format!(
                    "HTML body reference {} without a body store",
                    reference
                ))),
            },
        }
    }

    /// Appends a source corpus and returns its stable ordinal.
    pub fn add_source(&mut self, source: EntrySource) -> u16 {
        self.sources.push(source);
        (self.sources.len() - 1) as u16
    }

    /// Appends a pair entry and returns its ordinal.
    pub fn add_pair(&mut self, entry: PairEntry) -> Result<u32> {
        Ok(self.pairs.push(entry)? as u32)
    }

    /// Appends a text entry and returns its ordinal.
    pub fn add_text(&mut self, entry: TextEntry) -> Result<u32> {
        Ok(self.texts.push(entry)? as u32)
    }

    /// Appends an HTML entry (body inline) and returns its ordinal.
    pub fn add_html(&mut self, entry: HtmlEntry) -> Result<u32> {
        Ok(self.html_entries.push(entry)? as u32)
    }

    /// Appends an index.
    pub fn add_index(&mut self, index: Index) {
        self.indices.push(Arc::new(index));
    }

    /// Writes the dictionary in the requested format version.
    ///
    /// Only versions 6 and 7 have writers; `skip_html` is rejected for 7.
    pub fn write_version<W: Write + Seek>(
        &self,
        out: &mut W,
        version: u32,
        skip_html: bool,
    ) -> Result<()> {
        match version {
            7 if skip_html => Err(DictError::invalid_parameter(
                "skip_html is not supported for v7",
            )),
            7 => self.write(out),
            6 => self.write_v6(out, skip_html),
            other => Err(DictError::invalid_parameter(format!(
                "only versions 6 and 7 can be written, not {}",
                other
            ))),
        }
    }

    /// Writes the dictionary in the current (v7) format.
    pub fn write<W: Write + Seek>(&self, out: &mut W) -> Result<()> {
        if self.version < CURRENT_VERSION {
            return Err(DictError::invalid_parameter(format!(
                "cannot write a v{} dictionary in the v7 layout",
                self.version
            )));
        }
        self.check_html_consistency()?;
        out.write_i32::<BigEndian>(CURRENT_VERSION as i32)?;
        out.write_i64::<BigEndian>(self.creation_millis)?;
        write_mutf8(out, &self.dict_info)?;

        debug!("sources start: {}", out.stream_position()?);
        raf_list::write_items(out, &self.sources, |w, s, _| s.to_writer(w))?;
        debug!("pairs start: {}", out.stream_position()?);
        raf_list::write_list(out, self.pairs.as_list(), |w, p: &PairEntry, _| {
            p.to_writer(w)
        })?;
        debug!("texts start: {}", out.stream_position()?);
        raf_list::write_list(out, self.texts.as_list(), |w, t: &TextEntry, _| {
            t.to_writer(w)
        })?;

        debug!("html titles start: {}", out.stream_position()?);
        raf_list::write_list(out, self.html_entries.as_list(), |w, e: &HtmlEntry, i| {
            let body_ref = match &e.body {
                HtmlRef::Stored(reference) => *reference,
                HtmlRef::Inline(_) => i as u32,
            };
            e.to_writer_v7(w, body_ref)
        })?;

        debug!("html bodies start: {}", out.stream_position()?);
        match &self.html_bodies {
            Some(store) => {
                raf_list::write_list(out, store.as_list(), |w, b: &HtmlBody, _| b.to_writer(w))?;
            }
            None => {
                // Bodies extracted from the in-memory entries, densely
                // renumbered in entry order.
                let mut bodies = Vec::with_capacity(self.html_entries.len());
                for i in 0..self.html_entries.len() {
                    if let HtmlRef::Inline(body) = &self.html_entries.get(i)?.body {
                        bodies.push(Arc::clone(body));
                    }
                }
                raf_list::write_items(out, &bodies, |w, b, _| b.to_writer(w))?;
            }
        }

        debug!("indices start: {}", out.stream_position()?);
        raf_list::write_items(out, &self.indices, |w, idx, _| idx.write(w, false))?;
        debug!("end: {}", out.stream_position()?);
        write_mutf8(out, END_OF_DICTIONARY)?;
        Ok(())
    }

    /// Writes the dictionary in the legacy v6 format.
    ///
    /// With `skip_html`, HTML entries are elided: the title list is written
    /// empty and every index's row array and entry ranges are rewritten
    /// through a dense renumbering.
    pub fn write_v6<W: Write + Seek>(&self, out: &mut W, skip_html: bool) -> Result<()> {
        self.check_html_consistency()?;
        out.write_i32::<BigEndian>(6)?;
        out.write_i64::<BigEndian>(self.creation_millis)?;
        write_mutf8(out, &self.dict_info)?;

        debug!("sources start: {}", out.stream_position()?);
        raf_list::write_items(out, &self.sources, |w, s, _| s.to_writer(w))?;
        debug!("pairs start: {}", out.stream_position()?);
        raf_list::write_list(out, self.pairs.as_list(), |w, p: &PairEntry, _| {
            p.to_writer(w)
        })?;
        debug!("texts start: {}", out.stream_position()?);
        raf_list::write_list(out, self.texts.as_list(), |w, t: &TextEntry, _| {
            t.to_writer(w)
        })?;

        debug!("html entries start: {}", out.stream_position()?);
        if skip_html {
            raf_list::write_items(out, &[] as &[HtmlEntry], |_, _, _| Ok(()))?;
        } else {
            raf_list::write_list(out, self.html_entries.as_list(), |w, e: &HtmlEntry, _| {
                let body = self.html_body(e)?;
                e.to_writer_v6(w, &body)
            })?;
        }

        debug!("indices start: {}", out.stream_position()?);
        raf_list::write_items(out, &self.indices, |w, idx, _| idx.write(w, skip_html))?;
        debug!("end: {}", out.stream_position()?);
        write_mutf8(out, END_OF_DICTIONARY)?;
        Ok(())
    }

    fn check_html_consistency(&self) -> Result<()> {
        for i in 0..self.html_entries.len() {
            match (&self.html_entries.get(i)?.body, &self.html_bodies) {
                (HtmlRef::Inline(_), Some(_)) => {
                    return Err(DictError::invalid_parameter(
                        "inline HTML body alongside a body store",
                    ));
                }
                (HtmlRef::Stored(reference), None) => {
                    return Err(DictError::corrupt(format!(
                        "HTML body reference {} without a body store",
                        reference
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Metadata view of this dictionary (no filename; see
    /// [`DictionaryInfo::read`] for the path-based fast path).
    pub fn dictionary_info(&self) -> DictionaryInfo {
        DictionaryInfo {
            filename: String::new(),
            file_bytes: self.file.as_ref().map_or(0, |f| f.len()),
            creation_millis: self.creation_millis,
            dict_info: self.dict_info.clone(),
            index_infos: self.indices.iter().map(|i| i.index_info()).collect(),
        }
    }

    /// Debug view: dictionary info, sources, and every index row. The
    /// textual shape is not a stable schema.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "dictInfo={}", self.dict_info)?;
        for source in &self.sources {
            writeln!(out, "EntrySource: {} {}", source.name, source.num_entries)?;
        }
        writeln!(out)?;
        for index in &self.indices {
            writeln!(out, "Index: {} {}", index.short_name, index.long_name)?;
            for i in 0..index.rows().len() {
                let row = index.row(i)?;
                match index.resolve_row(row, self)? {
                    RowData::Token {
                        entry,
                        has_main_entry,
                    } => {
                        let marker = if has_main_entry { "" } else { " (no main entry)" };
                        writeln!(out, "  TokenRow: {}{}", entry.token, marker)?;
                    }
                    RowData::Pair(entry) => {
                        let rendered: Vec<String> = entry
                            .pairs
                            .iter()
                            .map(|p| format!("{} :: {}", p.lang_a, p.lang_b))
                            .collect();
                        writeln!(out, "    PairRow: {}", rendered.join(" | "))?;
                    }
                    RowData::Text(entry) => writeln!(out, "    TextRow: {}", entry.text)?,
                    RowData::Html(entry) => writeln!(out, "    HtmlRow: {}", entry.title)?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::index::IndexEntry;
    use crate::engine::row::{Row, RowKind};
    use std::collections::BTreeSet;
    use std::io::Cursor;
    use std::sync::atomic::AtomicBool;

    fn write_to_temp(dict: &Dictionary, version: u32, skip_html: bool) -> tempfile::NamedTempFile {
        let mut cursor = Cursor::new(Vec::new());
        dict.write_version(&mut cursor, version, skip_html)
            .expect("write");
        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), cursor.into_inner()).expect("write file");
        tmp
    }

    /// One source, two pair entries, one index whose single entry spans
    /// three rows (token, pair, pair).
    fn sample_dict() -> Dictionary {
        let mut dict = Dictionary::new("test dict");
        let src = dict.add_source(EntrySource::new("wikt", 2));
        let p0 = dict
            .add_pair(PairEntry::new(src, vec![crate::engine::entry::Pair::new("dog", "Hund")]))
            .expect("pair");
        let p1 = dict
            .add_pair(PairEntry::new(
                src,
                vec![crate::engine::entry::Pair::new("hound", "Hund")],
            ))
            .expect("pair");
        let entries = vec![IndexEntry::new("Dog", 0, 3).expect("entry")];
        let rows = vec![
            Row::new(RowKind::TokenMain, 0),
            Row::new(RowKind::Pair, p0),
            Row::new(RowKind::Pair, p1),
        ];
        let index = Index::new(
            "EN",
            "English",
            "EN",
            ":: Lower ;",
            false,
            1,
            BTreeSet::from(["the".to_string(), "a".to_string()]),
            entries,
            rows,
        )
        .expect("index");
        dict.add_index(index);
        dict
    }

    /// Rows [token, pair, html, pair] for the v6 pruning scenario.
    fn html_dict() -> Dictionary {
        let mut dict = Dictionary::new("html dict");
        let src = dict.add_source(EntrySource::new("src", 1));
        let p0 = dict
            .add_pair(PairEntry::new(src, vec![crate::engine::entry::Pair::new("dog", "Hund")]))
            .expect("pair");
        let p1 = dict
            .add_pair(PairEntry::new(
                src,
                vec![crate::engine::entry::Pair::new("doggo", "Hündchen")],
            ))
            .expect("pair");
        let h = dict
            .add_html(HtmlEntry::new(src, "dog", "<p>der Hund</p>").expect("html"))
            .expect("add html");
        let entries = vec![IndexEntry::new("dog", 0, 4).expect("entry").with_html_refs(vec![h])];
        let rows = vec![
            Row::new(RowKind::TokenMain, 0),
            Row::new(RowKind::Pair, p0),
            Row::new(RowKind::Html, h),
            Row::new(RowKind::Pair, p1),
        ];
        let index = Index::new(
            "EN",
            "English",
            "EN",
            ":: Lower ;",
            false,
            1,
            BTreeSet::new(),
            entries,
            rows,
        )
        .expect("index");
        dict.add_index(index);
        dict
    }

    #[test]
    fn v7_roundtrip_is_structurally_equal() {
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let back = Dictionary::open(tmp.path()).expect("open");

        assert_eq!(back.version(), 7);
        assert_eq!(back.creation_millis(), dict.creation_millis());
        assert_eq!(back.dict_info(), "test dict");
        assert_eq!(back.sources(), dict.sources());

        assert_eq!(back.pairs().len(), 2);
        assert_eq!(*back.pair(0).expect("pair"), *dict.pair(0).expect("pair"));
        assert_eq!(*back.pair(1).expect("pair"), *dict.pair(1).expect("pair"));

        let index = &back.indices()[0];
        assert_eq!(index.short_name, "EN");
        assert_eq!(index.long_name, "English");
        assert_eq!(index.sort_language.iso_code(), "EN");
        assert_eq!(index.normalizer_rules, ":: Lower ;");
        assert_eq!(index.main_token_count, 1);
        assert_eq!(
            index.stoplist,
            BTreeSet::from(["the".to_string(), "a".to_string()])
        );

        let entry = index.sorted_entries().get(0).expect("entry");
        assert_eq!(entry.token, "Dog");
        assert_eq!(entry.start_row, 0);
        assert_eq!(entry.num_rows, 3);

        let rows = index.entry_rows(&entry).expect("rows");
        assert_eq!(
            rows.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![RowKind::TokenMain, RowKind::Pair, RowKind::Pair]
        );

        // The persisted normalized form was restored into the memo.
        let flag = AtomicBool::new(false);
        let hit = index
            .find_insertion_point("dog", &flag)
            .expect("find")
            .expect("entry");
        assert_eq!(hit.token, "Dog");
        match index.resolve_row(rows[1], &back).expect("resolve") {
            crate::engine::row::RowData::Pair(pair) => {
                assert_eq!(pair.pairs[0].lang_a, "dog");
                assert_eq!(pair.pairs[0].lang_b, "Hund");
            }
            other => panic!("unexpected row data: {:?}", other),
        }
    }

    #[test]
    fn transcode_of_an_opened_v7_file_is_byte_identical() {
        let dict = sample_dict();
        let mut cursor = Cursor::new(Vec::new());
        dict.write(&mut cursor).expect("write");
        let first = cursor.into_inner();

        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), &first).expect("write file");
        let opened = Dictionary::open(tmp.path()).expect("open");

        let mut cursor = Cursor::new(Vec::new());
        opened.write(&mut cursor).expect("rewrite");
        assert_eq!(cursor.into_inner(), first);
    }

    #[test]
    fn v6_skip_html_prunes_rows_and_renumbers() {
        let dict = html_dict();
        let tmp = write_to_temp(&dict, 6, true);
        let back = Dictionary::open(tmp.path()).expect("open");

        assert_eq!(back.version(), 6);
        assert_eq!(back.html_entries().len(), 0);

        let index = &back.indices()[0];
        assert_eq!(index.rows().len(), 3);
        let kinds: Vec<RowKind> = (0..3)
            .map(|i| index.row(i).expect("row").kind)
            .collect();
        assert_eq!(kinds, vec![RowKind::TokenMain, RowKind::Pair, RowKind::Pair]);

        let entry = index.sorted_entries().get(0).expect("entry");
        assert_eq!(entry.start_row, 0);
        assert_eq!(entry.num_rows, 3);
        assert!(entry.html_refs.is_empty());

        // The surviving pair rows still reference the unchanged pair store.
        assert_eq!(
            back.pair(index.row(2).expect("row").reference)
                .expect("pair")
                .pairs[0]
                .lang_a,
            "doggo"
        );
    }

    #[test]
    fn v6_with_html_keeps_bodies_inline() {
        let dict = html_dict();
        let tmp = write_to_temp(&dict, 6, false);
        let back = Dictionary::open(tmp.path()).expect("open");

        assert_eq!(back.html_entries().len(), 1);
        let entry = back.html(0).expect("html");
        assert_eq!(entry.title, "dog");
        assert_eq!(back.html_text(&entry).expect("text"), "<p>der Hund</p>");
        assert_eq!(back.indices()[0].rows().len(), 4);
    }

    #[test]
    fn v7_html_bodies_live_in_the_body_store() {
        let dict = html_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let back = Dictionary::open(tmp.path()).expect("open");

        let entry = back.html(0).expect("html");
        assert!(matches!(entry.body, HtmlRef::Stored(0)));
        assert_eq!(back.html_text(&entry).expect("text"), "<p>der Hund</p>");
        let index = &back.indices()[0];
        let token = index.sorted_entries().get(0).expect("entry");
        assert_eq!(token.html_refs, vec![0]);
    }

    #[test]
    fn write_version_gates() {
        let dict = sample_dict();
        let mut cursor = Cursor::new(Vec::new());
        assert!(dict.write_version(&mut cursor, 7, true).is_err());
        assert!(dict.write_version(&mut cursor, 5, false).is_err());
        assert!(dict.write_version(&mut cursor, 6, false).is_ok());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut bytes = Vec::new();
        bytes.write_i32::<BigEndian>(99).expect("write");
        bytes.extend_from_slice(&[0u8; 32]);
        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), &bytes).expect("write file");
        let err = Dictionary::open(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            DictError::UnsupportedVersion { version: 99, .. }
        ));
    }

    #[test]
    fn damaged_terminator_is_corrupt() {
        let dict = sample_dict();
        let mut cursor = Cursor::new(Vec::new());
        dict.write(&mut cursor).expect("write");
        let mut bytes = cursor.into_inner();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tmp = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(tmp.path(), &bytes).expect("write file");
        let err = Dictionary::open(tmp.path()).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn reads_after_close_fail_closed() {
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let back = Dictionary::open(tmp.path()).expect("open");
        back.close();
        assert!(back.is_closed());

        let err = back.pair(0).unwrap_err();
        assert!(err.is_closed());
        let flag = AtomicBool::new(false);
        let err = back.indices()[0]
            .find_insertion_point("dog", &flag)
            .unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn cancelled_search_touches_nothing() {
        // With the interrupt raised before the call, the search returns the
        // cancelled sentinel without a single list access; a closed file
        // proves no read was attempted.
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let back = Dictionary::open(tmp.path()).expect("open");
        back.close();
        let flag = AtomicBool::new(true);
        let result = back.indices()[0]
            .find_insertion_point("dog", &flag)
            .expect("find");
        assert!(result.is_none());
    }

    #[test]
    fn in_memory_dictionaries_reject_stored_html_refs() {
        let mut dict = Dictionary::new("broken");
        let src = dict.add_source(EntrySource::new("src", 1));
        dict.add_html(HtmlEntry {
            source: src,
            title: "dangling".to_string(),
            body: HtmlRef::Stored(3),
        })
        .expect("add");
        let mut cursor = Cursor::new(Vec::new());
        assert!(dict.write(&mut cursor).is_err());
    }

    #[test]
    fn opened_dictionaries_are_read_only() {
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let mut back = Dictionary::open(tmp.path()).expect("open");
        let err = back
            .add_pair(PairEntry::new(
                0,
                vec![crate::engine::entry::Pair::new("new", "neu")],
            ))
            .unwrap_err();
        assert!(matches!(err, DictError::InvalidParameter { .. }));
    }

    #[test]
    fn info_fast_path_never_errors() {
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 7, false);
        let info = DictionaryInfo::read(tmp.path());
        assert!(!info.filename.is_empty());
        assert!(info.file_bytes > 0);
        assert_eq!(info.dict_info, "test dict");
        assert_eq!(info.index_infos.len(), 1);
        assert_eq!(info.index_infos[0].short_name, "EN");
        assert_eq!(info.index_infos[0].num_index_entries, 1);

        // Garbage in, minimal record out.
        let junk = tempfile::NamedTempFile::new().expect("temp");
        std::fs::write(junk.path(), b"not a dictionary").expect("write");
        let info = DictionaryInfo::read(junk.path());
        assert!(!info.filename.is_empty());
        assert_eq!(info.file_bytes, 16);
        assert!(info.index_infos.is_empty());
        assert_eq!(info.dict_info, "");
    }

    #[test]
    fn print_emits_the_debug_view() {
        let dict = sample_dict();
        let mut out = Vec::new();
        dict.print(&mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("dictInfo=test dict"));
        assert!(text.contains("EntrySource: wikt 2"));
        assert!(text.contains("Index: EN English"));
        assert!(text.contains("TokenRow: Dog"));
        assert!(text.contains("PairRow: dog :: Hund"));
    }

    #[test]
    fn legacy_stoplist_blob_reads_as_empty() {
        let dict = sample_dict();
        let tmp = write_to_temp(&dict, 6, false);
        let back = Dictionary::open(tmp.path()).expect("open");
        // The v6 envelope is opaque to the reader; the stoplist degrades to
        // empty while everything else survives.
        assert!(back.indices()[0].stoplist.is_empty());
        assert_eq!(back.indices()[0].sorted_entries().len(), 1);
    }
}
