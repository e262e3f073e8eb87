//! Ruleset-driven token normalizer.
//!
//! Indices persist a transliterator rules string describing how tokens are
//! reduced to a language-neutral sort key, e.g.
//!
//! ```text
//! :: NFD ; :: [:Nonspacing Mark:] Remove ; :: NFC ; :: Lower ;
//! ```
//!
//! [`Normalizer::from_rules`] parses the ruleset once into a pipeline of
//! stages; [`Normalizer::normalize`] applies them in order. The normalizer is
//! pure and thread-safe after construction. Rule atoms outside the repertoire
//! this format persists are rejected at parse time.
//!
//! Unicode stages are backed by the pure-Rust ICU4X crates: normalization
//! forms by `icu_normalizer`, mark removal by the `icu_properties` general
//! category data, case mapping by `icu_casemap`.

use icu_casemap::{CaseMapper, CaseMapperBorrowed};
use icu_locale::LanguageIdentifier;
use icu_normalizer::{
    ComposingNormalizer, ComposingNormalizerBorrowed, DecomposingNormalizer,
    DecomposingNormalizerBorrowed,
};
use icu_properties::props::GeneralCategory;
use icu_properties::{CodePointMapData, CodePointMapDataBorrowed};

use crate::{DictError, Result};

#[derive(Debug)]
enum Stage {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
    Lower,
    Upper,
    RemoveNonspacingMarks,
    /// Literal replacements, applied in one pass, longest match first.
    Convert(Vec<(String, String)>),
}

/// Compiled form of a persisted normalizer ruleset.
///
/// The ICU data handles the stages run on are built once here, not per
/// call.
pub struct Normalizer {
    stages: Vec<Stage>,
    nfc: ComposingNormalizerBorrowed<'static>,
    nfd: DecomposingNormalizerBorrowed<'static>,
    nfkc: ComposingNormalizerBorrowed<'static>,
    nfkd: DecomposingNormalizerBorrowed<'static>,
    case_mapper: CaseMapperBorrowed<'static>,
    categories: CodePointMapDataBorrowed<'static, GeneralCategory>,
}

impl Normalizer {
    /// Parses `rules` into a stage pipeline.
    ///
    /// Supported atoms: `:: NFC/NFD/NFKC/NFKD ;`, `:: Lower ;`, `:: Upper ;`
    /// (and their `Any-` spellings), `:: [:Mn:] Remove ;` (also spelled
    /// `[:Nonspacing Mark:]`), `:: Null ;`, and literal conversion rules
    /// `lhs > rhs ;` with `'...'` quoting. Anything else fails.
    pub fn from_rules(rules: &str) -> Result<Self> {
        let mut stages = Vec::new();
        let mut conversions: Vec<(String, String)> = Vec::new();
        for segment in split_segments(rules) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if let Some(transform) = segment.strip_prefix("::") {
                if !conversions.is_empty() {
                    stages.push(make_convert(std::mem::take(&mut conversions)));
                }
                if let Some(stage) = parse_transform(transform.trim())? {
                    stages.push(stage);
                }
            } else if let Some((lhs, rhs)) = segment.split_once('>') {
                let from = unquote(lhs.trim());
                let to = unquote(rhs.trim());
                if from.is_empty() {
                    return Err(bad_rules(rules, segment));
                }
                conversions.push((from, to));
            } else {
                return Err(bad_rules(rules, segment));
            }
        }
        if !conversions.is_empty() {
            stages.push(make_convert(conversions));
        }
        Ok(Self {
            stages,
            nfc: ComposingNormalizer::new_nfc(),
            nfd: DecomposingNormalizer::new_nfd(),
            nfkc: ComposingNormalizer::new_nfkc(),
            nfkd: DecomposingNormalizer::new_nfkd(),
            case_mapper: CaseMapper::new(),
            categories: CodePointMapData::<GeneralCategory>::new(),
        })
    }

    /// Applies the ruleset to `input`.
    pub fn normalize(&self, input: &str) -> String {
        let mut text = input.to_string();
        for stage in &self.stages {
            text = match stage {
                Stage::Nfc => self.nfc.normalize(&text).to_string(),
                Stage::Nfd => self.nfd.normalize(&text).to_string(),
                Stage::Nfkc => self.nfkc.normalize(&text).to_string(),
                Stage::Nfkd => self.nfkd.normalize(&text).to_string(),
                Stage::Lower => self
                    .case_mapper
                    .lowercase_to_string(&text, &LanguageIdentifier::UNKNOWN)
                    .to_string(),
                Stage::Upper => self
                    .case_mapper
                    .uppercase_to_string(&text, &LanguageIdentifier::UNKNOWN)
                    .to_string(),
                Stage::RemoveNonspacingMarks => text
                    .chars()
                    .filter(|&c| self.categories.get(c) != GeneralCategory::NonspacingMark)
                    .collect(),
                Stage::Convert(maps) => apply_conversions(&text, maps),
            };
        }
        text
    }
}

fn make_convert(mut conversions: Vec<(String, String)>) -> Stage {
    // Longest source first so "sch" wins over "s" at the same position.
    conversions.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    Stage::Convert(conversions)
}

fn parse_transform(spec: &str) -> Result<Option<Stage>> {
    let collapsed: String = spec.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = collapsed.to_ascii_lowercase();
    let stage = match lowered.as_str() {
        "nfc" => Stage::Nfc,
        "nfd" => Stage::Nfd,
        "nfkc" => Stage::Nfkc,
        "nfkd" => Stage::Nfkd,
        "lower" | "any-lower" => Stage::Lower,
        "upper" | "any-upper" => Stage::Upper,
        "[:mn:] remove" | "[:nonspacing mark:] remove" | "[:nonspacingmark:] remove" => {
            Stage::RemoveNonspacingMarks
        }
        "null" | "" => return Ok(None),
        _ => {
            return Err(DictError::corrupt(format!(
                "unsupported transform in normalizer rules: {}",
                spec
            )))
        }
    };
    Ok(Some(stage))
}

fn bad_rules(rules: &str, segment: &str) -> DictError {
    DictError::corrupt(format!(
        "unsupported normalizer rule {:?} in {:?}",
        segment, rules
    ))
}

/// Splits a ruleset on `;`, honoring `'...'` quoting (with `''` as an
/// escaped quote).
fn split_segments(rules: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in rules.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ';' if !in_quote => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

fn unquote(text: &str) -> String {
    let mut out = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // '' inside a quoted run is an escaped quote; bare quotes delimit.
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn apply_conversions(text: &str, maps: &[(String, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while !rest.is_empty() {
        for (from, to) in maps {
            if rest.starts_with(from.as_str()) {
                out.push_str(to);
                rest = &rest[from.len()..];
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}
