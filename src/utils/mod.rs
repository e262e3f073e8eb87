// Collation, normalization, and compression helpers
//
// This module provides the locale-aware pieces the lookup index is built on
// (the known-language table with its collators, the ruleset-driven token
// normalizer) and the gzip codec used for stored HTML bodies.

pub mod compression;
pub mod language;
pub mod normalizer;

pub use compression::{gzip_compress, gzip_decompress};
pub use language::Language;
pub use normalizer::Normalizer;
