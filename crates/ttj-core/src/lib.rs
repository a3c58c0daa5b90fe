//! Core library for extracting structured shipping records from OCR'd
//! Timber Trades Journal pages (1874-1899).
//!
//! This crate provides:
//! - Mojibake repair for double-encoded Scandinavian and German port names
//! - Era format classification and the three record-line grammars
//! - The context-aware record parser (headers set state, lines emit records)
//! - Cargo manifest segmentation into itemized entries
//! - Tiered normalization of entity names against authority lists

pub mod cargo;
pub mod encoding;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod parser;

pub use cargo::CargoSegmenter;
pub use error::{Result, TtjError};
pub use format::FormatFamily;
pub use models::{
    CargoConfig, CargoItem, Document, DocumentMeta, ExtractionConfig, GrammarTag, NormalizerConfig,
    ParserConfig, ShipRecord,
};
pub use normalize::{Category, EntityNormalizer, NormalizationResult, ReferenceSet, Tier};
pub use parser::{ParseContext, RecordParser};
