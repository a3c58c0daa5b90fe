//! Data models for documents, records, and configuration.

pub mod config;
pub mod record;

pub use config::{CargoConfig, ExtractionConfig, NormalizerConfig, ParserConfig};
pub use record::{CargoItem, Document, DocumentMeta, GrammarTag, ShipRecord};
