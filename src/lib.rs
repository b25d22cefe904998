//! featex - Batch gene feature extraction library.
//!
//! This library selects, for each of several feature columns in a
//! tab-separated feature matrix, the genes "positive" for that feature, and
//! intersects them with genomic coordinate windows from an annotation file.
//!
//! # Features
//!
//! - Parse feature matrices and four-column annotation files (with gzip support)
//! - Classify features as binary ({0,1} or {-1,1}) or continuous
//! - Adaptive quantile search for continuous features, with a ranked fallback
//! - Inner-join selected genes against annotation windows by identifier
//! - Per-feature failure isolation with a JSON batch manifest
//!
//! # Example
//!
//! ```ignore
//! use featex::batch::run_batch;
//! use std::path::Path;
//!
//! let outcomes = run_batch(
//!     Path::new("features.tsv"),
//!     &[4, 7, 12],
//!     Path::new("gencode_windows.bed"),
//!     Path::new("out"),
//! )?;
//! ```

pub mod batch;
pub mod config;
pub mod joiner;
pub mod output;
pub mod parser;
pub mod selector;
pub mod types;

pub use batch::{run_batch, FeatureOutcome, SkipReason};
pub use config::SelectorConfig;
pub use types::{
    AnnotationTable, FeatureSelection, FeatureTable, JoinedRow, ManifestEntry, SelectError,
};
