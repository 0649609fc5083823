//! File classification: deterministic fallback rules plus optional
//! AI enrichment.

pub mod classifier;
pub mod rules;

pub use classifier::{Classification, Classifier, ImpactLevel, fallback_classification};
