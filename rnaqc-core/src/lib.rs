//! # rnaqc-core
//!
//! Shared models for the rnaqc workspace. A [`models::Feature`] is a gene, exon or
//! transcript as resolved by an upstream annotation index; [`models::Span`] and
//! [`models::overlap_length`] give the half-open overlap arithmetic every engine
//! relies on; [`models::DefaultMap`] is the string keyed accumulator used for all
//! per-feature tallies.
pub mod errors;
pub mod models;
pub mod utils;
