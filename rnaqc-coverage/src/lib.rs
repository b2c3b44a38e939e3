//! # rnaqc-coverage
//!
//! Accumulation engines for RNA-seq coverage QC:
//!
//! - [`Collector`]: per-gene exon coverage, folded into shared per-exon totals.
//! - [`BaseCoverage`]: cache, commit and stream out base-level coverage blocks.
//! - [`BiasCounter`]: 5'/3' coverage bias near gene ends.
//!
//! [`coverage_scan`] drives all three over a stream of resolved blocks.
pub mod base_coverage;
pub mod bias;
pub mod collector;
pub mod config;
pub mod consts;
pub mod errors;
pub mod metrics;
pub mod scan;

// re-exports
pub use base_coverage::*;
pub use bias::*;
pub use collector::*;
pub use config::*;
pub use errors::*;
pub use metrics::*;
pub use scan::*;
