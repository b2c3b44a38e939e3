pub const DEFAULT_BIAS_GENE_LENGTH: u32 = 600;
pub const DEFAULT_BIAS_OFFSET: u32 = 150;
pub const DEFAULT_BIAS_WINDOW: u32 = 100;

/// Returned by `BiasCounter::get_bias` when no eligible coverage was seen.
pub const NO_BIAS: f64 = -1.0;

pub const FILTERED_BY_TAG_PREFIX: &str = "Filtered by tag: ";

// metric keys touched by the coverage scan
pub const TOTAL_BASES: &str = "Total Bases";
pub const COVERAGE_BLOCKS: &str = "Coverage Blocks";
pub const BLOCKS_OUTSIDE_EXONS: &str = "Blocks Outside Exons";
pub const GENES_SCANNED: &str = "Genes Scanned";

// output suffixes
pub const EXON_COVERAGE_SUFFIX: &str = "exon_coverage.tsv";
pub const BASE_COVERAGE_SUFFIX: &str = "base_coverage.tsv";
pub const GENE_BIAS_SUFFIX: &str = "gene_bias.tsv";
pub const METRICS_SUFFIX: &str = "metrics.tsv";
