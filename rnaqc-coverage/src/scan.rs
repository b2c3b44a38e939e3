use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use rnaqc_core::errors::FeatureError;
use rnaqc_core::models::{Feature, Span, Strand};
use rnaqc_core::utils::{get_dynamic_writer, parse_column};

use crate::base_coverage::BaseCoverage;
use crate::bias::BiasCounter;
use crate::collector::{Collector, SharedTotals, shared_totals};
use crate::config::QcConfig;
use crate::consts::{
    BASE_COVERAGE_SUFFIX, BLOCKS_OUTSIDE_EXONS, COVERAGE_BLOCKS, EXON_COVERAGE_SUFFIX,
    GENE_BIAS_SUFFIX, GENES_SCANNED, METRICS_SUFFIX, TOTAL_BASES,
};
use crate::errors::CoverageError;
use crate::metrics::Metrics;

const BLOCK_COLUMNS: usize = 10;

///
/// One aligned block, already resolved to the exon (and gene) it hits.
///
/// Line layout:
/// `gene_id gene_start gene_end strand exon_id transcript_id exon_start exon_end block_start block_end`
///
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    pub gene: Feature,
    pub exon: Feature,
    pub block: (u32, u32),
}

impl FromStr for BlockRecord {
    type Err = FeatureError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < BLOCK_COLUMNS {
            return Err(FeatureError::MissingColumns {
                expected: BLOCK_COLUMNS,
                found: fields.len(),
            });
        }

        let strand = Strand::from_str(fields[3])?;
        let gene = Feature::gene(
            fields[0],
            parse_column(&fields, 1)?,
            parse_column(&fields, 2)?,
            strand,
        )?;
        let exon = Feature::new(
            fields[0],
            fields[4],
            fields[5],
            parse_column(&fields, 6)?,
            parse_column(&fields, 7)?,
            strand,
        )?;

        let start: u32 = parse_column(&fields, 8)?;
        let end: u32 = parse_column(&fields, 9)?;
        if start > end {
            return Err(FeatureError::InvalidSpan { start, end });
        }

        Ok(BlockRecord {
            gene,
            exon,
            block: (start, end),
        })
    }
}

///
/// Output files of a coverage scan.
///
#[derive(Debug, Clone)]
pub struct ScanOutputs {
    pub exon_coverage: PathBuf,
    pub base_coverage: PathBuf,
    pub gene_bias: PathBuf,
    pub metrics: PathBuf,
}

impl ScanOutputs {
    pub fn from_prefix(prefix: &str, gzip: bool) -> Self {
        let with_suffix = |suffix: &str| PathBuf::from(format!("{}.{}", prefix, suffix));
        let base_coverage = match gzip {
            true => format!("{}.{}.gz", prefix, BASE_COVERAGE_SUFFIX),
            false => format!("{}.{}", prefix, BASE_COVERAGE_SUFFIX),
        };

        ScanOutputs {
            exon_coverage: with_suffix(EXON_COVERAGE_SUFFIX),
            base_coverage: PathBuf::from(base_coverage),
            gene_bias: with_suffix(GENE_BIAS_SUFFIX),
            metrics: with_suffix(METRICS_SUFFIX),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub blocks: u64,
    pub genes: u64,
    pub exons: usize,
    pub genes_with_bias: usize,
    pub total_coverage: f64,
}

struct GeneInFlight {
    gene: Feature,
    exons: Vec<Feature>,
    blocks: Vec<(u32, u32)>,
}

impl GeneInFlight {
    fn new(gene: Feature) -> Self {
        GeneInFlight {
            gene,
            exons: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn register_exon(&mut self, exon: &Feature) {
        if !self.exons.iter().any(|e| e.feature_id == exon.feature_id) {
            self.exons.push(exon.clone());
        }
    }
}

struct CoverageScan<W: Write> {
    coverage: Collector,
    presence: Collector,
    coverage_totals: SharedTotals,
    block_totals: SharedTotals,
    base: BaseCoverage<W>,
    bias: BiasCounter,
    metrics: Metrics,
    current: Option<GeneInFlight>,
    finished: HashSet<String>,
    gene_order: Vec<String>,
}

impl<W: Write> CoverageScan<W> {
    fn new(config: &QcConfig, base: BaseCoverage<W>) -> Self {
        let coverage_totals = shared_totals();
        let block_totals = shared_totals();

        CoverageScan {
            coverage: Collector::new(Rc::clone(&coverage_totals)),
            presence: Collector::new(Rc::clone(&block_totals)),
            coverage_totals,
            block_totals,
            base,
            bias: BiasCounter::new(config.bias),
            metrics: Metrics::new(),
            current: None,
            finished: HashSet::new(),
            gene_order: Vec::new(),
        }
    }

    fn push(&mut self, record: BlockRecord, line: usize) -> Result<()> {
        let same_gene = self
            .current
            .as_ref()
            .is_some_and(|g| g.gene.feature_id == record.gene.feature_id);

        if !same_gene {
            self.finish_gene()?;
            if self.finished.contains(&record.gene.feature_id) {
                return Err(CoverageError::UnsortedInput {
                    gene_id: record.gene.feature_id.clone(),
                    line,
                }
                .into());
            }
            self.current = Some(GeneInFlight::new(record.gene.clone()));
        }

        let BlockRecord { gene, exon, block } = record;

        self.metrics.increment(COVERAGE_BLOCKS);
        self.metrics.increment_by(TOTAL_BASES, block.width() as u64);

        let start = block.0.max(exon.start);
        let end = block.1.min(exon.end);
        if end > start {
            let length = (end - start) as f64;
            self.coverage.add(&gene.gene_id, &exon.feature_id, length);
            self.presence.add(&gene.gene_id, &exon.feature_id, length);
            self.base
                .add(&exon, start, end)
                .with_context(|| format!("Invalid block on line {}", line))?;
        } else {
            self.metrics.increment(BLOCKS_OUTSIDE_EXONS);
        }

        if let Some(current) = self.current.as_mut() {
            current.register_exon(&exon);
            current.blocks.push(block);
        }

        Ok(())
    }

    /// Fold the gene in flight into the totals and stream out its exons.
    fn finish_gene(&mut self) -> Result<()> {
        let Some(current) = self.current.take() else {
            return Ok(());
        };
        let gene_id = current.gene.feature_id.as_str();

        self.bias.set_gene_length(gene_id, current.gene.len());
        for block in &current.blocks {
            self.bias.check_bias(&current.gene, block);
        }

        self.coverage.collect(gene_id);
        self.presence.collect_single(gene_id);

        self.base.commit(gene_id)?;
        self.base.reset();
        let mut dumped = 0;
        for exon in &current.exons {
            dumped += self.base.dump(exon)?;
        }
        debug!(
            "Finished {}: {} blocks, {} coverage records",
            gene_id,
            current.blocks.len(),
            dumped
        );

        self.metrics.increment(GENES_SCANNED);
        self.finished.insert(gene_id.to_string());
        self.gene_order.push(gene_id.to_string());
        Ok(())
    }

    fn write_exon_coverage(&self, path: &Path) -> Result<usize> {
        let mut writer = get_dynamic_writer(path)?;
        let coverage = self.coverage_totals.borrow();
        let blocks = self.block_totals.borrow();

        let keys = coverage.sorted_keys();
        for exon_id in &keys {
            writeln!(
                writer,
                "{}\t{}\t{}",
                exon_id,
                coverage.value(exon_id),
                blocks.value(exon_id)
            )?;
        }
        writer.finish()?;
        Ok(keys.len())
    }

    fn write_gene_bias(&self, path: &Path) -> Result<usize> {
        let mut writer = get_dynamic_writer(path)?;
        let mut with_bias = 0;

        for gene_id in &self.gene_order {
            match self.bias.bias(gene_id) {
                Some(bias) => {
                    with_bias += 1;
                    writeln!(writer, "{}\t{:.6}", gene_id, bias)?;
                }
                None => writeln!(writer, "{}\tNA", gene_id)?,
            }
        }
        writer.finish()?;
        Ok(with_bias)
    }

    fn write_metrics(&self, path: &Path) -> Result<()> {
        let mut writer = get_dynamic_writer(path)?;
        self.metrics.write_report(&mut writer)?;
        writer.finish()?;
        Ok(())
    }
}

///
/// Replay resolved blocks through the coverage engines and write every report.
///
/// Lines of one gene must be contiguous. Each gene is committed and its exons
/// dumped as soon as the next gene starts, so an exon id may only belong to a
/// single gene.
///
/// # Arguments
///
/// - reader: tab separated block records, `#` comments and blank lines skipped
/// - config: bias window parameters
/// - outputs: where to write the four reports
///
pub fn coverage_scan<R: BufRead>(
    reader: R,
    config: &QcConfig,
    outputs: &ScanOutputs,
) -> Result<ScanSummary> {
    let base = BaseCoverage::from_path(&outputs.base_coverage)?;
    let mut scan = CoverageScan::new(config, base);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg} ({per_sec})")?
            .tick_strings(&["-", "\\", "|", "/"]),
    );
    spinner.set_message("Scanning coverage blocks...");

    let mut processed: u64 = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let record = BlockRecord::from_str(&line)
            .with_context(|| format!("Failed to parse block on line {}", line_no))?;
        scan.push(record, line_no)?;

        processed += 1;
        if processed % 10_000 == 0 {
            spinner.set_message(format!("Processed {} blocks", processed));
        }
        spinner.inc(1);
    }
    scan.finish_gene()?;
    scan.base.close()?;
    spinner.finish_and_clear();

    let exons = scan.write_exon_coverage(&outputs.exon_coverage)?;
    let genes_with_bias = scan.write_gene_bias(&outputs.gene_bias)?;
    scan.write_metrics(&outputs.metrics)?;

    let summary = ScanSummary {
        blocks: processed,
        genes: scan.metrics.get(GENES_SCANNED),
        exons,
        genes_with_bias,
        total_coverage: scan.coverage.sum(),
    };
    info!(
        "Scanned {} blocks over {} genes ({} exons covered, {} genes with bias)",
        summary.blocks, summary.genes, summary.exons, summary.genes_with_bias
    );

    Ok(summary)
}
