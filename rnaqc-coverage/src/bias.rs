use rnaqc_core::models::{DefaultMap, Feature, Span, Strand, overlap_length};

use crate::config::BiasParams;
use crate::consts::NO_BIAS;

/// Which trimmed gene boundary a block landed next to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneEnd {
    FivePrime,
    ThreePrime,
}

impl GeneEnd {
    pub fn classify(strand: Strand, window: Window) -> GeneEnd {
        match (strand, window) {
            (Strand::Forward, Window::Left) => GeneEnd::FivePrime,
            (Strand::Forward, Window::Right) => GeneEnd::ThreePrime,
            (Strand::Reverse, Window::Left) => GeneEnd::ThreePrime,
            (Strand::Reverse, Window::Right) => GeneEnd::FivePrime,
        }
    }
}

///
/// Tracks how much coverage falls close to the 5' and 3' ends of each gene.
///
/// Each gene is trimmed by `offset` on both sides; a block whose start lies in
/// `[trimmed_start, trimmed_start + window_size]` is a left-window hit, otherwise
/// a block whose end lies in `[trimmed_end - window_size, trimmed_end]` is a
/// right-window hit. The left test runs first, so a block matching both is
/// credited to the left window only. Genes shorter than `gene_length` are
/// skipped.
///
pub struct BiasCounter {
    params: BiasParams,
    gene_lengths: DefaultMap<u32>,
    five_end: DefaultMap<f64>,
    three_end: DefaultMap<f64>,
}

impl BiasCounter {
    pub fn new(params: BiasParams) -> Self {
        BiasCounter {
            params,
            gene_lengths: DefaultMap::new(),
            five_end: DefaultMap::new(),
            three_end: DefaultMap::new(),
        }
    }

    pub fn set_gene_length(&mut self, gene_id: &str, length: u32) {
        *self.gene_lengths.entry_or_default(gene_id) = length;
    }

    pub fn gene_length(&self, gene_id: &str) -> u32 {
        self.gene_lengths.value(gene_id)
    }

    pub fn params(&self) -> &BiasParams {
        &self.params
    }

    pub fn is_eligible(&self, gene_id: &str) -> bool {
        self.gene_length(gene_id) >= self.params.gene_length
    }

    fn window_for<B: Span + ?Sized>(&self, trimmed: (u32, u32), block: &B) -> Option<Window> {
        let (start, end) = trimmed;
        let size = self.params.window_size;

        if block.start() >= start && block.start() <= start.saturating_add(size) {
            Some(Window::Left)
        } else if block.end() >= end.saturating_sub(size) && block.end() <= end {
            Some(Window::Right)
        } else {
            None
        }
    }

    /// Credit the overlap of `block` with the trimmed `gene` to the gene end it
    /// falls next to, if any.
    pub fn check_bias<B: Span + ?Sized>(&mut self, gene: &Feature, block: &B) {
        if !self.is_eligible(&gene.feature_id) {
            return;
        }

        let offset = self.params.offset;
        let trimmed = (
            gene.start.saturating_add(offset),
            gene.end.saturating_sub(offset),
        );
        if trimmed.1 <= trimmed.0 {
            return;
        }

        let Some(window) = self.window_for(trimmed, block) else {
            return;
        };

        let overlap = overlap_length(&trimmed, block) as f64;
        let totals = match GeneEnd::classify(gene.strand, window) {
            GeneEnd::FivePrime => &mut self.five_end,
            GeneEnd::ThreePrime => &mut self.three_end,
        };
        *totals.entry_or_default(&gene.feature_id) += overlap;
    }

    pub fn five_end(&self, gene_id: &str) -> f64 {
        self.five_end.value(gene_id)
    }

    pub fn three_end(&self, gene_id: &str) -> f64 {
        self.three_end.value(gene_id)
    }

    /// 3' share of the end-proximal coverage, `None` when nothing was observed.
    pub fn bias(&self, gene_id: &str) -> Option<f64> {
        let cov5 = self.five_end(gene_id);
        let cov3 = self.three_end(gene_id);
        if cov5 + cov3 > 0.0 {
            Some(cov3 / (cov5 + cov3))
        } else {
            None
        }
    }

    /// Like [`BiasCounter::bias`], with `-1.0` standing in for "undefined".
    pub fn get_bias(&self, gene_id: &str) -> f64 {
        self.bias(gene_id).unwrap_or(NO_BIAS)
    }
}
