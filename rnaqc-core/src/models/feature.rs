use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::FeatureError;
use crate::models::span::Span;

///
/// Orientation of a feature on the reference.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = FeatureError;

    /// Accepts `+`/`-` as well as the integer codes `0` (forward) and `1` (reverse).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "0" => Ok(Strand::Forward),
            "-" | "1" => Ok(Strand::Reverse),
            other => Err(FeatureError::InvalidStrand(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// A gene, exon or transcript as handed out by the feature index.
///
/// `feature_id` is the identity of the element itself: the gene id for a gene,
/// the exon id for an exon. `gene_id` and `transcript_id` name its parents.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    pub gene_id: String,
    pub feature_id: String,
    pub transcript_id: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
}

impl Feature {
    pub fn new(
        gene_id: &str,
        feature_id: &str,
        transcript_id: &str,
        start: u32,
        end: u32,
        strand: Strand,
    ) -> Result<Self, FeatureError> {
        if start > end {
            return Err(FeatureError::InvalidSpan { start, end });
        }
        Ok(Feature {
            gene_id: gene_id.to_string(),
            feature_id: feature_id.to_string(),
            transcript_id: transcript_id.to_string(),
            start,
            end,
            strand,
        })
    }

    /// Gene-level feature: `feature_id` and `gene_id` are the same.
    pub fn gene(gene_id: &str, start: u32, end: u32, strand: Strand) -> Result<Self, FeatureError> {
        Feature::new(gene_id, gene_id, "", start, end, strand)
    }

    /// Zero for an inverted span built by hand.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn span(&self) -> (u32, u32) {
        (self.start, self.end)
    }
}

impl Span for Feature {
    fn start(&self) -> u32 {
        self.start
    }

    fn end(&self) -> u32 {
        self.end
    }
}
