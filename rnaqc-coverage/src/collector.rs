use std::cell::RefCell;
use std::rc::Rc;

use rnaqc_core::models::DefaultMap;

/// Per-exon totals owned by the caller and shared between collectors.
pub type SharedTotals = Rc<RefCell<DefaultMap<f64>>>;

pub fn shared_totals() -> SharedTotals {
    Rc::new(RefCell::new(DefaultMap::new()))
}

///
/// Gathers `(exon, coverage)` observations for each gene, then folds a finished
/// gene into a shared per-exon total, either by magnitude ([`Collector::collect`])
/// or by presence ([`Collector::collect_single`]).
///
/// Folding does not clear the stored observations: collecting the same gene
/// twice into the same target counts it twice.
///
pub struct Collector {
    target: SharedTotals,
    data: DefaultMap<Vec<(String, f64)>>,
    dirty: bool,
    total: f64,
}

impl Collector {
    pub fn new(target: SharedTotals) -> Self {
        Collector {
            target,
            data: DefaultMap::new(),
            dirty: false,
            total: 0.0,
        }
    }

    /// Record coverage for an exon of a gene. Non-positive coverage is ignored.
    pub fn add(&mut self, gene_id: &str, exon_id: &str, coverage: f64) {
        if coverage > 0.0 {
            self.data
                .entry_or_default(gene_id)
                .push((exon_id.to_string(), coverage));
            self.dirty = true;
        }
    }

    /// Add every stored coverage value of the gene into the target and the grand total.
    pub fn collect(&mut self, gene_id: &str) {
        let Some(entries) = self.data.get(gene_id) else {
            return;
        };
        let mut target = self.target.borrow_mut();
        for (exon_id, coverage) in entries {
            *target.entry_or_default(exon_id) += coverage;
            self.total += coverage;
        }
    }

    /// Add 1.0 per stored entry of the gene into the target, whatever its coverage.
    pub fn collect_single(&mut self, gene_id: &str) {
        let Some(entries) = self.data.get(gene_id) else {
            return;
        };
        let mut target = self.target.borrow_mut();
        for (exon_id, _) in entries {
            *target.entry_or_default(exon_id) += 1.0;
        }
    }

    pub fn query_gene(&self, gene_id: &str) -> bool {
        self.data.get(gene_id).is_some_and(|entries| !entries.is_empty())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn sum(&self) -> f64 {
        self.total
    }

    pub fn target(&self) -> &SharedTotals {
        &self.target
    }
}
