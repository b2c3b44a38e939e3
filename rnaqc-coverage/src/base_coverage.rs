use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use log::debug;

use rnaqc_core::models::{DefaultMap, Feature};
use rnaqc_core::utils::{DynWriter, FinishWrite, get_dynamic_writer};

use crate::errors::{CoverageError, CoverageResult};

///
/// One block of coverage, positioned relative to the start of its exon.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEntry {
    pub offset: u32,
    pub length: u32,
    pub transcript_id: String,
    pub owner_exon_id: String,
    /// Filled in when the entry is committed.
    pub owner_gene_id: Option<String>,
}

///
/// Base level coverage recorder.
///
/// Blocks are cached per gene while the gene is in flight, moved into per-exon
/// storage by [`BaseCoverage::commit`], and written out and freed per exon by
/// [`BaseCoverage::dump`]. Each dump line is
/// `transcript_id \t exon_id \t offset \t length`.
///
/// Ordering is the caller's job: an exon may only be dumped once every gene that
/// contributes to it has been committed. A commit that reaches an exon which was
/// already dumped fails with [`CoverageError::CommitAfterDump`] instead of
/// silently dropping the coverage. To make that check, the id of every dumped
/// exon is kept for the lifetime of the recorder, so memory grows with the number
/// of distinct exons written, not with the blocks seen.
///
pub struct BaseCoverage<W: Write> {
    cache: DefaultMap<Vec<CoverageEntry>>,
    coverage: DefaultMap<Vec<CoverageEntry>>,
    committed: HashSet<String>,
    dumped: HashSet<String>,
    writer: Option<W>,
}

impl BaseCoverage<DynWriter> {
    /// Open a sink at `path` (gzip compressed for `.gz`).
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(BaseCoverage::new(get_dynamic_writer(path)?))
    }
}

impl<W: Write> BaseCoverage<W> {
    pub fn new(writer: W) -> Self {
        BaseCoverage {
            cache: DefaultMap::new(),
            coverage: DefaultMap::new(),
            committed: HashSet::new(),
            dumped: HashSet::new(),
            writer: Some(writer),
        }
    }

    /// Cache the block `[start, end)` of `exon` under its gene.
    pub fn add(&mut self, exon: &Feature, start: u32, end: u32) -> CoverageResult<()> {
        if start < exon.start {
            return Err(CoverageError::NegativeOffset {
                exon_id: exon.feature_id.clone(),
                start,
                exon_start: exon.start,
            });
        }
        if end <= start {
            return Err(CoverageError::EmptyBlock {
                exon_id: exon.feature_id.clone(),
                start,
                end,
            });
        }

        self.cache
            .entry_or_default(&exon.gene_id)
            .push(CoverageEntry {
                offset: start - exon.start,
                length: end - start,
                transcript_id: exon.transcript_id.clone(),
                owner_exon_id: exon.feature_id.clone(),
                owner_gene_id: None,
            });
        Ok(())
    }

    /// Move a gene's cached blocks into per-exon storage.
    ///
    /// The cache itself is left alone until [`BaseCoverage::reset`].
    pub fn commit(&mut self, gene_id: &str) -> CoverageResult<()> {
        if self.committed.contains(gene_id) {
            return Err(CoverageError::AlreadyCommitted {
                gene_id: gene_id.to_string(),
            });
        }

        let Some(entries) = self.cache.get(gene_id) else {
            self.committed.insert(gene_id.to_string());
            return Ok(());
        };

        if let Some(entry) = entries
            .iter()
            .find(|entry| self.dumped.contains(&entry.owner_exon_id))
        {
            return Err(CoverageError::CommitAfterDump {
                exon_id: entry.owner_exon_id.clone(),
                gene_id: gene_id.to_string(),
            });
        }

        for entry in entries {
            let mut committed = entry.clone();
            committed.owner_gene_id = Some(gene_id.to_string());
            self.coverage
                .entry_or_default(&entry.owner_exon_id)
                .push(committed);
        }
        self.committed.insert(gene_id.to_string());

        debug!("Committed {} coverage blocks for {}", entries.len(), gene_id);
        Ok(())
    }

    /// Drop every cached gene.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.committed.clear();
    }

    /// Write all committed blocks of `exon` to the sink and free them.
    ///
    /// Returns the number of lines written; an exon without committed coverage
    /// writes nothing. Blocks are only freed once every line is written, so on a
    /// write error they stay pending.
    pub fn dump(&mut self, exon: &Feature) -> CoverageResult<usize> {
        let writer = self.writer.as_mut().ok_or(CoverageError::SinkClosed)?;
        let entries = self
            .coverage
            .get(&exon.feature_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for entry in entries {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                entry.transcript_id, exon.feature_id, entry.offset, entry.length
            )?;
        }
        let written = entries.len();

        self.coverage.remove(&exon.feature_id);
        self.dumped.insert(exon.feature_id.clone());
        Ok(written)
    }

    pub fn cached(&self, gene_id: &str) -> &[CoverageEntry] {
        self.cache.get(gene_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pending(&self, exon_id: &str) -> &[CoverageEntry] {
        self.coverage.get(exon_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of exons holding committed, not yet dumped coverage.
    pub fn pending_exons(&self) -> usize {
        self.coverage.len()
    }
}

impl<W: FinishWrite> BaseCoverage<W> {
    /// Finish and release the sink. Only valid once.
    pub fn close(&mut self) -> CoverageResult<()> {
        let writer = self.writer.take().ok_or(CoverageError::SinkClosed)?;
        writer.finish_write()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{self, BufRead};

    use pretty_assertions::assert_eq;
    use rnaqc_core::models::Strand;
    use rnaqc_core::utils::get_dynamic_reader;
    use rstest::{fixture, rstest};
    use tempfile::tempdir;

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[fixture]
    fn exon() -> Feature {
        Feature::new("G1", "E1", "T1", 100, 200, Strand::Forward).unwrap()
    }

    fn lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[rstest]
    fn test_add_caches_relative_block(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.add(&exon, 110, 150).unwrap();

        assert_eq!(
            cov.cached("G1"),
            &[CoverageEntry {
                offset: 10,
                length: 40,
                transcript_id: "T1".to_string(),
                owner_exon_id: "E1".to_string(),
                owner_gene_id: None,
            }]
        );
    }

    #[rstest]
    fn test_add_rejects_negative_offset(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        assert!(matches!(
            cov.add(&exon, 90, 150),
            Err(CoverageError::NegativeOffset { start: 90, exon_start: 100, .. })
        ));
        assert!(matches!(
            cov.add(&exon, 150, 150),
            Err(CoverageError::EmptyBlock { .. })
        ));
        assert!(cov.cached("G1").is_empty());
    }

    #[rstest]
    fn test_commit_tags_owner_gene(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.add(&exon, 110, 150).unwrap();
        cov.commit("G1").unwrap();

        let pending = cov.pending("E1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].owner_exon_id, "E1");
        assert_eq!(pending[0].owner_gene_id.as_deref(), Some("G1"));
    }

    #[rstest]
    fn test_add_commit_dump(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.add(&exon, 110, 150).unwrap();
        cov.add(&exon, 160, 165).unwrap();
        cov.add(&exon, 100, 200).unwrap();
        cov.commit("G1").unwrap();

        assert_eq!(cov.dump(&exon).unwrap(), 3);
        // evicted
        assert_eq!(cov.dump(&exon).unwrap(), 0);
        assert_eq!(cov.pending_exons(), 0);

        let writer = cov.writer.take().unwrap();
        assert_eq!(
            lines(&writer),
            vec!["T1\tE1\t10\t40", "T1\tE1\t60\t5", "T1\tE1\t0\t100"]
        );
    }

    #[rstest]
    fn test_reset_prevents_recommit(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.add(&exon, 110, 150).unwrap();
        cov.commit("G1").unwrap();
        cov.reset();
        cov.commit("G1").unwrap();

        assert_eq!(cov.pending("E1").len(), 1);
        assert!(cov.cached("G1").is_empty());
    }

    #[rstest]
    fn test_double_commit_is_rejected(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.add(&exon, 110, 150).unwrap();
        cov.commit("G1").unwrap();
        assert!(matches!(
            cov.commit("G1"),
            Err(CoverageError::AlreadyCommitted { .. })
        ));
        assert_eq!(cov.pending("E1").len(), 1);
    }

    #[rstest]
    fn test_commit_after_dump_is_rejected(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.dump(&exon).unwrap();

        let other = Feature::new("G2", "E1", "T9", 100, 200, Strand::Forward).unwrap();
        cov.add(&other, 120, 130).unwrap();
        assert!(matches!(
            cov.commit("G2"),
            Err(CoverageError::CommitAfterDump { .. })
        ));
        assert_eq!(cov.pending_exons(), 0);
    }

    #[rstest]
    fn test_closed_sink(exon: Feature) {
        let mut cov = BaseCoverage::new(Vec::new());
        cov.close().unwrap();
        assert!(matches!(cov.dump(&exon), Err(CoverageError::SinkClosed)));
        assert!(matches!(cov.close(), Err(CoverageError::SinkClosed)));
    }

    #[rstest]
    fn test_failed_dump_keeps_blocks(exon: Feature) {
        let mut cov = BaseCoverage::new(FullDisk);
        cov.add(&exon, 110, 150).unwrap();
        cov.add(&exon, 160, 165).unwrap();
        cov.commit("G1").unwrap();

        assert!(matches!(cov.dump(&exon), Err(CoverageError::Io(_))));
        assert_eq!(cov.pending("E1").len(), 2);
        assert_eq!(cov.pending_exons(), 1);
    }

    #[rstest]
    fn test_close_finishes_gz_sink(exon: Feature) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.base_coverage.tsv.gz");

        let mut cov = BaseCoverage::from_path(&path).unwrap();
        cov.add(&exon, 110, 150).unwrap();
        cov.commit("G1").unwrap();
        cov.dump(&exon).unwrap();
        cov.close().unwrap();

        // read back while the recorder is still alive
        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["T1\tE1\t10\t40"]);
        assert!(matches!(cov.close(), Err(CoverageError::SinkClosed)));
    }
}
