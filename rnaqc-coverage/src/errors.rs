use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Block start {start} lies before exon {exon_id} start {exon_start}")]
    NegativeOffset {
        exon_id: String,
        start: u32,
        exon_start: u32,
    },

    #[error("Empty coverage block [{start}, {end}) for exon {exon_id}")]
    EmptyBlock { exon_id: String, start: u32, end: u32 },

    #[error("Gene {gene_id} was already committed since the last reset")]
    AlreadyCommitted { gene_id: String },

    #[error("Gene {gene_id} commits coverage to exon {exon_id}, which was already dumped")]
    CommitAfterDump { exon_id: String, gene_id: String },

    #[error("Gene {gene_id} reappears on line {line} after it was finished; input must be grouped by gene")]
    UnsortedInput { gene_id: String, line: usize },

    #[error("Coverage output sink is closed")]
    SinkClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CoverageResult<T> = std::result::Result<T, CoverageError>;
