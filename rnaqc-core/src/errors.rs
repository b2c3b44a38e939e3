use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid coordinate `{value}` in column {column}")]
    InvalidCoordinate { column: usize, value: String },

    #[error("Invalid feature span: start {start} > end {end}")]
    InvalidSpan { start: u32, end: u32 },

    #[error("Expected {expected} columns, found {found}")]
    MissingColumns { expected: usize, found: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
