pub mod default_map;
pub mod feature;
pub mod span;

// re-export for cleaner imports
pub use self::default_map::DefaultMap;
pub use self::feature::{Feature, Strand};
pub use self::span::{Span, overlap_length};
