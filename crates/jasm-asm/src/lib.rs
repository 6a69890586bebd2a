pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{analyze, Analysis, Block, Edge, EdgeKind, EdgeOut, Report};
pub use model::{labels, listing, load_program, LabelKV, ListingLine};
