pub mod summary;
pub mod text_grid;

pub use summary::{ConversionSummary, TierSummary};
pub use text_grid::TextGridSink;
