pub mod correlation;
pub mod projection;

pub use correlation::{correlate, Correlation};
pub use projection::{emit_tiers, project_tiers};
