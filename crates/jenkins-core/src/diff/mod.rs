pub mod operations;
pub mod types;

pub use operations::diff;
pub use types::StatusChange;
