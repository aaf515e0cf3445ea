pub mod allocator;
pub mod filters;
pub mod generator;
pub mod metadata;
pub mod utils;

pub use allocator::*;
pub use generator::*;
pub use metadata::*;
