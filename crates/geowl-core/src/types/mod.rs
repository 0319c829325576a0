mod geo;
mod verdict;

pub use geo::*;
pub use verdict::*;
