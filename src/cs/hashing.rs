pub mod fnv;
pub mod quadratic;

pub use fnv::{fnv1a_64, FnvBuildHasher, FnvHasher};
pub use quadratic::{FnvQuadraticHashMap, QuadraticHashMap, QuadraticHashMapBuilder, SlotState};
