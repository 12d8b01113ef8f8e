// Re-export glam for convenience
pub use glam::*;

// Sol math types
mod interval;
mod ray;
mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use vector::{Mix, VectorExt, NORMALIZE_EPSILON_SQ};
