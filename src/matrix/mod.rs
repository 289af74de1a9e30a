//! Distance matrices and their window partition.

pub mod distance_matrix;
pub mod window;

pub use distance_matrix::DistanceMatrix;
pub use window::{MatrixWindow, WindowBlock};
