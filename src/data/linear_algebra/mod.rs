//! # Linear algebra primitives
//!
//! Dense matrix and vector types. The constraint systems this engine sees are
//! built from strategy spaces of finite games; they are small and dense, so no
//! sparse storage is maintained.
pub mod matrix;
pub mod vector;

pub use matrix::DenseMatrix;
pub use vector::Dense as DenseVector;
