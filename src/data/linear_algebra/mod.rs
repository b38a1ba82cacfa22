//! # Linear algebra primitives
//!
//! Linear algebra primitives used to represent data in either a dense or a sparse format.
pub mod vector;

/// Inner value for the sparse vector type and the sparse matrix slices.
pub type SparseTuple<F> = (usize, F);
/// Shorthand for the backing collection of sparse data structures.
pub type SparseTupleVec<F> = Vec<SparseTuple<F>>;
