//! # Algorithms
//!
//! The refinement driver in [`refinement`] produces exact results by repeatedly invoking a
//! floating-point simplex through the collaborator contract defined in [`simplex`].
pub mod refinement;
pub mod simplex;
