//! # Linear program representations
//!
//! The same program is held twice: once exactly over the rational type and once in floating
//! point. Both are instances of the same generic structure and are kept in lock-step by the
//! refinement driver.
pub mod elements;
pub mod general_form;
pub mod solution;
