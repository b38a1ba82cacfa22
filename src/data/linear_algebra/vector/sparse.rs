//! # Sparse vector
//!
//! Wrapping a `Vec<(usize, _)>`, fixed size. Indices start at `0` and the tuples are kept sorted
//! by index.
use std::fmt::Debug;
use std::ops::{Deref, MulAssign};
use std::slice::Iter;

use num::{One, Zero};

use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::Vector;

/// A sparse vector using a `Vec` with (index, value) combinations as back-end.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Sparse<F> {
    data: Vec<SparseTuple<F>>,
    len: usize,
}

impl<F> Sparse<F> {
    fn get_data_index(&self, i: usize) -> Result<usize, usize> {
        self.data.binary_search_by_key(&i, |&(index, _)| index)
    }

    /// Remove all explicitly stored values, keeping the dimension.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append a value with an index larger than all currently stored indices.
    ///
    /// # Arguments
    ///
    /// * `index`: Index of the value, beyond the currently largest stored index.
    /// * `value`: Nonzero value to store.
    pub fn push(&mut self, index: usize, value: F) {
        debug_assert!(index < self.len);
        debug_assert!(self.data.last().map_or(true, |&(largest, _)| largest < index));

        self.data.push((index, value));
    }

    /// Multiply each explicitly stored element by a value.
    pub fn element_wise_multiply(&mut self, value: &F)
    where
        for<'r> F: MulAssign<&'r F>,
    {
        for (_, element) in &mut self.data {
            *element *= value;
        }
    }
}

impl<F> Sparse<F>
where
    F: One,
{
    /// Create a sparse representation of standard basis unit vector e_i.
    ///
    /// # Arguments
    ///
    /// * `i`: Only index where there should be a 1. Note that indexing starts at zero, and runs
    /// until (not through) `len`.
    /// * `len`: Size of the vector.
    #[must_use]
    pub fn standard_basis_vector(i: usize, len: usize) -> Self {
        debug_assert!(i < len);

        Self { data: vec![(i, F::one())], len }
    }
}

impl<F> Deref for Sparse<F> {
    type Target = [SparseTuple<F>];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<F: PartialEq + Debug + Zero> Vector<F> for Sparse<F> {
    type Inner = SparseTuple<F>;

    /// Create a vector of length `len` from `data`.
    ///
    /// Requires that values close to zero are already filtered.
    fn new(data: Vec<Self::Inner>, len: usize) -> Self {
        debug_assert!(data.iter().all(|&(i, _)| i < len));
        debug_assert!(data.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(data.iter().all(|(_, v)| !v.is_zero()));

        Self { data, len }
    }

    fn get(&self, index: usize) -> Option<&F> {
        debug_assert!(index < self.len);

        self.get_data_index(index).ok().map(|i| &self.data[i].1)
    }

    fn set(&mut self, index: usize, value: F) {
        debug_assert!(index < self.len);

        if value.is_zero() {
            if let Ok(i) = self.get_data_index(index) {
                self.data.remove(i);
            }
        } else {
            match self.get_data_index(index) {
                Ok(i) => self.data[i].1 = value,
                Err(i) => self.data.insert(i, (index, value)),
            }
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    /// The number of explicitly stored nonzeros.
    fn size(&self) -> usize {
        self.data.len()
    }

    fn iter(&self) -> Iter<'_, Self::Inner> {
        self.data.iter()
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::vector::{SparseVector, Vector};
    use crate::data::number_types::rational::Rational;
    use crate::RAT;

    #[test]
    fn push_and_get() {
        let mut vector: SparseVector<Rational> = SparseVector::new(vec![], 5);
        vector.push(1, RAT!(2));
        vector.push(4, RAT!(-1));

        assert_eq!(vector.size(), 2);
        assert_eq!(vector.get(1), Some(&RAT!(2)));
        assert_eq!(vector.get(2), None);

        vector.clear();
        assert_eq!(vector.size(), 0);
        assert_eq!(vector.len(), 5);
    }

    #[test]
    fn set() {
        let mut vector = SparseVector::new(vec![(1, RAT!(2))], 3);
        vector.set(0, RAT!(1));
        vector.set(1, RAT!(0));

        assert_eq!(vector, SparseVector::new(vec![(0, RAT!(1))], 3));
    }

    #[test]
    fn standard_basis_vector() {
        let vector: SparseVector<Rational> = SparseVector::standard_basis_vector(1, 3);

        assert_eq!(vector.get(1), Some(&RAT!(1)));
        assert_eq!(vector.size(), 1);
    }
}
