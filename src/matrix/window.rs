// File: window.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

use std::ops::Range;

use crate::matrix::distance_matrix::DistanceMatrix;
use crate::structure::atom::Atom;

/// A square sub-block of a distance matrix.
///
/// Windows do not own any data; they are positions inside the parent
/// `DistanceMatrix` that created them and must be read through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixWindow {
    pub row: usize,
    pub col: usize,
    pub size: usize,
}

impl MatrixWindow {
    pub fn new(row: usize, col: usize, size: usize) -> Self {
        MatrixWindow { row, col, size }
    }

    pub fn row_range(&self) -> Range<usize> {
        self.row..self.row + self.size
    }

    pub fn col_range(&self) -> Range<usize> {
        self.col..self.col + self.size
    }

    pub fn row_atoms<'a>(&self, parent: &'a DistanceMatrix) -> &'a [Atom] {
        &parent.atoms()[self.row_range()]
    }

    pub fn col_atoms<'a>(&self, parent: &'a DistanceMatrix) -> &'a [Atom] {
        &parent.atoms()[self.col_range()]
    }

    /// Row and column chains are the same chain.
    pub fn is_intra_chain(&self, parent: &DistanceMatrix) -> bool {
        parent.atoms()[self.row].chain == parent.atoms()[self.col].chain
    }

    /// Copy of the window cells, row-major.
    pub fn block(&self, parent: &DistanceMatrix) -> WindowBlock {
        let mut values = Vec::with_capacity(self.size * self.size);
        for i in self.row_range() {
            for j in self.col_range() {
                values.push(parent.get(i, j));
            }
        }
        WindowBlock { size: self.size, values }
    }

    /// "A12-A16:B3-B7" style description used in reports.
    pub fn describe(&self, parent: &DistanceMatrix) -> String {
        let rows = self.row_atoms(parent);
        let cols = self.col_atoms(parent);
        match (rows.first(), rows.last(), cols.first(), cols.last()) {
            (Some(r0), Some(r1), Some(c0), Some(c1)) => {
                format!("{}-{}:{}-{}", r0.label(), r1.label(), c0.label(), c1.label())
            }
            _ => "NA".to_string(),
        }
    }
}

/// Dense copy of a window's distances.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBlock {
    pub size: usize,
    pub values: Vec<f32>,
}

impl WindowBlock {
    pub fn from_values(size: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), size * size, "block must be size x size");
        WindowBlock { size, values }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }
}
