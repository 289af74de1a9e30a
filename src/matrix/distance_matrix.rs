// File: distance_matrix.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Pairwise distance matrix over an ordered atom set and its window partition.

use crate::matrix::window::MatrixWindow;
use crate::structure::atom::Atom;
use crate::utils::log::{print_log_msg, DBUG};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    atoms: Vec<Atom>,
    // Row-major, `size` x `size`. Empty until `create_distance_matrix` is called.
    distances: Vec<f32>,
    size: usize,
    window_size: usize,
    intra_chain: bool,
    // Chains the matrix was requested for, including chains without selected atoms
    source_chains: usize,
    source_id: String,
    debug: bool,
    windows: Vec<MatrixWindow>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        DistanceMatrix::default()
    }

    /// Rebuild a matrix from stored parts. Returns `None` if the distance block
    /// does not match the number of atoms.
    pub fn from_parts(
        source_id: String, window_size: usize, intra_chain: bool, source_chains: usize,
        atoms: Vec<Atom>, distances: Vec<f32>,
    ) -> Option<Self> {
        if distances.len() != atoms.len() * atoms.len() {
            return None;
        }
        let size = atoms.len();
        Some(DistanceMatrix {
            atoms,
            distances,
            size,
            window_size,
            intra_chain,
            source_chains,
            source_id,
            debug: false,
            windows: Vec::new(),
        })
    }

    /// Append an atom. Duplicates are allowed. Invalidates the computed matrix and windows.
    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
        self.distances.clear();
        self.size = 0;
        self.windows.clear();
    }

    pub fn add_atoms<I: IntoIterator<Item = Atom>>(&mut self, atoms: I) {
        for atom in atoms {
            self.add_atom(atom);
        }
    }

    pub fn create_distance_matrix(&mut self) {
        let n = self.atoms.len();
        let mut distances = vec![0.0f32; n * n];
        for i in 0..n {
            let a = self.atoms[i].get_coordinate();
            for j in (i + 1)..n {
                let d = a.distance(&self.atoms[j].get_coordinate());
                distances[i * n + j] = d;
                distances[j * n + i] = d;
            }
        }
        self.distances = distances;
        self.size = n;
    }

    pub fn is_computed(&self) -> bool {
        self.size == self.atoms.len() && self.distances.len() == self.size * self.size
    }

    /// Partition into all valid windows of the configured size.
    ///
    /// A window is valid when its row atoms form one contiguous run of a single
    /// chain and so do its column atoms. Only the upper triangle (row <= col) is
    /// enumerated. When the matrix was built from more than one chain and
    /// intra-chain comparison is off, windows whose rows and columns share a
    /// chain are dropped. A requested chain without selected atoms still counts.
    /// Returns the number of windows.
    pub fn create_matrix_windows(&mut self) -> usize {
        if !self.is_computed() {
            self.create_distance_matrix();
        }
        self.windows.clear();
        let n = self.atoms.len();
        let w = self.window_size;
        if w == 0 || w > n {
            return 0;
        }

        // run[i]: number of consecutive atoms from i that stay in the same chain
        let mut run = vec![1usize; n];
        for i in (0..n - 1).rev() {
            if self.atoms[i].chain == self.atoms[i + 1].chain {
                run[i] = run[i + 1] + 1;
            }
        }
        let exclude_intra = !self.intra_chain && self.source_chains() > 1;

        for row in 0..=(n - w) {
            if run[row] < w {
                continue;
            }
            for col in row..=(n - w) {
                if run[col] < w {
                    continue;
                }
                if exclude_intra && self.atoms[row].chain == self.atoms[col].chain {
                    continue;
                }
                self.windows.push(MatrixWindow::new(row, col, w));
            }
        }
        if self.debug {
            print_log_msg(DBUG, &format!(
                "{} windows of size {} created for {} ({} atoms)",
                self.windows.len(), w, self.source_id, n
            ));
        }
        self.windows.len()
    }

    pub fn num_chains(&self) -> usize {
        let mut chains: Vec<u8> = Vec::new();
        for atom in &self.atoms {
            if !chains.contains(&atom.chain) {
                chains.push(atom.chain);
            }
        }
        chains.len()
    }

    /// Number of chains the matrix was built from: the count set with
    /// `set_source_chains`, or the chains present among its atoms if larger.
    pub fn source_chains(&self) -> usize {
        self.source_chains.max(self.num_chains())
    }
    pub fn set_source_chains(&mut self, source_chains: usize) {
        self.source_chains = source_chains;
        self.windows.clear();
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.distances[i * self.size + j]
    }

    pub fn size(&self) -> usize {
        self.size
    }
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }
    pub fn windows(&self) -> &[MatrixWindow] {
        &self.windows
    }

    pub fn set_window_size(&mut self, window_size: usize) {
        self.window_size = window_size;
    }
    pub fn window_size(&self) -> usize {
        self.window_size
    }
    pub fn set_intra_chain(&mut self, intra_chain: bool) {
        self.intra_chain = intra_chain;
    }
    pub fn intra_chain(&self) -> bool {
        self.intra_chain
    }
    pub fn set_source_id(&mut self, source_id: &str) {
        self.source_id = source_id.to_string();
    }
    pub fn source_id(&self) -> &str {
        &self.source_id
    }
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Residues placed on a slightly bent line so no two distances coincide by symmetry
    fn chain_atoms(chain: u8, len: usize, offset: f32) -> Vec<Atom> {
        (0..len)
            .map(|i| {
                let t = i as f32;
                Atom::new(
                    offset + 3.8 * t, (t * 0.9).sin() * 2.0, offset * 0.5 + t * t * 0.05,
                    *b" CA ", i as u64 + 1, *b"ALA", i as i32 + 1, chain, 0.0,
                )
            })
            .collect()
    }

    fn two_chain_matrix(len_a: usize, len_b: usize, window: usize, intra: bool) -> DistanceMatrix {
        let mut dm = DistanceMatrix::new();
        dm.add_atoms(chain_atoms(b'A', len_a, 0.0));
        dm.add_atoms(chain_atoms(b'B', len_b, 10.0));
        dm.set_window_size(window);
        dm.set_intra_chain(intra);
        dm.create_distance_matrix();
        dm
    }

    #[test]
    fn test_symmetric_zero_diagonal() {
        let dm = two_chain_matrix(6, 4, 3, false);
        let n = dm.size();
        assert_eq!(n, 10);
        for i in 0..n {
            assert_eq!(dm.get(i, i), 0.0);
            for j in 0..n {
                assert_eq!(dm.get(i, j), dm.get(j, i));
                assert!(dm.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn test_create_distance_matrix_is_idempotent() {
        let mut dm = two_chain_matrix(5, 5, 3, false);
        let first = dm.distances().to_vec();
        dm.create_distance_matrix();
        assert_eq!(first, dm.distances());
    }

    #[test]
    fn test_add_atom_invalidates() {
        let mut dm = two_chain_matrix(4, 4, 2, false);
        assert!(dm.create_matrix_windows() > 0);
        dm.add_atom(chain_atoms(b'B', 1, 40.0)[0]);
        assert!(!dm.is_computed());
        assert!(dm.windows().is_empty());
        // duplicates are allowed and grow the matrix
        let dup = dm.atoms()[0];
        dm.add_atom(dup);
        dm.create_distance_matrix();
        assert_eq!(dm.size(), 10);
    }

    #[test]
    fn test_windows_inside_bounds_and_inter_chain() {
        for (len_a, len_b, w) in [(10, 10, 5), (7, 3, 3), (4, 9, 2), (6, 6, 1)] {
            let mut dm = two_chain_matrix(len_a, len_b, w, false);
            let count = dm.create_matrix_windows();
            let n = dm.size();
            assert_eq!(count, (len_a - w + 1) * (len_b - w + 1));
            for window in dm.windows() {
                assert!(window.row + w <= n && window.col + w <= n);
                assert!(!window.is_intra_chain(&dm));
                let rows = window.row_atoms(&dm);
                assert!(rows.iter().all(|a| a.chain == rows[0].chain));
                let cols = window.col_atoms(&dm);
                assert!(cols.iter().all(|a| a.chain == cols[0].chain));
            }
        }
    }

    #[test]
    fn test_intra_chain_windows_when_enabled() {
        let mut dm = two_chain_matrix(4, 4, 2, true);
        let count = dm.create_matrix_windows();
        // A-A: 3*4/2 = 6 upper-triangle origins, same for B-B, plus 3*3 A-B
        assert_eq!(count, 6 + 6 + 9);
        assert!(dm.windows().iter().any(|w| w.is_intra_chain(&dm)));
    }

    #[test]
    fn test_window_larger_than_chains_gives_zero() {
        let mut dm = two_chain_matrix(4, 4, 5, false);
        assert_eq!(dm.create_matrix_windows(), 0);
        let mut dm = two_chain_matrix(4, 4, 9, true);
        assert_eq!(dm.create_matrix_windows(), 0);
    }

    #[test]
    fn test_single_chain_keeps_intra_windows() {
        let mut dm = DistanceMatrix::new();
        dm.add_atoms(chain_atoms(b'A', 6, 0.0));
        dm.set_window_size(3);
        assert_eq!(dm.create_matrix_windows(), 4 * 5 / 2);
    }

    #[test]
    fn test_repartition_after_window_size_change() {
        let mut dm = two_chain_matrix(10, 10, 5, false);
        assert_eq!(dm.create_matrix_windows(), 36);
        dm.set_window_size(4);
        assert_eq!(dm.create_matrix_windows(), 49);
        assert!(dm.windows().iter().all(|w| w.size == 4));
    }

    #[test]
    fn test_from_parts_validates_size() {
        let atoms = chain_atoms(b'A', 3, 0.0);
        assert!(DistanceMatrix::from_parts("x".to_string(), 2, false, 1, atoms.clone(), vec![0.0; 8]).is_none());
        let dm = DistanceMatrix::from_parts("x".to_string(), 2, false, 1, atoms, vec![0.0; 9]).unwrap();
        assert!(dm.is_computed());
        assert_eq!(dm.source_id(), "x");
    }

    #[test]
    fn test_requested_chain_without_atoms_keeps_exclusion() {
        // round A:B where chain B contributed no selected atoms
        let mut dm = DistanceMatrix::new();
        dm.add_atoms(chain_atoms(b'A', 10, 0.0));
        dm.set_window_size(5);
        assert_eq!(dm.source_chains(), 1);
        dm.set_source_chains(2);
        assert_eq!(dm.source_chains(), 2);
        assert_eq!(dm.create_matrix_windows(), 0);
        // intra-chain windows return when enabled
        dm.set_intra_chain(true);
        assert_eq!(dm.create_matrix_windows(), 6 * 7 / 2);
        // a smaller request never hides chains present among the atoms
        let mut two = two_chain_matrix(6, 6, 3, false);
        two.set_source_chains(1);
        assert_eq!(two.source_chains(), 2);
        assert_eq!(two.create_matrix_windows(), 16);
    }
}
