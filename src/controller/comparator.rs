// File: comparator.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Window against window comparison with an iteration budget.
//! Each iteration reads the candidate window under a different registration
//! and the lowest likeness wins.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::controller::metric::Metric;
use crate::controller::result::DistanceMatrixResult;
use crate::matrix::{DistanceMatrix, MatrixWindow, WindowBlock};
use crate::structure::atom::Atom;

/// How the cells of a candidate window are paired with the query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registration {
    Direct,
    /// Row and column atoms swapped
    Transposed,
    /// Both axes read backwards
    Reversed,
    TransposedReversed,
}

impl Registration {
    pub const ALL: [Registration; 4] = [
        Registration::Direct,
        Registration::Transposed,
        Registration::Reversed,
        Registration::TransposedReversed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Registration::Direct => "direct",
            Registration::Transposed => "transposed",
            Registration::Reversed => "reversed",
            Registration::TransposedReversed => "transposed_reversed",
        }
    }

    pub fn apply(&self, block: &WindowBlock) -> WindowBlock {
        let n = block.size;
        let mut values = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let v = match self {
                    Registration::Direct => block.get(i, j),
                    Registration::Transposed => block.get(j, i),
                    Registration::Reversed => block.get(n - 1 - i, n - 1 - j),
                    Registration::TransposedReversed => block.get(n - 1 - j, n - 1 - i),
                };
                values.push(v);
            }
        }
        WindowBlock { size: n, values }
    }

    /// Candidate atoms in the order that pairs them with the query's row atoms
    /// followed by its column atoms.
    pub fn candidate_atoms(&self, window: &MatrixWindow, parent: &DistanceMatrix) -> Vec<Atom> {
        let rows = window.row_atoms(parent);
        let cols = window.col_atoms(parent);
        match self {
            Registration::Direct => rows.iter().chain(cols.iter()).copied().collect(),
            Registration::Transposed => cols.iter().chain(rows.iter()).copied().collect(),
            Registration::Reversed => rows.iter().rev().chain(cols.iter().rev()).copied().collect(),
            Registration::TransposedReversed => {
                cols.iter().rev().chain(rows.iter().rev()).copied().collect()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowComparator {
    metric: Metric,
    registrations: Vec<Registration>,
}

impl WindowComparator {
    /// The first iteration is always direct. Later iterations visit the other
    /// registrations in an order fixed by `seed`. The budget is capped at the
    /// number of distinct registrations.
    pub fn new(metric: Metric, iterations: usize, seed: u64) -> Self {
        let mut rest = Registration::ALL[1..].to_vec();
        let mut rng = StdRng::seed_from_u64(seed);
        rest.shuffle(&mut rng);
        let budget = iterations.clamp(1, Registration::ALL.len());
        let mut registrations = vec![Registration::Direct];
        registrations.extend(rest.into_iter().take(budget - 1));
        WindowComparator { metric, registrations }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Best (likeness, 1-based iteration, registration). Ties keep the earlier
    /// iteration. `None` when no registration gives a finite score.
    pub fn compare(&self, query: &WindowBlock, candidate: &WindowBlock) -> Option<(f32, usize, Registration)> {
        let registered: Vec<WindowBlock> = self
            .registrations
            .iter()
            .map(|registration| registration.apply(candidate))
            .collect();
        self.best_registration(query, registered.iter())
    }

    // `registered` yields the candidate under each registration, in iteration order
    fn best_registration<'b>(
        &self, query: &WindowBlock, registered: impl Iterator<Item = &'b WindowBlock>,
    ) -> Option<(f32, usize, Registration)> {
        let mut best: Option<(f32, usize, Registration)> = None;
        for (i, block) in registered.enumerate() {
            let likeness = self.metric.likeness(query, block);
            if !likeness.is_finite() {
                continue;
            }
            if best.map_or(true, |(current, _, _)| likeness < current) {
                best = Some((likeness, i + 1, self.registrations[i]));
            }
        }
        best
    }

    /// Compare every query window with every candidate window and keep the
    /// `top` best pairs in ascending likeness. Equal scores keep query window
    /// order, then candidate window order. Pairs without a finite score are skipped.
    pub fn compare_all_windows(
        &self, query: &DistanceMatrix, entry: usize, candidate: &DistanceMatrix, top: usize,
    ) -> Vec<DistanceMatrixResult> {
        let mut best: Vec<DistanceMatrixResult> = Vec::with_capacity(top + 1);
        if top == 0 {
            return best;
        }
        // Registered candidate blocks, indexed [registration][window]
        let candidate_blocks: Vec<Vec<WindowBlock>> = self
            .registrations
            .iter()
            .map(|registration| {
                candidate
                    .windows()
                    .iter()
                    .map(|window| registration.apply(&window.block(candidate)))
                    .collect()
            })
            .collect();

        for query_window in query.windows() {
            let query_block = query_window.block(query);
            for (c, candidate_window) in candidate.windows().iter().enumerate() {
                let registered = candidate_blocks.iter().map(|blocks| &blocks[c]);
                let Some((likeness, iteration, registration)) =
                    self.best_registration(&query_block, registered)
                else {
                    continue;
                };
                if best.len() == top && likeness >= best[top - 1].likeness {
                    continue;
                }
                let at = best.partition_point(|r| r.likeness <= likeness);
                best.insert(at, DistanceMatrixResult::new(
                    *query_window, entry, *candidate_window, self.metric,
                    likeness, iteration, registration,
                ));
                best.truncate(top);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(chain: u8, len: usize, offset: f32) -> Vec<Atom> {
        (0..len)
            .map(|i| {
                let t = i as f32;
                Atom::new(
                    offset + 3.8 * t, (t * 1.3).sin() * 3.0, (t * 0.7).cos() * 2.0 + offset * 0.3,
                    *b" CA ", i as u64 + 1, *b"GLY", i as i32 + 1, chain, 0.0,
                )
            })
            .collect()
    }

    fn matrix(first: Vec<Atom>, second: Vec<Atom>, window: usize) -> DistanceMatrix {
        let mut dm = DistanceMatrix::new();
        dm.add_atoms(first);
        dm.add_atoms(second);
        dm.set_window_size(window);
        dm.create_matrix_windows();
        dm
    }

    #[test]
    fn test_registration_apply() {
        let block = WindowBlock::from_values(2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Registration::Direct.apply(&block), block);
        assert_eq!(Registration::Transposed.apply(&block).values, vec![1.0, 3.0, 2.0, 4.0]);
        assert_eq!(Registration::Reversed.apply(&block).values, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(Registration::TransposedReversed.apply(&block).values, vec![4.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_registrations_are_seeded() {
        let a = WindowComparator::new(Metric::Standard, 4, 7);
        let b = WindowComparator::new(Metric::Standard, 4, 7);
        assert_eq!(a.registrations(), b.registrations());
        assert_eq!(a.registrations()[0], Registration::Direct);
        assert_eq!(a.registrations().len(), 4);
        // over budget is capped, zero is treated as one
        assert_eq!(WindowComparator::new(Metric::Standard, 10, 0).registrations().len(), 4);
        assert_eq!(WindowComparator::new(Metric::Standard, 0, 0).registrations(), &[Registration::Direct]);
    }

    #[test]
    fn test_identical_matrices_match_at_zero() {
        let query = matrix(chain(b'A', 8, 0.0), chain(b'B', 8, 12.0), 4);
        let candidate = query.clone();
        let comparator = WindowComparator::new(Metric::Standard, 1, 0);
        let results = comparator.compare_all_windows(&query, 3, &candidate, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].likeness, 0.0);
        assert_eq!(results[0].entry, 3);
        assert_eq!(results[0].query_window, results[0].candidate_window);
        assert_eq!(results[0].iteration, 1);
    }

    #[test]
    fn test_top_results_are_sorted() {
        let query = matrix(chain(b'A', 8, 0.0), chain(b'B', 8, 12.0), 3);
        let candidate = matrix(chain(b'A', 9, 1.0), chain(b'B', 7, 15.0), 3);
        let comparator = WindowComparator::new(Metric::MinDistance, 1, 0);
        let results = comparator.compare_all_windows(&query, 0, &candidate, 5);
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].likeness <= pair[1].likeness);
        }
        assert!(comparator.compare_all_windows(&query, 0, &candidate, 0).is_empty());
    }

    #[test]
    fn test_swapped_chains_found_by_transposed_registration() {
        let a = chain(b'A', 6, 0.0);
        let b = chain(b'B', 6, 12.0);
        let query = matrix(a.clone(), b.clone(), 6);
        // Same geometry stored with chains in the other order
        let b_first: Vec<Atom> = b.iter().map(|atom| Atom { chain: b'A', ..*atom }).collect();
        let a_second: Vec<Atom> = a.iter().map(|atom| Atom { chain: b'B', ..*atom }).collect();
        let candidate = matrix(b_first, a_second, 6);

        let direct_only = WindowComparator::new(Metric::Standard, 1, 0);
        let direct = direct_only.compare_all_windows(&query, 0, &candidate, 1);
        assert!(direct[0].likeness > 1.0);

        let full = WindowComparator::new(Metric::Standard, 4, 0);
        let best = full.compare_all_windows(&query, 0, &candidate, 1);
        assert!(best[0].likeness < 1e-4);
        assert_eq!(best[0].registration, Registration::Transposed);
        assert!(best[0].iteration > 1);
    }

    #[test]
    fn test_compare_is_deterministic() {
        let x = WindowBlock::from_values(2, vec![0.0, 5.0, 6.0, 0.0]);
        let y = WindowBlock::from_values(2, vec![0.0, 6.0, 5.0, 0.0]);
        let comparator = WindowComparator::new(Metric::Standard, 4, 42);
        let first = comparator.compare(&x, &y).unwrap();
        assert_eq!(Some(first), comparator.compare(&x, &y));
        assert_eq!(first.0, 0.0);
        assert!(first.1 > 1);
        // equal scores keep the first iteration
        let symmetric = WindowBlock::from_values(2, vec![0.0, 5.0, 5.0, 0.0]);
        assert_eq!(comparator.compare(&symmetric, &symmetric), Some((0.0, 1, Registration::Direct)));
        let broken = WindowBlock::from_values(2, vec![0.0, f32::NAN, f32::NAN, 0.0]);
        assert_eq!(comparator.compare(&x, &broken), None);
    }

    #[test]
    fn test_non_finite_candidate_does_not_displace_best() {
        let a = chain(b'A', 8, 0.0);
        let mut b = chain(b'B', 8, 12.0);
        let query = matrix(a.clone(), b.clone(), 4);
        b[2].x = f32::NAN;
        let candidate = matrix(a, b, 4);

        let comparator = WindowComparator::new(Metric::Standard, 4, 0);
        let results = comparator.compare_all_windows(&query, 0, &candidate, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].likeness, 0.0);
        // windows covering B3 are never reported
        let with_nan = comparator.compare_all_windows(&query, 0, &candidate, 100);
        assert!(with_nan.iter().all(|r| r.likeness.is_finite()));
        assert!(with_nan.iter().all(|r| !(r.candidate_window.col..r.candidate_window.col + 4).contains(&10)));
    }
}
