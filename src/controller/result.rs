// File: result.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Result collection, alignment filtering and reporting for one comparison round.

use std::cmp::Ordering;
use std::io::Write;

use rustc_hash::FxHashMap;

use crate::controller::comparator::Registration;
use crate::controller::metric::Metric;
use crate::index::database::DistanceMatrixDatabase;
use crate::matrix::{DistanceMatrix, MatrixWindow};
use crate::structure::atom::Atom;
use crate::structure::coordinate::Coordinate;
use crate::structure::qcp::{superpose, Superposition};
use crate::utils::log::Verbosity;

pub const DISTANCE_MATRIX_RESULT_HEADER: &str = "rank\tquery\tquery_row\tquery_col\tquery_row_res\tquery_col_res\ttarget\ttarget_row\ttarget_col\ttarget_row_res\ttarget_col_res\tmetric\tlikeness\titeration\tregistration\trmsd";
pub const SUPERPOSITION_HEADER: &str = "u00\tu01\tu02\tu10\tu11\tu12\tu20\tu21\tu22\tt0\tt1\tt2";

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrixResult {
    pub query_window: MatrixWindow,
    /// Index of the database entry holding `candidate_window`
    pub entry: usize,
    pub candidate_window: MatrixWindow,
    pub metric: Metric,
    pub likeness: f32,
    /// 1-based iteration that produced the score
    pub iteration: usize,
    pub registration: Registration,
    pub superposition: Option<Superposition>,
}

impl DistanceMatrixResult {
    pub fn new(
        query_window: MatrixWindow, entry: usize, candidate_window: MatrixWindow,
        metric: Metric, likeness: f32, iteration: usize, registration: Registration,
    ) -> Self {
        Self {
            query_window,
            entry,
            candidate_window,
            metric,
            likeness,
            iteration,
            registration,
            superposition: None,
        }
    }

    pub fn rmsd(&self) -> Option<f32> {
        self.superposition.map(|s| s.rmsd)
    }
}

/// A batch is kept when any member is within `tolerance`. `None` accepts any non-empty batch.
pub fn accept_batch(batch: &[DistanceMatrixResult], tolerance: Option<f32>) -> bool {
    match tolerance {
        None => !batch.is_empty(),
        Some(tol) => batch.iter().any(|result| result.likeness <= tol),
    }
}

#[derive(Debug)]
pub struct ResultManager<'a> {
    query: &'a DistanceMatrix,
    database: &'a DistanceMatrixDatabase,
    results: Vec<DistanceMatrixResult>,
    align_pdbs: bool,
    rmsd_tol: f32,
    superpose: bool,
    header: bool,
    finalized: bool,
    verbosity: Verbosity,
}

impl<'a> ResultManager<'a> {
    pub fn new(query: &'a DistanceMatrix, database: &'a DistanceMatrixDatabase) -> Self {
        ResultManager {
            query,
            database,
            results: Vec::new(),
            align_pdbs: false,
            rmsd_tol: 2.0,
            superpose: false,
            header: false,
            finalized: false,
            verbosity: Verbosity::default(),
        }
    }

    /// Stored as given. Duplicates are collapsed when the results are finalized.
    pub fn add_results(&mut self, results: Vec<DistanceMatrixResult>) {
        self.results.extend(results);
        self.finalized = false;
    }

    pub fn set_align_pdbs(&mut self, align_pdbs: bool) {
        self.align_pdbs = align_pdbs;
    }
    pub fn set_rmsd_tol(&mut self, rmsd_tol: f32) {
        self.rmsd_tol = rmsd_tol;
    }
    /// Report the superposition matrix. Implies alignment.
    pub fn set_superpose(&mut self, superpose: bool) {
        self.superpose = superpose;
        if superpose {
            self.align_pdbs = true;
        }
    }
    pub fn set_header(&mut self, header: bool) {
        self.header = header;
    }
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn results(&self) -> &[DistanceMatrixResult] {
        &self.results
    }
    pub fn len(&self) -> usize {
        self.results.len()
    }
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Deduplicate, align when enabled, and sort. Safe to call more than once.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.deduplicate();
        if self.align_pdbs {
            self.align();
        }
        self.sort();
        self.finalized = true;
    }

    // Keep the lowest likeness per (entry, query window, candidate window); first wins on ties
    fn deduplicate(&mut self) {
        let mut seen: FxHashMap<(usize, MatrixWindow, MatrixWindow), usize> = FxHashMap::default();
        let mut kept: Vec<DistanceMatrixResult> = Vec::with_capacity(self.results.len());
        for result in self.results.drain(..) {
            let key = (result.entry, result.query_window, result.candidate_window);
            match seen.get(&key) {
                Some(&idx) => {
                    if result.likeness < kept[idx].likeness {
                        kept[idx] = result;
                    }
                }
                None => {
                    seen.insert(key, kept.len());
                    kept.push(result);
                }
            }
        }
        self.results = kept;
    }

    // Superpose candidate window atoms onto query window atoms. Failed or
    // over-tolerance results are dropped; the rest of the batch continues.
    fn align(&mut self) {
        let query = self.query;
        let database = self.database;
        let rmsd_tol = self.rmsd_tol;
        let verbosity = self.verbosity;
        let before = self.results.len();
        self.results.retain_mut(|result| {
            let Some(candidate) = database.get(result.entry) else {
                verbosity.warn(&format!("Database entry {} not found; result dropped", result.entry));
                return false;
            };
            let fixed: Vec<Coordinate> = result
                .query_window
                .row_atoms(query)
                .iter()
                .chain(result.query_window.col_atoms(query).iter())
                .map(|atom| atom.get_coordinate())
                .collect();
            let moving: Vec<Coordinate> = result
                .registration
                .candidate_atoms(&result.candidate_window, candidate)
                .iter()
                .map(|atom| atom.get_coordinate())
                .collect();
            match superpose(&fixed, &moving) {
                Ok(superposition) => {
                    if superposition.rmsd > rmsd_tol {
                        verbosity.debug(&format!(
                            "{} {} RMSD {:.3} above tolerance {:.3}",
                            candidate.source_id(), result.candidate_window.describe(candidate),
                            superposition.rmsd, rmsd_tol
                        ));
                        return false;
                    }
                    result.superposition = Some(superposition);
                    true
                }
                Err(e) => {
                    verbosity.warn(&format!(
                        "{} {}: {}; result dropped",
                        candidate.source_id(), result.candidate_window.describe(candidate), e
                    ));
                    false
                }
            }
        });
        verbosity.info(&format!(
            "{} of {} results passed alignment", self.results.len(), before
        ));
    }

    // Stable: ascending likeness, then ascending RMSD when present
    fn sort(&mut self) {
        self.results.sort_by(|a, b| {
            a.likeness.total_cmp(&b.likeness).then_with(|| match (a.rmsd(), b.rmsd()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            })
        });
    }

    pub fn write_results<W: Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.finalize();
        if self.header {
            if self.superpose {
                writeln!(writer, "{}\t{}", DISTANCE_MATRIX_RESULT_HEADER, SUPERPOSITION_HEADER)?;
            } else {
                writeln!(writer, "{}", DISTANCE_MATRIX_RESULT_HEADER)?;
            }
        }
        for (rank, result) in self.results.iter().enumerate() {
            let Some(candidate) = self.database.get(result.entry) else {
                continue;
            };
            let line = self.format_line(rank + 1, result, candidate);
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }

    pub fn print_results(&mut self) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_results(&mut handle)
    }

    fn format_line(&self, rank: usize, result: &DistanceMatrixResult, candidate: &DistanceMatrix) -> String {
        let (q, c) = (&result.query_window, &result.candidate_window);
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{}\t{}\t{}",
            rank,
            self.query.source_id(),
            q.row, q.col,
            first_label(q.row_atoms(self.query)),
            first_label(q.col_atoms(self.query)),
            candidate.source_id(),
            c.row, c.col,
            first_label(c.row_atoms(candidate)),
            first_label(c.col_atoms(candidate)),
            result.metric,
            result.likeness,
            result.iteration,
            result.registration.name(),
            result.rmsd().map_or("NA".to_string(), |rmsd| format!("{:.3}", rmsd)),
        );
        if self.superpose {
            match &result.superposition {
                Some(s) => {
                    for row in s.rot.iter() {
                        for value in row.iter() {
                            line.push_str(&format!("\t{:.4}", value));
                        }
                    }
                    for value in s.tran.iter() {
                        line.push_str(&format!("\t{:.4}", value));
                    }
                }
                None => line.push_str(&"\tNA".repeat(12)),
            }
        }
        line
    }
}

fn first_label(atoms: &[Atom]) -> String {
    atoms.first().map_or("NA".to_string(), |atom| atom.label())
}
