// File: search.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Search driver: one comparison round per chain pair of the query structure,
//! each round swept against every database entry.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::controller::comparator::WindowComparator;
use crate::controller::metric::Metric;
use crate::controller::result::{accept_batch, DistanceMatrixResult, ResultManager};
use crate::error::{Result, SearchError};
use crate::index::database::DistanceMatrixDatabase;
use crate::matrix::DistanceMatrix;
use crate::measure_time;
use crate::structure::core::Structure;
use crate::structure::io::pdb::read_structure_from_path;
use crate::utils::log::Verbosity;

pub const DEFAULT_RMSD_TOL: f32 = 2.0;
pub const DEFAULT_ATOM_NAME: &str = "CA";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub pdb_path: String,
    pub metric: Metric,
    pub window_size: usize,
    pub database_path: String,
    pub iterations: usize,
    pub top: usize,
    pub intra_chain: bool,
    /// `None` accepts every batch
    pub likeness_tol: Option<f32>,
    pub align: bool,
    pub rmsd_tol: f32,
    pub superpose: bool,
    pub seed: u64,
    pub atom_name: String,
    pub header: bool,
    pub output: Option<String>,
    pub verbosity: Verbosity,
}

impl SearchConfig {
    pub fn new(pdb_path: &str, metric: Metric, window_size: usize, database_path: &str) -> Self {
        SearchConfig {
            pdb_path: pdb_path.to_string(),
            metric,
            window_size,
            database_path: database_path.to_string(),
            iterations: 1,
            top: 1,
            intra_chain: false,
            likeness_tol: None,
            align: false,
            rmsd_tol: DEFAULT_RMSD_TOL,
            superpose: false,
            seed: 0,
            atom_name: DEFAULT_ATOM_NAME.to_string(),
            header: false,
            output: None,
            verbosity: Verbosity::default(),
        }
    }
}

/// Cooperative cancellation flag checked between database entries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Round label, e.g. "A:B", or "A" for a single-chain round.
pub fn round_label(chains: &[u8]) -> String {
    chains.iter().map(|&c| (c as char).to_string()).collect::<Vec<_>>().join(":")
}

/// Chains compared per round: every pair of chains, or the lone chain of a
/// single-chain structure.
pub fn query_rounds(structure: &Structure) -> Vec<Vec<u8>> {
    if structure.chains.len() == 1 {
        return vec![vec![structure.chains[0]]];
    }
    structure.chain_pairs().into_iter().map(|(a, b)| vec![a, b]).collect()
}

/// Distance matrix over the selected atoms of `chains`, in chain order, with windows partitioned.
/// Every requested chain counts for the intra-chain rule, even one without selected atoms.
pub fn build_query_matrix(structure: &Structure, chains: &[u8], cfg: &SearchConfig) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::new();
    matrix.add_atoms(structure.atoms_of_chains(chains, &cfg.atom_name));
    matrix.set_source_chains(chains.len());
    matrix.set_source_id(&cfg.pdb_path);
    matrix.set_window_size(cfg.window_size);
    matrix.set_intra_chain(cfg.intra_chain);
    matrix.set_debug(cfg.verbosity.debug);
    matrix.create_distance_matrix();
    matrix.create_matrix_windows();
    matrix
}

/// Sweep one query matrix against the database.
///
/// Entries with no windows or a different window size are skipped with a
/// warning. A query without windows is an error since nothing can be compared.
pub fn search_round<'a>(
    query: &'a DistanceMatrix, round: &str, database: &'a DistanceMatrixDatabase,
    cfg: &SearchConfig, cancel: &CancelToken,
) -> Result<ResultManager<'a>> {
    if query.windows().is_empty() {
        return Err(SearchError::NoQueryWindows { round: round.to_string() });
    }
    let comparator = WindowComparator::new(cfg.metric, cfg.iterations, cfg.seed);
    let verbosity = cfg.verbosity;

    let batches: Vec<Option<Vec<DistanceMatrixResult>>> = database
        .entries()
        .par_iter()
        .enumerate()
        .map(|(idx, entry)| {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            verbosity.debug(&format!(
                "Trying {} ({}) ... {} windows", entry.source_id(), idx, entry.windows().len()
            ));
            if entry.windows().is_empty() {
                verbosity.warn(&format!("{} has no usable windows; skipped", entry.source_id()));
                return Ok(None);
            }
            if entry.window_size() != query.window_size() {
                verbosity.warn(&format!(
                    "{} was built with window size {} (query uses {}); skipped",
                    entry.source_id(), entry.window_size(), query.window_size()
                ));
                return Ok(None);
            }
            let batch = comparator.compare_all_windows(query, idx, entry, cfg.top);
            if accept_batch(&batch, cfg.likeness_tol) {
                Ok(Some(batch))
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut manager = ResultManager::new(query, database);
    manager.set_align_pdbs(cfg.align);
    manager.set_rmsd_tol(cfg.rmsd_tol);
    manager.set_superpose(cfg.superpose);
    manager.set_header(cfg.header);
    manager.set_verbosity(verbosity);
    // Merged in database order so the report does not depend on scheduling
    for batch in batches.into_iter().flatten() {
        manager.add_results(batch);
    }
    manager.finalize();
    verbosity.info(&format!("Round {}: {} results", round, manager.len()));
    Ok(manager)
}

/// Run every round of the configured search and write the reports.
/// Returns the number of reported results over all rounds.
pub fn run_search(cfg: &SearchConfig, cancel: &CancelToken) -> Result<usize> {
    let verbosity = cfg.verbosity;
    let structure = read_structure_from_path(&cfg.pdb_path)?;
    let database = measure_time!(
        verbosity, "Loading database",
        DistanceMatrixDatabase::load_checkpoint(&cfg.database_path)?
    );
    verbosity.info(&format!(
        "Loaded {} entries from {}", database.len(), cfg.database_path
    ));

    let rounds = query_rounds(&structure);
    let queries: Vec<(String, DistanceMatrix)> = rounds
        .par_iter()
        .map(|chains| (round_label(chains), build_query_matrix(&structure, chains, cfg)))
        .collect();

    let mut writer: Option<BufWriter<File>> = match &cfg.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).map_err(|e| SearchError::io(path, e))?,
        )),
        None => None,
    };

    let mut total = 0;
    for (round, query) in queries.iter() {
        verbosity.info(&format!(
            "Round {}: {} atoms, {} windows", round, query.num_atoms(), query.windows().len()
        ));
        let mut manager = measure_time!(
            verbosity, format!("Round {}", round),
            search_round(query, round, &database, cfg, cancel)?
        );
        total += manager.len();
        match (&mut writer, &cfg.output) {
            (Some(w), Some(path)) => {
                writeln!(w, "# round {}", round).map_err(|e| SearchError::io(path, e))?;
                manager.write_results(w).map_err(|e| SearchError::io(path, e))?;
            }
            _ => {
                if queries.len() > 1 {
                    println!("# round {}", round);
                }
                manager.print_results().map_err(|e| SearchError::io("<stdout>", e))?;
            }
        }
    }
    verbosity.done(&format!("{} results reported over {} rounds", total, queries.len()));
    Ok(total)
}
