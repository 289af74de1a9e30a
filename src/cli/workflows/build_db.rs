// File: build_db.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Workflow for building a distance matrix database.
//! Input is a list file or a directory of PDB files; output is the binary
//! checkpoint and its TOML sidecar.

use rayon::prelude::*;

use crate::cli::config::{config_path, write_database_config_to_file, DatabaseConfig};
use crate::cli::{set_threads, AppArgs};
use crate::error::{Result, SearchError};
use crate::index::database::DistanceMatrixDatabase;
use crate::matrix::DistanceMatrix;
use crate::measure_time;
use crate::structure::io::pdb::read_structure_from_path;
use crate::utils::loader::{load_path, load_path_list};
use crate::utils::log::Verbosity;

pub const HELP_BUILD: &str = "\
usage: dmsearch build (-l <LIST> | -p <PDB_DIR>) -o <DB> -w <INT> [OPTIONS]

input/output:
 -l, --list <PATH>        Text file with one PDB path per line
 -p, --pdbs <PATH>        Directory containing PDB files (.pdb, .ent, .pdb.gz)
 -r, --recursive          Collect PDB files in subdirectories
 -o, --output <PATH>      Path to save the database checkpoint [REQUIRED]

database parameters:
 -w, --window <INT>       Window size [REQUIRED]
 --intra                  Allow intra-chain windows
 --atom <NAME>            Atom used for distance matrices [CA]

general options:
 -t, --threads <INT>      Number of threads [1]
 -v, --verbose            Print verbose messages
 -h, --help               Print this help menu

examples:
dmsearch build -p data/pdbs -r -o db/pdbs.dmdb -w 5 -t 8
dmsearch build -l data/list.txt -o db/list.dmdb -w 4 --intra
";

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub paths: Vec<String>,
    pub output: String,
    pub window_size: usize,
    pub intra_chain: bool,
    pub atom_name: String,
    pub verbosity: Verbosity,
}

/// Read every structure and build one matrix per structure over the selected
/// atoms of all chains in file order. Unreadable structures are skipped with a warning.
pub fn build_database(cfg: &BuildConfig) -> DistanceMatrixDatabase {
    let verbosity = cfg.verbosity;
    let matrices: Vec<Option<DistanceMatrix>> = cfg
        .paths
        .par_iter()
        .map(|path| match read_structure_from_path(path) {
            Ok(structure) => {
                let mut matrix = DistanceMatrix::new();
                matrix.add_atoms(structure.atoms_of_chains(&structure.chains, &cfg.atom_name));
                matrix.set_source_chains(structure.chains.len());
                matrix.set_source_id(path);
                matrix.set_window_size(cfg.window_size);
                matrix.set_intra_chain(cfg.intra_chain);
                matrix.create_distance_matrix();
                if matrix.num_atoms() == 0 {
                    verbosity.warn(&format!("{} has no {} atoms", path, cfg.atom_name));
                }
                Some(matrix)
            }
            Err(e) => {
                verbosity.warn(&format!("{}; skipped", e));
                None
            }
        })
        .collect();

    let mut database = DistanceMatrixDatabase::new();
    for matrix in matrices.into_iter().flatten() {
        database.push(matrix);
    }
    database
}

/// Build and save the checkpoint and sidecar config. Returns the number of stored entries.
pub fn build_and_save(cfg: &BuildConfig) -> Result<usize> {
    let verbosity = cfg.verbosity;
    let database = measure_time!(verbosity, "Building matrices", build_database(cfg));
    measure_time!(verbosity, "Saving checkpoint", database.save_checkpoint(&cfg.output)?);
    let config = DatabaseConfig::new(cfg.window_size, cfg.intra_chain, &cfg.atom_name, database.len());
    write_database_config_to_file(&config_path(&cfg.output), &config)?;
    Ok(database.len())
}

pub fn build_db(env: AppArgs) -> Result<()> {
    match env {
        AppArgs::Build {
            pdb_list,
            pdb_dir,
            recursive,
            output,
            window_size,
            intra_chain,
            atom_name,
            threads,
            verbose,
            help,
        } => {
            if help {
                eprintln!("{}", HELP_BUILD);
                return Ok(());
            }
            let Some(output) = output else {
                eprintln!("{}", HELP_BUILD);
                return Err(SearchError::MissingArgument("-o/--output"));
            };
            let Some(window_size) = window_size else {
                eprintln!("{}", HELP_BUILD);
                return Err(SearchError::MissingArgument("-w/--window"));
            };
            if window_size == 0 {
                return Err(SearchError::InvalidArgument {
                    option: "--window", message: "window size must be positive".to_string(),
                });
            }
            let paths = match (pdb_list, pdb_dir) {
                (Some(list), _) => load_path_list(&list)?,
                (None, Some(dir)) => load_path(&dir, recursive)?,
                (None, None) => {
                    eprintln!("{}", HELP_BUILD);
                    return Err(SearchError::MissingArgument("-l/--list or -p/--pdbs"));
                }
            };
            let verbosity = Verbosity::new(verbose, false);
            set_threads(threads);
            verbosity.info(&format!(
                "Building database from {} structures with {} threads", paths.len(), threads
            ));
            let cfg = BuildConfig { paths, output, window_size, intra_chain, atom_name, verbosity };
            let count = build_and_save(&cfg)?;
            verbosity.done(&format!("{} entries saved to {}", count, cfg.output));
            Ok(())
        }
        _ => Err(SearchError::InvalidArgument {
            option: "subcommand", message: "expected build arguments".to_string(),
        }),
    }
}
