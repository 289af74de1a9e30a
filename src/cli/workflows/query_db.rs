// File: query_db.rs
// Author: Hyunbin Kim (khb7840@gmail.com)
// Description
// Workflow for searching a query structure against a distance matrix database.
// Each pair of query chains is one comparison round.

use std::path::Path;

use crate::cli::config::{config_path, read_database_config_from_file};
use crate::cli::{set_threads, AppArgs};
use crate::controller::metric::Metric;
use crate::controller::search::{run_search, CancelToken, SearchConfig};
use crate::error::{Result, SearchError};
use crate::utils::log::Verbosity;

pub const HELP_QUERY: &str = "\
usage: dmsearch query -p <PDB> -m <METRIC> -w <INT> -d <DB> [OPTIONS]

input/output:
 -p, --pdb <PATH>             Query PDB file [REQUIRED]
 -d, --database <PATH>        Database checkpoint built with `dmsearch build` [REQUIRED]
 -o, --output <PATH>          Output file path [stdout]

search parameters:
 -m, --metric <STR>           standard, diagonal, doubleDiagonal, minDistance or minDistanceRow [REQUIRED]
 -w, --window <INT>           Window size [REQUIRED]
 -n, --iterations <INT>       Registrations tried per window pair, at most 4 [1]
 --top <INT>                  Best results kept per database entry [1]
 --intra                      Allow intra-chain windows
 --seed <INT>                 Seed for the registration order [0]
 --atom <NAME>                Atom used for distance matrices [CA]
 -t, --threads <INT>          Number of threads [1]

filtering options:
 -l, --likeness <FLOAT>       Likeness tolerance; entries without a result at or below it are dropped [unbounded]
 --align                      Superpose matching windows and report RMSD
 -r, --rmsd <FLOAT>           RMSD tolerance used with --align [2.0]

display options:
 --header                     Print header in output
 --superpose                  Print rotation and translation of the superposition (implies --align)

general options:
 --debug                      Print per-entry debug messages
 -v, --verbose                Print verbose messages
 -h, --help                   Print this help menu

examples:
# Best window pair per database entry with the standard metric
dmsearch query -p query/1abc.pdb -m standard -w 5 -d db/pdbs.dmdb -t 8

# Try all registrations, keep 10 pairs per entry and filter by RMSD
dmsearch query -p query/1abc.pdb -m minDistance -w 5 -d db/pdbs.dmdb -n 4 --top 10 --align -r 1.5 --header
";

/// Validate parsed arguments and turn them into a search configuration.
pub fn query_config(env: AppArgs) -> Result<Option<(SearchConfig, usize)>> {
    match env {
        AppArgs::Query {
            pdb_path,
            metric,
            window_size,
            database_path,
            iterations,
            top,
            intra_chain,
            likeness_tol,
            align,
            rmsd_tol,
            superpose,
            seed,
            atom_name,
            output,
            header,
            threads,
            debug,
            verbose,
            help,
        } => {
            if help {
                eprintln!("{}", HELP_QUERY);
                return Ok(None);
            }
            let missing = |option: &'static str| {
                eprintln!("{}", HELP_QUERY);
                SearchError::MissingArgument(option)
            };
            let pdb_path = pdb_path.ok_or_else(|| missing("-p/--pdb"))?;
            let metric = metric.ok_or_else(|| missing("-m/--metric"))?;
            let window_size = window_size.ok_or_else(|| missing("-w/--window"))?;
            let database_path = database_path.ok_or_else(|| missing("-d/--database"))?;

            let metric = Metric::from_str(&metric)
                .map_err(|message| SearchError::InvalidArgument { option: "--metric", message })?;
            let invalid = |option: &'static str, message: &str| SearchError::InvalidArgument {
                option, message: message.to_string(),
            };
            if window_size == 0 {
                return Err(invalid("--window", "window size must be positive"));
            }
            if iterations == 0 {
                return Err(invalid("--iterations", "at least one iteration is required"));
            }
            if top == 0 {
                return Err(invalid("--top", "at least one result per entry is required"));
            }
            if threads == 0 {
                return Err(invalid("--threads", "at least one thread is required"));
            }
            if let Some(tol) = likeness_tol {
                if !(tol >= 0.0) {
                    return Err(invalid("--likeness", "tolerance must be a non-negative number"));
                }
            }
            if !(rmsd_tol >= 0.0) {
                return Err(invalid("--rmsd", "tolerance must be a non-negative number"));
            }

            let mut cfg = SearchConfig::new(&pdb_path, metric, window_size, &database_path);
            cfg.iterations = iterations;
            cfg.top = top;
            cfg.intra_chain = intra_chain;
            cfg.likeness_tol = likeness_tol;
            cfg.align = align || superpose;
            cfg.rmsd_tol = rmsd_tol;
            cfg.superpose = superpose;
            cfg.seed = seed;
            cfg.atom_name = atom_name;
            cfg.header = header;
            cfg.output = output;
            cfg.verbosity = Verbosity::new(verbose, debug);
            Ok(Some((cfg, threads)))
        }
        _ => Err(SearchError::InvalidArgument {
            option: "subcommand", message: "expected query arguments".to_string(),
        }),
    }
}

// Compare the query parameters with the ones the database was built with
fn check_database_config(cfg: &SearchConfig) {
    let path = config_path(&cfg.database_path);
    if !Path::new(&path).exists() {
        cfg.verbosity.debug(&format!("No database config at {}", path));
        return;
    }
    match read_database_config_from_file(&path) {
        Ok(db_config) => {
            if db_config.window_size != cfg.window_size {
                cfg.verbosity.warn(&format!(
                    "Database was built with window size {} but the query uses {}; mismatching entries will be skipped",
                    db_config.window_size, cfg.window_size
                ));
            }
            if db_config.atom_name != cfg.atom_name {
                cfg.verbosity.warn(&format!(
                    "Database was built from {} atoms but the query uses {}",
                    db_config.atom_name, cfg.atom_name
                ));
            }
            cfg.verbosity.info(&format!(
                "Database config: {} entries, window {}, intra-chain {}",
                db_config.num_entries, db_config.window_size, db_config.intra_chain
            ));
        }
        Err(e) => cfg.verbosity.warn(&format!("{}; ignored", e)),
    }
}

pub fn query_db(env: AppArgs) -> Result<()> {
    let Some((cfg, threads)) = query_config(env)? else {
        return Ok(());
    };
    set_threads(threads);
    cfg.verbosity.info(&format!(
        "Querying {} against {} ({} metric, window {}) with {} threads",
        cfg.pdb_path, cfg.database_path, cfg.metric, cfg.window_size, threads
    ));
    check_database_config(&cfg);
    run_search(&cfg, &CancelToken::new())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_args(metric: Option<&str>, window_size: Option<usize>) -> AppArgs {
        AppArgs::Query {
            pdb_path: Some("query.pdb".to_string()),
            metric: metric.map(|m| m.to_string()),
            window_size,
            database_path: Some("db.dmdb".to_string()),
            iterations: 1,
            top: 1,
            intra_chain: false,
            likeness_tol: None,
            align: false,
            rmsd_tol: 2.0,
            superpose: true,
            seed: 0,
            atom_name: "CA".to_string(),
            output: None,
            header: false,
            threads: 1,
            debug: true,
            verbose: false,
            help: false,
        }
    }

    #[test]
    fn test_query_config() {
        let (cfg, threads) = query_config(query_args(Some("doubleDiagonal"), Some(5))).unwrap().unwrap();
        assert_eq!(threads, 1);
        assert_eq!(cfg.metric, Metric::DoubleDiagonal);
        assert!(cfg.align && cfg.superpose);
        assert!(cfg.verbosity.verbose);
        assert_eq!(cfg.likeness_tol, None);
    }

    #[test]
    fn test_query_config_errors() {
        let err = query_config(query_args(None, Some(5))).err().unwrap();
        assert!(matches!(err, SearchError::MissingArgument("-m/--metric")));
        let err = query_config(query_args(Some("standard"), None)).err().unwrap();
        assert!(matches!(err, SearchError::MissingArgument("-w/--window")));
        let err = query_config(query_args(Some("cosine"), Some(5))).err().unwrap();
        assert_eq!(err.exit_code(), 2);
        let err = query_config(query_args(Some("standard"), Some(0))).err().unwrap();
        assert!(matches!(err, SearchError::InvalidArgument { option: "--window", .. }));
    }
}
