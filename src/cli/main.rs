// File: main.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

use dmsearch::cli::workflows::build_db::build_db;
use dmsearch::cli::workflows::query_db::query_db;
use dmsearch::cli::{print_logo, AppArgs};
use dmsearch::prelude::*;

const HELP: &str = "\
usage: dmsearch <SUBCOMMAND> [OPTIONS]

subcommands:
  build     Build a distance matrix database from protein structures
  query     Search windows of a query structure against a database

options:
  -h, --help                 Print this help menu

Run `dmsearch <SUBCOMMAND> --help` for subcommand options.
";

fn invalid(e: pico_args::Error) -> SearchError {
    SearchError::InvalidArgument { option: "arguments", message: e.to_string() }
}

fn parse_arg() -> Result<AppArgs> {
    let mut args = pico_args::Arguments::from_env();
    let subcommand = args.subcommand().map_err(invalid)?;
    let parsed = match subcommand.as_deref() {
        Some("build") => AppArgs::Build {
            pdb_list: args.opt_value_from_str(["-l", "--list"]).map_err(invalid)?,
            pdb_dir: args.opt_value_from_str(["-p", "--pdbs"]).map_err(invalid)?,
            recursive: args.contains(["-r", "--recursive"]),
            output: args.opt_value_from_str(["-o", "--output"]).map_err(invalid)?,
            window_size: args.opt_value_from_str(["-w", "--window"]).map_err(invalid)?,
            intra_chain: args.contains("--intra"),
            atom_name: args.opt_value_from_str("--atom").map_err(invalid)?
                .unwrap_or_else(|| DEFAULT_ATOM_NAME.to_string()),
            threads: args.opt_value_from_str(["-t", "--threads"]).map_err(invalid)?.unwrap_or(1),
            verbose: args.contains(["-v", "--verbose"]),
            help: args.contains(["-h", "--help"]),
        },
        Some("query") => AppArgs::Query {
            pdb_path: args.opt_value_from_str(["-p", "--pdb"]).map_err(invalid)?,
            metric: args.opt_value_from_str(["-m", "--metric"]).map_err(invalid)?,
            window_size: args.opt_value_from_str(["-w", "--window"]).map_err(invalid)?,
            database_path: args.opt_value_from_str(["-d", "--database"]).map_err(invalid)?,
            iterations: args.opt_value_from_str(["-n", "--iterations"]).map_err(invalid)?.unwrap_or(1),
            top: args.opt_value_from_str("--top").map_err(invalid)?.unwrap_or(1),
            intra_chain: args.contains("--intra"),
            likeness_tol: args.opt_value_from_str(["-l", "--likeness"]).map_err(invalid)?,
            align: args.contains("--align"),
            rmsd_tol: args.opt_value_from_str(["-r", "--rmsd"]).map_err(invalid)?.unwrap_or(DEFAULT_RMSD_TOL),
            superpose: args.contains("--superpose"),
            seed: args.opt_value_from_str("--seed").map_err(invalid)?.unwrap_or(0),
            atom_name: args.opt_value_from_str("--atom").map_err(invalid)?
                .unwrap_or_else(|| DEFAULT_ATOM_NAME.to_string()),
            output: args.opt_value_from_str(["-o", "--output"]).map_err(invalid)?,
            header: args.contains("--header"),
            threads: args.opt_value_from_str(["-t", "--threads"]).map_err(invalid)?.unwrap_or(1),
            debug: args.contains("--debug"),
            verbose: args.contains(["-v", "--verbose"]),
            help: args.contains(["-h", "--help"]),
        },
        Some(other) => {
            return Err(SearchError::InvalidArgument {
                option: "subcommand", message: format!("unknown subcommand '{}'", other),
            });
        }
        None => AppArgs::Global {
            help: args.contains(["-h", "--help"]),
        },
    };
    let remaining = args.finish();
    if !remaining.is_empty() {
        print_log_msg(WARN, &format!("Unused arguments: {:?}", remaining));
    }
    Ok(parsed)
}

fn run() -> Result<()> {
    match parse_arg()? {
        AppArgs::Global { help } => {
            print_logo();
            eprintln!("{}", HELP);
            if help {
                Ok(())
            } else {
                Err(SearchError::MissingArgument("subcommand"))
            }
        }
        env @ AppArgs::Build { .. } => build_db(env),
        env @ AppArgs::Query { .. } => query_db(env),
    }
}

fn main() {
    if let Err(e) = run() {
        print_log_msg(FAIL, &e.to_string());
        std::process::exit(e.exit_code());
    }
}
