//! Command line interface for dmsearch

// File: mod.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

// Arguments of CLI app are defined here

pub mod workflows;
pub mod config;

pub enum AppArgs {
    Global {
        help: bool,
    },
    Build {
        pdb_list: Option<String>,
        pdb_dir: Option<String>,
        recursive: bool,
        output: Option<String>,
        window_size: Option<usize>,
        intra_chain: bool,
        atom_name: String,
        threads: usize,
        verbose: bool,
        help: bool,
    },
    Query {
        pdb_path: Option<String>,
        metric: Option<String>,
        window_size: Option<usize>,
        database_path: Option<String>,
        iterations: usize,
        top: usize,
        intra_chain: bool,
        // Tolerances
        likeness_tol: Option<f32>,
        align: bool,
        rmsd_tol: f32,
        superpose: bool,
        seed: u64,
        atom_name: String,
        // Output
        output: Option<String>,
        header: bool,
        threads: usize,
        debug: bool,
        verbose: bool,
        help: bool,
    },
}

pub fn print_logo() {
    let logo = [
        "",
        "\x1b[91m░█▀▄░█▄█░\x1b[93m█▀▀░█▀▀░█▀█░█▀▄░█▀▀░█░█\x1b[0m",
        "\x1b[91m░█░█░█░█░\x1b[93m▀▀█░█▀▀░█▀█░█▀▄░█░░░█▀█\x1b[0m",
        "\x1b[91m░▀▀░░▀░▀░\x1b[93m▀▀▀░▀▀▀░▀░▀░▀░▀░▀▀▀░▀░▀\x1b[0m",
        "",
    ];

    for line in &logo {
        eprintln!("{}", line);
    }
}

/// Configure the global rayon pool. A pool that already exists is kept.
pub fn set_threads(threads: usize) {
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        crate::utils::log::print_log_msg(
            crate::utils::log::WARN, &format!("Thread pool already initialized: {}", e),
        );
    }
}
