// File: prelude.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

pub use crate::error::{Result, SearchError};

pub use crate::structure::atom::Atom;
pub use crate::structure::coordinate::Coordinate;
pub use crate::structure::core::Structure;
pub use crate::structure::io::pdb::{read_structure_from_path, Reader as PDBReader};
pub use crate::structure::qcp::{superpose, Superposition};

pub use crate::matrix::{DistanceMatrix, MatrixWindow, WindowBlock};
pub use crate::index::database::DistanceMatrixDatabase;

pub use crate::controller::comparator::{Registration, WindowComparator};
pub use crate::controller::metric::Metric;
pub use crate::controller::result::{accept_batch, DistanceMatrixResult, ResultManager};
pub use crate::controller::search::{
    run_search, search_round, CancelToken, SearchConfig, DEFAULT_ATOM_NAME, DEFAULT_RMSD_TOL,
};

pub use crate::utils::log::{log_msg, print_log_msg, Verbosity, DBUG, DONE, FAIL, INFO, WARN};
