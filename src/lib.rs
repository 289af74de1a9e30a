//! # About project
//!
//! dmsearch finds structurally similar fragments between protein structures by
//! comparing fixed-size windows of inter-residue distance matrices.

pub mod error;
pub mod structure;
pub mod matrix;
pub mod index;
pub mod controller;
pub mod utils;
pub mod cli;
pub mod prelude;
