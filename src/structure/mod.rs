// File: mod.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Minimal structural model: atoms, chains, PDB input and superposition.

pub mod atom;
pub mod coordinate;
pub mod core;
pub mod io;
pub mod qcp;
