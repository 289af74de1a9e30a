// File: mod.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! # Workflows
//! This module contains the workflows for the CLI.
//! There are two workflows: `build_db` and `query_db`.

pub mod build_db;
pub mod query_db;
