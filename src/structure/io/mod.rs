//! Structure file readers
pub mod parser;
pub mod pdb;

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructureFileFormat {
    PDB,
    PDBGZ,
}

impl StructureFileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => StructureFileFormat::PDBGZ,
            _ => StructureFileFormat::PDB,
        }
    }
}
