use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::super::core::*;
use super::parser::*;
use super::*;
use crate::error::{Result, SearchError};

/// A PDB reader
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    /// The underlying reader
    pub reader: R,
    pub input_type: StructureFileFormat,
    path: PathBuf,
}

impl Reader<File> {
    pub fn new(file: File) -> Self {
        Reader {
            reader: file,
            input_type: StructureFileFormat::PDB,
            path: PathBuf::new(),
        }
    }

    /// Read from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SearchError::io(path, e))?;
        let mut reader = Reader::new(file);
        reader.input_type = StructureFileFormat::from_path(path);
        reader.path = path.to_path_buf();
        Ok(reader)
    }

    pub fn read_structure(&self) -> Result<Structure> {
        match self.input_type {
            StructureFileFormat::PDBGZ => {
                read_atom_lines(BufReader::new(GzDecoder::new(&self.reader)), &self.path)
            }
            _ => read_atom_lines(BufReader::new(&self.reader), &self.path),
        }
    }
}

// Reading each line of PDB, parse and build atomvector. Only the first model is read.
fn read_atom_lines<B: BufRead>(reader: B, path: &Path) -> Result<Structure> {
    let mut structure = Structure::new();
    let mut record = None;
    for line in reader.lines() {
        let atomline = line.map_err(|e| SearchError::Structure {
            path: path.to_path_buf(),
            reason: format!("Error reading line: {}", e),
        })?;
        if atomline.starts_with("ENDMDL") {
            break;
        }
        if atomline.starts_with("ATOM  ") {
            // Conversion error. Just skip the line.
            if let Ok(atom) = parse_line(&atomline) {
                structure.update(atom, &mut record);
            }
        }
    }
    if structure.num_atoms == 0 {
        return Err(SearchError::Structure {
            path: path.to_path_buf(),
            reason: "No ATOM records found".to_string(),
        });
    }
    Ok(structure)
}

pub fn read_structure_from_path<P: AsRef<Path>>(path: P) -> Result<Structure> {
    Reader::from_file(path)?.read_structure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const PDB: &str = "\
HEADER    TEST
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  CA  GLY A   2      12.000   7.000  -4.000  1.00  0.00           C
ATOM      4  CA  GLY B   1      13.000   8.000  -3.000  1.00  0.00           C
ENDMDL
ATOM      5  CA  GLY B   2      14.000   9.000  -2.000  1.00  0.00           C
";

    #[test]
    fn test_read_pdb() {
        let mut file = tempfile::Builder::new().suffix(".pdb").tempfile().unwrap();
        file.write_all(PDB.as_bytes()).unwrap();
        let structure = read_structure_from_path(file.path()).unwrap();
        assert_eq!(structure.num_atoms, 4);
        assert_eq!(structure.num_residues, 3);
        assert_eq!(structure.chains, vec![b'A', b'B']);
        assert_eq!(structure.chain_atoms(b'A', "CA").len(), 2);
    }

    #[test]
    fn test_read_pdb_gz() {
        let file = tempfile::Builder::new().suffix(".pdb.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(PDB.as_bytes()).unwrap();
        encoder.finish().unwrap();
        let structure = read_structure_from_path(file.path()).unwrap();
        assert_eq!(structure.num_atoms, 4);
    }

    #[test]
    fn test_missing_and_empty_files() {
        let err = read_structure_from_path("no/such/file.pdb").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        let file = tempfile::Builder::new().suffix(".pdb").tempfile().unwrap();
        assert!(matches!(
            read_structure_from_path(file.path()),
            Err(SearchError::Structure { .. })
        ));
    }
}
