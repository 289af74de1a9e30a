// File: loader.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SearchError};

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdb", "ent", "pdb.gz"];

fn has_allowed_extension(path: &str) -> bool {
    ALLOWED_EXTENSIONS.iter().any(|&ext| path.ends_with(ext))
}

/// Collect structure files in a directory, sorted so the build order is stable.
pub fn load_path(dir: &str, recursive: bool) -> Result<Vec<String>> {
    let mut pdb_paths = Vec::new();
    let paths = std::fs::read_dir(dir).map_err(|e| SearchError::io(dir, e))?;

    for entry in paths {
        let path = entry.map_err(|e| SearchError::io(dir, e))?.path();
        let path_str = path.to_string_lossy().to_string();
        if path.is_dir() {
            if recursive {
                pdb_paths.append(&mut load_path(&path_str, recursive)?);
            }
        } else if has_allowed_extension(&path_str) {
            pdb_paths.push(path_str);
        }
    }
    pdb_paths.sort();
    Ok(pdb_paths)
}

/// Read a list file with one structure path per line. Blank lines and `#` comments are skipped.
pub fn load_path_list<P: AsRef<Path>>(list: P) -> Result<Vec<String>> {
    let list = list.as_ref();
    let file = std::fs::File::open(list).map_err(|e| SearchError::io(list, e))?;
    let mut pdb_paths = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| SearchError::io(list, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        pdb_paths.push(line.to_string());
    }
    Ok(pdb_paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();
        for name in ["b.pdb", "a.ent", "skip.txt"] {
            std::fs::File::create(dir.path().join(name)).unwrap();
        }
        std::fs::File::create(inner.join("c.pdb.gz")).unwrap();

        let root = dir.path().to_str().unwrap();
        let flat = load_path(root, false).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].ends_with("a.ent"));
        let recursive = load_path(root, true).unwrap();
        assert_eq!(recursive.len(), 3);
    }

    #[test]
    fn test_load_path_list() {
        let mut list = tempfile::NamedTempFile::new().unwrap();
        writeln!(list, "# database members").unwrap();
        writeln!(list, "data/1abc.pdb").unwrap();
        writeln!(list).unwrap();
        writeln!(list, "  data/2xyz.pdb  ").unwrap();
        let paths = load_path_list(list.path()).unwrap();
        assert_eq!(paths, vec!["data/1abc.pdb", "data/2xyz.pdb"]);
        assert!(load_path_list("no/such/list.txt").is_err());
    }
}
