// File: database.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Ordered collection of distance matrices and its binary checkpoint.
//!
//! Layout (little-endian):
//! ```text
//! magic "DMDB" | version u32 | count u64
//! entry: id_len u32 | id | window_size u32 | intra_chain u8 | source_chains u32 | natoms u32
//!        atom: x f32 | y f32 | z f32 | chain u8 | res_serial i32 | atom_name [u8; 4] | res_name [u8; 3]
//!        distances f32 * natoms * natoms, row-major
//! ```
//! Coordinates and distances must be finite.

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;

use crate::error::{Result, SearchError};
use crate::matrix::DistanceMatrix;
use crate::structure::atom::Atom;

pub const CHECKPOINT_MAGIC: &[u8; 4] = b"DMDB";
pub const CHECKPOINT_VERSION: u32 = 2;
// x, y, z, chain, res_serial, atom_name, res_name
const ATOM_RECORD_SIZE: usize = 4 * 3 + 1 + 4 + 4 + 3;

#[derive(Debug, Clone, Default)]
pub struct DistanceMatrixDatabase {
    entries: Vec<DistanceMatrix>,
}

impl DistanceMatrixDatabase {
    pub fn new() -> Self {
        DistanceMatrixDatabase::default()
    }

    /// Add an entry, computing its distances if they are missing.
    pub fn push(&mut self, mut matrix: DistanceMatrix) {
        if !matrix.is_computed() {
            matrix.create_distance_matrix();
        }
        self.entries.push(matrix);
    }

    pub fn entries(&self) -> &[DistanceMatrix] {
        &self.entries
    }
    pub fn get(&self, idx: usize) -> Option<&DistanceMatrix> {
        self.entries.get(idx)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a checkpoint. Stored distances are used as is and windows are
    /// partitioned from each entry's stored window size and intra-chain flag.
    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SearchError::io(path, e))?;
        let file_len = file.metadata().map_err(|e| SearchError::io(path, e))?.len();
        if file_len == 0 {
            return Err(SearchError::checkpoint(path, "empty file"));
        }
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| SearchError::io(path, e))?;
        let entries = decode_entries(&mmap[..], path)?;
        Ok(DistanceMatrixDatabase { entries })
    }

    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SearchError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        encode_entries(&self.entries, &mut writer, path)?;
        writer.flush().map_err(|e| SearchError::io(path, e))
    }
}

fn encode_entries<W: Write>(entries: &[DistanceMatrix], writer: &mut W, path: &Path) -> Result<()> {
    let io_err = |e: std::io::Error| SearchError::io(path, e);
    writer.write_all(CHECKPOINT_MAGIC).map_err(io_err)?;
    writer.write_u32::<LittleEndian>(CHECKPOINT_VERSION).map_err(io_err)?;
    writer.write_u64::<LittleEndian>(entries.len() as u64).map_err(io_err)?;

    for entry in entries {
        if !entry.is_computed() {
            return Err(SearchError::checkpoint(
                path, format!("entry '{}' has no distance matrix", entry.source_id()),
            ));
        }
        let id = entry.source_id().as_bytes();
        writer.write_u32::<LittleEndian>(to_u32(id.len(), "identifier length", path)?).map_err(io_err)?;
        writer.write_all(id).map_err(io_err)?;
        writer.write_u32::<LittleEndian>(to_u32(entry.window_size(), "window size", path)?).map_err(io_err)?;
        writer.write_u8(entry.intra_chain() as u8).map_err(io_err)?;
        writer.write_u32::<LittleEndian>(to_u32(entry.source_chains(), "chain count", path)?).map_err(io_err)?;
        writer.write_u32::<LittleEndian>(to_u32(entry.num_atoms(), "atom count", path)?).map_err(io_err)?;
        for atom in entry.atoms() {
            writer.write_f32::<LittleEndian>(atom.x).map_err(io_err)?;
            writer.write_f32::<LittleEndian>(atom.y).map_err(io_err)?;
            writer.write_f32::<LittleEndian>(atom.z).map_err(io_err)?;
            writer.write_u8(atom.chain).map_err(io_err)?;
            writer.write_i32::<LittleEndian>(atom.res_serial).map_err(io_err)?;
            writer.write_all(&atom.atom_name).map_err(io_err)?;
            writer.write_all(&atom.res_name).map_err(io_err)?;
        }
        for &d in entry.distances() {
            writer.write_f32::<LittleEndian>(d).map_err(io_err)?;
        }
    }
    Ok(())
}

fn to_u32(value: usize, what: &str, path: &Path) -> Result<u32> {
    u32::try_from(value).map_err(|_| SearchError::checkpoint(path, format!("{} {} does not fit in u32", what, value)))
}

fn decode_entries(bytes: &[u8], path: &Path) -> Result<Vec<DistanceMatrix>> {
    let truncated = |_: std::io::Error| SearchError::checkpoint(path, "truncated file");
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if &magic != CHECKPOINT_MAGIC {
        return Err(SearchError::checkpoint(path, "not a distance matrix checkpoint (bad magic)"));
    }
    let version = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if version != CHECKPOINT_VERSION {
        return Err(SearchError::checkpoint(path, format!("unknown version {}", version)));
    }
    let count = cursor.read_u64::<LittleEndian>().map_err(truncated)?;

    let mut entries = Vec::new();
    for n in 0..count {
        let id_len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        ensure_remaining(&cursor, id_len, path)?;
        let mut id = vec![0u8; id_len];
        cursor.read_exact(&mut id).map_err(truncated)?;
        let source_id = String::from_utf8(id)
            .map_err(|_| SearchError::checkpoint(path, format!("entry {} identifier is not UTF-8", n)))?;

        let window_size = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let intra_chain = match cursor.read_u8().map_err(truncated)? {
            0 => false,
            1 => true,
            flag => {
                return Err(SearchError::checkpoint(
                    path, format!("entry '{}' has invalid intra-chain flag {}", source_id, flag),
                ))
            }
        };
        let source_chains = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let natoms = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let block_len = natoms
            .checked_mul(natoms)
            .and_then(|cells| cells.checked_mul(4))
            .and_then(|len| len.checked_add(natoms * ATOM_RECORD_SIZE))
            .ok_or_else(|| SearchError::checkpoint(path, format!("entry '{}' atom count {} too large", source_id, natoms)))?;
        ensure_remaining(&cursor, block_len, path)?;

        let mut atoms = Vec::with_capacity(natoms);
        for i in 0..natoms {
            let x = cursor.read_f32::<LittleEndian>().map_err(truncated)?;
            let y = cursor.read_f32::<LittleEndian>().map_err(truncated)?;
            let z = cursor.read_f32::<LittleEndian>().map_err(truncated)?;
            if !(x.is_finite() && y.is_finite() && z.is_finite()) {
                return Err(SearchError::checkpoint(
                    path, format!("entry '{}' atom {} has a non-finite coordinate", source_id, i),
                ));
            }
            let chain = cursor.read_u8().map_err(truncated)?;
            let res_serial = cursor.read_i32::<LittleEndian>().map_err(truncated)?;
            let mut atom_name = [0u8; 4];
            cursor.read_exact(&mut atom_name).map_err(truncated)?;
            let mut res_name = [0u8; 3];
            cursor.read_exact(&mut res_name).map_err(truncated)?;
            atoms.push(Atom::new(
                x, y, z, atom_name, i as u64 + 1, res_name, res_serial, chain, 0.0,
            ));
        }
        let mut distances = vec![0.0f32; natoms * natoms];
        cursor.read_f32_into::<LittleEndian>(&mut distances).map_err(truncated)?;
        if distances.iter().any(|d| !d.is_finite()) {
            return Err(SearchError::checkpoint(
                path, format!("entry '{}' has a non-finite distance", source_id),
            ));
        }

        let mut matrix = DistanceMatrix::from_parts(source_id, window_size, intra_chain, source_chains, atoms, distances)
            .ok_or_else(|| SearchError::checkpoint(path, format!("entry {} distance block size mismatch", n)))?;
        matrix.create_matrix_windows();
        entries.push(matrix);
    }

    if (cursor.position() as usize) != bytes.len() {
        return Err(SearchError::checkpoint(
            path, format!("{} trailing bytes after {} entries", bytes.len() - cursor.position() as usize, count),
        ));
    }
    Ok(entries)
}

fn ensure_remaining(cursor: &Cursor<&[u8]>, needed: usize, path: &Path) -> Result<()> {
    let remaining = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
    if needed > remaining {
        return Err(SearchError::checkpoint(path, "truncated file"));
    }
    Ok(())
}
