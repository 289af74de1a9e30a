use crate::structure::coordinate::Coordinate;

/// Value snapshot of a single atom record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub atom_name: [u8; 4],
    pub atom_serial: u64,
    pub res_name: [u8; 3],
    pub res_serial: i32,
    pub chain: u8,
    pub b_factor: f32,
}

impl Atom {
    pub fn new(
        x: f32, y: f32, z: f32, atom_name: [u8; 4], atom_serial: u64,
        res_name: [u8; 3], res_serial: i32, chain: u8, b_factor: f32,
    ) -> Atom {
        Atom {
            x, y, z,
            atom_name, atom_serial,
            res_name, res_serial,
            chain, b_factor,
        }
    }

    pub fn get_coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y, self.z)
    }

    /// Atom name without the PDB column padding, e.g. "CA".
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.atom_name).trim().to_string()
    }

    /// Chain and residue label used in reports, e.g. "A42".
    pub fn label(&self) -> String {
        format!("{}{}", self.chain as char, self.res_serial)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name() == name.trim()
    }
}

/// Atoms of a structure stored column-wise, in file order.
#[derive(Debug, Clone, Default)]
pub struct AtomVector {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub atom_name: Vec<[u8; 4]>,
    pub atom_serial: Vec<u64>,
    pub res_name: Vec<[u8; 3]>,
    pub res_serial: Vec<i32>,
    pub chain: Vec<u8>,
    pub b_factor: Vec<f32>,
}

impl AtomVector {
    pub fn new() -> AtomVector {
        AtomVector::default()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn push_atom(&mut self, atom: Atom) {
        self.x.push(atom.x);
        self.y.push(atom.y);
        self.z.push(atom.z);
        self.atom_name.push(atom.atom_name);
        self.atom_serial.push(atom.atom_serial);
        self.res_name.push(atom.res_name);
        self.res_serial.push(atom.res_serial);
        self.chain.push(atom.chain);
        self.b_factor.push(atom.b_factor);
    }

    pub fn get(&self, index: usize) -> Atom {
        Atom {
            x: self.x[index],
            y: self.y[index],
            z: self.z[index],
            atom_name: self.atom_name[index],
            atom_serial: self.atom_serial[index],
            res_name: self.res_name[index],
            res_serial: self.res_serial[index],
            chain: self.chain[index],
            b_factor: self.b_factor[index],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Atom> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}
