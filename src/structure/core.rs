use crate::structure::atom::{Atom, AtomVector};

/// Structure is the main data structure for storing the information of a protein structure.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub num_chains: usize,
    pub chains: Vec<u8>,
    pub atom_vector: AtomVector,
    pub num_atoms: usize,
    pub num_residues: usize,
}

impl Structure {
    pub fn new() -> Structure {
        Structure::default()
    }

    pub fn update(&mut self, atom: Atom, record: &mut Option<(u8, i32)>) {
        // record store previous chain ID and residue serial
        if !self.chains.contains(&atom.chain) {
            self.chains.push(atom.chain);
            self.num_chains += 1;
        }
        if *record != Some((atom.chain, atom.res_serial)) {
            self.num_residues += 1;
            *record = Some((atom.chain, atom.res_serial));
        }
        self.num_atoms += 1;
        self.atom_vector.push_atom(atom);
    }

    /// Atoms named `atom_name` in the given chain, one per residue, in file order.
    /// Alternate locations are dropped by keeping the first record of each residue.
    pub fn chain_atoms(&self, chain: u8, atom_name: &str) -> Vec<Atom> {
        let mut atoms: Vec<Atom> = Vec::new();
        for atom in self.atom_vector.iter() {
            if atom.chain != chain || !atom.has_name(atom_name) {
                continue;
            }
            if atoms.last().map(|prev| prev.res_serial) == Some(atom.res_serial) {
                continue;
            }
            atoms.push(atom);
        }
        atoms
    }

    /// `chain_atoms` of each chain in `chains`, concatenated in the given order.
    pub fn atoms_of_chains(&self, chains: &[u8], atom_name: &str) -> Vec<Atom> {
        chains
            .iter()
            .flat_map(|&chain| self.chain_atoms(chain, atom_name))
            .collect()
    }

    /// All unordered pairs of chains (i < j) in order of first appearance.
    pub fn chain_pairs(&self) -> Vec<(u8, u8)> {
        let mut pairs = Vec::new();
        for i in 0..self.chains.len() {
            for j in (i + 1)..self.chains.len() {
                pairs.push((self.chains[i], self.chains[j]));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &[u8; 4], res_serial: i32, chain: u8) -> Atom {
        Atom::new(res_serial as f32, 0.0, 0.0, *name, 0, *b"ALA", res_serial, chain, 0.0)
    }

    #[test]
    fn test_update_counts() {
        let mut structure = Structure::new();
        let mut record = None;
        for (name, res, chain) in [
            (b" N  ", 1, b'A'), (b" CA ", 1, b'A'), (b" CA ", 2, b'A'),
            (b" CA ", 1, b'B'), (b" CB ", 1, b'B'),
        ] {
            structure.update(atom(name, res, chain), &mut record);
        }
        assert_eq!(structure.num_atoms, 5);
        assert_eq!(structure.num_residues, 3);
        assert_eq!(structure.chains, vec![b'A', b'B']);
        assert_eq!(structure.chain_pairs(), vec![(b'A', b'B')]);
    }

    #[test]
    fn test_chain_atoms_keeps_first_altloc() {
        let mut structure = Structure::new();
        let mut record = None;
        structure.update(atom(b" CA ", 1, b'A'), &mut record);
        let mut alt = atom(b" CA ", 1, b'A');
        alt.x = 99.0;
        structure.update(alt, &mut record);
        structure.update(atom(b" CA ", 2, b'A'), &mut record);
        structure.update(atom(b" CA ", 1, b'B'), &mut record);
        let ca = structure.chain_atoms(b'A', "CA");
        assert_eq!(ca.len(), 2);
        assert_eq!(ca[0].x, 1.0);
        assert!(structure.chain_atoms(b'C', "CA").is_empty());
        let ordered = structure.atoms_of_chains(&[b'B', b'A'], "CA");
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0].chain, b'B');
    }
}
