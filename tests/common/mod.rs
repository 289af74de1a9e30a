// File: mod.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Synthetic PDB files for integration tests.

use std::path::Path;

/// Helical CA trace, one helix per chain, each chain shifted along x.
/// `radius` changes the shape so different values give different structures.
pub fn pdb_text(chains: &[(char, usize)], radius: f32) -> String {
    let mut text = String::new();
    let mut serial = 1;
    for (k, &(chain, len)) in chains.iter().enumerate() {
        for i in 0..len {
            let angle = (100.0f32 * i as f32).to_radians();
            let x = radius * angle.cos() + 12.0 * k as f32;
            let y = radius * angle.sin() + 0.7 * k as f32;
            let z = 1.5 * i as f32 - 2.0 * k as f32;
            for (name, dx) in [(" N  ", -0.5f32), (" CA ", 0.0f32)] {
                text.push_str(&format!(
                    "ATOM  {:>5} {} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}           {}\n",
                    serial, name, "ALA", chain, i + 1, x + dx, y, z, 1.0, 20.0, &name[1..2],
                ));
                serial += 1;
            }
        }
    }
    text.push_str("END\n");
    text
}

pub fn write_pdb(dir: &Path, name: &str, chains: &[(char, usize)], radius: f32) -> String {
    let path = dir.join(name);
    std::fs::write(&path, pdb_text(chains, radius)).expect("Unable to write test PDB");
    path.to_string_lossy().to_string()
}
