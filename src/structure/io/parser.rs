use crate::structure::atom::Atom;

pub fn parse_line(line: &str) -> Result<Atom, &'static str> {
    // Check line length is enough to index b_factor
    if line.len() < 66 || !line.is_ascii() {
        return Err("Line is too short for an ATOM record");
    }
    // Parse line
    let x = line[30..38].trim().parse::<f32>();
    let y = line[38..46].trim().parse::<f32>();
    let z = line[46..54].trim().parse::<f32>();
    let atom_name = parse_atom(&line[12..16]);
    let atom_serial = line[6..11].trim().parse::<u64>();
    let res_name = parse_residue(&line[17..20]);
    let res_serial = line[22..26].trim().parse::<i32>();
    let chain = line.as_bytes()[21];
    let b_factor = line[60..66].trim().parse::<f32>();
    // let occupancy = &line[54..60]; // NOT USING occupancy yet

    // Check if all the parsing was successful
    match (x, y, z, atom_name, atom_serial, res_name, res_serial, b_factor) {
        (
            Ok(x), Ok(y), Ok(z), Ok(atom_name), Ok(atom_serial),
            Ok(res_name), Ok(res_serial), Ok(b_factor),
        ) if x.is_finite() && y.is_finite() && z.is_finite() => Ok(Atom::new(
            x, y, z, atom_name, atom_serial, res_name, res_serial, chain, b_factor,
        )),
        _ => Err("Error parsing line"),
    }
}

pub fn parse_atom(name: &str) -> Result<[u8; 4], &'static str> {
    let bytes = name.as_bytes();
    // Check atom name is 4 ASCII characters
    match bytes.len() {
        4 => Ok([bytes[0], bytes[1], bytes[2], bytes[3]]),
        _ => Err("Atom name is not 4 characters long"),
    }
}

pub fn parse_residue(name: &str) -> Result<[u8; 3], &'static str> {
    let bytes = name.as_bytes();
    // Check residue name is 3 ASCII characters
    match bytes.len() {
        3 => Ok([bytes[0], bytes[1], bytes[2]]),
        _ => Err("Residue name is not 3 characters long"),
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn test_parse_atom() {
        let atom_name_bytes = parse_atom("CA  ").unwrap();
        assert_eq!(atom_name_bytes, [67, 65, 32, 32]);
        assert!(parse_atom("CA").is_err());
        assert!(parse_atom("CA   ").is_err());
    }

    #[test]
    fn test_parse_residue() {
        assert_eq!(parse_residue("ALA").unwrap(), [65, 76, 65]);
        assert!(parse_residue("ALAN").is_err());
        assert!(parse_residue("AL").is_err());
    }

    #[test]
    fn test_parse_line_success() {
        let line = "ATOM      1  N   ALA A 340      -2.311   2.993 -33.448  1.00  6.00           N  ";
        let atom = parse_line(line).unwrap();
        assert_eq!(atom.atom_name, [32, 78, 32, 32]); // N
        assert_eq!(atom.res_name, [65, 76, 65]); // ALA
        assert_eq!(atom.chain, b'A');
        assert_eq!(atom.atom_serial, 1);
        assert_eq!(atom.res_serial, 340);
        assert_eq!(atom.x, -2.311);
        assert_eq!(atom.y, 2.993);
        assert_eq!(atom.z, -33.448);
        assert_eq!(atom.b_factor, 6.00);
    }

    #[test]
    fn test_parse_line_negative_residue() {
        let line = "ATOM      2  CA  GLY B  -4       1.000   2.000   3.000  1.00  0.00           C  ";
        let atom = parse_line(line).unwrap();
        assert_eq!(atom.res_serial, -4);
        assert_eq!(atom.chain, b'B');
    }

    #[test]
    fn test_parse_line_failures() {
        // Short line
        assert!(parse_line("ATOM      1  N   ALA A   1      10.000  10.000  10.000  1").is_err());
        // Error in X
        let line = "ATOM      1  N   ALA A   1      1A.000  10.000  10.000  1.00  0.00           N  ";
        assert!(parse_line(line).is_err());
        // Error in residue serial
        let line = "ATOM      1  N   ALA A 3A0      -2.311   2.993 -33.448  1.00  6.00           N  ";
        assert!(parse_line(line).is_err());
        // Error in atom serial
        let line = "ATOM      K  N   ALA A   1      10.000  10.000  10.000  1.00  0.00           N  ";
        assert!(parse_line(line).is_err());
        // Non-finite coordinates parse as floats but are rejected
        let line = "ATOM      1  N   ALA A   1      10.000  10.000  10.000  1.00  0.00           N  ";
        for value in ["     nan", "     inf", "    -inf"] {
            let x = format!("{}{}{}", &line[..30], value, &line[38..]);
            assert!(parse_line(&x).is_err());
            let z = format!("{}{}{}", &line[..46], value, &line[54..]);
            assert!(parse_line(&z).is_err());
        }
    }
}
