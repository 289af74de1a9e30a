// File: qcp.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

// Quaternion characteristic polynomial superposition.
// reference: https://github.com/biopython/biopython/blob/master/Bio/PDB/qcprot.py
// C reference: https://theobald.brandeis.edu/qcp/

use crate::error::{Result, SearchError};
use crate::structure::coordinate::Coordinate;

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Best-fit rigid transform moving one point set onto another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Superposition {
    pub rot: [[f32; 3]; 3],
    pub tran: [f32; 3],
    pub rmsd: f32,
}

impl Superposition {
    pub fn apply(&self, coord: &Coordinate) -> Coordinate {
        let r = &self.rot;
        Coordinate::new(
            r[0][0] * coord.x + r[0][1] * coord.y + r[0][2] * coord.z + self.tran[0],
            r[1][0] * coord.x + r[1][1] * coord.y + r[1][2] * coord.z + self.tran[1],
            r[2][0] * coord.x + r[2][1] * coord.y + r[2][2] * coord.z + self.tran[2],
        )
    }
}

/// Superpose `moving` onto `fixed`. Both sets must be non-empty and of equal length.
pub fn superpose(fixed: &[Coordinate], moving: &[Coordinate]) -> Result<Superposition> {
    if fixed.len() != moving.len() {
        return Err(SearchError::Alignment(format!(
            "point sets differ in size ({} vs {})", fixed.len(), moving.len()
        )));
    }
    if fixed.is_empty() {
        return Err(SearchError::Alignment("empty point sets".to_string()));
    }
    if fixed.iter().chain(moving.iter()).any(|c| !c.is_finite()) {
        return Err(SearchError::Alignment("non-finite coordinate".to_string()));
    }
    let natoms = fixed.len();
    let reference: Vec<[f64; 3]> = fixed.iter().map(to_f64).collect();
    let coords: Vec<[f64; 3]> = moving.iter().map(to_f64).collect();

    let com_ref = mean(&reference);
    let com_coords = mean(&coords);
    let centered_ref: Vec<[f64; 3]> = reference.iter().map(|c| sub(*c, com_ref)).collect();
    let centered_coords: Vec<[f64; 3]> = coords.iter().map(|c| sub(*c, com_coords)).collect();

    // Rotation aligns centered_coords to centered_ref
    let rot = qcp_rotation(&centered_coords, &centered_ref);
    let rotated_com = rotate(com_coords, &rot);
    let tran = sub(com_ref, rotated_com);

    // Final RMSD from the transformed coordinates
    let sum_sq: f64 = coords
        .iter()
        .zip(reference.iter())
        .map(|(c, r)| {
            let t = rotate(*c, &rot);
            (t[0] + tran[0] - r[0]).powi(2)
                + (t[1] + tran[1] - r[1]).powi(2)
                + (t[2] + tran[2] - r[2]).powi(2)
        })
        .sum();
    let rmsd = (sum_sq / natoms as f64).sqrt();
    if !rmsd.is_finite() {
        return Err(SearchError::Alignment("superposition did not converge".to_string()));
    }

    let mut rot32 = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            rot32[i][j] = rot[i][j] as f32;
        }
    }
    Ok(Superposition {
        rot: rot32,
        tran: [tran[0] as f32, tran[1] as f32, tran[2] as f32],
        rmsd: rmsd as f32,
    })
}

fn to_f64(c: &Coordinate) -> [f64; 3] {
    [c.x as f64, c.y as f64, c.z as f64]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn mean(coords: &[[f64; 3]]) -> [f64; 3] {
    let sum = coords.iter().fold([0.0; 3], |acc, c| [acc[0] + c[0], acc[1] + c[1], acc[2] + c[2]]);
    let n = coords.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

fn rotate(coord: [f64; 3], rot: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        coord[0] * rot[0][0] + coord[1] * rot[0][1] + coord[2] * rot[0][2],
        coord[0] * rot[1][0] + coord[1] * rot[1][1] + coord[2] * rot[1][2],
        coord[0] * rot[2][0] + coord[1] * rot[2][1] + coord[2] * rot[2][2],
    ]
}

// Inner product matrix A = sum(ref_i^T * coords_i)
fn inner_product(coords: &[[f64; 3]], reference: &[[f64; 3]]) -> ([[f64; 3]; 3], f64) {
    let mut a = [[0.0; 3]; 3];
    let mut g = 0.0;
    for (c, r) in coords.iter().zip(reference.iter()) {
        g += c[0] * c[0] + c[1] * c[1] + c[2] * c[2];
        g += r[0] * r[0] + r[1] * r[1] + r[2] * r[2];
        for i in 0..3 {
            for j in 0..3 {
                a[i][j] += r[i] * c[j];
            }
        }
    }
    (a, g * 0.5)
}

fn qcp_rotation(coords: &[[f64; 3]], reference: &[[f64; 3]]) -> [[f64; 3]; 3] {
    let (a, e0) = inner_product(coords, reference);

    let (sxx, sxy, sxz) = (a[0][0], a[0][1], a[0][2]);
    let (syx, syy, syz) = (a[1][0], a[1][1], a[1][2]);
    let (szx, szy, szz) = (a[2][0], a[2][1], a[2][2]);

    let sxx2 = sxx * sxx;
    let syy2 = syy * syy;
    let szz2 = szz * szz;
    let sxy2 = sxy * sxy;
    let syz2 = syz * syz;
    let sxz2 = sxz * sxz;
    let syx2 = syx * syx;
    let szy2 = szy * szy;
    let szx2 = szx * szx;

    let syz_szy_m_syy_szz2 = 2.0 * (syz * szy - syy * szz);
    let sxx2_syy2_szz2_syz2_szy2 = syy2 + szz2 - sxx2 + syz2 + szy2;

    let c2 = -2.0 * (sxx2 + syy2 + szz2 + sxy2 + syx2 + sxz2 + szx2 + syz2 + szy2);
    let c1 = 8.0 * (sxx * syz * szy + syy * szx * sxz + szz * sxy * syx
        - sxx * syy * szz - syz * szx * sxy - szy * syx * sxz);

    let sxz_p_szx = sxz + szx;
    let syz_p_szy = syz + szy;
    let sxy_p_syx = sxy + syx;
    let syz_m_szy = syz - szy;
    let sxz_m_szx = sxz - szx;
    let sxy_m_syx = sxy - syx;
    let sxx_p_syy = sxx + syy;
    let sxx_m_syy = sxx - syy;
    let sxy2_sxz2_syx2_szx2 = sxy2 + sxz2 - syx2 - szx2;

    let c0 = sxy2_sxz2_syx2_szx2 * sxy2_sxz2_syx2_szx2
        + (sxx2_syy2_szz2_syz2_szy2 + syz_szy_m_syy_szz2)
            * (sxx2_syy2_szz2_syz2_szy2 - syz_szy_m_syy_szz2)
        + (-sxz_p_szx * syz_m_szy + sxy_m_syx * (sxx_m_syy - szz))
            * (-sxz_m_szx * syz_p_szy + sxy_m_syx * (sxx_m_syy + szz))
        + (-sxz_p_szx * syz_p_szy - sxy_p_syx * (sxx_p_syy - szz))
            * (-sxz_m_szx * syz_m_szy - sxy_p_syx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_p_szy + sxz_p_szx * (sxx_m_syy + szz))
            * (-sxy_m_syx * syz_m_szy + sxz_p_szx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_m_szy + sxz_m_szx * (sxx_m_syy - szz))
            * (-sxy_m_syx * syz_p_szy + sxz_m_szx * (sxx_p_syy - szz));

    // Newton-Raphson for the largest eigenvalue, starting from e0
    let mut mx_eigenv = e0;
    let eval_prec = 1e-11;
    for _ in 0..50 {
        let oldg = mx_eigenv;
        let x2 = mx_eigenv * mx_eigenv;
        let b = (x2 + c2) * mx_eigenv;
        let a = b + c1;
        let f = a * mx_eigenv + c0;
        let f_prime = 2.0 * x2 * mx_eigenv + b + a;
        let delta = f / (f_prime + eval_prec);
        mx_eigenv = (mx_eigenv - delta).abs();
        if (mx_eigenv - oldg).abs() < eval_prec * mx_eigenv {
            break;
        }
    }

    let a11 = sxx_p_syy + szz - mx_eigenv;
    let a12 = syz_m_szy;
    let a13 = -sxz_m_szx;
    let a14 = sxy_m_syx;
    let a21 = syz_m_szy;
    let a22 = sxx_m_syy - szz - mx_eigenv;
    let a23 = sxy_p_syx;
    let a24 = sxz_p_szx;
    let a31 = a13;
    let a32 = a23;
    let a33 = syy - sxx - szz - mx_eigenv;
    let a34 = syz_p_szy;
    let a41 = a14;
    let a42 = a24;
    let a43 = a34;
    let a44 = szz - sxx_p_syy - mx_eigenv;

    let a3344_4334 = a33 * a44 - a43 * a34;
    let a3244_4234 = a32 * a44 - a42 * a34;
    let a3243_4233 = a32 * a43 - a42 * a33;
    let a3143_4133 = a31 * a43 - a41 * a33;
    let a3144_4134 = a31 * a44 - a41 * a34;
    let a3142_4132 = a31 * a42 - a41 * a32;
    let a1324_1423 = a13 * a24 - a14 * a23;
    let a1224_1422 = a12 * a24 - a14 * a22;
    let a1223_1322 = a12 * a23 - a13 * a22;
    let a1124_1421 = a11 * a24 - a14 * a21;
    let a1123_1321 = a11 * a23 - a13 * a21;
    let a1122_1221 = a11 * a22 - a12 * a21;

    // Try each cofactor column in turn until one is not degenerate
    let candidates = [
        [
            a22 * a3344_4334 - a23 * a3244_4234 + a24 * a3243_4233,
            -a21 * a3344_4334 + a23 * a3144_4134 - a24 * a3143_4133,
            a21 * a3244_4234 - a22 * a3144_4134 + a24 * a3142_4132,
            -a21 * a3243_4233 + a22 * a3143_4133 - a23 * a3142_4132,
        ],
        [
            a12 * a3344_4334 - a13 * a3244_4234 + a14 * a3243_4233,
            -a11 * a3344_4334 + a13 * a3144_4134 - a14 * a3143_4133,
            a11 * a3244_4234 - a12 * a3144_4134 + a14 * a3142_4132,
            -a11 * a3243_4233 + a12 * a3143_4133 - a13 * a3142_4132,
        ],
        [
            a42 * a1324_1423 - a43 * a1224_1422 + a44 * a1223_1322,
            -a41 * a1324_1423 + a43 * a1124_1421 - a44 * a1123_1321,
            a41 * a1224_1422 - a42 * a1124_1421 + a44 * a1122_1221,
            -a41 * a1223_1322 + a42 * a1123_1321 - a43 * a1122_1221,
        ],
        [
            a32 * a1324_1423 - a33 * a1224_1422 + a34 * a1223_1322,
            -a31 * a1324_1423 + a33 * a1124_1421 - a34 * a1123_1321,
            a31 * a1224_1422 - a32 * a1124_1421 + a34 * a1122_1221,
            -a31 * a1223_1322 + a32 * a1123_1321 - a33 * a1122_1221,
        ],
    ];
    let evec_prec = 1e-6;
    let q = candidates
        .iter()
        .find(|q| q.iter().map(|v| v * v).sum::<f64>() >= evec_prec);
    let [q1, q2, q3, q4] = match q {
        Some(q) => {
            let normq = q.iter().map(|v| v * v).sum::<f64>().sqrt();
            [q[0] / normq, q[1] / normq, q[2] / normq, q[3] / normq]
        }
        None => return IDENTITY,
    };

    let a2 = q1 * q1;
    let x2 = q2 * q2;
    let y2 = q3 * q3;
    let z2 = q4 * q4;
    let xy = q2 * q3;
    let az = q1 * q4;
    let zx = q4 * q2;
    let ay = q1 * q3;
    let yz = q3 * q4;
    let ax = q1 * q2;

    [
        [a2 + x2 - y2 - z2, 2.0 * (xy + az), 2.0 * (zx - ay)],
        [2.0 * (xy - az), a2 - x2 + y2 - z2, 2.0 * (yz + ax)],
        [2.0 * (zx + ay), 2.0 * (yz - ax), a2 - x2 - y2 + z2],
    ]
}
