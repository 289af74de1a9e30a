// File: metric.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Similarity metrics between two windows of equal size.
//! Every metric is a sum of absolute differences, so 0 means identical and
//! scores are only comparable between windows of the same size.

use std::fmt;

use crate::matrix::WindowBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// All N*N cells
    Standard,
    /// Main diagonal
    Diagonal,
    /// Main diagonal and anti-diagonal
    DoubleDiagonal,
    /// Per-row and per-column minima
    MinDistance,
    /// Per-row minima
    MinDistanceRow,
}

impl Metric {
    /// Parse from string. camelCase names and snake_case aliases are accepted.
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim() {
            "standard" => Ok(Self::Standard),
            "diagonal" | "diag" => Ok(Self::Diagonal),
            "doubleDiagonal" | "double_diagonal" | "doubleDiag" => Ok(Self::DoubleDiagonal),
            "minDistance" | "min_distance" | "minDist" => Ok(Self::MinDistance),
            "minDistanceRow" | "min_distance_row" | "minDistRow" => Ok(Self::MinDistanceRow),
            _ => Err(format!(
                "Unknown search metric: '{}'. Valid metrics: {}",
                s,
                Self::valid_names()
            )),
        }
    }

    pub fn valid_names() -> &'static str {
        "standard, diagonal, doubleDiagonal, minDistance, minDistanceRow"
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Diagonal => "diagonal",
            Self::DoubleDiagonal => "doubleDiagonal",
            Self::MinDistance => "minDistance",
            Self::MinDistanceRow => "minDistanceRow",
        }
    }

    pub fn likeness(&self, a: &WindowBlock, b: &WindowBlock) -> f32 {
        debug_assert_eq!(a.size, b.size, "windows must have equal size");
        let n = a.size;
        match self {
            Self::Standard => a
                .values
                .iter()
                .zip(b.values.iter())
                .map(|(x, y)| (x - y).abs())
                .sum(),
            Self::Diagonal => (0..n).map(|i| (a.get(i, i) - b.get(i, i)).abs()).sum(),
            Self::DoubleDiagonal => (0..n)
                .map(|i| {
                    let k = n - 1 - i;
                    (a.get(i, i) - b.get(i, i)).abs() + (a.get(i, k) - b.get(i, k)).abs()
                })
                .sum(),
            Self::MinDistance => {
                let rows: f32 = row_minima(a)
                    .zip(row_minima(b))
                    .map(|(x, y)| (x - y).abs())
                    .sum();
                let cols: f32 = col_minima(a)
                    .zip(col_minima(b))
                    .map(|(x, y)| (x - y).abs())
                    .sum();
                rows + cols
            }
            Self::MinDistanceRow => row_minima(a)
                .zip(row_minima(b))
                .map(|(x, y)| (x - y).abs())
                .sum(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn row_minima(block: &WindowBlock) -> impl Iterator<Item = f32> + '_ {
    (0..block.size).map(move |i| {
        (0..block.size).map(|j| block.get(i, j)).fold(f32::INFINITY, f32::min)
    })
}

fn col_minima(block: &WindowBlock) -> impl Iterator<Item = f32> + '_ {
    (0..block.size).map(move |j| {
        (0..block.size).map(|i| block.get(i, j)).fold(f32::INFINITY, f32::min)
    })
}
