//! Random linear projection from 18-dimensional phase space to 3D
//!
//! The map is drawn as three rows of 18 coefficients, one row per output
//! axis, with every coefficient uniform in `[-1, 1]`. Each row is then
//! normalized to unit length and reshaped into per-body 3x3 blocks, one for
//! positions and one for velocities:
//!
//! ```text
//! positions[b].col(c)  = (row_x[3b + c],     row_y[3b + c],     row_z[3b + c])
//! velocities[b].col(c) = (row_x[9 + 3b + c], row_y[9 + 3b + c], row_z[9 + 3b + c])
//! ```
//!
//! Rows are normalized but not orthogonalized by default, so the map is only
//! approximately distance preserving. [`Projection::random_orthonormal`] runs
//! Gram-Schmidt over the rows when an exactly orthonormal map is wanted.

use crate::physics::body::{BODY_COUNT, ThreeBodySystem};
use crate::physics::math::{
    DisplayMatrix, Matrix, PHASE_SPACE_DIMENSIONS, Scalar, Vector, dot_rows, normalize_row,
    try_normalize,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six 3x3 blocks of the projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Pos0,
    Vel0,
    Pos1,
    Vel1,
    Pos2,
    Vel2,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Pos0,
        Axis::Vel0,
        Axis::Pos1,
        Axis::Vel1,
        Axis::Pos2,
        Axis::Vel2,
    ];

    /// The next selector in cycling order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&a| a == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn body(self) -> usize {
        match self {
            Axis::Pos0 | Axis::Vel0 => 0,
            Axis::Pos1 | Axis::Vel1 => 1,
            Axis::Pos2 | Axis::Vel2 => 2,
        }
    }

    pub fn is_velocity(self) -> bool {
        matches!(self, Axis::Vel0 | Axis::Vel1 | Axis::Vel2)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_velocity() {
            "velocity"
        } else {
            "position"
        };
        write!(f, "{kind} of body {}", self.body())
    }
}

pub type Row = [Scalar; PHASE_SPACE_DIMENSIONS];

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    positions: [Matrix; BODY_COUNT],
    velocities: [Matrix; BODY_COUNT],
}

impl Projection {
    /// Draws a fresh projection with independently normalized rows.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::from_rows(Self::random_rows(rng))
    }

    /// Draws a fresh projection whose three rows are mutually orthogonal.
    pub fn random_orthonormal<R: Rng>(rng: &mut R) -> Self {
        loop {
            let mut rows = Self::random_rows(rng);
            if orthonormalize(&mut rows) {
                return Self::from_rows(rows);
            }
        }
    }

    /// Draws a projection, orthonormal or only row-normalized.
    pub fn create_matrix<R: Rng>(rng: &mut R, orthogonalize: bool) -> Self {
        if orthogonalize {
            Self::random_orthonormal(rng)
        } else {
            Self::random(rng)
        }
    }

    fn random_rows<R: Rng>(rng: &mut R) -> [Row; 3] {
        std::array::from_fn(|_| loop {
            let mut row: Row = std::array::from_fn(|_| rng.random_range(-1.0..=1.0));
            if normalize_row(&mut row) {
                break row;
            }
        })
    }

    /// Builds the per-body blocks from three 18-component rows.
    pub fn from_rows(rows: [Row; 3]) -> Self {
        let block = |offset: usize, body: usize| {
            let column = |c: usize| {
                let index = offset + 3 * body + c;
                Vector::new(rows[0][index], rows[1][index], rows[2][index])
            };
            Matrix::from_cols(column(0), column(1), column(2))
        };

        Self {
            positions: std::array::from_fn(|b| block(0, b)),
            velocities: std::array::from_fn(|b| block(9, b)),
        }
    }

    /// The three 18-component rows this projection was built from
    pub fn rows(&self) -> [Row; 3] {
        let mut rows = [[0.0; PHASE_SPACE_DIMENSIONS]; 3];
        for (offset, blocks) in [(0, &self.positions), (9, &self.velocities)] {
            for (body, matrix) in blocks.iter().enumerate() {
                for c in 0..3 {
                    let column = matrix.col(c);
                    rows[0][offset + 3 * body + c] = column.x;
                    rows[1][offset + 3 * body + c] = column.y;
                    rows[2][offset + 3 * body + c] = column.z;
                }
            }
        }
        rows
    }

    /// Maps the full phase-space state of a system to a point in 3D.
    pub fn phase_space_to_viz_space(&self, system: &ThreeBodySystem) -> Vector {
        system
            .iter()
            .enumerate()
            .fold(Vector::ZERO, |acc, (b, body)| {
                acc + self.positions[b] * body.position + self.velocities[b] * body.velocity
            })
    }

    /// The 3x3 block for one axis selector
    pub fn proj_matrix(&self, axis: Axis) -> Matrix {
        let body = axis.body();
        if axis.is_velocity() {
            self.velocities[body]
        } else {
            self.positions[body]
        }
    }

    /// Display vectors for the three columns of the selected block, each
    /// normalized to unit length
    pub fn projection_axes(&self, axis: Axis) -> DisplayMatrix {
        let matrix = self.proj_matrix(axis);
        let unit = |c: usize| {
            let column = matrix.col(c);
            try_normalize(column).unwrap_or(column).as_vec3()
        };
        DisplayMatrix::from_cols(unit(0), unit(1), unit(2))
    }
}

/// Modified Gram-Schmidt over the rows. Returns `false` when the rows are
/// numerically dependent.
fn orthonormalize(rows: &mut [Row; 3]) -> bool {
    for i in 0..rows.len() {
        for j in 0..i {
            let (done, rest) = rows.split_at_mut(i);
            let projection = dot_rows(&rest[0], &done[j]);
            for (x, y) in rest[0].iter_mut().zip(done[j].iter()) {
                *x -= projection * y;
            }
        }
        if !normalize_row(&mut rows[i]) {
            return false;
        }
        // A row that collapsed to rounding noise normalizes fine but is meaningless
        for j in 0..i {
            if dot_rows(&rows[i], &rows[j]).abs() > 1e-9 {
                return false;
            }
        }
    }
    true
}
