//! Inertia and friction inputs of a link.
//!
//! Both can be given in several equivalent forms. They are resolved once, when the link
//! is built, into one canonical representation: a full symmetric 3x3 inertia matrix and
//! a pair of Coulomb friction torques for the positive and negative direction of motion.

use bitflags::bitflags;
use nalgebra::Matrix3;
use crate::errors::StructuralError;

/// Off-diagonal difference tolerated in a full inertia matrix.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Link inertia about the centre of mass, as given by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InertiaInput {
    /// Principal moments `[Ixx, Iyy, Izz]`, off-diagonal terms zero.
    Diagonal([f64; 3]),
    /// `[Ixx, Iyy, Izz, Ixy, Iyz, Ixz]`
    Packed([f64; 6]),
    /// Full matrix, must be symmetric.
    Full(Matrix3<f64>),
}

impl InertiaInput {
    /// Canonical symmetric inertia tensor.
    pub fn to_matrix(&self) -> Result<Matrix3<f64>, StructuralError> {
        match *self {
            InertiaInput::Diagonal([ixx, iyy, izz]) =>
                Ok(Matrix3::from_diagonal(&nalgebra::Vector3::new(ixx, iyy, izz))),
            InertiaInput::Packed([ixx, iyy, izz, ixy, iyz, ixz]) => Ok(Matrix3::new(
                ixx, ixy, ixz,
                ixy, iyy, iyz,
                ixz, iyz, izz,
            )),
            InertiaInput::Full(matrix) => {
                if (matrix - matrix.transpose()).amax() > SYMMETRY_TOLERANCE {
                    return Err(StructuralError::AsymmetricInertia);
                }
                Ok(matrix)
            }
        }
    }
}

impl From<[f64; 3]> for InertiaInput {
    fn from(diagonal: [f64; 3]) -> Self {
        InertiaInput::Diagonal(diagonal)
    }
}

impl From<[f64; 6]> for InertiaInput {
    fn from(packed: [f64; 6]) -> Self {
        InertiaInput::Packed(packed)
    }
}

impl From<Matrix3<f64>> for InertiaInput {
    fn from(matrix: Matrix3<f64>) -> Self {
        InertiaInput::Full(matrix)
    }
}

impl TryFrom<&[f64]> for InertiaInput {
    type Error = StructuralError;

    /// 3, 6 or 9 (row major) values.
    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match values.len() {
            3 => Ok(InertiaInput::Diagonal([values[0], values[1], values[2]])),
            6 => Ok(InertiaInput::Packed([values[0], values[1], values[2],
                values[3], values[4], values[5]])),
            9 => Ok(InertiaInput::Full(Matrix3::from_row_slice(values))),
            found => Err(StructuralError::MalformedInertia { found }),
        }
    }
}

/// Coulomb friction torque as given by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoulombInput {
    /// Same magnitude in both directions: `c` becomes `[c, -c]`.
    Symmetric(f64),
    /// `[positive direction, negative direction]`
    Pair([f64; 2]),
}

impl CoulombInput {
    pub fn to_pair(&self) -> [f64; 2] {
        match *self {
            CoulombInput::Symmetric(c) => [c, -c],
            CoulombInput::Pair(pair) => pair,
        }
    }
}

impl From<f64> for CoulombInput {
    fn from(c: f64) -> Self {
        CoulombInput::Symmetric(c)
    }
}

impl From<[f64; 1]> for CoulombInput {
    fn from(c: [f64; 1]) -> Self {
        CoulombInput::Symmetric(c[0])
    }
}

impl From<[f64; 2]> for CoulombInput {
    fn from(pair: [f64; 2]) -> Self {
        CoulombInput::Pair(pair)
    }
}

impl TryFrom<&[f64]> for CoulombInput {
    type Error = StructuralError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match values {
            [c] => Ok(CoulombInput::Symmetric(*c)),
            [positive, negative] => Ok(CoulombInput::Pair([*positive, *negative])),
            _ => Err(StructuralError::MalformedFriction { found: values.len() }),
        }
    }
}

bitflags! {
    /// Selects which friction components `ELink::without_friction` removes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Friction: u8 {
        /// Coulomb (static) friction pair
        const COULOMB = 0b01;
        /// Viscous coefficient
        const VISCOUS = 0b10;
    }
}

impl Default for Friction {
    /// The idealized model removes both components.
    fn default() -> Self {
        Friction::all()
    }
}

/// Friction torque at the link for joint velocity `qd`. It opposes the motion.
///
/// `coulomb` is the `[positive, negative]` pair, `viscous` the coefficient `B` at the
/// motor and `gear_ratio` the transmission ratio `G`. At rest the friction is zero.
pub fn friction_torque(coulomb: &[f64; 2], viscous: f64, gear_ratio: f64, qd: f64) -> f64 {
    let g = gear_ratio.abs();
    let static_part = if qd > 0.0 {
        coulomb[0]
    } else if qd < 0.0 {
        coulomb[1]
    } else {
        return 0.0;
    };
    -g * (viscous * g * qd + static_part)
}
