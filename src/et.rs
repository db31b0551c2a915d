//! Elementary transforms and their sequences.
//!
//! An elementary transform (ET) is a rotation about or a translation along one of the
//! Cartesian axes. It is either fixed (the angle or length is part of the model) or
//! variable (a joint, the value is supplied at evaluation time). Transforms are chained
//! with `*` into an elementary transform sequence (ETS) that applies left to right:
//! ```
//! use rs_ets_kinematics::et::ET;
//! let ets = ET::tz(0.333) * ET::rx(-std::f64::consts::FRAC_PI_2) * ET::rz_joint();
//! assert_eq!(ets.len(), 3);
//! assert_eq!(ets.n_variables(), 1);
//! assert!(ets.is_joint());
//! assert_eq!(ets.to_string(), "tz(0.333) * Rx(-90.0000) * Rz()");
//! ```

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;
use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use crate::errors::{EvaluationError, StructuralError};
use crate::kinematic_traits::{Kinematics, Pose};

/// Cartesian axis and the kind of motion along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Tx,
    Ty,
    Tz,
    Rx,
    Ry,
    Rz,
}

impl Axis {
    pub fn is_rotation(&self) -> bool {
        matches!(self, Axis::Rx | Axis::Ry | Axis::Rz)
    }

    pub fn is_translation(&self) -> bool {
        !self.is_rotation()
    }

    /// Unit vector of the Cartesian axis this transform acts on.
    pub fn unit(&self) -> Unit<Vector3<f64>> {
        match self {
            Axis::Tx | Axis::Rx => Vector3::x_axis(),
            Axis::Ty | Axis::Ry => Vector3::y_axis(),
            Axis::Tz | Axis::Rz => Vector3::z_axis(),
        }
    }

    /// Homogeneous transform of this axis for the given angle (radians) or length.
    pub fn transform(&self, value: f64) -> Pose {
        if self.is_rotation() {
            Pose::from_parts(Translation3::identity(),
                             UnitQuaternion::from_axis_angle(&self.unit(), value))
        } else {
            Pose::from_parts(Translation3::from(self.unit().into_inner() * value),
                             UnitQuaternion::identity())
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Axis::Tx => "tx",
            Axis::Ty => "ty",
            Axis::Tz => "tz",
            Axis::Rx => "Rx",
            Axis::Ry => "Ry",
            Axis::Rz => "Rz",
        }
    }
}

impl FromStr for Axis {
    type Err = StructuralError;

    /// Case insensitive: "tx", "Rz", "RY" are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tx" => Ok(Axis::Tx),
            "ty" => Ok(Axis::Ty),
            "tz" => Ok(Axis::Tz),
            "rx" => Ok(Axis::Rx),
            "ry" => Ok(Axis::Ry),
            "rz" => Ok(Axis::Rz),
            _ => Err(StructuralError::UnknownAxis(s.to_string())),
        }
    }
}

/// Whether the transform has its value built in or takes it from the joint vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EtKind {
    Fixed(f64),
    Variable,
}

/// Elementary transform. Immutable, created once while the model is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ET {
    pub axis: Axis,
    pub kind: EtKind,
}

impl ET {
    pub fn fixed(axis: Axis, value: f64) -> Self {
        ET { axis, kind: EtKind::Fixed(value) }
    }

    pub fn variable(axis: Axis) -> Self {
        ET { axis, kind: EtKind::Variable }
    }

    /// Translation along x by `length`
    pub fn tx(length: f64) -> Self {
        Self::fixed(Axis::Tx, length)
    }

    pub fn ty(length: f64) -> Self {
        Self::fixed(Axis::Ty, length)
    }

    pub fn tz(length: f64) -> Self {
        Self::fixed(Axis::Tz, length)
    }

    /// Rotation about x by `angle` radians
    pub fn rx(angle: f64) -> Self {
        Self::fixed(Axis::Rx, angle)
    }

    pub fn ry(angle: f64) -> Self {
        Self::fixed(Axis::Ry, angle)
    }

    pub fn rz(angle: f64) -> Self {
        Self::fixed(Axis::Rz, angle)
    }

    /// Prismatic joint along x
    pub fn tx_joint() -> Self {
        Self::variable(Axis::Tx)
    }

    pub fn ty_joint() -> Self {
        Self::variable(Axis::Ty)
    }

    pub fn tz_joint() -> Self {
        Self::variable(Axis::Tz)
    }

    /// Revolute joint about x
    pub fn rx_joint() -> Self {
        Self::variable(Axis::Rx)
    }

    pub fn ry_joint() -> Self {
        Self::variable(Axis::Ry)
    }

    pub fn rz_joint() -> Self {
        Self::variable(Axis::Rz)
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, EtKind::Variable)
    }

    /// Fixed value of the transform, `None` for a joint.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self.kind {
            EtKind::Fixed(value) => Some(value),
            EtKind::Variable => None,
        }
    }

    /// Evaluate the transform. A variable transform needs `q`; a fixed one must not
    /// be given any, as it would silently override the model.
    pub fn evaluate(&self, q: Option<f64>) -> Result<Pose, EvaluationError> {
        match (self.kind, q) {
            (EtKind::Fixed(value), None) => Ok(self.axis.transform(value)),
            (EtKind::Variable, Some(q)) => Ok(self.axis.transform(q)),
            (EtKind::Variable, None) => Err(EvaluationError::MissingJointValue),
            (EtKind::Fixed(_), Some(_)) => Err(EvaluationError::UnexpectedJointValue),
        }
    }
}

impl fmt::Display for ET {
    /// Rotations are shown in degrees with 4 decimals, lengths as they are, and
    /// joints with empty parentheses.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            EtKind::Variable => write!(f, "{}()", self.axis.label()),
            EtKind::Fixed(angle) if self.axis.is_rotation() =>
                write!(f, "{}({:.4})", self.axis.label(), angle.to_degrees()),
            EtKind::Fixed(length) => write!(f, "{}({})", self.axis.label(), length),
        }
    }
}

/// Elementary transform sequence. Later transforms are nearer to the end-effector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ETS(Vec<ET>);

impl ETS {
    /// Empty sequence, evaluates to identity.
    pub fn new() -> Self {
        ETS(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ET> {
        self.0.iter()
    }

    pub fn n_variables(&self) -> usize {
        self.0.iter().filter(|et| et.is_variable()).count()
    }

    /// True if the sequence has exactly one joint variable and it is the last transform.
    pub fn is_joint(&self) -> bool {
        self.n_variables() == 1 && self.0.last().is_some_and(|et| et.is_variable())
    }

    /// Axis of the first joint variable, if any.
    pub fn variable(&self) -> Option<Axis> {
        self.0.iter().find(|et| et.is_variable()).map(|et| et.axis)
    }

    pub fn push(&mut self, et: ET) {
        self.0.push(et);
    }

    /// Compose the sequence, taking one value from `qs` for every joint variable,
    /// in order.
    pub fn evaluate(&self, qs: &[f64]) -> Result<Pose, EvaluationError> {
        let expected = self.n_variables();
        if qs.len() != expected {
            return Err(EvaluationError::JointCountMismatch { expected, found: qs.len() });
        }
        let mut values = qs.iter();
        self.0.iter().try_fold(Pose::identity(), |pose, et| {
            let q = if et.is_variable() { values.next().copied() } else { None };
            Ok(pose * et.evaluate(q)?)
        })
    }
}

impl Kinematics for ETS {
    fn dof(&self) -> usize {
        self.n_variables()
    }

    fn forward(&self, qs: &[f64]) -> Result<Pose, EvaluationError> {
        self.evaluate(qs)
    }
}

impl fmt::Display for ETS {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|et| et.to_string()).collect();
        write!(f, "{}", parts.join(" * "))
    }
}

impl From<ET> for ETS {
    fn from(et: ET) -> Self {
        ETS(vec![et])
    }
}

impl From<Vec<ET>> for ETS {
    fn from(ets: Vec<ET>) -> Self {
        ETS(ets)
    }
}

impl FromIterator<ET> for ETS {
    fn from_iter<I: IntoIterator<Item = ET>>(iter: I) -> Self {
        ETS(iter.into_iter().collect())
    }
}

impl Mul for ET {
    type Output = ETS;

    fn mul(self, rhs: ET) -> ETS {
        ETS(vec![self, rhs])
    }
}

impl Mul<ET> for ETS {
    type Output = ETS;

    fn mul(mut self, rhs: ET) -> ETS {
        self.0.push(rhs);
        self
    }
}

impl Mul<ETS> for ET {
    type Output = ETS;

    fn mul(self, rhs: ETS) -> ETS {
        let mut ets = Vec::with_capacity(rhs.len() + 1);
        ets.push(self);
        ets.extend(rhs.0);
        ETS(ets)
    }
}

impl Mul for ETS {
    type Output = ETS;

    fn mul(mut self, rhs: ETS) -> ETS {
        self.0.extend(rhs.0);
        self
    }
}
