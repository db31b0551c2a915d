//! Errors raised while building and evaluating kinematic models

use std::fmt;

/// Failure to construct a link, a robot or one of their parameters. These are never
/// recovered: the offending object is simply not created.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// A link may only contain one joint variable.
    TooManyVariables { found: usize },
    /// The parent of the link at `link` is not a link declared before it.
    InvalidParent { link: usize, parent: usize },
    /// Inertia given with a number of values other than 3, 6 or 9.
    MalformedInertia { found: usize },
    /// Full inertia matrix that is not symmetric.
    AsymmetricInertia,
    /// Coulomb friction given with a number of values other than 1 or 2.
    MalformedFriction { found: usize },
    /// Lower joint limit above the upper one, or not finite.
    InvalidLimits { lower: f64, upper: f64 },
    /// Named configuration (zero, ready) of the wrong length.
    ConfigurationLength { name: String, expected: usize, found: usize },
    /// Value that is not a shape given where geometry is expected.
    InvalidGeometry(String),
    /// Axis name that is not one of tx, ty, tz, rx, ry, rz.
    UnknownAxis(String),
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StructuralError::TooManyVariables { found } =>
                write!(f, "Link can have at most one joint variable, found {}", found),
            StructuralError::InvalidParent { link, parent } =>
                write!(f, "Parent {} of link {} is not declared before it", parent, link),
            StructuralError::MalformedInertia { found } =>
                write!(f, "Inertia must have 3, 6 or 9 elements, found {}", found),
            StructuralError::AsymmetricInertia =>
                write!(f, "Inertia matrix must be symmetric"),
            StructuralError::MalformedFriction { found } =>
                write!(f, "Coulomb friction must have 1 or 2 elements, found {}", found),
            StructuralError::InvalidLimits { lower, upper } =>
                write!(f, "Invalid joint limits: {} to {}", lower, upper),
            StructuralError::ConfigurationLength { ref name, expected, found } =>
                write!(f, "Configuration {} must have {} values, found {}", name, expected, found),
            StructuralError::InvalidGeometry(ref what) =>
                write!(f, "Not a shape: {}", what),
            StructuralError::UnknownAxis(ref axis) =>
                write!(f, "Unknown axis: {}", axis),
        }
    }
}

impl std::error::Error for StructuralError {}

/// Failure of a single evaluation call. Stateless: the call can be repeated with
/// corrected arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A joint variable was not given a value.
    MissingJointValue,
    /// A value was given but there is no joint variable to take it.
    UnexpectedJointValue,
    /// Number of joint values does not match the number of joint variables.
    JointCountMismatch { expected: usize, found: usize },
    /// The robot has several leaves; the end link must be named.
    AmbiguousEndEffector { leaves: usize },
    /// Link id or name not present in the robot.
    UnknownLink(String),
    /// The robot has no links.
    EmptyRobot,
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EvaluationError::MissingJointValue =>
                write!(f, "Joint variable present but no value supplied"),
            EvaluationError::UnexpectedJointValue =>
                write!(f, "Value supplied but there is no joint variable"),
            EvaluationError::JointCountMismatch { expected, found } =>
                write!(f, "Expected {} joint values, found {}", expected, found),
            EvaluationError::AmbiguousEndEffector { leaves } =>
                write!(f, "Robot has {} leaf links, specify the end link", leaves),
            EvaluationError::UnknownLink(ref link) =>
                write!(f, "Unknown link: {}", link),
            EvaluationError::EmptyRobot =>
                write!(f, "Robot has no links"),
        }
    }
}

impl std::error::Error for EvaluationError {}
