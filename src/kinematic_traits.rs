extern crate nalgebra as na;

use na::Isometry3;
use crate::errors::EvaluationError;

/// Pose is used a pose of a link or of the tool center point. It contains both Cartesian
/// position and rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
/// The 4x4 homogeneous matrix is available with `to_homogeneous()`.
pub type Pose = Isometry3<f64>;

/// Joint configuration, one value per variable elementary transform (radians for
/// revolute joints, meters for prismatic ones).
pub type Joints = Vec<f64>;

/// Anything that maps a joint configuration to a pose. Implemented by the bare
/// transform sequence and by the assembled robot.
pub trait Kinematics {
    /// Number of joint variables `forward` expects.
    fn dof(&self) -> usize;

    /// Forward kinematics. Fails if the configuration does not have `dof()` values
    /// or the end-effector is not uniquely defined.
    fn forward(&self, qs: &[f64]) -> Result<Pose, EvaluationError>;
}
