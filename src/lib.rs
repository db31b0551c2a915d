//! Rust implementation of forward kinematics for serial and branching robots described as
//! sequences of elementary transforms
//!
//! An elementary transform (ET) is a single rotation about, or translation along, one of
//! the Cartesian axes. Any rigid link of a robot arm can be described as a short sequence
//! of such transforms (ETS), with at most one of them being the joint variable. This
//! representation does not need the frame placement rules of Denavit-Hartenberg and can
//! express any URDF model directly; DH parameters are still accepted and converted.
//!
//! # Features
//!
//! - Elementary transforms, fixed or joint variables, composed with `*`.
//! - Links (`ELink`) with joint limits, mass, centre of mass, inertia, motor inertia,
//!   viscous and Coulomb friction, gear ratio and attached geometry.
//! - Robots as trees of links with base and tool transforms, zero and ready
//!   configurations, forward kinematics of the tool and of every link frame.
//! - Advisory joint limit checks and random configurations within the limits.
//! - Standard and modified Denavit-Hartenberg links, converted into transform sequences.
//! - Built-in models: Franka Emika Panda (modified DH) and Frankie, the Panda on a mobile
//!   base (transform sequences).
//! - Reading robots from URDF and from YAML descriptions (`allow_filesystem` feature).
//!
//! # Example
//! ```
//! use rs_ets_kinematics::et::ET;
//! use rs_ets_kinematics::elink::{ELink, LinkId};
//! use rs_ets_kinematics::robot::Robot;
//! use rs_ets_kinematics::kinematic_traits::Kinematics;
//!
//! let links = vec![
//!     ELink::new(ET::tz(0.5) * ET::rz_joint()).unwrap().named("shoulder"),
//!     ELink::new(ET::tx(0.4) * ET::ry_joint()).unwrap().named("elbow").with_parent(LinkId(0)),
//!     ELink::new(ET::tx(0.3)).unwrap().named("hand").with_parent(LinkId(1)),
//! ];
//! let robot = Robot::new(links, "arm").unwrap();
//! let pose = robot.forward(&[0.0, 0.0]).unwrap();
//! assert!((pose.translation.vector.x - 0.7).abs() < 1e-12);
//! ```

pub mod kinematic_traits;
pub mod errors;
pub mod et;
pub mod dynamics;
pub mod constraints;
pub mod shape;
pub mod elink;
pub mod robot;
pub mod dh;
pub mod models;
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

#[cfg(feature = "allow_filesystem")]
pub mod urdf;

#[cfg(feature = "allow_filesystem")]
pub mod robot_from_file;

#[cfg(test)]
mod tests;
