//! Chain link built from an elementary transform sequence.
//!
//! A link holds at most one joint variable. The transform from its parent's frame to its
//! own is the composition of its ETS with the joint value substituted. Dynamic parameters
//! (mass, inertia, motor inertia, friction, gear ratio) travel with the link but do not
//! take part in the kinematics.

use std::fmt;
use nalgebra::{Matrix3, Vector3};
use crate::constraints::JointLimits;
use crate::dynamics::{friction_torque, CoulombInput, Friction, InertiaInput};
use crate::errors::{EvaluationError, StructuralError};
use crate::et::{Axis, ETS};
use crate::kinematic_traits::Pose;
use crate::shape::Shapes;

/// Index of a link in the arena of a [`crate::robot::Robot`]. The parent of a link is
/// referred to by its id, never owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ELink {
    name: String,
    ets: ETS,
    parent: Option<LinkId>,
    qlim: Option<JointLimits>,
    /// Mass
    m: f64,
    /// Centre of mass in the link frame
    r: Vector3<f64>,
    /// Inertia about the centre of mass
    inertia: Matrix3<f64>,
    /// Motor inertia
    jm: f64,
    /// Viscous friction, referred to the motor
    b: f64,
    /// Coulomb friction, positive then negative direction
    tc: [f64; 2],
    /// Gear ratio
    g: f64,
    geometry: Shapes,
    collision: Shapes,
}

impl Default for ELink {
    /// Identity link: no transforms, no joint, all dynamics zero and gear ratio 1.
    fn default() -> Self {
        ELink {
            name: String::new(),
            ets: ETS::new(),
            parent: None,
            qlim: None,
            m: 0.0,
            r: Vector3::zeros(),
            inertia: Matrix3::zeros(),
            jm: 0.0,
            b: 0.0,
            tc: [0.0, 0.0],
            g: 1.0,
            geometry: Shapes::new(),
            collision: Shapes::new(),
        }
    }
}

impl ELink {
    /// Link from a transform sequence. Fails if the sequence has more than one joint
    /// variable.
    pub fn new(ets: impl Into<ETS>) -> Result<Self, StructuralError> {
        let ets = ets.into();
        let found = ets.n_variables();
        if found > 1 {
            return Err(StructuralError::TooManyVariables { found });
        }
        Ok(ELink { ets, ..ELink::default() })
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_parent(mut self, parent: LinkId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_qlim(mut self, lower: f64, upper: f64) -> Result<Self, StructuralError> {
        self.set_qlim(lower, upper)?;
        Ok(self)
    }

    pub fn with_mass(mut self, m: f64) -> Self {
        self.m = m;
        self
    }

    pub fn with_com(mut self, r: Vector3<f64>) -> Self {
        self.r = r;
        self
    }

    pub fn with_inertia(mut self, inertia: impl Into<InertiaInput>) -> Result<Self, StructuralError> {
        self.set_inertia(inertia)?;
        Ok(self)
    }

    pub fn with_jm(mut self, jm: f64) -> Self {
        self.jm = jm;
        self
    }

    pub fn with_viscous(mut self, b: f64) -> Self {
        self.b = b;
        self
    }

    pub fn with_coulomb(mut self, tc: impl Into<CoulombInput>) -> Self {
        self.set_coulomb(tc);
        self
    }

    pub fn with_gear_ratio(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    pub fn with_geometry(mut self, shapes: impl Into<Shapes>) -> Self {
        self.geometry = shapes.into();
        self
    }

    pub fn with_collision(mut self, shapes: impl Into<Shapes>) -> Self {
        self.collision = shapes.into();
        self
    }

    pub fn set_qlim(&mut self, lower: f64, upper: f64) -> Result<(), StructuralError> {
        let limits = JointLimits::new(lower, upper)
            .ok_or(StructuralError::InvalidLimits { lower, upper })?;
        self.qlim = Some(limits);
        Ok(())
    }

    pub fn set_inertia(&mut self, inertia: impl Into<InertiaInput>) -> Result<(), StructuralError> {
        self.inertia = inertia.into().to_matrix()?;
        Ok(())
    }

    pub fn set_coulomb(&mut self, tc: impl Into<CoulombInput>) {
        self.tc = tc.into().to_pair();
    }

    pub fn set_viscous(&mut self, b: f64) {
        self.b = b;
    }

    pub fn set_geometry(&mut self, shapes: impl Into<Shapes>) {
        self.geometry = shapes.into();
    }

    pub fn set_collision(&mut self, shapes: impl Into<Shapes>) {
        self.collision = shapes.into();
    }

    pub(crate) fn set_parent(&mut self, parent: Option<LinkId>) {
        self.parent = parent;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ets(&self) -> &ETS {
        &self.ets
    }

    pub fn parent(&self) -> Option<LinkId> {
        self.parent
    }

    pub fn qlim(&self) -> Option<JointLimits> {
        self.qlim
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn r(&self) -> &Vector3<f64> {
        &self.r
    }

    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }

    pub fn jm(&self) -> f64 {
        self.jm
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn tc(&self) -> [f64; 2] {
        self.tc
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn geometry(&self) -> &Shapes {
        &self.geometry
    }

    pub fn collision(&self) -> &Shapes {
        &self.collision
    }

    /// True if the link carries a joint variable.
    pub fn is_variable(&self) -> bool {
        self.ets.n_variables() == 1
    }

    /// The joint variable is the last transform of the link.
    pub fn is_joint(&self) -> bool {
        self.ets.is_joint()
    }

    pub fn is_revolute(&self) -> bool {
        self.ets.variable().is_some_and(|axis| axis.is_rotation())
    }

    pub fn is_prismatic(&self) -> bool {
        self.ets.variable().is_some_and(|axis| axis.is_translation())
    }

    /// Axis of the joint variable, if any.
    pub fn joint_axis(&self) -> Option<Axis> {
        self.ets.variable()
    }

    /// Transform from the parent frame to this link's frame. `q` must be given exactly
    /// when the link has a joint variable.
    pub fn local_transform(&self, q: Option<f64>) -> Result<Pose, EvaluationError> {
        match (self.is_variable(), q) {
            (true, Some(q)) => self.ets.evaluate(&[q]),
            (false, None) => self.ets.evaluate(&[]),
            (true, None) => Err(EvaluationError::MissingJointValue),
            (false, Some(_)) => Err(EvaluationError::UnexpectedJointValue),
        }
    }

    /// Advisory check against the joint limits, see [`JointLimits::is_at_limit`].
    /// Always false for a link without limits.
    pub fn is_at_limit(&self, q: f64) -> bool {
        self.qlim.is_some_and(|limits| limits.is_at_limit(q))
    }

    /// Joint friction torque for the joint velocity `qd`, referred to the link side
    /// of the gearbox.
    pub fn friction(&self, qd: f64) -> f64 {
        friction_torque(&self.tc, self.b, self.g, qd)
    }

    /// Copy of the link with the selected friction components set to zero.
    pub fn without_friction(&self, which: Friction) -> ELink {
        let mut link = self.clone();
        if which.contains(Friction::COULOMB) {
            link.tc = [0.0, 0.0];
        }
        if which.contains(Friction::VISCOUS) {
            link.b = 0.0;
        }
        link
    }

    /// Copy of the link with no friction at all.
    pub fn frictionless(&self) -> ELink {
        self.without_friction(Friction::all())
    }

    /// Dynamic parameters as a fixed layout text block.
    pub fn dynamics(&self) -> String {
        let i = &self.inertia;
        let qlim = match self.qlim {
            Some(limits) => format!("{:.2} to {:.2}", limits.lower, limits.upper),
            None => "none".to_string(),
        };
        format!(
            "m     =  {:.2} \n\
             r     =  {:.2} {:.2} {:.2} \n        \
             | {:.2} {:.2} {:.2} | \n\
             I     = | {:.2} {:.2} {:.2} | \n        \
             | {:.2} {:.2} {:.2} | \n\
             Jm    =  {:.2} \n\
             B     =  {:.2} \n\
             Tc    =  {:.2}(+) {:.2}(-) \n\
             G     =  {:.2} \n\
             qlim  =  {}",
            self.m,
            self.r.x, self.r.y, self.r.z,
            i[(0, 0)], i[(0, 1)], i[(0, 2)],
            i[(1, 0)], i[(1, 1)], i[(1, 2)],
            i[(2, 0)], i[(2, 1)], i[(2, 2)],
            self.jm,
            self.b,
            self.tc[0], self.tc[1],
            self.g,
            qlim)
    }
}

impl fmt::Display for ELink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ets)
    }
}
