//! Denavit-Hartenberg link descriptions, converted into equivalent transform sequences.
//!
//! Standard (distal) DH places the joint at the start of the link:
//! `Rz(theta) * tz(d) * tx(a) * Rx(alpha)`. Modified (proximal) DH places it at the end:
//! `Rx(alpha) * tx(a) * Rz(theta) * tz(d)`. For revolute joints `theta` is the joint
//! variable plus `offset`, for prismatic joints `d` is. Terms with zero value are left
//! out of the sequence, and a non-zero offset becomes a fixed transform just before
//! the joint.

use crate::elink::ELink;
use crate::errors::StructuralError;
use crate::et::{Axis, ET, ETS};
use crate::robot::Robot;

/// Anything that can be turned into a single chain link.
pub trait DHLink {
    fn elink(&self) -> Result<ELink, StructuralError>;
}

impl<T: DHLink + ?Sized> DHLink for &T {
    fn elink(&self) -> Result<ELink, StructuralError> {
        (**self).elink()
    }
}

/// Revolute joint, standard DH.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevoluteDH {
    pub a: f64,
    pub d: f64,
    pub alpha: f64,
    /// Added to the joint value
    pub offset: f64,
    pub qlim: Option<[f64; 2]>,
}

/// Prismatic joint, standard DH.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrismaticDH {
    pub a: f64,
    pub theta: f64,
    pub alpha: f64,
    pub offset: f64,
    pub qlim: Option<[f64; 2]>,
}

/// Revolute joint, modified DH.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevoluteMDH {
    pub a: f64,
    pub d: f64,
    pub alpha: f64,
    pub offset: f64,
    pub qlim: Option<[f64; 2]>,
}

/// Prismatic joint, modified DH.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrismaticMDH {
    pub a: f64,
    pub theta: f64,
    pub alpha: f64,
    pub offset: f64,
    pub qlim: Option<[f64; 2]>,
}

fn push_fixed(ets: &mut ETS, axis: Axis, value: f64) {
    if value != 0.0 {
        ets.push(ET::fixed(axis, value));
    }
}

/// Fixed `offset` then the joint, both on `axis`.
fn push_joint(ets: &mut ETS, axis: Axis, offset: f64) {
    push_fixed(ets, axis, offset);
    ets.push(ET::variable(axis));
}

fn build(ets: ETS, qlim: Option<[f64; 2]>) -> Result<ELink, StructuralError> {
    let link = ELink::new(ets)?;
    match qlim {
        Some([lower, upper]) => link.with_qlim(lower, upper),
        None => Ok(link),
    }
}

impl DHLink for RevoluteDH {
    fn elink(&self) -> Result<ELink, StructuralError> {
        let mut ets = ETS::new();
        push_joint(&mut ets, Axis::Rz, self.offset);
        push_fixed(&mut ets, Axis::Tz, self.d);
        push_fixed(&mut ets, Axis::Tx, self.a);
        push_fixed(&mut ets, Axis::Rx, self.alpha);
        build(ets, self.qlim)
    }
}

impl DHLink for PrismaticDH {
    fn elink(&self) -> Result<ELink, StructuralError> {
        let mut ets = ETS::new();
        push_fixed(&mut ets, Axis::Rz, self.theta);
        push_joint(&mut ets, Axis::Tz, self.offset);
        push_fixed(&mut ets, Axis::Tx, self.a);
        push_fixed(&mut ets, Axis::Rx, self.alpha);
        build(ets, self.qlim)
    }
}

impl DHLink for RevoluteMDH {
    fn elink(&self) -> Result<ELink, StructuralError> {
        let mut ets = ETS::new();
        push_fixed(&mut ets, Axis::Rx, self.alpha);
        push_fixed(&mut ets, Axis::Tx, self.a);
        push_joint(&mut ets, Axis::Rz, self.offset);
        push_fixed(&mut ets, Axis::Tz, self.d);
        build(ets, self.qlim)
    }
}

impl DHLink for PrismaticMDH {
    fn elink(&self) -> Result<ELink, StructuralError> {
        let mut ets = ETS::new();
        push_fixed(&mut ets, Axis::Rx, self.alpha);
        push_fixed(&mut ets, Axis::Tx, self.a);
        push_fixed(&mut ets, Axis::Rz, self.theta);
        push_joint(&mut ets, Axis::Tz, self.offset);
        build(ets, self.qlim)
    }
}

/// Serial robot from DH links, named `link1`, `link2`, ... in order.
pub fn dh_robot<L: DHLink>(links: &[L], name: &str) -> Result<Robot, StructuralError> {
    let elinks = links.iter().enumerate()
        .map(|(i, link)| Ok(link.elink()?.named(&format!("link{}", i + 1))))
        .collect::<Result<Vec<_>, StructuralError>>()?;
    Robot::serial(elinks, name)
}
