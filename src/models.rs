//! Hardcoded robot models

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use nalgebra::{Isometry3, Vector3};
use crate::dh::{dh_robot, RevoluteMDH};
use crate::elink::{ELink, LinkId};
use crate::errors::StructuralError;
use crate::et::ET;
use crate::robot::Robot;

/// Franka Emika Panda, modified DH.
/// See https://frankaemika.github.io/docs/control_parameters.html
pub fn panda() -> Result<Robot, StructuralError> {
    let tool_offset = 0.103;
    let flange = 0.107;

    let links = [
        RevoluteMDH { d: 0.333, qlim: Some([-2.8973, 2.8973]), ..Default::default() },
        RevoluteMDH { alpha: -FRAC_PI_2, qlim: Some([-1.7628, 1.7628]), ..Default::default() },
        RevoluteMDH { d: 0.316, alpha: FRAC_PI_2, qlim: Some([-2.8973, 2.8973]), ..Default::default() },
        RevoluteMDH { a: 0.0825, alpha: FRAC_PI_2, qlim: Some([-3.0718, -0.0698]), ..Default::default() },
        RevoluteMDH { a: -0.0825, d: 0.384, alpha: -FRAC_PI_2, qlim: Some([-2.8973, 2.8973]), ..Default::default() },
        RevoluteMDH { alpha: FRAC_PI_2, qlim: Some([-0.0175, 3.7525]), ..Default::default() },
        RevoluteMDH { a: 0.088, d: flange, alpha: FRAC_PI_2, qlim: Some([-2.8973, 2.8973]), ..Default::default() },
    ];

    let tool = Isometry3::translation(0.0, 0.0, tool_offset)
        * Isometry3::rotation(Vector3::z() * -FRAC_PI_4);

    dh_robot(&links, "Panda")?
        .with_manufacturer("Franka Emika")
        .with_tool(tool)
        .with_qz(vec![0.0; 7])?
        .with_qr(vec![0.0, -0.3, 0.0, -2.2, 0.0, 2.0, FRAC_PI_4])
}

/// Panda on a mobile base (rotation then forward motion), as a pure transform sequence.
/// The tool offset is a fixed end-effector link.
pub fn frankie() -> Result<Robot, StructuralError> {
    let tool_offset = 0.103;
    let deg90 = FRAC_PI_2;

    let links = vec![
        ELink::new(ET::rz_joint())?.named("base0"),
        ELink::new(ET::tx_joint())?.named("base1"),
        ELink::new(ET::tz(0.333) * ET::rz_joint())?.named("link0"),
        ELink::new(ET::rx(-deg90) * ET::rz_joint())?.named("link1"),
        ELink::new(ET::rx(deg90) * ET::tz(0.316) * ET::rz_joint())?.named("link2"),
        ELink::new(ET::tx(0.0825) * ET::rx(deg90) * ET::rz_joint())?.named("link3"),
        ELink::new(ET::tx(-0.0825) * ET::rx(-deg90) * ET::tz(0.384) * ET::rz_joint())?.named("link4"),
        ELink::new(ET::rx(deg90) * ET::rz_joint())?.named("link5"),
        ELink::new(ET::tx(0.088) * ET::rx(deg90) * ET::tz(0.107) * ET::rz_joint())?.named("link6"),
        ELink::new(ET::tz(tool_offset) * ET::rz(-FRAC_PI_4))?.named("ee"),
    ];
    let links = links.into_iter().enumerate()
        .map(|(i, link)| match i {
            0 => link,
            _ => link.with_parent(LinkId(i - 1)),
        })
        .collect();

    Robot::new(links, "Frankie")?
        .with_manufacturer("Franka Emika, Omron")
        .with_qz(vec![0.0; 9])?
        .with_qr(vec![0.0, 0.0, 0.0, -0.3, 0.0, -2.2, 0.0, 2.0, FRAC_PI_4])
}
