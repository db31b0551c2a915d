//! Supports reading and writing robot descriptions as YAML (optional)
//!
//! Each link is described by its transform sequence written as text, like
//! `tz(0.333) * Rx(deg(-90)) * Rz()`. Rotation values are radians unless given as
//! `deg(angle)`; empty parentheses mark the joint variable.

use std::path::Path;
use regex::Regex;
use yaml_rust2::{Yaml, YamlLoader};
use crate::elink::{ELink, LinkId};
use crate::errors::StructuralError;
use crate::et::{Axis, ET, ETS};
use crate::kinematic_traits::Pose;
use crate::parameter_error::ParameterError;
use crate::robot::Robot;
use crate::shape::{Shape, ShapeKind, Shapes};
use crate::utils::deg;

impl Robot {
    /// Read the robot from YAML file. YAML file like this is supported:
    /// ```yaml
    /// name: Pendulum
    /// manufacturer: Acme
    /// tool: "tz(0.1)"
    /// links:
    ///   - name: mount
    ///     ets: "tz(1.0) * Rx(deg(90))"
    ///   - name: arm
    ///     ets: "Rz()"
    ///     qlim: [deg(-170), deg(170)]
    ///     m: 1.2
    ///     r: [0.0, 0.0, 0.25]
    ///     I: [0.01, 0.01, 0.002]
    ///     B: 0.1
    ///     Tc: [0.4, -0.43]
    ///     collision:
    ///       - cylinder: [0.03, 0.5]
    ///         origin: "tz(0.25)"
    /// qr: [deg(45)]
    /// ```
    /// A link without `parent` is attached to the link before it (the first link is a
    /// root); `parent: ~` makes it a root, and `parent: name` attaches it to an earlier
    /// link. A parent may also be given by its position in the list, which `to_yaml`
    /// does when link names repeat. `base`, `tool` and shape `origin` are transform
    /// sequences without joints.
    /// Inertia `I` takes 3, 6 or 9 values, Coulomb friction `Tc` one or two.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Same as [`Robot::from_yaml_file`] for the text of the file.
    pub fn from_yaml(contents: &str) -> Result<Self, ParameterError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let doc = docs.first()
            .ok_or_else(|| ParameterError::ParseError("Empty YAML document".into()))?;

        let name = doc["name"].as_str().unwrap_or("robot");
        let entries = doc["links"].as_vec()
            .ok_or_else(|| ParameterError::MissingField("links".into()))?;

        let mut links: Vec<ELink> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let link = read_link(entry, index, &links)?;
            links.push(link);
        }

        let mut robot = Robot::new(links, name)?;
        if let Some(manufacturer) = doc["manufacturer"].as_str() {
            robot = robot.with_manufacturer(manufacturer);
        }
        if let Some(base) = optional_pose(&doc["base"], "base")? {
            robot = robot.with_base(base);
        }
        if let Some(tool) = optional_pose(&doc["tool"], "tool")? {
            robot = robot.with_tool(tool);
        }
        if !doc["qz"].is_badvalue() {
            robot = robot.with_qz(numbers(&doc["qz"], "qz")?)?;
        }
        if !doc["qr"].is_badvalue() {
            robot = robot.with_qr(numbers(&doc["qr"], "qr")?)?;
        }
        Ok(robot)
    }

    /// Convert to string yaml representation that [`Robot::from_yaml`] reads back.
    pub fn to_yaml(&self) -> String {
        let mut out = format!("name: {}\n", quoted(self.name()));
        if !self.manufacturer().is_empty() {
            out.push_str(&format!("manufacturer: {}\n", quoted(self.manufacturer())));
        }
        if *self.base() != Pose::identity() {
            out.push_str(&format!("base: \"{}\"\n", pose_to_yaml(self.base())));
        }
        if *self.tool() != Pose::identity() {
            out.push_str(&format!("tool: \"{}\"\n", pose_to_yaml(self.tool())));
        }
        out.push_str("links:\n");
        for link in self.links() {
            out.push_str(&link_to_yaml(self, link));
        }
        out.push_str(&format!("qz: [{}]\n", join(self.qz())));
        out.push_str(&format!("qr: [{}]\n", join(self.qr())));
        out
    }
}

fn read_link(entry: &Yaml, index: usize, earlier: &[ELink]) -> Result<ELink, ParameterError> {
    let name = match entry["name"].as_str() {
        Some(name) => name.to_string(),
        None => format!("link{}", index),
    };
    let ets_text = entry["ets"].as_str()
        .ok_or_else(|| ParameterError::MissingField(format!("ets of link {}", name)))?;
    let mut link = ELink::new(parse_ets(ets_text)?)?.named(&name);

    let parent = match &entry["parent"] {
        Yaml::BadValue => index.checked_sub(1).map(LinkId),
        Yaml::Null => None,
        Yaml::String(parent) => Some(earlier.iter().position(|l| l.name() == parent)
            .map(LinkId)
            .ok_or_else(|| ParameterError::UnknownParent { link: name.clone(), parent: parent.clone() })?),
        // Position of the parent in the list, for names that are not unique
        Yaml::Integer(parent) if (0..index as i64).contains(parent) => Some(LinkId(*parent as usize)),
        Yaml::Integer(parent) => return Err(ParameterError::UnknownParent {
            link: name.clone(),
            parent: parent.to_string(),
        }),
        other => return Err(ParameterError::ParseError(format!("Bad parent of {}: {:?}", name, other))),
    };
    if let Some(parent) = parent {
        link = link.with_parent(parent);
    }

    if !entry["qlim"].is_badvalue() {
        let qlim = numbers(&entry["qlim"], "qlim")?;
        let [lower, upper] = <[f64; 2]>::try_from(qlim.as_slice())
            .map_err(|_| ParameterError::InvalidLength { expected: 2, found: qlim.len() })?;
        link = link.with_qlim(lower, upper)?;
    }
    if !entry["m"].is_badvalue() {
        link = link.with_mass(number(&entry["m"], "m")?);
    }
    if !entry["r"].is_badvalue() {
        let r = numbers(&entry["r"], "r")?;
        let r = <[f64; 3]>::try_from(r.as_slice())
            .map_err(|_| ParameterError::InvalidLength { expected: 3, found: r.len() })?;
        link = link.with_com(r.into());
    }
    if !entry["I"].is_badvalue() {
        let inertia = numbers(&entry["I"], "I")?;
        link = link.with_inertia(crate::dynamics::InertiaInput::try_from(inertia.as_slice())?)?;
    }
    if !entry["Jm"].is_badvalue() {
        link = link.with_jm(number(&entry["Jm"], "Jm")?);
    }
    if !entry["B"].is_badvalue() {
        link = link.with_viscous(number(&entry["B"], "B")?);
    }
    match &entry["Tc"] {
        Yaml::BadValue => {}
        Yaml::Array(_) => {
            let tc = numbers(&entry["Tc"], "Tc")?;
            link = link.with_coulomb(crate::dynamics::CoulombInput::try_from(tc.as_slice())?);
        }
        scalar => link = link.with_coulomb(number(scalar, "Tc")?),
    }
    if !entry["G"].is_badvalue() {
        link = link.with_gear_ratio(number(&entry["G"], "G")?);
    }
    if !entry["geometry"].is_badvalue() {
        link = link.with_geometry(shapes(&entry["geometry"])?);
    }
    if !entry["collision"].is_badvalue() {
        link = link.with_collision(shapes(&entry["collision"])?);
    }
    Ok(link)
}

/// Parses a transform sequence like `tx(0.1) * Rz(deg(45)) * tz()`.
pub fn parse_ets(text: &str) -> Result<ETS, ParameterError> {
    let term = Regex::new(r"^\s*([A-Za-z]{2})\s*\(\s*(.*?)\s*\)\s*$")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;
    let mut ets = ETS::new();
    if text.trim().is_empty() {
        return Ok(ets);
    }
    for part in text.split('*') {
        let caps = term.captures(part)
            .ok_or_else(|| ParameterError::ParseError(format!("Not a transform: {}", part.trim())))?;
        let axis: Axis = caps[1].parse()?;
        let value = &caps[2];
        if value.is_empty() {
            ets.push(ET::variable(axis));
        } else {
            ets.push(ET::fixed(axis, parse_angle(value)?));
        }
    }
    Ok(ets)
}

/// Plain number, or `deg(angle)` converted into radians.
fn parse_angle(value: &str) -> Result<f64, ParameterError> {
    let re = Regex::new(r"^deg\(\s*([-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?)\s*\)$")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;
    let value = value.trim();
    if let Some(caps) = re.captures(value) {
        let degrees: f64 = caps[1].parse()
            .map_err(|_| ParameterError::WrongAngle(value.to_string()))?;
        Ok(degrees.to_radians())
    } else {
        value.parse()
            .map_err(|_| ParameterError::WrongAngle(value.to_string()))
    }
}

fn number(value: &Yaml, field: &str) -> Result<f64, ParameterError> {
    match value {
        Yaml::Real(_) => value.as_f64()
            .ok_or_else(|| ParameterError::ParseError(format!("{}: bad number", field))),
        Yaml::Integer(i) => Ok(*i as f64),
        Yaml::String(s) => parse_angle(s),
        _ => Err(ParameterError::ParseError(format!("{}: number expected, found {:?}", field, value))),
    }
}

fn numbers(value: &Yaml, field: &str) -> Result<Vec<f64>, ParameterError> {
    value.as_vec()
        .ok_or_else(|| ParameterError::ParseError(format!("{}: list expected", field)))?
        .iter()
        .map(|v| number(v, field))
        .collect()
}

fn optional_pose(value: &Yaml, field: &str) -> Result<Option<Pose>, ParameterError> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(text) => Ok(Some(fixed_pose(text, field)?)),
        other => Err(ParameterError::ParseError(format!("{}: transform expected, found {:?}", field, other))),
    }
}

fn fixed_pose(text: &str, field: &str) -> Result<Pose, ParameterError> {
    let ets = parse_ets(text)?;
    ets.evaluate(&[])
        .map_err(|e| ParameterError::ParseError(format!("{}: {}", field, e)))
}

fn shapes(value: &Yaml) -> Result<Shapes, ParameterError> {
    let entries = match value {
        Yaml::Array(entries) => entries.as_slice(),
        single => std::slice::from_ref(single),
    };
    entries.iter().map(shape).collect()
}

/// One of `box: [x, y, z]`, `cylinder: [radius, length]`, `sphere: radius`,
/// `mesh: file`, with an optional `origin`.
fn shape(value: &Yaml) -> Result<Shape, ParameterError> {
    let invalid = || ParameterError::from(StructuralError::InvalidGeometry(format!("{:?}", value)));
    let hash = value.as_hash().ok_or_else(invalid)?;
    let mut found = None;
    for (key, parameters) in hash {
        let Some(key) = key.as_str() else { return Err(invalid()) };
        if key == "origin" {
            continue;
        }
        if found.is_some() {
            return Err(invalid());
        }
        found = Some(match (key, parameters) {
            ("mesh", Yaml::String(filename)) => Shape::mesh(filename),
            (_, Yaml::Array(_)) => Shape::from_parameters(key, &numbers(parameters, key)?)?,
            (_, scalar) => Shape::from_parameters(key, &[number(scalar, key)?])?,
        });
    }
    let shape = found.ok_or_else(invalid)?;
    match optional_pose(&value["origin"], "origin")? {
        Some(origin) => Ok(shape.with_base(origin)),
        None => Ok(shape),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn join(values: &[f64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Exact text of a value: lengths as they are, angles as `deg()` when that reads back
/// to the same number.
fn value_to_yaml(axis: Axis, value: f64) -> String {
    if axis.is_rotation() {
        let text = deg(&value);
        if parse_angle(&text).is_ok_and(|parsed| parsed == value) {
            return text;
        }
    }
    value.to_string()
}

fn ets_to_yaml(ets: &ETS) -> String {
    ets.iter()
        .map(|et| match et.value() {
            Some(value) => format!("{}({})", et.axis.label(), value_to_yaml(et.axis, value)),
            None => format!("{}()", et.axis.label()),
        })
        .collect::<Vec<_>>()
        .join(" * ")
}

fn pose_to_yaml(pose: &Pose) -> String {
    let t = pose.translation.vector;
    let (roll, pitch, yaw) = pose.rotation.euler_angles();
    let ets: ETS = [ET::tx(t.x), ET::ty(t.y), ET::tz(t.z), ET::rz(yaw), ET::ry(pitch), ET::rx(roll)]
        .into_iter()
        .filter(|et| et.value() != Some(0.0))
        .collect();
    ets_to_yaml(&ets)
}

fn shape_to_yaml(shape: &Shape) -> String {
    let primitive = match &shape.kind {
        ShapeKind::Box { x, y, z } => format!("box: [{}, {}, {}]", x, y, z),
        ShapeKind::Cylinder { radius, length } => format!("cylinder: [{}, {}]", radius, length),
        ShapeKind::Sphere { radius } => format!("sphere: {}", radius),
        ShapeKind::Mesh { filename, .. } => format!("mesh: {}", quoted(filename)),
    };
    if shape.base == Pose::identity() {
        format!("      - {}\n", primitive)
    } else {
        format!("      - {}\n        origin: \"{}\"\n", primitive, pose_to_yaml(&shape.base))
    }
}

fn link_to_yaml(robot: &Robot, link: &ELink) -> String {
    let mut out = format!("  - name: {}\n    ets: \"{}\"\n", quoted(link.name()), ets_to_yaml(link.ets()));
    match link.parent() {
        Some(parent) => {
            let parent_name = robot.link(parent).map(|p| p.name()).unwrap_or_default();
            let same_name = robot.links().iter().filter(|l| l.name() == parent_name).count();
            if same_name == 1 {
                out.push_str(&format!("    parent: {}\n", quoted(parent_name)));
            } else {
                out.push_str(&format!("    parent: {}\n", parent.0));
            }
        }
        None => out.push_str("    parent: ~\n"),
    }
    if let Some(limits) = link.qlim() {
        let axis = link.joint_axis().unwrap_or(Axis::Tz);
        out.push_str(&format!("    qlim: [{}, {}]\n",
                              value_to_yaml(axis, limits.lower), value_to_yaml(axis, limits.upper)));
    }
    if link.m() != 0.0 {
        out.push_str(&format!("    m: {}\n", link.m()));
    }
    if *link.r() != nalgebra::Vector3::zeros() {
        out.push_str(&format!("    r: [{}]\n", join(link.r().as_slice())));
    }
    let i = link.inertia();
    if *i != nalgebra::Matrix3::zeros() {
        out.push_str(&format!("    I: [{}]\n",
                              join(&[i[(0, 0)], i[(1, 1)], i[(2, 2)], i[(0, 1)], i[(1, 2)], i[(0, 2)]])));
    }
    if link.jm() != 0.0 {
        out.push_str(&format!("    Jm: {}\n", link.jm()));
    }
    if link.b() != 0.0 {
        out.push_str(&format!("    B: {}\n", link.b()));
    }
    if link.tc() != [0.0, 0.0] {
        out.push_str(&format!("    Tc: [{}]\n", join(&link.tc())));
    }
    if link.g() != 1.0 {
        out.push_str(&format!("    G: {}\n", link.g()));
    }
    for (field, shapes) in [("geometry", link.geometry()), ("collision", link.collision())] {
        if !shapes.is_empty() {
            out.push_str(&format!("    {}:\n", field));
            for shape in shapes.iter() {
                out.push_str(&shape_to_yaml(shape));
            }
        }
    }
    out
}
