//! Supports building robots from URDF (optional)
//!
//! Every URDF link becomes one [`ELink`]. The link's transform sequence is the origin of
//! the joint leading to it followed by the joint variable, so a robot built from the
//! result has the same link frames as the URDF. Links are ordered parents first.

extern crate sxd_document;

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use std::fs::read_to_string;
use std::path::Path;
use anyhow::Context;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use regex::Regex;
use sxd_document::{dom, parser, QName};
use tracing::warn;
use crate::elink::{ELink, LinkId};
use crate::et::{Axis, ET, ETS};
use crate::parameter_error::ParameterError;
use crate::robot::Robot;
use crate::shape::{Shape, ShapeKind, Shapes};

/// Reads URDF (or simple XACRO) file into links and robot name, see [`from_urdf`].
///
/// # Example
/// ```
/// use rs_ets_kinematics::robot::Robot;
/// let (links, name) = rs_ets_kinematics::urdf::from_urdf_file("src/tests/data/panda.urdf")
///     .expect("Failed to read panda.urdf");
/// let robot = Robot::try_from((links, name)).unwrap();
/// assert_eq!(robot.n(), 7);
/// ```
pub fn from_urdf_file<P: AsRef<Path>>(path: P) -> anyhow::Result<(Vec<ELink>, String)> {
    let path = path.as_ref();
    let xml_content = read_to_string(path)
        .with_context(|| format!("Failed to read xacro/urdf file {}", path.display()))?;
    from_urdf(&xml_content)
        .with_context(|| format!("Failed to interpret robot model in {}", path.display()))
}

/// Same as [`from_urdf_file`] but assembles the robot.
pub fn robot_from_urdf_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Robot> {
    let (links, name) = from_urdf_file(path)?;
    Ok(Robot::try_from((links, name))?)
}

/// Parses URDF XML content into links, ordered so that every parent precedes its
/// children, and the robot name. The result can be passed to `Robot::try_from`.
///
/// Joint origins become fixed `tx ty tz Rz Ry Rx` transforms (zero terms left out).
/// Revolute and continuous joints become a rotation variable, prismatic joints a
/// translation variable, about or along the joint axis that must be one of the
/// coordinate axes, possibly negated. Joint limits may be plain numbers (radians or
/// meters) or `${radians(degrees)}` as common in xacro.
pub fn from_urdf(xml_content: &str) -> Result<(Vec<ELink>, String), ParameterError> {
    let package = parser::parse(xml_content)
        .map_err(|e| ParameterError::XmlProcessingError(format!("Failed to parse XML: {}", e)))?;
    let document = package.as_document();

    let root_element = document.root().children().into_iter()
        .find_map(|e| e.element())
        .ok_or_else(|| ParameterError::XmlProcessingError("No root element found".into()))?;
    let name = root_element.attribute("name")
        .map(|attr| attr.value().to_string())
        .unwrap_or_else(|| "robot".to_string());

    let mut links = Vec::new();
    let mut joints = Vec::new();
    collect(root_element, &mut links, &mut joints)?;

    Ok((assemble(links, joints)?, name))
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Origin {
    xyz: [f64; 3],
    rpy: [f64; 3],
}

impl Origin {
    fn pose(&self) -> Isometry3<f64> {
        let [x, y, z] = self.xyz;
        let [roll, pitch, yaw] = self.rpy;
        Isometry3::from_parts(Translation3::new(x, y, z),
                              UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Fixed transforms equivalent to the origin.
    fn push_to(&self, ets: &mut ETS) {
        let [x, y, z] = self.xyz;
        let [roll, pitch, yaw] = self.rpy;
        for et in [ET::tx(x), ET::ty(y), ET::tz(z), ET::rz(yaw), ET::ry(pitch), ET::rx(roll)] {
            if et.value() != Some(0.0) {
                ets.push(et);
            }
        }
    }
}

#[derive(Debug, Default)]
struct LinkData {
    name: String,
    mass: Option<f64>,
    com: Vector3<f64>,
    inertia: Option<[f64; 6]>,
    visual: Vec<Shape>,
    collision: Vec<Shape>,
}

#[derive(Debug)]
struct JointData {
    name: String,
    kind: String,
    parent: String,
    child: String,
    origin: Origin,
    axis: [f64; 3],
    limits: Option<(f64, f64)>,
}

fn child_elements<'d>(element: dom::Element<'d>) -> impl Iterator<Item = dom::Element<'d>> {
    element.children().into_iter().filter_map(|e| e.element())
}

fn find_child<'d>(element: dom::Element<'d>, tag: &str) -> Option<dom::Element<'d>> {
    let tag = QName::new(tag);
    child_elements(element).find(|el| el.name() == tag)
}

fn required_attribute<'d>(element: dom::Element<'d>, name: &str) -> Result<&'d str, ParameterError> {
    element.attribute(name)
        .map(|attr| attr.value())
        .ok_or_else(|| ParameterError::MissingField(
            format!("{} attribute not found in {}", name, element.name().local_part())))
}

// Recursive, so links and joints inside xacro macros are also found
fn collect(element: dom::Element, links: &mut Vec<LinkData>, joints: &mut Vec<JointData>)
           -> Result<(), ParameterError> {
    let link_tag = QName::new("link");
    let joint_tag = QName::new("joint");

    for child in child_elements(element) {
        if child.name() == link_tag {
            links.push(read_link(child)?);
        } else if child.name() == joint_tag {
            if let Some(joint) = read_joint(child)? {
                joints.push(joint);
            }
        } else {
            collect(child, links, joints)?;
        }
    }
    Ok(())
}

fn read_link(element: dom::Element) -> Result<LinkData, ParameterError> {
    let mut link = LinkData {
        name: required_attribute(element, "name")?.to_string(),
        ..LinkData::default()
    };

    if let Some(inertial) = find_child(element, "inertial") {
        if let Some(mass) = find_child(inertial, "mass") {
            link.mass = Some(parse_number(required_attribute(mass, "value")?)?);
        }
        if let Some(origin) = find_child(inertial, "origin") {
            let origin = read_origin(origin)?;
            link.com = Vector3::from(origin.xyz);
            if origin.rpy != [0.0; 3] {
                warn!("Rotated inertial frame of link {} is not supported, rotation ignored",
                      link.name);
            }
        }
        if let Some(inertia) = find_child(inertial, "inertia") {
            let mut values = [0.0; 6];
            for (value, name) in values.iter_mut().zip(["ixx", "iyy", "izz", "ixy", "iyz", "ixz"]) {
                *value = match inertia.attribute(name) {
                    Some(attr) => parse_number(attr.value())?,
                    None => 0.0,
                };
            }
            link.inertia = Some(values);
        }
    }

    for child in child_elements(element) {
        let local_name = child.name().local_part();
        if local_name == "visual" || local_name == "collision" {
            match read_shape(child)? {
                Some(shape) if local_name == "visual" => link.visual.push(shape),
                Some(shape) => link.collision.push(shape),
                None => warn!("Unsupported geometry in {} of link {}", local_name, link.name),
            }
        }
    }
    Ok(link)
}

fn read_shape(element: dom::Element) -> Result<Option<Shape>, ParameterError> {
    let base = match find_child(element, "origin") {
        Some(origin) => read_origin(origin)?.pose(),
        None => Isometry3::identity(),
    };
    let Some(geometry) = find_child(element, "geometry") else {
        return Ok(None);
    };
    let Some(primitive) = child_elements(geometry).next() else {
        return Ok(None);
    };
    let kind = match primitive.name().local_part() {
        "box" => {
            let [x, y, z] = parse_triple(required_attribute(primitive, "size")?)?;
            ShapeKind::Box { x, y, z }
        }
        "cylinder" => ShapeKind::Cylinder {
            radius: parse_number(required_attribute(primitive, "radius")?)?,
            length: parse_number(required_attribute(primitive, "length")?)?,
        },
        "sphere" => ShapeKind::Sphere {
            radius: parse_number(required_attribute(primitive, "radius")?)?,
        },
        "mesh" => ShapeKind::Mesh {
            filename: required_attribute(primitive, "filename")?.to_string(),
            scale: match primitive.attribute("scale") {
                Some(scale) => Vector3::from(parse_triple(scale.value())?),
                None => Vector3::repeat(1.0),
            },
        },
        _ => return Ok(None),
    };
    Ok(Some(Shape { kind, base }))
}

fn read_joint(element: dom::Element) -> Result<Option<JointData>, ParameterError> {
    // Joint references inside other elements (transmissions) carry no parent/child
    let (Some(parent), Some(child)) = (find_child(element, "parent"), find_child(element, "child")) else {
        return Ok(None);
    };
    let name = element.attribute("name")
        .map(|attr| attr.value().to_string())
        .unwrap_or_else(|| "Unnamed".to_string());

    if find_child(element, "mimic").is_some() {
        warn!("Mimic tag of joint {} ignored, it is an independent joint", name);
    }

    let limits = match find_child(element, "limit")
        .filter(|limit| limit.attribute("lower").is_some() || limit.attribute("upper").is_some())
        .map(get_limits).transpose() {
        Ok(limits) => limits,
        Err(e) => {
            warn!("Joint limits defined but not readable for {}: {}", name, e);
            None
        }
    };

    Ok(Some(JointData {
        kind: required_attribute(element, "type")?.to_string(),
        parent: required_attribute(parent, "link")?.to_string(),
        child: required_attribute(child, "link")?.to_string(),
        origin: find_child(element, "origin").map_or_else(|| Ok(Origin::default()), read_origin)?,
        axis: match find_child(element, "axis") {
            Some(axis) => parse_triple(required_attribute(axis, "xyz")?)?,
            None => [1.0, 0.0, 0.0],
        },
        limits,
        name,
    }))
}

fn read_origin(element: dom::Element) -> Result<Origin, ParameterError> {
    let xyz = match element.attribute("xyz") {
        Some(attr) => parse_triple(attr.value())?,
        None => [0.0; 3],
    };
    let rpy = match element.attribute("rpy") {
        Some(attr) => {
            let angles = attr.value().split_whitespace()
                .map(parse_angle)
                .collect::<Result<Vec<f64>, _>>()?;
            <[f64; 3]>::try_from(angles.as_slice())
                .map_err(|_| ParameterError::InvalidLength { expected: 3, found: angles.len() })?
        }
        None => [0.0; 3],
    };
    Ok(Origin { xyz, rpy })
}

fn parse_number(value: &str) -> Result<f64, ParameterError> {
    value.trim().parse()
        .map_err(|_| ParameterError::ParseError(format!("Not a number: {}", value)))
}

fn parse_triple(value: &str) -> Result<[f64; 3], ParameterError> {
    let numbers = value.split_whitespace()
        .map(parse_number)
        .collect::<Result<Vec<f64>, _>>()?;
    <[f64; 3]>::try_from(numbers.as_slice())
        .map_err(|_| ParameterError::InvalidLength { expected: 3, found: numbers.len() })
}

fn parse_angle(attr_value: &str) -> Result<f64, ParameterError> {
    // Regular expression to match the ${radians(<number>)} format that is common in xacro
    let re = Regex::new(r"^\$\{radians\((-?\d+(\.\d+)?)\)\}$")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;

    if let Some(caps) = re.captures(attr_value) {
        let degrees_str = caps.get(1)
            .ok_or_else(|| ParameterError::WrongAngle(format!("Bad representation: {}", attr_value)))?
            .as_str();
        let degrees: f64 = degrees_str.parse()
            .map_err(|_| ParameterError::WrongAngle(attr_value.to_string()))?;
        Ok(degrees.to_radians())
    } else {
        // Plain number is in radians
        attr_value.parse()
            .map_err(|_| ParameterError::WrongAngle(attr_value.to_string()))
    }
}

fn get_limits(element: dom::Element) -> Result<(f64, f64), ParameterError> {
    let lower_limit = parse_angle(required_attribute(element, "lower")?)?;
    let upper_limit = parse_angle(required_attribute(element, "upper")?)?;
    Ok((lower_limit, upper_limit))
}

/// Appends the joint variable. Negative axes are flipped onto the positive one by a
/// half turn that is undone after the joint.
fn push_joint(ets: &mut ETS, joint: &JointData) -> Result<(), ParameterError> {
    let rotation = match joint.kind.as_str() {
        "revolute" | "continuous" => true,
        "prismatic" => false,
        "fixed" => return Ok(()),
        other => {
            warn!("Joint {} of type {} is treated as fixed", joint.name, other);
            return Ok(());
        }
    };

    let non_zero: Vec<usize> = (0..3).filter(|&i| joint.axis[i] != 0.0).collect();
    let [index] = non_zero.as_slice() else {
        return Err(ParameterError::ParseError(
            format!("Axis of joint {} must be a coordinate axis, found {:?}", joint.name, joint.axis)));
    };
    let axis = match (*index, rotation) {
        (0, true) => Axis::Rx,
        (1, true) => Axis::Ry,
        (_, true) => Axis::Rz,
        (0, false) => Axis::Tx,
        (1, false) => Axis::Ty,
        (_, false) => Axis::Tz,
    };

    if joint.axis[*index] < 0.0 {
        let flip = if *index == 2 { Axis::Rx } else { Axis::Rz };
        ets.push(ET::fixed(flip, PI));
        ets.push(ET::variable(axis));
        ets.push(ET::fixed(flip, -PI));
    } else {
        ets.push(ET::variable(axis));
    }
    Ok(())
}

/// Orders links breadth first from the roots and builds their transform sequences.
fn assemble(links: Vec<LinkData>, joints: Vec<JointData>) -> Result<Vec<ELink>, ParameterError> {
    let index_of: HashMap<&str, usize> = links.iter().enumerate()
        .map(|(i, link)| (link.name.as_str(), i))
        .collect();

    let mut joint_to: HashMap<usize, &JointData> = HashMap::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); links.len()];
    for joint in &joints {
        let child = *index_of.get(joint.child.as_str())
            .ok_or_else(|| ParameterError::MissingField(
                format!("Link {} of joint {} not declared", joint.child, joint.name)))?;
        let parent = *index_of.get(joint.parent.as_str())
            .ok_or_else(|| ParameterError::UnknownParent {
                link: joint.child.clone(),
                parent: joint.parent.clone(),
            })?;
        if joint_to.insert(child, joint).is_some() {
            return Err(ParameterError::ParseError(format!("Link {} has more than one parent", joint.child)));
        }
        children[parent].push(child);
    }

    let mut queue: VecDeque<usize> = (0..links.len()).filter(|i| !joint_to.contains_key(i)).collect();
    let mut new_ids: Vec<Option<LinkId>> = vec![None; links.len()];
    let mut order: Vec<usize> = Vec::with_capacity(links.len());
    while let Some(index) = queue.pop_front() {
        new_ids[index] = Some(LinkId(order.len()));
        order.push(index);
        queue.extend(children[index].iter().copied());
    }
    if order.len() != links.len() {
        return Err(ParameterError::ParseError("Links form a cycle".into()));
    }

    let mut elinks = Vec::with_capacity(order.len());
    for index in order {
        let data = &links[index];
        let mut ets = ETS::new();
        let mut parent = None;
        let mut limits = None;
        if let Some(joint) = joint_to.get(&index) {
            joint.origin.push_to(&mut ets);
            push_joint(&mut ets, joint)?;
            parent = index_of.get(joint.parent.as_str()).and_then(|&p| new_ids[p]);
            limits = joint.limits;
        }

        let mut link = ELink::new(ets)?
            .named(&data.name)
            .with_com(data.com)
            .with_geometry(Shapes::from(data.visual.clone()))
            .with_collision(Shapes::from(data.collision.clone()));
        if let Some(parent) = parent {
            link = link.with_parent(parent);
        }
        if let Some(mass) = data.mass {
            link = link.with_mass(mass);
        }
        if let Some(inertia) = data.inertia {
            link = link.with_inertia(inertia)?;
        }
        if let Some((lower, upper)) = limits {
            if link.is_variable() && lower < upper {
                link = link.with_qlim(lower, upper)?;
            }
        }
        elinks.push(link);
    }
    Ok(elinks)
}
