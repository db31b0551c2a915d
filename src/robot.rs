//! Robot as a tree of links.
//!
//! Links are kept in an arena in declaration order and refer to their parent by
//! [`LinkId`]. A parent must be declared before its children, so the tree can neither
//! contain cycles nor forward references, and a single pass in arena order visits every
//! parent before its children. Several roots are allowed.
//!
//! Joint values are assigned to the links carrying a joint variable in arena order.

use std::fmt;
use rand::Rng;
use tracing::debug;
use crate::constraints::JointLimits;
use crate::dynamics::Friction;
use crate::elink::{ELink, LinkId};
use crate::errors::{EvaluationError, StructuralError};
use crate::kinematic_traits::{Joints, Kinematics, Pose};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    name: String,
    manufacturer: String,
    links: Vec<ELink>,
    /// Position in the joint vector for every link with a joint variable
    joint_indices: Vec<Option<usize>>,
    n: usize,
    base: Pose,
    tool: Pose,
    qz: Joints,
    qr: Joints,
}

impl Robot {
    /// Assemble a robot from links in declaration order. Every parent must refer to a
    /// link declared before the one referring to it.
    pub fn new(links: Vec<ELink>, name: &str) -> Result<Self, StructuralError> {
        for (index, link) in links.iter().enumerate() {
            if let Some(LinkId(parent)) = link.parent() {
                if parent >= index {
                    return Err(StructuralError::InvalidParent { link: index, parent });
                }
            }
        }

        let mut n = 0;
        let joint_indices: Vec<Option<usize>> = links.iter().map(|link| {
            if link.is_variable() {
                n += 1;
                Some(n - 1)
            } else {
                None
            }
        }).collect();

        debug!("Robot {}: {} links, {} joints", name, links.len(), n);
        Ok(Robot {
            name: name.to_string(),
            manufacturer: String::new(),
            links,
            joint_indices,
            n,
            base: Pose::identity(),
            tool: Pose::identity(),
            qz: vec![0.0; n],
            qr: vec![0.0; n],
        })
    }

    /// Chain of links where each link is the parent of the next one. Parents already
    /// present on the links are replaced.
    pub fn serial(links: Vec<ELink>, name: &str) -> Result<Self, StructuralError> {
        let links = links.into_iter().enumerate().map(|(index, mut link)| {
            link.set_parent(index.checked_sub(1).map(LinkId));
            link
        }).collect();
        Self::new(links, name)
    }

    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = manufacturer.to_string();
        self
    }

    pub fn with_base(mut self, base: Pose) -> Self {
        self.base = base;
        self
    }

    pub fn with_tool(mut self, tool: Pose) -> Self {
        self.tool = tool;
        self
    }

    /// Zero configuration
    pub fn with_qz(mut self, qz: Joints) -> Result<Self, StructuralError> {
        self.check_configuration("qz", &qz)?;
        self.qz = qz;
        Ok(self)
    }

    /// Ready configuration
    pub fn with_qr(mut self, qr: Joints) -> Result<Self, StructuralError> {
        self.check_configuration("qr", &qr)?;
        self.qr = qr;
        Ok(self)
    }

    fn check_configuration(&self, name: &str, q: &[f64]) -> Result<(), StructuralError> {
        if q.len() != self.n {
            return Err(StructuralError::ConfigurationLength {
                name: name.to_string(),
                expected: self.n,
                found: q.len(),
            });
        }
        Ok(())
    }

    fn check_joints(&self, q: &[f64]) -> Result<(), EvaluationError> {
        if q.len() != self.n {
            return Err(EvaluationError::JointCountMismatch { expected: self.n, found: q.len() });
        }
        Ok(())
    }

    /// Number of joints.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn base(&self) -> &Pose {
        &self.base
    }

    pub fn tool(&self) -> &Pose {
        &self.tool
    }

    pub fn qz(&self) -> &Joints {
        &self.qz
    }

    pub fn qr(&self) -> &Joints {
        &self.qr
    }

    pub fn links(&self) -> &[ELink] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Result<&ELink, EvaluationError> {
        self.links.get(id.0).ok_or_else(|| EvaluationError::UnknownLink(id.to_string()))
    }

    /// Id of the first link with the given name.
    pub fn find(&self, name: &str) -> Option<LinkId> {
        self.links.iter().position(|link| link.name() == name).map(LinkId)
    }

    pub fn names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    pub fn parent(&self, id: LinkId) -> Option<LinkId> {
        self.links.get(id.0).and_then(|link| link.parent())
    }

    /// Links whose parent is `id`, in declaration order.
    pub fn children(&self, id: LinkId) -> Vec<LinkId> {
        self.links.iter().enumerate()
            .filter(|(_, link)| link.parent() == Some(id))
            .map(|(index, _)| LinkId(index))
            .collect()
    }

    /// Links without children.
    pub fn leaves(&self) -> Vec<LinkId> {
        let mut has_children = vec![false; self.links.len()];
        for link in &self.links {
            if let Some(LinkId(parent)) = link.parent() {
                has_children[parent] = true;
            }
        }
        has_children.iter().enumerate()
            .filter(|(_, has)| !**has)
            .map(|(index, _)| LinkId(index))
            .collect()
    }

    /// The link itself, then its parent and so on up to the root.
    pub fn ancestors(&self, id: LinkId) -> impl Iterator<Item = LinkId> + '_ {
        let start = if id.0 < self.links.len() { Some(id) } else { None };
        std::iter::successors(start, move |current| self.parent(*current))
    }

    /// Position of the link's joint variable in the joint vector.
    pub fn joint_index(&self, id: LinkId) -> Option<usize> {
        self.joint_indices.get(id.0).copied().flatten()
    }

    /// Links carrying the joint variables, in joint vector order.
    pub fn joints(&self) -> impl Iterator<Item = &ELink> {
        self.links.iter().filter(|link| link.is_variable())
    }

    /// Limits of every joint, in joint vector order.
    pub fn qlim(&self) -> Vec<Option<JointLimits>> {
        self.joints().map(|link| link.qlim()).collect()
    }

    fn local_transform(&self, index: usize, q: &[f64]) -> Result<Pose, EvaluationError> {
        let value = self.joint_indices[index].map(|j| q[j]);
        self.links[index].local_transform(value)
    }

    /// World pose of every link frame, in arena order. The tool transform is not applied.
    pub fn link_poses(&self, q: &[f64]) -> Result<Vec<Pose>, EvaluationError> {
        self.check_joints(q)?;
        let mut poses: Vec<Pose> = Vec::with_capacity(self.links.len());
        for (index, link) in self.links.iter().enumerate() {
            let parent_pose = match link.parent() {
                Some(LinkId(parent)) => poses[parent],
                None => self.base,
            };
            poses.push(parent_pose * self.local_transform(index, q)?);
        }
        Ok(poses)
    }

    /// Pose of the tool mounted on the `end` link.
    pub fn pose_of(&self, q: &[f64], end: LinkId) -> Result<Pose, EvaluationError> {
        self.check_joints(q)?;
        self.link(end)?;
        let chain: Vec<LinkId> = self.ancestors(end).collect();
        let mut pose = self.base;
        for LinkId(index) in chain.into_iter().rev() {
            pose *= self.local_transform(index, q)?;
        }
        Ok(pose * self.tool)
    }

    /// Pose of the tool for a robot with a single end effector.
    pub fn pose(&self, q: &[f64]) -> Result<Pose, EvaluationError> {
        if self.links.is_empty() {
            return Err(EvaluationError::EmptyRobot);
        }
        match self.leaves().as_slice() {
            [end] => self.pose_of(q, *end),
            leaves => Err(EvaluationError::AmbiguousEndEffector { leaves: leaves.len() }),
        }
    }

    /// Pose of the tool for each of the given configurations.
    pub fn forward_many(&self, qs: &[Joints]) -> Vec<Result<Pose, EvaluationError>> {
        #[cfg(feature = "parallel")]
        let poses = qs.par_iter().map(|q| self.pose(q)).collect();
        #[cfg(not(feature = "parallel"))]
        let poses = qs.iter().map(|q| self.pose(q)).collect();
        poses
    }

    /// Per joint, whether the value is beyond its limits. Joints without limits are
    /// never at the limit.
    pub fn is_at_limit(&self, q: &[f64]) -> Result<Vec<bool>, EvaluationError> {
        self.check_joints(q)?;
        Ok(self.joints().zip(q).map(|(link, q)| link.is_at_limit(*q)).collect())
    }

    pub fn any_at_limit(&self, q: &[f64]) -> Result<bool, EvaluationError> {
        Ok(self.is_at_limit(q)?.into_iter().any(|at_limit| at_limit))
    }

    /// Configuration drawn uniformly within the joint limits; joints without limits are
    /// drawn from -pi to pi.
    pub fn random_configuration<R: Rng + ?Sized>(&self, rng: &mut R) -> Joints {
        use std::f64::consts::PI;
        self.joints().map(|link| match link.qlim() {
            Some(limits) if limits.range() > 0.0 => rng.gen_range(limits.lower..=limits.upper),
            Some(limits) => limits.lower,
            None => rng.gen_range(-PI..=PI),
        }).collect()
    }

    /// Copy of the robot with the selected friction removed from every link.
    pub fn without_friction(&self, which: Friction) -> Robot {
        let mut robot = self.clone();
        robot.links = self.links.iter().map(|link| link.without_friction(which)).collect();
        robot
    }
}

impl TryFrom<(Vec<ELink>, String)> for Robot {
    type Error = StructuralError;

    fn try_from((links, name): (Vec<ELink>, String)) -> Result<Self, Self::Error> {
        Robot::new(links, &name)
    }
}

impl Kinematics for Robot {
    fn dof(&self) -> usize {
        self.n
    }

    fn forward(&self, qs: &[f64]) -> Result<Pose, EvaluationError> {
        self.pose(qs)
    }
}

impl fmt::Display for Robot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.manufacturer.is_empty() {
            writeln!(f, "{}: {} joints", self.name, self.n)?;
        } else {
            writeln!(f, "{} ({}): {} joints", self.name, self.manufacturer, self.n)?;
        }
        for (index, link) in self.links.iter().enumerate() {
            let parent = match link.parent() {
                Some(LinkId(parent)) => self.links[parent].name(),
                None => "-",
            };
            writeln!(f, "{:>3} {:<12} {:<12} {}", index, link.name(), parent, link)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Isometry3, Vector3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::et::ET;
    use super::*;

    const SMALL: f64 = 1e-9;

    fn assert_poses_equal(a: &Pose, b: &Pose) {
        let (ma, mb) = (a.to_homogeneous(), b.to_homogeneous());
        assert!((ma - mb).amax() < SMALL, "Poses differ:\n{}\n{}", ma, mb);
    }

    /// Base with a revolute joint and two fingers, each a prismatic joint.
    fn gripper() -> Robot {
        let links = vec![
            ELink::new(ET::tz(0.5) * ET::rz_joint()).unwrap().named("palm"),
            ELink::new(ET::ty(0.05) * ET::ty_joint()).unwrap().named("left")
                .with_parent(LinkId(0)).with_qlim(0.0, 0.04).unwrap(),
            ELink::new(ET::ty(-0.05) * ET::rz(std::f64::consts::PI) * ET::ty_joint()).unwrap()
                .named("right").with_parent(LinkId(0)).with_qlim(0.0, 0.04).unwrap(),
        ];
        Robot::new(links, "gripper").unwrap()
    }

    #[test]
    fn test_structure() {
        let robot = gripper();
        assert_eq!(robot.n(), 3);
        assert_eq!(robot.children(LinkId(0)), vec![LinkId(1), LinkId(2)]);
        assert_eq!(robot.leaves(), vec![LinkId(1), LinkId(2)]);
        assert_eq!(robot.find("right"), Some(LinkId(2)));
        assert_eq!(robot.find("thumb"), None);
        assert_eq!(robot.ancestors(LinkId(2)).collect::<Vec<_>>(), vec![LinkId(2), LinkId(0)]);
        assert_eq!(robot.joint_index(LinkId(1)), Some(1));
        assert_eq!(robot.names(), vec!["palm", "left", "right"]);
        assert_eq!(robot.qz(), &vec![0.0; 3]);
    }

    #[test]
    fn test_invalid_parent() {
        let links = vec![
            ELink::default().named("a").with_parent(LinkId(1)),
            ELink::default().named("b"),
        ];
        assert_eq!(Robot::new(links, "forward").err(),
                   Some(StructuralError::InvalidParent { link: 0, parent: 1 }));

        let links = vec![ELink::default().with_parent(LinkId(0))];
        assert_eq!(Robot::new(links, "self").err(),
                   Some(StructuralError::InvalidParent { link: 0, parent: 0 }));
    }

    #[test]
    fn test_branching_pose() {
        let robot = gripper();
        let q = [0.0, 0.01, 0.02];
        assert_eq!(robot.pose(&q), Err(EvaluationError::AmbiguousEndEffector { leaves: 2 }));

        let left = robot.pose_of(&q, LinkId(1)).unwrap();
        assert!((left.translation.vector - Vector3::new(0.0, 0.06, 0.5)).norm() < SMALL);
        let right = robot.pose_of(&q, LinkId(2)).unwrap();
        assert!((right.translation.vector - Vector3::new(0.0, -0.07, 0.5)).norm() < SMALL);

        let poses = robot.link_poses(&q).unwrap();
        assert_poses_equal(&poses[1], &left);
        assert_poses_equal(&poses[2], &right);
    }

    #[test]
    fn test_base_and_tool() {
        let robot = Robot::serial(vec![
            ELink::new(ET::rz_joint()).unwrap(),
            ELink::new(ET::tx(1.0)).unwrap(),
        ], "arm").unwrap()
            .with_base(Isometry3::translation(0.0, 0.0, 1.0))
            .with_tool(Isometry3::translation(0.5, 0.0, 0.0));
        let pose = robot.pose(&[std::f64::consts::FRAC_PI_2]).unwrap();
        assert!((pose.translation.vector - Vector3::new(0.0, 1.5, 1.0)).norm() < SMALL);
    }

    #[test]
    fn test_argument_errors() {
        let robot = gripper();
        assert_eq!(robot.pose_of(&[0.0], LinkId(1)),
                   Err(EvaluationError::JointCountMismatch { expected: 3, found: 1 }));
        assert!(matches!(robot.pose_of(&[0.0; 3], LinkId(7)), Err(EvaluationError::UnknownLink(_))));
        let empty = Robot::new(vec![], "empty").unwrap();
        assert_eq!(empty.pose(&[]), Err(EvaluationError::EmptyRobot));
        assert_eq!(robot.clone().with_qr(vec![0.0]).err(),
                   Some(StructuralError::ConfigurationLength { name: "qr".into(), expected: 3, found: 1 }));
    }

    #[test]
    fn test_limits() {
        let robot = gripper();
        assert_eq!(robot.is_at_limit(&[10.0, 0.02, 0.05]).unwrap(), vec![false, false, true]);
        assert!(!robot.any_at_limit(&[10.0, 0.02, 0.02]).unwrap());
        assert_eq!(robot.qlim()[0], None);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let q = robot.random_configuration(&mut rng);
            assert!(!robot.any_at_limit(&q).unwrap());
            assert!(q[0].abs() <= std::f64::consts::PI);
        }
    }

    #[test]
    fn test_forward_many() {
        let robot = Robot::serial(vec![ELink::new(ET::tx_joint()).unwrap()], "slider").unwrap();
        let qs: Vec<Joints> = (0..10).map(|i| vec![i as f64]).collect();
        let poses = robot.forward_many(&qs);
        for (i, pose) in poses.into_iter().enumerate() {
            assert_eq!(pose.unwrap().translation.vector.x, i as f64);
        }
    }

    #[test]
    fn test_from_tuple_and_display() {
        let robot = Robot::try_from((vec![
            ELink::new(ET::tz(1.0)).unwrap().named("base"),
            ELink::new(ET::rz_joint()).unwrap().named("link1").with_parent(LinkId(0)),
        ], "demo".to_string())).unwrap();
        assert_eq!(robot.dof(), 1);
        let text = robot.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "demo: 1 joints");
        assert!(lines[2].contains("link1"));
        assert!(lines[2].contains("base"));
        assert!(lines[2].ends_with("Rz()"));
    }
}
