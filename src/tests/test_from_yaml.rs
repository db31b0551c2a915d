#[cfg(test)]
mod tests {
    use nalgebra::{Matrix3, Vector3};
    use crate::elink::{ELink, LinkId};
    use crate::et::ET;
    use crate::models::{frankie, panda};
    use crate::parameter_error::ParameterError;
    use crate::robot::Robot;
    use crate::shape::ShapeKind;
    use crate::tests::test_utils::{assert_pose, assert_poses_close, rng};
    use crate::utils::as_radians;

    const PLANAR_ARM: &str = "src/tests/data/planar_arm.yaml";

    fn planar_arm() -> Robot {
        Robot::from_yaml_file(PLANAR_ARM).expect("Failed to load planar_arm.yaml")
    }

    #[test]
    fn test_read_planar_arm() {
        let robot = planar_arm();
        assert_eq!(robot.name(), "Planar");
        assert_eq!(robot.manufacturer(), "Acme");
        assert_eq!(robot.n(), 2);
        assert_eq!(robot.names(), vec!["shoulder", "elbow", "flange"]);
        assert_eq!(robot.parent(LinkId(2)), Some(LinkId(1)));
        assert_eq!(robot.leaves(), vec![LinkId(2)]);
        assert_eq!(robot.qz(), &vec![0.0, 0.0]);
        assert_eq!(robot.qr(), &as_radians([30.0, -60.0]).to_vec());

        let limits = robot.qlim();
        assert_eq!(limits[0].map(|l| (l.lower, l.upper)),
                   Some(((-170f64).to_radians(), 170f64.to_radians())));
        assert_eq!(limits[1].map(|l| (l.lower, l.upper)), Some((-2.0, 2.0)));
    }

    #[test]
    fn test_read_dynamics() {
        let robot = planar_arm();
        let shoulder = robot.link(LinkId(0)).unwrap();
        assert_eq!(shoulder.m(), 1.5);
        assert_eq!(*shoulder.r(), Vector3::new(0.2, 0.0, 0.0));
        assert_eq!(*shoulder.inertia(), Matrix3::from_diagonal(&Vector3::new(0.01, 0.02, 0.03)));
        assert_eq!(shoulder.jm(), 0.0002);
        assert_eq!(shoulder.b(), 0.001);
        assert_eq!(shoulder.tc(), [0.4, -0.43]);
        assert_eq!(shoulder.g(), 100.0);

        let elbow = robot.link(LinkId(1)).unwrap();
        assert_eq!(elbow.m(), 1.0);
        assert_eq!(elbow.tc(), [0.2, -0.2], "Single Coulomb value is symmetric");
        assert_eq!(elbow.g(), 1.0);

        let flange = robot.link(LinkId(2)).unwrap();
        assert!(flange.qlim().is_none());
        assert_eq!(flange.m(), 0.0);
    }

    #[test]
    fn test_read_shapes() {
        let robot = planar_arm();
        let shoulder = robot.link(LinkId(0)).unwrap();
        assert_eq!(shoulder.collision().len(), 1);
        assert!(shoulder.geometry().is_empty());

        // Cylinder laid along x, from the joint to the elbow
        let bounds = shoulder.collision().local_bounds().unwrap();
        assert!((bounds.mins.x - 0.0).abs() < 1e-12);
        assert!((bounds.maxs.x - 0.4).abs() < 1e-12);
        assert!((bounds.maxs.z - 0.05).abs() < 1e-12);

        let elbow = robot.link(LinkId(1)).unwrap();
        let mesh = elbow.geometry().iter().next().unwrap();
        assert!(matches!(&mesh.kind, ShapeKind::Mesh { filename, .. } if filename == "meshes/elbow.stl"));
    }

    #[test]
    fn test_planar_arm_kinematics() {
        let robot = planar_arm();
        let q = robot.qr().clone();
        let (a, b) = (q[0], q[1]);
        let x = 0.4 * a.cos() + 0.4 * (a + b).cos();
        let y = 0.4 * a.sin() + 0.4 * (a + b).sin();
        let (s, c) = (a + b).sin_cos();
        assert_pose(&robot.pose(&q).unwrap(), [x, y, 0.5],
                    Matrix3::new(c, -s, 0.0,
                                 s, c, 0.0,
                                 0.0, 0.0, 1.0),
                    1e-12);
    }

    fn assert_same_robot(original: &Robot, restored: &Robot) {
        assert_eq!(restored.name(), original.name());
        assert_eq!(restored.manufacturer(), original.manufacturer());
        assert_eq!(restored.n(), original.n());
        assert_eq!(restored.names(), original.names());
        assert_eq!(restored.qz(), original.qz());
        assert_eq!(restored.qr(), original.qr());
        assert_eq!(restored.qlim(), original.qlim());
        for (a, b) in original.links().iter().zip(restored.links()) {
            assert_eq!(a.ets(), b.ets(), "Transforms of {} differ", a.name());
            assert_eq!(a.parent(), b.parent());
            assert_eq!(a.dynamics(), b.dynamics());
            assert_eq!(a.collision().len(), b.collision().len());
            assert_eq!(a.geometry().len(), b.geometry().len());
        }

        let mut rng = rng();
        for _ in 0..20 {
            let q = original.random_configuration(&mut rng);
            assert_poses_close(&restored.pose(&q).unwrap(), &original.pose(&q).unwrap(), 1e-12);
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        for robot in [planar_arm(), panda().unwrap(), frankie().unwrap()] {
            let yaml = robot.to_yaml();
            let restored = Robot::from_yaml(&yaml)
                .unwrap_or_else(|e| panic!("Failed to read back {}: {}\n{}", robot.name(), e, yaml));
            assert_same_robot(&robot, &restored);
        }
    }

    /// Serial chain whose links all have the empty name.
    fn unnamed_chain() -> Robot {
        Robot::serial(vec![
            ELink::new(ET::rz_joint()).unwrap(),
            ELink::new(ET::tx(1.0)).unwrap(),
            ELink::new(ET::tx(1.0) * ET::rz_joint()).unwrap(),
        ], "unnamed").unwrap()
    }

    #[test]
    fn test_round_trip_with_repeated_names() {
        let unnamed = unnamed_chain();

        let links = vec![
            ELink::new(ET::tz(0.5)).unwrap().named("body"),
            ELink::new(ET::ty(0.1) * ET::rx_joint()).unwrap().named("finger").with_parent(LinkId(0)),
            ELink::new(ET::tx(0.2)).unwrap().named("tip").with_parent(LinkId(1)),
            ELink::new(ET::ty(-0.1) * ET::rx_joint()).unwrap().named("finger").with_parent(LinkId(0)),
            ELink::new(ET::tx(0.2)).unwrap().named("tip").with_parent(LinkId(3)),
        ];
        let hand = Robot::new(links, "hand").unwrap();

        for robot in [unnamed, hand] {
            let yaml = robot.to_yaml();
            let restored = Robot::from_yaml(&yaml)
                .unwrap_or_else(|e| panic!("Failed to read back {}: {}\n{}", robot.name(), e, yaml));
            let parents: Vec<_> = robot.links().iter().map(|l| l.parent()).collect();
            let restored_parents: Vec<_> = restored.links().iter().map(|l| l.parent()).collect();
            assert_eq!(restored_parents, parents, "{}", yaml);
            assert_eq!(restored.leaves(), robot.leaves());
        }

        let unnamed = Robot::from_yaml(&unnamed_chain().to_yaml()).unwrap();
        let pose = unnamed.pose(&[0.0, 0.0]).unwrap();
        assert!((pose.translation.vector - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_round_trip_keeps_shape_placement() {
        let robot = planar_arm();
        let restored = Robot::from_yaml(&robot.to_yaml()).unwrap();
        let before = robot.link(LinkId(0)).unwrap().collision().local_bounds().unwrap();
        let after = restored.link(LinkId(0)).unwrap().collision().local_bounds().unwrap();
        assert!((before.mins - after.mins).amax() < 1e-12);
        assert!((before.maxs - after.maxs).amax() < 1e-12);
    }

    #[test]
    fn test_missing_file() {
        let result = Robot::from_yaml_file("src/tests/data/no_such_robot.yaml");
        assert!(matches!(result, Err(ParameterError::IoError(_))));
    }
}
