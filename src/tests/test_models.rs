#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;
    use nalgebra::{Isometry3, Matrix3, Vector3};
    use crate::dynamics::Friction;
    use crate::elink::LinkId;
    use crate::errors::EvaluationError;
    use crate::kinematic_traits::{Joints, Kinematics};
    use crate::models::{frankie, panda};
    use crate::tests::test_utils::{assert_pose, assert_poses_close, rng};

    const TOLERANCE: f64 = 1e-7;

    #[test]
    fn test_panda_zero_pose() {
        let robot = panda().expect("Panda must build");
        let pose = robot.pose(robot.qz()).expect("Forward kinematics failed");
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_pose(&pose, [0.088, 0.0, 0.823],
                    Matrix3::new(s, s, 0.0,
                                 s, -s, 0.0,
                                 0.0, 0.0, -1.0),
                    TOLERANCE);
    }

    #[test]
    fn test_panda_ready_pose() {
        let robot = panda().expect("Panda must build");
        let pose = robot.pose(robot.qr()).expect("Forward kinematics failed");
        assert_pose(&pose, [0.4840068820, 0.0, 0.4130277771],
                    Matrix3::new(0.9950041653, 0.0, 0.0998334166,
                                 0.0, -1.0, 0.0,
                                 0.0998334166, 0.0, -0.9950041653),
                    TOLERANCE);
    }

    #[test]
    fn test_frankie_matches_panda() {
        let panda = panda().unwrap();
        let frankie = frankie().unwrap();
        let mut rng = rng();

        for _ in 0..100 {
            let q = panda.random_configuration(&mut rng);
            let mut q_frankie: Joints = vec![0.0, 0.0];
            q_frankie.extend_from_slice(&q);

            let expected = panda.pose(&q).unwrap();
            let actual = frankie.pose(&q_frankie).unwrap();
            assert_poses_close(&actual, &expected, 1e-9);
        }
    }

    #[test]
    fn test_frankie_base_moves_arm() {
        let panda = panda().unwrap();
        let frankie = frankie().unwrap();
        let q = panda.qr().clone();
        let mut q_frankie: Joints = vec![FRAC_PI_2, 1.0];
        q_frankie.extend_from_slice(&q);

        let expected = Isometry3::rotation(Vector3::z() * FRAC_PI_2)
            * Isometry3::translation(1.0, 0.0, 0.0)
            * panda.pose(&q).unwrap();
        assert_poses_close(&frankie.pose(&q_frankie).unwrap(), &expected, 1e-9);
    }

    #[test]
    fn test_frankie_ready_matches_panda_ready_arm() {
        let frankie = frankie().unwrap();
        let panda = panda().unwrap();
        let arm: Joints = frankie.qr()[2..].to_vec();
        assert_poses_close(&frankie.pose(frankie.qr()).unwrap(), &panda.pose(&arm).unwrap(), 1e-9);
    }

    #[test]
    fn test_repeated_evaluation_is_identical() {
        let robot = panda().unwrap();
        let q = robot.random_configuration(&mut rng());
        let first = robot.forward(&q).unwrap();
        for _ in 0..10 {
            assert_eq!(robot.forward(&q).unwrap(), first);
        }
    }

    #[test]
    fn test_link_poses_end_with_tool_frame() {
        let robot = panda().unwrap();
        let q = robot.qr().clone();
        let poses = robot.link_poses(&q).unwrap();
        assert_eq!(poses.len(), 7);
        let flange = poses.last().unwrap();
        assert_poses_close(&(flange * robot.tool()), &robot.pose(&q).unwrap(), 1e-12);
        // First joint only lifts
        assert!((poses[0].translation.vector - Vector3::new(0.0, 0.0, 0.333)).norm() < 1e-12);
    }

    #[test]
    fn test_forward_many_matches_single() {
        let robot = frankie().unwrap();
        let mut rng = rng();
        let qs: Vec<Joints> = (0..50).map(|_| robot.random_configuration(&mut rng)).collect();
        let poses = robot.forward_many(&qs);
        assert_eq!(poses.len(), qs.len());
        for (q, pose) in qs.iter().zip(poses) {
            assert_eq!(pose.unwrap(), robot.pose(q).unwrap());
        }
    }

    #[test]
    fn test_panda_limits() {
        let robot = panda().unwrap();
        assert!(!robot.any_at_limit(robot.qr()).unwrap());
        // Joint 4 does not allow zero
        assert_eq!(robot.is_at_limit(robot.qz()).unwrap(),
                   vec![false, false, false, true, false, false, false]);
        let mut rng = rng();
        for _ in 0..100 {
            let q = robot.random_configuration(&mut rng);
            assert!(crate::utils::is_valid(&q));
            assert!(!robot.any_at_limit(&q).unwrap());
        }
    }

    #[test]
    fn test_wrong_joint_count() {
        let robot = panda().unwrap();
        assert_eq!(robot.pose(&[0.0; 6]),
                   Err(EvaluationError::JointCountMismatch { expected: 7, found: 6 }));
        assert_eq!(robot.pose_of(&[0.0; 8], LinkId(2)),
                   Err(EvaluationError::JointCountMismatch { expected: 7, found: 8 }));
    }

    #[test]
    fn test_robot_without_friction_keeps_kinematics() {
        let robot = panda().unwrap();
        let ideal = robot.without_friction(Friction::all());
        let q = robot.qr().clone();
        assert_eq!(ideal.pose(&q), robot.pose(&q));
        assert!(ideal.links().iter().all(|link| link.b() == 0.0 && link.tc() == [0.0, 0.0]));
    }

    #[test]
    fn test_display() {
        let robot = frankie().unwrap();
        let text = robot.to_string();
        assert!(text.starts_with("Frankie (Franka Emika, Omron): 9 joints"));
        assert_eq!(text.lines().count(), 11);
        assert!(text.contains("tz(0.333) * Rz()"));
    }
}
