#[cfg(test)]
mod tests {
    use anyhow::{Context, Result};
    use crate::elink::LinkId;
    use crate::models::panda;
    use crate::robot::Robot;
    use crate::shape::ShapeKind;
    use crate::tests::test_utils::{assert_poses_close, rng};
    use crate::urdf::{from_urdf_file, robot_from_urdf_file};

    const PANDA_URDF: &str = "src/tests/data/panda.urdf";

    #[test]
    fn test_urdf_panda_matches_dh_panda() -> Result<()> {
        let from_urdf = robot_from_urdf_file(PANDA_URDF)?;
        let from_dh = panda().context("Building Panda")?;
        assert_eq!(from_urdf.name(), "panda");
        assert_eq!(from_urdf.n(), 7);
        assert_eq!(from_urdf.leaves(), vec![LinkId(9)]);

        let mut rng = rng();
        for _ in 0..100 {
            let q = from_dh.random_configuration(&mut rng);
            let expected = from_dh.pose(&q)?;
            let actual = from_urdf.pose(&q)?;
            assert_poses_close(&actual, &expected, 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_urdf_limits_match_dh_limits() -> Result<()> {
        let from_urdf = robot_from_urdf_file(PANDA_URDF)?;
        let from_dh = panda()?;
        assert_eq!(from_urdf.qlim(), from_dh.qlim());
        Ok(())
    }

    #[test]
    fn test_urdf_dynamics_and_geometry() -> Result<()> {
        let (links, name) = from_urdf_file(PANDA_URDF)?;
        let robot = Robot::try_from((links, name))?;

        let link1 = robot.link(robot.find("panda_link1").context("panda_link1 missing")?)?;
        assert_eq!(link1.m(), 4.970684);
        assert_eq!(link1.r().z, -0.04762);
        assert_eq!(link1.inertia()[(0, 2)], 0.006772);
        assert_eq!(link1.inertia()[(2, 0)], 0.006772);
        assert_eq!(link1.collision().len(), 1);

        let link7 = robot.link(robot.find("panda_link7").context("panda_link7 missing")?)?;
        let visual = link7.geometry().iter().next().context("link7 has no visual")?;
        assert!(matches!(&visual.kind, ShapeKind::Mesh { filename, .. } if filename.ends_with("link7.dae")));

        let hand = robot.link(robot.find("panda_hand").context("panda_hand missing")?)?;
        let bounds = hand.collision().local_bounds().context("hand has no bounds")?;
        assert!((bounds.maxs.z - 0.065).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = from_urdf_file("src/tests/data/no_such_robot.urdf");
        let message = format!("{:#}", result.err().expect("Missing file must fail"));
        assert!(message.contains("no_such_robot.urdf"), "{}", message);
    }
}
