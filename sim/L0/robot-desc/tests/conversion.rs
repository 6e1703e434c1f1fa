//! End-to-end conversion tests.
//!
//! Each test drives the public API from URDF text through to emitted MJCF or
//! SDF, the way a caller outside the crate would.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use robot_desc::{
    Error, JointType, Pipeline, TargetFormat, ValidationConfig, ValidationError, parse_urdf_str,
    robot_to_mjcf, robot_to_sdf, urdf_to_mjcf, urdf_to_sdf,
};

const ROVER: &str = r#"<?xml version="1.0"?>
<robot name="rover">
  <link name="chassis">
    <inertial>
      <mass value="5"/>
      <inertia ixx="0.1" iyy="0.2" izz="0.3"/>
    </inertial>
    <visual>
      <geometry><box size="0.4 0.2 0.1"/></geometry>
      <material name="blue"><color rgba="0 0 1 1"/></material>
    </visual>
    <collision><geometry><box size="0.4 0.2 0.1"/></geometry></collision>
  </link>
  <link name="wheel">
    <collision><geometry><cylinder radius="0.05" length="0.02"/></geometry></collision>
  </link>
  <joint name="wheel_joint" type="continuous">
    <parent link="chassis"/>
    <child link="wheel"/>
    <origin xyz="0 0.15 0"/>
    <axis xyz="0 1 0"/>
    <limit effort="150" velocity="5"/>
  </joint>
</robot>"#;

fn section<'a>(doc: &'a str, open: &str, close: &str) -> &'a str {
    let start = doc.find(open).expect("section should open");
    let end = doc[start..].find(close).expect("section should close");
    &doc[start..start + end]
}

// =============================================================================
// MJCF
// =============================================================================

mod mjcf {
    use super::*;

    #[test]
    fn two_link_rover_nests_wheel_in_chassis() {
        let mjcf = urdf_to_mjcf(ROVER).unwrap();

        assert!(mjcf.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(mjcf.contains(r#"<mujoco model="rover">"#));

        let chassis = section(&mjcf, r#"<body name="chassis""#, "</worldbody>");
        assert!(chassis.contains(r#"<body name="wheel" pos="0 0.15 0">"#));
        assert!(chassis.contains(r#"<joint name="wheel_joint" type="hinge" axis="0 1 0"/>"#));
    }

    #[test]
    fn shapes_use_half_sizes() {
        let mjcf = urdf_to_mjcf(ROVER).unwrap();
        assert!(mjcf.contains(
            r#"<geom name="chassis_collision_0" type="box" size="0.2 0.1 0.05" pos="0 0 0""#
        ));
        assert!(mjcf.contains(r#"type="cylinder" size="0.05 0.01""#));
    }

    #[test]
    fn visual_geoms_are_colored_and_inert() {
        let mjcf = urdf_to_mjcf(ROVER).unwrap();
        assert!(mjcf.contains(
            r#"<geom name="chassis_visual_0" type="box" size="0.2 0.1 0.05" pos="0 0 0" rgba="0 0 1 1" contype="0" conaffinity="0" group="1"/>"#
        ));
    }

    #[test]
    fn actuators_follow_worldbody() {
        let mjcf = urdf_to_mjcf(ROVER).unwrap();
        let worldbody_end = mjcf.find("</worldbody>").unwrap();
        let actuator = mjcf.find("<actuator>").unwrap();
        assert!(actuator > worldbody_end);
        assert!(mjcf.contains(
            r#"<motor name="motor_wheel_joint" joint="wheel_joint" ctrllimited="true" ctrlrange="-150 150"/>"#
        ));
    }

    #[test]
    fn inertia_is_diagonal() {
        let mjcf = urdf_to_mjcf(ROVER).unwrap();
        assert!(mjcf.contains(r#"<inertial pos="0 0 0" mass="5" diaginertia="0.1 0.2 0.3"/>"#));
    }
}

// =============================================================================
// SDF
// =============================================================================

mod sdf {
    use super::*;

    #[test]
    fn two_link_rover_is_flat() {
        let sdf = urdf_to_sdf(ROVER).unwrap();
        assert!(sdf.contains(r#"<sdf version="1.7">"#));
        assert!(sdf.contains(r#"<model name="rover">"#));

        // Links and joints are siblings: no link nests inside another.
        let chassis = section(&sdf, r#"<link name="chassis">"#, "</link>");
        assert!(!chassis.contains(r#"<link name="wheel">"#));

        let joint = section(&sdf, r#"<joint name="wheel_joint" type="revolute">"#, "</joint>");
        assert!(joint.contains("<parent>chassis</parent>"));
        assert!(joint.contains("<child>wheel</child>"));
        assert!(joint.contains(r#"<pose relative_to="chassis">0 0.15 0 0 0 0</pose>"#));
        assert!(joint.contains("<xyz>0 1 0</xyz>"));
        // Continuous joints carry no position bounds.
        assert!(!joint.contains("<lower>"));
        assert!(joint.contains("<effort>150</effort>"));
    }

    #[test]
    fn shapes_keep_full_sizes() {
        let sdf = urdf_to_sdf(ROVER).unwrap();
        assert!(sdf.contains("<size>0.4 0.2 0.1</size>"));
        assert!(sdf.contains("<radius>0.05</radius>"));
        assert!(sdf.contains("<length>0.02</length>"));
    }

    #[test]
    fn child_link_is_posed_at_its_joint() {
        let sdf = urdf_to_sdf(ROVER).unwrap();
        let wheel = section(&sdf, r#"<link name="wheel">"#, "</link>");
        assert!(wheel.contains(r#"<pose relative_to="wheel_joint"/>"#));

        let chassis = section(&sdf, r#"<link name="chassis">"#, "</link>");
        assert!(!chassis.contains("relative_to"));
    }
}

// =============================================================================
// Validation
// =============================================================================

mod validation {
    use super::*;

    fn coincident(joint_type: JointType) -> String {
        format!(
            r#"<robot name="r">
                <link name="base"/>
                <link name="part"/>
                <joint name="j" type="{joint_type}">
                    <parent link="base"/>
                    <child link="part"/>
                    <axis xyz="0 0 1"/>
                </joint>
            </robot>"#
        )
    }

    #[test]
    fn zero_origin_is_rejected_for_every_joint_type() {
        let pipeline = Pipeline::default();
        for joint_type in JointType::ALL {
            let err = pipeline.prepare(&coincident(joint_type)).unwrap_err();
            match err {
                Error::Validation(ValidationError::TooClose {
                    joint,
                    child,
                    distance,
                    min_offset,
                }) => {
                    assert_eq!(joint, "j");
                    assert_eq!(child, "part");
                    assert!(distance.abs() < f64::EPSILON);
                    assert!((min_offset - 0.5).abs() < f64::EPSILON);
                }
                other => panic!("{joint_type}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejection_message_names_the_link() {
        let err = Pipeline::default()
            .prepare(&coincident(JointType::Revolute))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'part'"));
        assert!(message.contains("0.5"));
    }

    #[test]
    fn rover_passes_default_checks() {
        assert!(Pipeline::default().prepare(ROVER).is_ok());
    }

    #[test]
    fn weak_actuator_is_rejected_until_threshold_lowers() {
        let weak = ROVER.replace(r#"effort="150""#, r#"effort="20""#);
        assert!(matches!(
            Pipeline::default().prepare(&weak),
            Err(Error::Validation(ValidationError::WeakActuator { .. }))
        ));
        let lenient = Pipeline::new(ValidationConfig::default().with_min_effort(10.0));
        assert!(lenient.prepare(&weak).is_ok());
    }
}

// =============================================================================
// Pipeline and determinism
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn wrapped_response_converts() {
        let response = format!("Here you go:\n```xml\n{ROVER}\n```\nHappy simulating.");
        let pipeline = Pipeline::default();
        let mjcf = pipeline.convert(&response, TargetFormat::Mjcf).unwrap();
        assert_eq!(mjcf, urdf_to_mjcf(ROVER).unwrap());
        let sdf = pipeline.convert(&response, TargetFormat::Sdf).unwrap();
        assert_eq!(sdf, urdf_to_sdf(ROVER).unwrap());
    }

    #[test]
    fn conversion_is_deterministic() {
        let tree = parse_urdf_str(ROVER).unwrap();
        let mjcf = robot_to_mjcf(&tree);
        let sdf = robot_to_sdf(&tree);
        for _ in 0..5 {
            let again = parse_urdf_str(ROVER).unwrap();
            assert_eq!(robot_to_mjcf(&again), mjcf);
            assert_eq!(robot_to_sdf(&again), sdf);
        }
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = urdf_to_mjcf("<robot name=\"r\"><link name=\"a\">").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
