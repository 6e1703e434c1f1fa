//! Property-based tests for shape mapping and emission.
//!
//! Run with: cargo test -p robot-desc -- proptest

#![allow(clippy::unwrap_used)]

use robot_desc::{
    Geometry, JointType, MjcfGeom, SdfGeom, StructuralValidator, ValidationConfig, mjcf_geom,
    parse_urdf_str, robot_to_mjcf, robot_to_sdf, sdf_geom,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A positive shape dimension.
fn arb_dim() -> impl Strategy<Value = f64> {
    0.001..10.0f64
}

fn arb_joint_type() -> impl Strategy<Value = JointType> {
    prop::sample::select(JointType::ALL.to_vec())
}

/// A chain of `links` links joined end to end along x.
fn chain_urdf(joint_type: JointType, links: usize, spacing: f64) -> String {
    let mut doc = String::from(r#"<robot name="chain">"#);
    for i in 0..links {
        doc.push_str(&format!(r#"<link name="l{i}"/>"#));
    }
    for i in 1..links {
        doc.push_str(&format!(
            r#"<joint name="j{i}" type="{joint_type}">
                <parent link="l{}"/><child link="l{i}"/>
                <origin xyz="{spacing} 0 0"/><axis xyz="0 0 1"/>
            </joint>"#,
            i - 1
        ));
    }
    doc.push_str("</robot>");
    doc
}

// =============================================================================
// Property Tests: Geometry
// =============================================================================

proptest! {
    /// MJCF boxes are exactly half the URDF box; SDF boxes are unchanged.
    #[test]
    fn box_halves_for_mjcf_only(x in arb_dim(), y in arb_dim(), z in arb_dim()) {
        let shape = Geometry::box_shape(x, y, z);

        match mjcf_geom(&shape) {
            MjcfGeom::Box { half_extents } => {
                prop_assert_eq!(half_extents.x * 2.0, x);
                prop_assert_eq!(half_extents.y * 2.0, y);
                prop_assert_eq!(half_extents.z * 2.0, z);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        match sdf_geom(&shape) {
            SdfGeom::Box { size } => {
                prop_assert_eq!(size.x, x);
                prop_assert_eq!(size.y, y);
                prop_assert_eq!(size.z, z);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    /// Cylinders keep their radius and halve their length for MJCF.
    #[test]
    fn cylinder_radius_is_preserved(radius in arb_dim(), length in arb_dim()) {
        let shape = Geometry::cylinder(radius, length);

        match mjcf_geom(&shape) {
            MjcfGeom::Cylinder { radius: r, half_length } => {
                prop_assert_eq!(r, radius);
                prop_assert_eq!(half_length * 2.0, length);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        match sdf_geom(&shape) {
            SdfGeom::Cylinder { radius: r, length: l } => {
                prop_assert_eq!(r, radius);
                prop_assert_eq!(l, length);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}

// =============================================================================
// Property Tests: Emission
// =============================================================================

proptest! {
    /// Every link becomes exactly one MJCF body and one SDF link.
    #[test]
    fn every_link_is_emitted_once(joint_type in arb_joint_type(), links in 1usize..8) {
        let tree = parse_urdf_str(&chain_urdf(joint_type, links, 0.3)).unwrap();

        let mjcf = robot_to_mjcf(&tree);
        let sdf = robot_to_sdf(&tree);
        prop_assert_eq!(mjcf.matches("<body ").count(), links);
        prop_assert_eq!(sdf.matches("<link ").count(), links);
        prop_assert_eq!(sdf.matches("<joint ").count(), links - 1);
    }

    /// Emission depends only on the tree.
    #[test]
    fn emission_is_deterministic(joint_type in arb_joint_type(), links in 1usize..6) {
        let urdf = chain_urdf(joint_type, links, 0.25);
        let a = parse_urdf_str(&urdf).unwrap();
        let b = parse_urdf_str(&urdf).unwrap();
        prop_assert_eq!(robot_to_mjcf(&a), robot_to_mjcf(&b));
        prop_assert_eq!(robot_to_sdf(&a), robot_to_sdf(&b));
    }

    /// Offsets under the threshold are rejected regardless of joint type.
    #[test]
    fn short_offsets_are_rejected(joint_type in arb_joint_type(), spacing in 0.0..0.0099f64) {
        let tree = parse_urdf_str(&chain_urdf(joint_type, 2, spacing)).unwrap();
        let validator = StructuralValidator::new(ValidationConfig::default());
        prop_assert!(validator.validate(&tree).is_err());
    }

    /// Offsets at or over the threshold pass when nothing else is wrong.
    #[test]
    fn long_offsets_pass(joint_type in arb_joint_type(), spacing in 0.01..5.0f64) {
        let tree = parse_urdf_str(&chain_urdf(joint_type, 3, spacing)).unwrap();
        let validator = StructuralValidator::new(ValidationConfig::default());
        prop_assert!(validator.validate(&tree).is_ok());
    }
}
