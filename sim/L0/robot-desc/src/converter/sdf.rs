//! URDF to SDF conversion.
//!
//! SDF keeps the URDF shape: links and joints are siblings under `<model>`
//! and joints reference their links by name. Frames are chained explicitly,
//! each joint posed relative to its parent link and each child link posed
//! relative to its incoming joint.

use tracing::debug;

use super::{XmlWriter, esc, fmt_vec3};
use crate::error::Result;
use crate::geometry::{SdfGeom, sdf_geom};
use crate::parser::parse_urdf_str;
use crate::types::{Geometry, Inertia, Inertial, Joint, JointType, KinematicTree, Link, Origin};

/// SDF version written to the root element.
pub const SDF_VERSION: &str = "1.7";

#[allow(clippy::approx_constant)]
const DEFAULT_LOWER: f64 = -3.14;
#[allow(clippy::approx_constant)]
const DEFAULT_UPPER: f64 = 3.14;
const DEFAULT_EFFORT: f64 = 100.0;
const DEFAULT_VELOCITY: f64 = 1.0;

/// SDF joint type for a URDF joint type.
///
/// SDF has no planar joint, so planar becomes a prismatic joint along the
/// axis. Floating becomes a ball joint, and unknown types fall back to
/// revolute.
#[must_use]
pub fn sdf_joint_type(joint_type: JointType) -> &'static str {
    match joint_type {
        JointType::Revolute | JointType::Continuous | JointType::Unknown => "revolute",
        JointType::Prismatic | JointType::Planar => "prismatic",
        JointType::Fixed => "fixed",
        JointType::Floating => "ball",
    }
}

/// Parse a URDF document and convert it to SDF.
///
/// # Errors
///
/// Returns an error if the document fails to parse.
pub fn urdf_to_sdf(urdf_xml: &str) -> Result<String> {
    let tree = parse_urdf_str(urdf_xml)?;
    Ok(robot_to_sdf(&tree))
}

/// Convert a tree to SDF.
#[must_use]
pub fn robot_to_sdf(tree: &KinematicTree) -> String {
    let mut w = XmlWriter::new();
    w.open(&format!(r#"<sdf version="{SDF_VERSION}">"#));
    w.open(&format!(r#"<model name="{}">"#, esc(tree.name())));
    w.text_element("static", "false");

    for link in tree.links() {
        let incoming = tree.parent_joint(&link.name);
        write_link(&mut w, link, incoming);
    }
    for joint in tree.joints() {
        write_joint(&mut w, joint);
    }

    w.close("</model>");
    w.close("</sdf>");

    debug!(
        robot = %tree.name(),
        links = tree.links().len(),
        joints = tree.joints().len(),
        "emitted SDF"
    );
    w.finish()
}

fn write_link(w: &mut XmlWriter, link: &Link, incoming: Option<&Joint>) {
    let name = esc(&link.name);
    w.open(&format!(r#"<link name="{name}">"#));

    if let Some(joint) = incoming {
        w.line(&format!(r#"<pose relative_to="{}"/>"#, esc(&joint.name)));
    }
    if let Some(inertial) = &link.inertial {
        write_inertial(w, inertial);
    }

    for (i, visual) in link.visuals.iter().enumerate() {
        w.open(&format!(r#"<visual name="{name}_visual_{i}">"#));
        w.text_element("pose", &pose_text(&visual.origin));
        write_geometry(w, &visual.geometry);
        if let Some(color) = visual.color {
            let rgba = color.to_string();
            w.open("<material>");
            w.text_element("ambient", &rgba);
            w.text_element("diffuse", &rgba);
            w.close("</material>");
        }
        w.close("</visual>");
    }

    for (i, collision) in link.collisions.iter().enumerate() {
        w.open(&format!(r#"<collision name="{name}_collision_{i}">"#));
        w.text_element("pose", &pose_text(&collision.origin));
        write_geometry(w, &collision.geometry);
        w.close("</collision>");
    }

    w.close("</link>");
}

fn write_inertial(w: &mut XmlWriter, inertial: &Inertial) {
    w.open("<inertial>");
    w.text_element("pose", &pose_text(&inertial.origin));
    w.text_element("mass", &inertial.mass.to_string());
    if let Some(inertia) = &inertial.inertia {
        w.open("<inertia>");
        for (component, value) in inertia.components() {
            let value = value.unwrap_or(Inertia::UNSET_DEFAULT);
            w.text_element(component, &value.to_string());
        }
        w.close("</inertia>");
    }
    w.close("</inertial>");
}

fn write_geometry(w: &mut XmlWriter, geometry: &Geometry) {
    w.open("<geometry>");
    match sdf_geom(geometry) {
        SdfGeom::Box { size } => {
            w.open("<box>");
            w.text_element("size", &fmt_vec3(&size));
            w.close("</box>");
        }
        SdfGeom::Cylinder { radius, length } => {
            w.open("<cylinder>");
            w.text_element("radius", &radius.to_string());
            w.text_element("length", &length.to_string());
            w.close("</cylinder>");
        }
        SdfGeom::Sphere { radius } => {
            w.open("<sphere>");
            w.text_element("radius", &radius.to_string());
            w.close("</sphere>");
        }
        SdfGeom::Mesh { uri, scale } => {
            w.open("<mesh>");
            w.text_element("uri", &uri);
            if let Some(scale) = scale {
                w.text_element("scale", &fmt_vec3(&scale));
            }
            w.close("</mesh>");
        }
    }
    w.close("</geometry>");
}

fn write_joint(w: &mut XmlWriter, joint: &Joint) {
    w.open(&format!(
        r#"<joint name="{}" type="{}">"#,
        esc(&joint.name),
        sdf_joint_type(joint.joint_type)
    ));
    w.text_element("parent", &joint.parent);
    w.text_element("child", &joint.child);
    w.line(&format!(
        r#"<pose relative_to="{}">{}</pose>"#,
        esc(&joint.parent),
        pose_text(&joint.origin)
    ));

    if joint.joint_type != JointType::Fixed {
        w.open("<axis>");
        w.text_element("xyz", &fmt_vec3(&joint.axis));
        if let Some(limit) = &joint.limit {
            w.open("<limit>");
            if joint.joint_type != JointType::Continuous {
                w.text_element("lower", &limit.lower.unwrap_or(DEFAULT_LOWER).to_string());
                w.text_element("upper", &limit.upper.unwrap_or(DEFAULT_UPPER).to_string());
            }
            w.text_element(
                "effort",
                &limit.effort.unwrap_or(DEFAULT_EFFORT).to_string(),
            );
            w.text_element(
                "velocity",
                &limit.velocity.unwrap_or(DEFAULT_VELOCITY).to_string(),
            );
            w.close("</limit>");
        }
        if let Some(dynamics) = &joint.dynamics {
            w.open("<dynamics>");
            w.text_element("damping", &dynamics.damping.to_string());
            w.text_element("friction", &dynamics.friction.to_string());
            w.close("</dynamics>");
        }
        w.close("</axis>");
    }

    w.close("</joint>");
}

/// Six-value SDF pose: `x y z roll pitch yaw`.
fn pose_text(origin: &Origin) -> String {
    format!("{} {}", fmt_vec3(&origin.xyz), fmt_vec3(&origin.rpy))
}
