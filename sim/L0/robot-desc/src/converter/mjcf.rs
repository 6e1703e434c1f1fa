//! URDF to MJCF conversion.
//!
//! MJCF expresses kinematics by nesting: each link becomes a `<body>` placed
//! inside its parent's body at the incoming joint's origin, and the joint
//! itself is declared inside the child body.
//!
//! ## Mapping
//!
//! | URDF | MJCF |
//! |------|------|
//! | `<robot>` | `<mujoco model>` |
//! | `<link>` | `<body>` |
//! | revolute / continuous | `<joint type="hinge">` + `<motor>` |
//! | prismatic | `<joint type="slide">` + `<motor>` |
//! | fixed | no joint, rigid nesting |
//! | unrecognized type | no joint, rigid nesting |
//! | floating | `<joint type="ball">`, unactuated |
//! | planar | two `slide` joints and one `hinge`, each actuated |
//! | `<inertial>` | `<inertial>` with `diaginertia` or `fullinertia` |
//! | `<visual>` | `<geom>` in group 1, no contacts |
//! | `<collision>` | `<geom>` in group 3, contacts enabled |
//!
//! Rotations are written as `euler` with `eulerseq="XYZ"`, which matches the
//! fixed-axis roll-pitch-yaw convention of URDF.

use std::collections::HashSet;

use nalgebra::Vector3;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{XmlWriter, esc, fmt_vec3};
use crate::error::Result;
use crate::geometry::{MjcfGeom, mjcf_geom};
use crate::parser::parse_urdf_str;
use crate::types::{Geometry, Inertia, Inertial, Joint, JointType, KinematicTree, Link, Origin};

/// Range for limited revolute joints whose limit omits a bound.
#[allow(clippy::approx_constant)]
const DEFAULT_REVOLUTE_RANGE: (f64, f64) = (-3.14, 3.14);
/// Range for limited prismatic joints whose limit omits a bound.
const DEFAULT_PRISMATIC_RANGE: (f64, f64) = (0.0, 1.0);
/// Actuator force bound when a limit omits `effort`.
const DEFAULT_EFFORT: f64 = 100.0;

/// Settings for the generated MJCF wrapper.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MjcfOptions {
    /// World gravity vector (m/s²).
    pub gravity: Vector3<f64>,
    /// Integrator timestep (s).
    pub timestep: f64,
    /// Size of the floor plane geom.
    pub floor_size: Vector3<f64>,
    /// Emit visual geoms alongside collision geoms.
    pub include_visuals: bool,
}

impl Default for MjcfOptions {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, 0.0, -9.81),
            timestep: 0.002,
            floor_size: Vector3::new(5.0, 5.0, 0.1),
            include_visuals: true,
        }
    }
}

impl MjcfOptions {
    /// Set the gravity vector.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the timestep.
    #[must_use]
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the floor plane size.
    #[must_use]
    pub fn with_floor_size(mut self, floor_size: Vector3<f64>) -> Self {
        self.floor_size = floor_size;
        self
    }

    /// Enable or disable visual geoms.
    #[must_use]
    pub fn with_visuals(mut self, include_visuals: bool) -> Self {
        self.include_visuals = include_visuals;
        self
    }
}

/// Parse a URDF document and convert it to MJCF.
///
/// # Errors
///
/// Returns an error if the document fails to parse.
///
/// # Example
///
/// ```
/// use robot_desc::urdf_to_mjcf;
///
/// let urdf = r#"<robot name="bot"><link name="base"/></robot>"#;
/// let mjcf = urdf_to_mjcf(urdf).unwrap();
/// assert!(mjcf.contains(r#"<mujoco model="bot">"#));
/// ```
pub fn urdf_to_mjcf(urdf_xml: &str) -> Result<String> {
    let tree = parse_urdf_str(urdf_xml)?;
    Ok(robot_to_mjcf(&tree))
}

/// Convert a tree to MJCF with default options.
#[must_use]
pub fn robot_to_mjcf(tree: &KinematicTree) -> String {
    robot_to_mjcf_with(tree, &MjcfOptions::default())
}

/// Convert a tree to MJCF.
#[must_use]
pub fn robot_to_mjcf_with(tree: &KinematicTree, options: &MjcfOptions) -> String {
    MjcfEmitter::new(tree, options).emit()
}

/// A mesh file declared in `<asset>`.
#[derive(Debug, Clone, PartialEq)]
struct MeshAsset {
    name: String,
    filename: String,
    scale: Option<Vector3<f64>>,
}

struct MjcfEmitter<'a> {
    tree: &'a KinematicTree,
    options: &'a MjcfOptions,
    writer: XmlWriter,
    assets: Vec<MeshAsset>,
    actuators: Vec<String>,
    visited: HashSet<&'a str>,
}

impl<'a> MjcfEmitter<'a> {
    fn new(tree: &'a KinematicTree, options: &'a MjcfOptions) -> Self {
        Self {
            tree,
            options,
            writer: XmlWriter::new(),
            assets: Vec::new(),
            actuators: Vec::new(),
            visited: HashSet::new(),
        }
    }

    fn emit(mut self) -> String {
        self.collect_assets();

        self.writer
            .open(&format!(r#"<mujoco model="{}">"#, esc(self.tree.name())));
        self.writer
            .line(r#"<compiler angle="radian" eulerseq="XYZ"/>"#);
        self.writer.line(&format!(
            r#"<option gravity="{}" timestep="{}"/>"#,
            fmt_vec3(&self.options.gravity),
            self.options.timestep
        ));

        if !self.assets.is_empty() {
            self.writer.open("<asset>");
            let lines: Vec<String> = self.assets.iter().map(asset_line).collect();
            self.writer.lines(&lines);
            self.writer.close("</asset>");
        }

        self.writer.open("<worldbody>");
        self.writer.line(&format!(
            r#"<geom name="floor" type="plane" size="{}" rgba="0.8 0.8 0.8 1"/>"#,
            fmt_vec3(&self.options.floor_size)
        ));
        self.writer
            .line(r#"<light diffuse="0.8 0.8 0.8" pos="0 0 3" dir="0 0 -1"/>"#);
        self.emit_body(self.tree.root(), None);
        self.writer.close("</worldbody>");

        if self.actuators.is_empty() {
            self.writer.line("<actuator/>");
        } else {
            self.writer.open("<actuator>");
            self.writer.lines(&self.actuators);
            self.writer.close("</actuator>");
        }
        self.writer.close("</mujoco>");

        for link in self.tree.links() {
            if !self.visited.contains(link.name.as_str()) {
                warn!(link = %link.name, "link is not reachable from the root; skipped");
            }
        }
        debug!(
            robot = %self.tree.name(),
            bodies = self.visited.len(),
            actuators = self.actuators.len(),
            meshes = self.assets.len(),
            "emitted MJCF"
        );

        self.writer.finish()
    }

    /// Declare every distinct (file, scale) pair once, in document order.
    fn collect_assets(&mut self) {
        let tree = self.tree;
        let include_visuals = self.options.include_visuals;
        for link in tree.links() {
            let visuals = link
                .visuals
                .iter()
                .filter(|_| include_visuals)
                .map(|v| &v.geometry);
            let collisions = link.collisions.iter().map(|c| &c.geometry);
            for geometry in visuals.chain(collisions) {
                if let Geometry::Mesh { filename, scale } = geometry {
                    let known = self
                        .assets
                        .iter()
                        .any(|a| a.filename == *filename && a.scale == *scale);
                    if !known {
                        let name = format!("mesh_{}", self.assets.len());
                        self.assets.push(MeshAsset {
                            name,
                            filename: filename.clone(),
                            scale: *scale,
                        });
                    }
                }
            }
        }
    }

    fn asset_name(&self, filename: &str, scale: Option<Vector3<f64>>) -> &str {
        self.assets
            .iter()
            .find(|a| a.filename == filename && a.scale == scale)
            .map_or("", |a| a.name.as_str())
    }

    fn emit_body(&mut self, link: &'a Link, parent_joint: Option<&'a Joint>) {
        if !self.visited.insert(link.name.as_str()) {
            warn!(link = %link.name, "link reached twice; second occurrence skipped");
            return;
        }

        let origin = parent_joint.map(|j| j.origin).unwrap_or_default();
        self.writer.open(&format!(
            r#"<body name="{}"{}>"#,
            esc(&link.name),
            pose_attrs(&origin)
        ));

        if let Some(joint) = parent_joint {
            self.emit_articulation(joint);
        }
        if let Some(inertial) = &link.inertial {
            self.writer.line(&inertial_line(inertial));
        }
        self.emit_geoms(link);

        let children: Vec<&'a Joint> = self.tree.child_joints(&link.name).collect();
        for joint in children {
            if let Some(child) = self.tree.link(&joint.child) {
                self.emit_body(child, Some(joint));
            }
        }

        self.writer.close("</body>");
    }

    fn emit_articulation(&mut self, joint: &Joint) {
        let name = joint.name.as_str();
        let damping = damping_attrs(joint);

        match joint.joint_type {
            JointType::Revolute | JointType::Continuous => {
                let range = match (joint.joint_type, &joint.limit) {
                    (JointType::Revolute, Some(limit)) => {
                        let lower = limit.lower.unwrap_or(DEFAULT_REVOLUTE_RANGE.0);
                        let upper = limit.upper.unwrap_or(DEFAULT_REVOLUTE_RANGE.1);
                        format!(r#" limited="true" range="{lower} {upper}""#)
                    }
                    _ => String::new(),
                };
                self.writer.line(&format!(
                    r#"<joint name="{}" type="hinge" axis="{}"{range}{damping}/>"#,
                    esc(name),
                    fmt_vec3(&joint.axis)
                ));
                self.push_motor(name, ctrl_attrs(joint));
            }
            JointType::Prismatic => {
                let range = joint.limit.as_ref().map_or_else(String::new, |limit| {
                    let lower = limit.lower.unwrap_or(DEFAULT_PRISMATIC_RANGE.0);
                    let upper = limit.upper.unwrap_or(DEFAULT_PRISMATIC_RANGE.1);
                    format!(r#" limited="true" range="{lower} {upper}""#)
                });
                self.writer.line(&format!(
                    r#"<joint name="{}" type="slide" axis="{}"{range}{damping}/>"#,
                    esc(name),
                    fmt_vec3(&joint.axis)
                ));
                self.push_motor(name, String::new());
            }
            JointType::Fixed | JointType::Unknown => {}
            JointType::Floating => {
                self.writer.line(&format!(
                    r#"<joint name="{}" type="ball"{damping}/>"#,
                    esc(name)
                ));
            }
            JointType::Planar => {
                let (u, v) = plane_basis(&joint.axis);
                let ctrl = ctrl_attrs(joint);
                for (suffix, kind, axis) in [
                    ("x", "slide", u),
                    ("y", "slide", v),
                    ("rot", "hinge", joint.axis),
                ] {
                    let dof = format!("{name}_{suffix}");
                    self.writer.line(&format!(
                        r#"<joint name="{}" type="{kind}" axis="{}"{damping}/>"#,
                        esc(&dof),
                        fmt_vec3(&axis)
                    ));
                    self.push_motor(&dof, ctrl.clone());
                }
            }
        }
    }

    fn push_motor(&mut self, joint: &str, ctrl: String) {
        self.actuators.push(format!(
            r#"<motor name="motor_{0}" joint="{0}"{ctrl}/>"#,
            esc(joint)
        ));
    }

    fn emit_geoms(&mut self, link: &Link) {
        if self.options.include_visuals {
            for (i, visual) in link.visuals.iter().enumerate() {
                let rgba = visual
                    .color
                    .map_or_else(String::new, |c| format!(r#" rgba="{c}""#));
                let line = format!(
                    r#"<geom name="{}_visual_{i}"{}{}{rgba} contype="0" conaffinity="0" group="1"/>"#,
                    esc(&link.name),
                    self.shape_attrs(&visual.geometry),
                    pose_attrs(&visual.origin),
                );
                self.writer.line(&line);
            }
        }
        for (i, collision) in link.collisions.iter().enumerate() {
            let line = format!(
                r#"<geom name="{}_collision_{i}"{}{} contype="1" conaffinity="1" group="3"/>"#,
                esc(&link.name),
                self.shape_attrs(&collision.geometry),
                pose_attrs(&collision.origin),
            );
            self.writer.line(&line);
        }
    }

    fn shape_attrs(&self, geometry: &Geometry) -> String {
        let geom = mjcf_geom(geometry);
        match &geom {
            MjcfGeom::Mesh { filename, scale } => format!(
                r#" type="mesh" mesh="{}""#,
                self.asset_name(filename, *scale)
            ),
            _ => match geom.size() {
                Some(size) => format!(r#" type="{}" size="{size}""#, geom.type_name()),
                None => format!(r#" type="{}""#, geom.type_name()),
            },
        }
    }
}

fn asset_line(asset: &MeshAsset) -> String {
    let scale = asset
        .scale
        .map_or_else(String::new, |s| format!(r#" scale="{}""#, fmt_vec3(&s)));
    format!(
        r#"<mesh name="{}" file="{}"{scale}/>"#,
        asset.name,
        esc(&asset.filename)
    )
}

/// ` pos="..."` always, ` euler="..."` only for a rotated frame.
fn pose_attrs(origin: &Origin) -> String {
    let mut attrs = format!(r#" pos="{}""#, fmt_vec3(&origin.xyz));
    if origin.has_rotation() {
        attrs.push_str(&format!(r#" euler="{}""#, fmt_vec3(&origin.rpy)));
    }
    attrs
}

fn damping_attrs(joint: &Joint) -> String {
    let mut attrs = String::new();
    if let Some(dynamics) = &joint.dynamics {
        if dynamics.damping > 0.0 {
            attrs.push_str(&format!(r#" damping="{}""#, dynamics.damping));
        }
        if dynamics.friction > 0.0 {
            attrs.push_str(&format!(r#" frictionloss="{}""#, dynamics.friction));
        }
    }
    attrs
}

/// Control bounds for a motor: `±effort` when the joint has a limit.
fn ctrl_attrs(joint: &Joint) -> String {
    joint.limit.as_ref().map_or_else(String::new, |limit| {
        let effort = limit.effort.unwrap_or(DEFAULT_EFFORT);
        format!(r#" ctrllimited="true" ctrlrange="{} {effort}""#, -effort)
    })
}

fn inertial_line(inertial: &Inertial) -> String {
    let pose = pose_attrs(&inertial.origin);
    let tensor = inertia_attr(inertial.inertia.as_ref());
    format!(r#"<inertial{pose} mass="{}" {tensor}/>"#, inertial.mass)
}

/// `diaginertia` when the products of inertia vanish, `fullinertia`
/// otherwise. Unset moments take [`Inertia::UNSET_DEFAULT`] and unset
/// products take zero.
fn inertia_attr(inertia: Option<&Inertia>) -> String {
    let d = Inertia::UNSET_DEFAULT;
    let Some(i) = inertia else {
        return format!(r#"diaginertia="{d} {d} {d}""#);
    };
    let (ixx, iyy, izz) = (i.ixx.unwrap_or(d), i.iyy.unwrap_or(d), i.izz.unwrap_or(d));
    let (ixy, ixz, iyz) = (
        i.ixy.unwrap_or(0.0),
        i.ixz.unwrap_or(0.0),
        i.iyz.unwrap_or(0.0),
    );
    if ixy == 0.0 && ixz == 0.0 && iyz == 0.0 {
        format!(r#"diaginertia="{ixx} {iyy} {izz}""#)
    } else {
        format!(r#"fullinertia="{ixx} {iyy} {izz} {ixy} {ixz} {iyz}""#)
    }
}

/// Two unit vectors spanning the plane normal to `axis`.
fn plane_basis(axis: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = (reference - axis * axis.dot(&reference)).normalize();
    let v = axis.cross(&u);
    (u, v)
}
