//! The in-memory robot description.
//!
//! These types mirror the URDF schema closely but use Rust-native types. A
//! [`KinematicTree`] is assembled once per document through [`TreeBuilder`],
//! which checks link references and resolves the root; after that it is only
//! read.

use std::collections::HashSet;
use std::fmt;

use nalgebra::Vector3;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Safe axis normalization with Z fallback for zero-length vectors.
#[inline]
fn safe_normalize_axis(v: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n > 1e-10 { v / n } else { Vector3::z() }
}

// ============================================================================
// Origin (Pose)
// ============================================================================

/// Pose of a URDF frame relative to its parent.
///
/// Represents the `<origin>` element with xyz position and rpy rotation.
/// Roll, pitch and yaw are applied about the fixed X, Y and Z axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Origin {
    /// Position (xyz) in meters.
    pub xyz: Vector3<f64>,
    /// Rotation as roll-pitch-yaw (rpy) in radians.
    pub rpy: Vector3<f64>,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            xyz: Vector3::zeros(),
            rpy: Vector3::zeros(),
        }
    }
}

impl Origin {
    /// Create a new origin at position with identity rotation.
    #[must_use]
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            xyz: Vector3::new(x, y, z),
            rpy: Vector3::zeros(),
        }
    }

    /// Create from position and rpy.
    #[must_use]
    pub fn new(xyz: Vector3<f64>, rpy: Vector3<f64>) -> Self {
        Self { xyz, rpy }
    }

    /// Euclidean length of the translation.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.xyz.norm()
    }

    /// Whether any rotation component is non-zero.
    #[must_use]
    pub fn has_rotation(&self) -> bool {
        self.rpy.iter().any(|a| *a != 0.0)
    }
}

// ============================================================================
// Inertial Properties
// ============================================================================

/// Inertial properties from `<inertial>` element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Inertial {
    /// Origin of the inertial frame relative to link frame.
    pub origin: Origin,
    /// Mass in kg.
    pub mass: f64,
    /// Inertia tensor, when an `<inertia>` element was given.
    pub inertia: Option<Inertia>,
}

impl Default for Inertial {
    fn default() -> Self {
        Self {
            origin: Origin::default(),
            mass: 1.0,
            inertia: None,
        }
    }
}

impl Inertial {
    /// Create inertial properties with given mass and no inertia tensor.
    #[must_use]
    pub fn with_mass(mass: f64) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }
}

/// Inertia tensor from URDF.
///
/// URDF specifies the upper-triangular elements of the symmetric tensor.
/// Each element is kept optional so every emitter can apply its own default
/// to the ones the document left out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Inertia {
    /// Moment of inertia about X axis.
    pub ixx: Option<f64>,
    /// Product of inertia XY.
    pub ixy: Option<f64>,
    /// Product of inertia XZ.
    pub ixz: Option<f64>,
    /// Moment of inertia about Y axis.
    pub iyy: Option<f64>,
    /// Product of inertia YZ.
    pub iyz: Option<f64>,
    /// Moment of inertia about Z axis.
    pub izz: Option<f64>,
}

impl Inertia {
    /// Default for any element the document did not set.
    pub const UNSET_DEFAULT: f64 = 0.001;

    /// Create a diagonal inertia tensor.
    #[must_use]
    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Self {
        Self {
            ixx: Some(ixx),
            ixy: Some(0.0),
            ixz: Some(0.0),
            iyy: Some(iyy),
            iyz: Some(0.0),
            izz: Some(izz),
        }
    }

    /// Elements in URDF order `[ixx, ixy, ixz, iyy, iyz, izz]`.
    #[must_use]
    pub fn components(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("ixx", self.ixx),
            ("ixy", self.ixy),
            ("ixz", self.ixz),
            ("iyy", self.iyy),
            ("iyz", self.iyz),
            ("izz", self.izz),
        ]
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Geometry shape from `<geometry>` element.
///
/// Sizes follow the URDF convention: box sizes and cylinder lengths are full
/// extents, not half extents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Geometry {
    /// Box with size (x, y, z) in meters.
    Box {
        /// Full size in x, y, z dimensions.
        size: Vector3<f64>,
    },
    /// Cylinder along the local Z axis.
    Cylinder {
        /// Cylinder radius in meters.
        radius: f64,
        /// Full cylinder length in meters.
        length: f64,
    },
    /// Sphere with radius in meters.
    Sphere {
        /// Sphere radius in meters.
        radius: f64,
    },
    /// Mesh file reference.
    Mesh {
        /// Path or URI of the mesh file.
        filename: String,
        /// Optional scale factor.
        scale: Option<Vector3<f64>>,
    },
}

impl Geometry {
    /// Create a box geometry.
    #[must_use]
    pub fn box_shape(x: f64, y: f64, z: f64) -> Self {
        Self::Box {
            size: Vector3::new(x, y, z),
        }
    }

    /// Create a cylinder geometry.
    #[must_use]
    pub fn cylinder(radius: f64, length: f64) -> Self {
        Self::Cylinder { radius, length }
    }

    /// Create a sphere geometry.
    #[must_use]
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Create a mesh geometry.
    #[must_use]
    pub fn mesh(filename: impl Into<String>, scale: Option<Vector3<f64>>) -> Self {
        Self::Mesh {
            filename: filename.into(),
            scale,
        }
    }

    /// Bounding half-extent used to size the chassis: half the largest box
    /// dimension, or the radius of round primitives. Meshes have none.
    #[must_use]
    pub fn half_extent(&self) -> Option<f64> {
        match self {
            Self::Box { size } => Some(size.max() / 2.0),
            Self::Cylinder { radius, .. } | Self::Sphere { radius } => Some(*radius),
            Self::Mesh { .. } => None,
        }
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba(pub [f64; 4]);

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{r} {g} {b} {a}")
    }
}

// ============================================================================
// Visual and Collision
// ============================================================================

/// Visual properties from `<visual>` element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Visual {
    /// Origin relative to link frame.
    pub origin: Origin,
    /// Geometry shape.
    pub geometry: Geometry,
    /// Resolved material color, if any.
    pub color: Option<Rgba>,
}

/// Collision properties from `<collision>` element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collision {
    /// Origin relative to link frame.
    pub origin: Origin,
    /// Geometry shape.
    pub geometry: Geometry,
}

// ============================================================================
// Link
// ============================================================================

/// A link (rigid body) from `<link>` element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Link {
    /// Link name (required, must be unique).
    pub name: String,
    /// Inertial properties (optional for massless/fixed links).
    pub inertial: Option<Inertial>,
    /// Visual geometries, in document order.
    pub visuals: Vec<Visual>,
    /// Collision geometries, in document order.
    pub collisions: Vec<Collision>,
}

impl Link {
    /// Create a new link with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inertial: None,
            visuals: Vec::new(),
            collisions: Vec::new(),
        }
    }

    /// Set inertial properties.
    #[must_use]
    pub fn with_inertial(mut self, inertial: Inertial) -> Self {
        self.inertial = Some(inertial);
        self
    }

    /// Add a visual geometry.
    #[must_use]
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visuals.push(visual);
        self
    }

    /// Add a collision geometry.
    #[must_use]
    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.collisions.push(collision);
        self
    }
}

// ============================================================================
// Joint
// ============================================================================

/// Joint type from URDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JointType {
    /// Revolute joint with limits.
    Revolute,
    /// Continuous (unlimited revolute) joint.
    Continuous,
    /// Prismatic (sliding) joint.
    Prismatic,
    /// Fixed (welded) joint.
    Fixed,
    /// Floating (6-DOF) joint.
    Floating,
    /// Planar (2D translation + rotation) joint.
    Planar,
    /// A `type` attribute naming none of the URDF joint types.
    Unknown,
}

impl JointType {
    /// Every URDF joint type, in documentation order. [`JointType::Unknown`]
    /// is not a URDF type and is left out.
    pub const ALL: [Self; 6] = [
        Self::Revolute,
        Self::Continuous,
        Self::Prismatic,
        Self::Fixed,
        Self::Floating,
        Self::Planar,
    ];

    /// Parse joint type from string. Unrecognized names give `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "revolute" => Some(Self::Revolute),
            "continuous" => Some(Self::Continuous),
            "prismatic" => Some(Self::Prismatic),
            "fixed" => Some(Self::Fixed),
            "floating" => Some(Self::Floating),
            "planar" => Some(Self::Planar),
            _ => None,
        }
    }

    /// The URDF spelling of this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revolute => "revolute",
            Self::Continuous => "continuous",
            Self::Prismatic => "prismatic",
            Self::Fixed => "fixed",
            Self::Floating => "floating",
            Self::Planar => "planar",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint limits from `<limit>` element.
///
/// Every attribute is optional; the emitters decide what a missing value
/// means in their schema.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointLimit {
    /// Lower position limit (rad or m).
    pub lower: Option<f64>,
    /// Upper position limit (rad or m).
    pub upper: Option<f64>,
    /// Maximum effort (N or Nm).
    pub effort: Option<f64>,
    /// Maximum velocity (rad/s or m/s).
    pub velocity: Option<f64>,
}

impl JointLimit {
    /// Create limits that only bound effort.
    #[must_use]
    pub fn effort_only(effort: f64) -> Self {
        Self {
            effort: Some(effort),
            ..Default::default()
        }
    }
}

/// Joint dynamics from `<dynamics>` element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointDynamics {
    /// Viscous damping coefficient.
    pub damping: f64,
    /// Static friction (Coulomb).
    pub friction: f64,
}

/// A joint connecting two links.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Origin of joint frame relative to parent link frame.
    pub origin: Origin,
    /// Unit joint axis in joint frame (default: z-axis).
    pub axis: Vector3<f64>,
    /// Joint limits.
    pub limit: Option<JointLimit>,
    /// Joint dynamics.
    pub dynamics: Option<JointDynamics>,
}

impl Joint {
    /// Create a new joint.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            joint_type,
            parent: parent.into(),
            child: child.into(),
            origin: Origin::default(),
            axis: Vector3::z(),
            limit: None,
            dynamics: None,
        }
    }

    /// Set the joint origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the joint axis.
    #[must_use]
    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = safe_normalize_axis(axis);
        self
    }

    /// Set the joint limits.
    #[must_use]
    pub fn with_limit(mut self, limit: JointLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the joint dynamics.
    #[must_use]
    pub fn with_dynamics(mut self, dynamics: JointDynamics) -> Self {
        self.dynamics = Some(dynamics);
        self
    }

    /// A joint whose parent and child are the same link. It carries no
    /// kinematic information and is skipped when walking the tree.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.parent == self.child
    }
}

// ============================================================================
// Kinematic tree
// ============================================================================

/// A complete robot description.
///
/// Links are kept in document order, joints in document order, and the root
/// is resolved once at build time. See [`TreeBuilder`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicTree {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    root: usize,
}

impl KinematicTree {
    /// Start building a tree with the given robot name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TreeBuilder {
        TreeBuilder::new(name)
    }

    /// Robot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All links, in document order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All joints, in document order.
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The root link.
    #[must_use]
    pub fn root(&self) -> &Link {
        &self.links[self.root]
    }

    /// Get a link by name.
    #[must_use]
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Get a joint by name.
    #[must_use]
    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// The joint that attaches `link` to its parent, if any.
    ///
    /// When a document gives a link several parents, the first joint in
    /// document order wins.
    #[must_use]
    pub fn parent_joint(&self, link: &str) -> Option<&Joint> {
        self.joints
            .iter()
            .find(|j| !j.is_self_loop() && j.child == link)
    }

    /// Joints leading out of `link` to its children, in document order.
    pub fn child_joints<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a Joint> + 'a {
        self.joints
            .iter()
            .filter(move |j| !j.is_self_loop() && j.parent == link)
    }
}

/// Assembles a [`KinematicTree`], checking references and resolving the root.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
}

impl TreeBuilder {
    /// Create a builder for a robot with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            joints: Vec::new(),
        }
    }

    /// Add a link.
    #[must_use]
    pub fn link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Add a joint.
    #[must_use]
    pub fn joint(mut self, joint: Joint) -> Self {
        self.joints.push(joint);
        self
    }

    /// Add a link in place.
    pub fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Add a joint in place.
    pub fn push_joint(&mut self, joint: Joint) {
        self.joints.push(joint);
    }

    /// Finish the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoLinks`] for an empty robot,
    /// [`ParseError::DuplicateLink`] when two links share a name, and
    /// [`ParseError::UndefinedLink`] when a joint references a missing link.
    pub fn build(self) -> Result<KinematicTree, ParseError> {
        if self.links.is_empty() {
            return Err(ParseError::NoLinks(self.name));
        }

        let mut link_names = HashSet::new();
        for link in &self.links {
            if !link_names.insert(link.name.as_str()) {
                return Err(ParseError::DuplicateLink(link.name.clone()));
            }
        }

        for joint in &self.joints {
            if !link_names.contains(joint.parent.as_str()) {
                return Err(ParseError::undefined_link(&joint.parent, &joint.name));
            }
            if !link_names.contains(joint.child.as_str()) {
                return Err(ParseError::undefined_link(&joint.child, &joint.name));
            }
        }

        let root = resolve_root(&self.links, &self.joints);

        Ok(KinematicTree {
            name: self.name,
            links: self.links,
            joints: self.joints,
            root,
        })
    }
}

/// Index of the root link: the first link in document order that is not the
/// child of any joint, or the first link when every link has a parent.
fn resolve_root(links: &[Link], joints: &[Joint]) -> usize {
    let children: HashSet<&str> = joints
        .iter()
        .filter(|j| !j.is_self_loop())
        .map(|j| j.child.as_str())
        .collect();

    let candidates: Vec<usize> = links
        .iter()
        .enumerate()
        .filter(|(_, l)| !children.contains(l.name.as_str()))
        .map(|(i, _)| i)
        .collect();

    match candidates.as_slice() {
        [] => {
            warn!(
                root = %links[0].name,
                "every link has a parent joint; using the first link as root"
            );
            0
        }
        [only] => *only,
        [first, ..] => {
            warn!(
                count = candidates.len(),
                root = %links[*first].name,
                "several links have no parent joint; using the first in document order"
            );
            *first
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_default() {
        let origin = Origin::default();
        assert_eq!(origin.xyz, Vector3::zeros());
        assert_eq!(origin.rpy, Vector3::zeros());
        assert!(!origin.has_rotation());
    }

    #[test]
    fn test_origin_distance() {
        let origin = Origin::from_xyz(0.3, 0.4, 0.0);
        assert_relative_eq!(origin.distance(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_joint_type_names_round_trip() {
        for ty in JointType::ALL {
            assert_eq!(JointType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(JointType::from_str("invalid"), None);
        assert!(!JointType::ALL.contains(&JointType::Unknown));
    }

    #[test]
    fn test_axis_is_normalized() {
        let joint = Joint::new("j", JointType::Revolute, "a", "b")
            .with_axis(Vector3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(joint.axis.y, 1.0, epsilon = 1e-12);

        let joint = Joint::new("j", JointType::Revolute, "a", "b").with_axis(Vector3::zeros());
        assert_eq!(joint.axis, Vector3::z());
    }

    #[test]
    fn test_half_extent() {
        assert_relative_eq!(
            Geometry::box_shape(0.4, 1.2, 0.1).half_extent().unwrap(),
            0.6
        );
        assert_relative_eq!(Geometry::cylinder(0.3, 2.0).half_extent().unwrap(), 0.3);
        assert_relative_eq!(Geometry::sphere(0.2).half_extent().unwrap(), 0.2);
        assert!(Geometry::mesh("a.stl", None).half_extent().is_none());
    }

    #[test]
    fn test_builder_resolves_root() {
        let tree = KinematicTree::builder("arm")
            .link(Link::new("link1"))
            .link(Link::new("base"))
            .joint(Joint::new("j1", JointType::Revolute, "base", "link1"))
            .build()
            .unwrap();

        assert_eq!(tree.name(), "arm");
        assert_eq!(tree.root().name, "base");
        assert_eq!(tree.parent_joint("link1").unwrap().name, "j1");
        assert!(tree.parent_joint("base").is_none());
        assert_eq!(tree.child_joints("base").count(), 1);
    }

    #[test]
    fn test_root_first_candidate_in_document_order() {
        let tree = KinematicTree::builder("two_roots")
            .link(Link::new("a"))
            .link(Link::new("b"))
            .build()
            .unwrap();
        assert_eq!(tree.root().name, "a");
    }

    #[test]
    fn test_root_fallback_when_cyclic() {
        let tree = KinematicTree::builder("loop")
            .link(Link::new("a"))
            .link(Link::new("b"))
            .joint(Joint::new("j1", JointType::Fixed, "a", "b"))
            .joint(Joint::new("j2", JointType::Fixed, "b", "a"))
            .build()
            .unwrap();
        assert_eq!(tree.root().name, "a");
    }

    #[test]
    fn test_self_loop_ignored() {
        let tree = KinematicTree::builder("self")
            .link(Link::new("base"))
            .link(Link::new("arm"))
            .joint(Joint::new("noop", JointType::Fixed, "base", "base"))
            .joint(Joint::new("j", JointType::Revolute, "base", "arm"))
            .build()
            .unwrap();

        assert_eq!(tree.root().name, "base");
        let children: Vec<_> = tree.child_joints("base").map(|j| j.name.as_str()).collect();
        assert_eq!(children, vec!["j"]);
        assert!(tree.parent_joint("base").is_none());
    }

    #[test]
    fn test_builder_rejects_undefined_link() {
        let result = KinematicTree::builder("test")
            .link(Link::new("base"))
            .joint(Joint::new("j1", JointType::Fixed, "base", "nonexistent"))
            .build();
        assert!(matches!(result, Err(ParseError::UndefinedLink { .. })));
    }

    #[test]
    fn test_builder_rejects_duplicates_and_empty() {
        let result = KinematicTree::builder("dup")
            .link(Link::new("base"))
            .link(Link::new("base"))
            .build();
        assert!(matches!(result, Err(ParseError::DuplicateLink(_))));

        let result = KinematicTree::builder("empty").build();
        assert!(matches!(result, Err(ParseError::NoLinks(_))));
    }
}
