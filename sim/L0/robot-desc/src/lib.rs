//! URDF robot descriptions: parsing, structural checks, and conversion to
//! simulator formats.
//!
//! This crate reads [URDF](http://wiki.ros.org/urdf) documents into a
//! [`KinematicTree`], rejects physically implausible designs before they
//! reach a simulator, and emits the tree as MJCF (nested bodies) or SDF 1.7
//! (flat links and joints).
//!
//! # Features
//!
//! - Parse URDF XML strings into an immutable kinematic tree
//! - Structural validation: joint spacing, actuator effort, mass properties
//! - MJCF emission with actuators, mesh assets and a scene wrapper
//! - SDF emission with joint-relative link poses
//! - Extraction of a document embedded in free-form text
//! - Scoring of simulator runs behind a [`SimulationOracle`] seam
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies** and no simulator
//! linked in. Running a description is delegated to whatever implements
//! [`SimulationOracle`].
//!
//! # Example
//!
//! ```
//! use robot_desc::urdf_to_mjcf;
//!
//! let urdf = r#"
//!     <robot name="rover">
//!         <link name="chassis">
//!             <collision><geometry><box size="0.4 0.2 0.1"/></geometry></collision>
//!         </link>
//!         <link name="wheel"/>
//!         <joint name="wheel_joint" type="continuous">
//!             <parent link="chassis"/>
//!             <child link="wheel"/>
//!             <axis xyz="0 1 0"/>
//!         </joint>
//!     </robot>
//! "#;
//!
//! let mjcf = urdf_to_mjcf(urdf).expect("should convert");
//! assert!(mjcf.contains(r#"<body name="wheel""#));
//! assert!(mjcf.contains(r#"size="0.2 0.1 0.05""#));
//! assert!(mjcf.contains(r#"<motor name="motor_wheel_joint""#));
//! ```
//!
//! Validation runs separately, so a description can be converted for
//! inspection even when it would be rejected:
//!
//! ```
//! use robot_desc::{StructuralValidator, ValidationConfig, parse_urdf_str};
//!
//! let tree = parse_urdf_str(
//!     r#"<robot name="r">
//!         <link name="base"/><link name="arm"/>
//!         <joint name="j" type="fixed"><parent link="base"/><child link="arm"/></joint>
//!     </robot>"#,
//! )
//! .expect("should parse");
//!
//! let validator = StructuralValidator::new(ValidationConfig::default());
//! assert!(validator.validate(&tree).is_err());
//! ```
//!
//! # Supported URDF Elements
//!
//! - `<link>` with `<inertial>`, `<visual>` and `<collision>`
//! - `<joint>` of type `fixed`, `revolute`, `continuous`, `prismatic`,
//!   `floating` or `planar`, with `<origin>`, `<axis>`, `<limit>` and
//!   `<dynamics>`
//! - `<box>`, `<cylinder>`, `<sphere>` and `<mesh>` geometry
//! - `<material>` colors, inline on a visual or declared by name on the robot
//!
//! # Limitations
//!
//! - `<mimic>`, `<transmission>` and `<gazebo>` are ignored
//! - Mesh files are referenced, never loaded
//! - Kinematic loops are not supported (tree structures only)

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::should_implement_trait,
    clippy::items_after_statements,
    clippy::option_if_let_else
)]

pub mod converter;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod oracle;
pub mod parser;
pub mod pipeline;
pub mod score;
pub mod types;
pub mod validation;

pub use converter::TargetFormat;
pub use converter::mjcf::{MjcfOptions, robot_to_mjcf, robot_to_mjcf_with, urdf_to_mjcf};
pub use converter::sdf::{SDF_VERSION, robot_to_sdf, sdf_joint_type, urdf_to_sdf};
pub use error::{Error, ParseError, Result, ValidationError};
pub use extract::{DocumentExtractor, extract_document};
pub use geometry::{MjcfGeom, SdfGeom, mjcf_geom, sdf_geom};
pub use oracle::{Contact, OracleError, SimulationOracle, SimulationReport, spawn_pose};
pub use parser::parse_urdf_str;
pub use pipeline::{Evaluation, Pipeline};
pub use score::{
    Diagnostics, ScoreBreakdown, ScoreLabel, SimulationMetrics, Suggestion, Terrain,
    compute_score, suggestions,
};
pub use types::{
    Collision, Geometry, Inertia, Inertial, Joint, JointDynamics, JointLimit, JointType,
    KinematicTree, Link, Origin, Rgba, TreeBuilder, Visual,
};
pub use validation::{
    StructuralValidator, ValidationConfig, check_efforts, check_mass_properties, check_offsets,
};
