//! Structural checks on a parsed robot.
//!
//! A document can be perfectly well-formed and still fall apart in
//! simulation. The checks here catch the common cases:
//!
//! - child links placed on top of their parent, which makes them
//!   self-collide on the first step,
//! - actuators too weak to hold the robot up,
//! - negative or non-finite mass properties.
//!
//! # Example
//!
//! ```
//! use robot_desc::{StructuralValidator, ValidationConfig, parse_urdf_str};
//!
//! let tree = parse_urdf_str(r#"<robot name="r"><link name="base"/></robot>"#).unwrap();
//! let validator = StructuralValidator::new(ValidationConfig::default().with_min_effort(50.0));
//! assert!(validator.validate(&tree).is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::types::KinematicTree;

/// Half-extent assumed when the root link has no primitive collision shape.
pub const DEFAULT_CHASSIS_HALF_EXTENT: f64 = 0.5;

/// Thresholds for [`StructuralValidator`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationConfig {
    /// Joint origins shorter than this (m) count as coincident.
    pub min_joint_distance: f64,
    /// Smallest offset (m) suggested to the author when a joint is
    /// coincident. The chassis half-extent raises it.
    pub min_offset: f64,
    /// Smallest acceptable joint effort (N or Nm).
    pub min_effort: f64,
    /// Also check mass and inertia values.
    pub check_mass_properties: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_joint_distance: 0.01,
            min_offset: 0.5,
            min_effort: 100.0,
            check_mass_properties: true,
        }
    }
}

impl ValidationConfig {
    /// Set the coincidence distance.
    #[must_use]
    pub fn with_min_joint_distance(mut self, distance: f64) -> Self {
        self.min_joint_distance = distance;
        self
    }

    /// Set the suggested minimum offset.
    #[must_use]
    pub fn with_min_offset(mut self, offset: f64) -> Self {
        self.min_offset = offset;
        self
    }

    /// Set the effort floor.
    #[must_use]
    pub fn with_min_effort(mut self, effort: f64) -> Self {
        self.min_effort = effort;
        self
    }

    /// Enable or disable the mass-property check.
    #[must_use]
    pub fn with_mass_check(mut self, enabled: bool) -> Self {
        self.check_mass_properties = enabled;
        self
    }
}

/// Runs the structural checks in order and stops at the first failure.
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator {
    config: ValidationConfig,
}

impl StructuralValidator {
    /// Create a validator.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a tree.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: offsets, then efforts, then mass
    /// properties.
    pub fn validate(&self, tree: &KinematicTree) -> Result<(), ValidationError> {
        let c = &self.config;
        check_offsets(tree, c.min_joint_distance, c.min_offset)?;
        check_efforts(tree, c.min_effort)?;
        if c.check_mass_properties {
            check_mass_properties(tree)?;
        }
        debug!(robot = %tree.name(), "structural validation passed");
        Ok(())
    }
}

/// Half-extent of the chassis: the root link's first primitive collision
/// shape, or [`DEFAULT_CHASSIS_HALF_EXTENT`] when there is none.
#[must_use]
pub fn chassis_half_extent(tree: &KinematicTree) -> f64 {
    tree.root()
        .collisions
        .iter()
        .find_map(|c| c.geometry.half_extent())
        .unwrap_or(DEFAULT_CHASSIS_HALF_EXTENT)
}

/// Reject joints whose child sits on its parent.
///
/// Self-loop joints are ignored.
///
/// # Errors
///
/// Returns [`ValidationError::TooClose`] for the first joint whose origin
/// translation is shorter than `min_joint_distance`. The reported minimum
/// offset is the larger of `min_offset` and the chassis half-extent. A
/// non-finite distance never passes.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn check_offsets(
    tree: &KinematicTree,
    min_joint_distance: f64,
    min_offset: f64,
) -> Result<(), ValidationError> {
    for joint in tree.joints().iter().filter(|j| !j.is_self_loop()) {
        let distance = joint.origin.distance();
        if !(distance >= min_joint_distance) {
            return Err(ValidationError::TooClose {
                joint: joint.name.clone(),
                child: joint.child.clone(),
                distance,
                min_offset: min_offset.max(chassis_half_extent(tree)),
            });
        }
    }
    Ok(())
}

/// Reject joint limits with too little effort.
///
/// Joints without a limit, or with a limit that omits `effort`, pass.
///
/// # Errors
///
/// Returns [`ValidationError::WeakActuator`] for the first joint whose
/// effort is below `min_effort` or is NaN.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn check_efforts(tree: &KinematicTree, min_effort: f64) -> Result<(), ValidationError> {
    for joint in tree.joints() {
        let Some(effort) = joint.limit.and_then(|l| l.effort) else {
            continue;
        };
        if !(effort >= min_effort) {
            return Err(ValidationError::WeakActuator {
                joint: joint.name.clone(),
                effort,
                floor: min_effort,
            });
        }
    }
    Ok(())
}

/// Reject negative or non-finite masses and inertia moments.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidMass`] or
/// [`ValidationError::InvalidInertia`] for the first offending link.
pub fn check_mass_properties(tree: &KinematicTree) -> Result<(), ValidationError> {
    for link in tree.links() {
        let Some(inertial) = &link.inertial else {
            continue;
        };

        if !inertial.mass.is_finite() || inertial.mass < 0.0 {
            return Err(ValidationError::InvalidMass {
                link_name: link.name.clone(),
                mass: inertial.mass,
            });
        }

        let Some(inertia) = &inertial.inertia else {
            continue;
        };
        for (component, value) in inertia.components() {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(ValidationError::InvalidInertia {
                    link_name: link.name.clone(),
                    message: format!("{component} must be finite, got {value}"),
                });
            }
        }
        for (component, value) in [
            ("ixx", inertia.ixx),
            ("iyy", inertia.iyy),
            ("izz", inertia.izz),
        ] {
            if let Some(value) = value.filter(|v| *v < 0.0) {
                return Err(ValidationError::InvalidInertia {
                    link_name: link.name.clone(),
                    message: format!("{component} must be non-negative, got {value}"),
                });
            }
        }
    }
    Ok(())
}
