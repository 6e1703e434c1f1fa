//! The boundary to an external physics simulator.
//!
//! The simulator is opaque: it takes a description document and a spawn
//! pose, runs for a while, and reports where the robot base ended up and
//! which bodies touched. Everything downstream of that report (metrics,
//! diagnostics, scoring) lives in this crate.

use std::collections::BTreeSet;

use nalgebra::{Isometry3, Vector3};
use thiserror::Error;

use crate::converter::TargetFormat;
use crate::score::{Diagnostics, SimulationMetrics, Terrain};

/// Base distance (m) from the world origin past which a run counts as an
/// explosion.
pub const EXPLOSION_DISTANCE: f64 = 10.0;
/// Tilt cosine below which the robot counts as fallen over.
pub const FALLEN_TILT_COS: f64 = 0.1;
/// Height (m) below which the robot counts as having fallen through the
/// ground.
pub const BELOW_GROUND_Z: f64 = -0.5;

/// Errors reported by a simulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The simulator is not installed or not reachable.
    #[error("simulator unavailable: {0}")]
    Unavailable(String),

    /// The simulator rejected the document.
    #[error("simulator rejected the document: {0}")]
    InvalidDocument(String),

    /// The run started but did not complete.
    #[error("simulation failed: {0}")]
    Failed(String),
}

/// A contact observed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Robot link on one side of the contact.
    pub link_a: String,
    /// Robot link on the other side, or `None` for the environment.
    pub link_b: Option<String>,
}

impl Contact {
    /// Contact between two different links of the robot.
    #[must_use]
    pub fn is_self_collision(&self) -> bool {
        self.link_b.as_deref().is_some_and(|b| b != self.link_a)
    }
}

/// What a simulator returns.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Base pose at the end of the run, in world coordinates.
    pub final_pose: Isometry3<f64>,
    /// Contacts at spawn, right after the first step.
    pub initial_contacts: Vec<Contact>,
    /// Contacts at the end of the run.
    pub contacts: Vec<Contact>,
}

/// A physics simulator that can run a robot description.
pub trait SimulationOracle {
    /// Document format the simulator loads.
    fn format(&self) -> TargetFormat;

    /// Spawn the robot described by `document` at `spawn` on `terrain` and
    /// run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulator is unavailable, rejects the
    /// document, or fails during the run.
    fn simulate(
        &self,
        document: &str,
        spawn: &Isometry3<f64>,
        terrain: Terrain,
    ) -> Result<SimulationReport, OracleError>;
}

/// Spawn pose for a terrain: upright, at the terrain's spawn height above
/// the origin.
#[must_use]
pub fn spawn_pose(terrain: Terrain) -> Isometry3<f64> {
    Isometry3::translation(0.0, 0.0, terrain.spawn_height())
}

/// Cosine between the body z-axis of `pose` and world up.
#[must_use]
pub fn tilt_cos(pose: &Isometry3<f64>) -> f64 {
    (pose.rotation * Vector3::z()).dot(&Vector3::z())
}

impl SimulationMetrics {
    /// Reduce a report to scoring metrics.
    #[must_use]
    pub fn from_report(
        spawn: &Isometry3<f64>,
        report: &SimulationReport,
        terrain: Terrain,
    ) -> Self {
        let start = spawn.translation.vector;
        let end = report.final_pose.translation.vector;
        Self {
            displacement: (end - start).norm(),
            tilt_cos: tilt_cos(&report.final_pose),
            final_z: end.z,
            terrain,
        }
    }
}

/// Self-collision pairs as sorted, de-duplicated `a<->b` strings.
fn self_collision_pairs(contacts: &[Contact]) -> Vec<String> {
    contacts
        .iter()
        .filter(|c| c.is_self_collision())
        .filter_map(|c| {
            let b = c.link_b.as_deref()?;
            let (lo, hi) = if c.link_a.as_str() <= b {
                (c.link_a.as_str(), b)
            } else {
                (b, c.link_a.as_str())
            };
            Some(format!("{lo}<->{hi}"))
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl Diagnostics {
    /// Inspect a run for explosions, falls and self-collisions.
    #[must_use]
    pub fn from_report(report: &SimulationReport) -> Self {
        let initial = self_collision_pairs(&report.initial_contacts);
        let settled = self_collision_pairs(&report.contacts);
        let mut issues = Vec::new();

        if !initial.is_empty() {
            issues.push(format!(
                "Self-collisions at spawn between: {}",
                initial.join(", ")
            ));
        }

        let position = report.final_pose.translation.vector;
        let distance = position.norm();
        if distance > EXPLOSION_DISTANCE {
            issues.push(format!("Robot exploded: moved {distance:.1}m from origin"));
        }

        let up = tilt_cos(&report.final_pose);
        if up < FALLEN_TILT_COS {
            issues.push(format!("Robot fell over immediately (tilt_cos={up:.3})"));
        }
        if position.z < BELOW_GROUND_Z {
            issues.push(format!(
                "Robot fell through the ground (z={:.3})",
                position.z
            ));
        }
        if !settled.is_empty() && initial.is_empty() {
            issues.push(format!(
                "Self-collisions developed during settling: {}",
                settled.join(", ")
            ));
        }

        Self {
            self_collisions_initial: initial,
            self_collisions_final: settled,
            issues,
        }
    }
}
