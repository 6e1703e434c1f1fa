//! Scoring a simulated robot.
//!
//! Three components, each scored from 0 to 100:
//!
//! - **Stability**: how little the base moved from its spawn point.
//! - **Uprightness**: how close the base stayed to vertical.
//! - **Grounding**: how close the base ended to spawn height.
//!
//! The weighted sum is scaled by a terrain difficulty multiplier and capped
//! at 100.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weight of the stability component.
pub const WEIGHT_STABILITY: f64 = 0.40;
/// Weight of the uprightness component.
pub const WEIGHT_UPRIGHTNESS: f64 = 0.35;
/// Weight of the grounding component.
pub const WEIGHT_GROUNDING: f64 = 0.25;

/// Displacement scale (m) of the stability decay.
pub const MAX_DISPLACEMENT: f64 = 10.0;
/// Height deviation (m) at which grounding reaches zero.
pub const MAX_HEIGHT_DEVIATION: f64 = 5.0;
/// Reference height (m) for grounding.
pub const IDEAL_HEIGHT: f64 = 1.0;

// ============================================================================
// Terrain
// ============================================================================

/// Ground the robot is simulated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Terrain {
    /// Flat plane.
    #[default]
    Flat,
    /// 15° ramp.
    Slope,
    /// Staircase.
    Stairs,
    /// Randomized heightfield.
    Uneven,
}

impl Terrain {
    /// Every terrain, easiest first.
    pub const ALL: [Self; 4] = [Self::Flat, Self::Slope, Self::Stairs, Self::Uneven];

    /// Score multiplier rewarding harder terrain.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Flat => 1.0,
            Self::Slope => 1.15,
            Self::Stairs => 1.25,
            Self::Uneven => 1.30,
        }
    }

    /// Height (m) at which the robot base is spawned.
    #[must_use]
    pub fn spawn_height(&self) -> f64 {
        match self {
            Self::Flat | Self::Slope => 1.0,
            Self::Stairs => 0.6,
            Self::Uneven => 1.2,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Slope => "slope",
            Self::Stairs => "stairs",
            Self::Uneven => "uneven",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized terrain name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown terrain '{0}' (expected flat, slope, stairs or uneven)")]
pub struct ParseTerrainError(String);

impl FromStr for Terrain {
    type Err = ParseTerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTerrainError(s.to_string()))
    }
}

// ============================================================================
// Components
// ============================================================================

/// Outcome of one simulation run, reduced to what scoring needs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationMetrics {
    /// Distance (m) between spawn and final base position.
    pub displacement: f64,
    /// Cosine of the angle between the base z-axis and world up.
    pub tilt_cos: f64,
    /// Final base height (m).
    pub final_z: f64,
    /// Terrain the run used.
    pub terrain: Terrain,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// 100 at rest, decaying exponentially with displacement. Negative input
/// counts as zero.
#[must_use]
pub fn score_stability(displacement: f64) -> f64 {
    let d = displacement.max(0.0);
    let raw = 100.0 * (-3.0 * d / MAX_DISPLACEMENT).exp();
    round_to(raw.clamp(0.0, 100.0), 2)
}

/// Linear in `tilt_cos`, clamped to `[0, 1]`.
#[must_use]
pub fn score_uprightness(tilt_cos: f64) -> f64 {
    round_to(tilt_cos.clamp(0.0, 1.0) * 100.0, 2)
}

/// 100 at `reference` height, falling linearly to zero at
/// [`MAX_HEIGHT_DEVIATION`] away from it.
#[must_use]
pub fn score_grounding(final_z: f64, reference: f64) -> f64 {
    let deviation = (final_z - reference).abs();
    if deviation > MAX_HEIGHT_DEVIATION {
        return 0.0;
    }
    let raw = 100.0 * (1.0 - deviation / MAX_HEIGHT_DEVIATION);
    round_to(raw.clamp(0.0, 100.0), 2)
}

// ============================================================================
// Composite score
// ============================================================================

/// Component and final scores for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreBreakdown {
    /// Stability component.
    pub stability: f64,
    /// Uprightness component.
    pub uprightness: f64,
    /// Grounding component.
    pub grounding: f64,
    /// Weighted sum before the terrain multiplier, 2 decimals.
    pub weighted: f64,
    /// Terrain the run used.
    pub terrain: Terrain,
    /// Multiplier applied for that terrain.
    pub terrain_multiplier: f64,
    /// Final score in `[0, 100]`, 1 decimal.
    pub final_score: f64,
}

impl ScoreBreakdown {
    /// Label for the final score.
    #[must_use]
    pub fn label(&self) -> ScoreLabel {
        ScoreLabel::from_score(self.final_score)
    }
}

/// Compute the composite score for a run.
#[must_use]
pub fn compute_score(metrics: &SimulationMetrics) -> ScoreBreakdown {
    let stability = score_stability(metrics.displacement);
    let uprightness = score_uprightness(metrics.tilt_cos);
    let grounding = score_grounding(metrics.final_z, IDEAL_HEIGHT);

    let weighted = WEIGHT_STABILITY * stability
        + WEIGHT_UPRIGHTNESS * uprightness
        + WEIGHT_GROUNDING * grounding;
    let multiplier = metrics.terrain.multiplier();
    let final_score = (weighted * multiplier).clamp(0.0, 100.0);

    ScoreBreakdown {
        stability,
        uprightness,
        grounding,
        weighted: round_to(weighted, 2),
        terrain: metrics.terrain,
        terrain_multiplier: multiplier,
        final_score: round_to(final_score, 1),
    }
}

/// Human-readable band for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoreLabel {
    /// Below 20.
    Unstable,
    /// 20 and up.
    Poor,
    /// 40 and up.
    Fair,
    /// 60 and up.
    Good,
    /// 75 and up.
    Great,
    /// 90 and up.
    Excellent,
}

impl ScoreLabel {
    /// Band for a score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 75.0 {
            Self::Great
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Poor
        } else {
            Self::Unstable
        }
    }

    /// Display name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Unstable => "Unstable",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Refinement suggestions
// ============================================================================

/// A refinement the author can apply with one click.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Suggestion {
    /// Short description of the problem or idea.
    pub text: String,
    /// Instruction to hand back to the generator.
    pub prompt: String,
}

impl Suggestion {
    fn new(text: &str, prompt: &str) -> Self {
        Self {
            text: text.to_string(),
            prompt: prompt.to_string(),
        }
    }
}

/// Findings from a short settling run, built by
/// [`Diagnostics::from_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Self-collision pairs present right after spawn, as `a<->b`.
    pub self_collisions_initial: Vec<String>,
    /// Self-collision pairs present after settling.
    pub self_collisions_final: Vec<String>,
    /// Human-readable problems found.
    pub issues: Vec<String>,
}

impl Diagnostics {
    /// No issues were found.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Suggest refinements for a run.
///
/// Physics problems come first, then anything the diagnostics found. A run
/// with no problems gets a fixed set of general tweaks instead.
#[must_use]
pub fn suggestions(metrics: &SimulationMetrics, diagnostics: Option<&Diagnostics>) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if metrics.displacement > 2.0 {
        out.push(Suggestion::new(
            "Robot is unstable: too much displacement",
            "Make the robot more stable by widening the base and lowering the center of gravity",
        ));
    }
    if metrics.tilt_cos < 0.3 {
        out.push(Suggestion::new(
            "Robot falls over easily",
            "Make the robot more balanced; widen the legs/wheels and lower the center of mass",
        ));
    } else if metrics.tilt_cos < 0.7 {
        out.push(Suggestion::new(
            "Robot tilts significantly",
            "Improve balance by adjusting leg positions for better weight distribution",
        ));
    }
    if metrics.final_z < 0.1 {
        out.push(Suggestion::new(
            "Robot is too low to the ground",
            "Make the legs longer so the robot sits higher off the ground",
        ));
    }
    if metrics.final_z > 3.0 {
        out.push(Suggestion::new(
            "Robot launched into the air",
            "Reduce joint effort and fix joint limits to prevent the robot from launching itself",
        ));
    }

    if let Some(diagnostics) = diagnostics {
        if !diagnostics.self_collisions_initial.is_empty()
            || !diagnostics.self_collisions_final.is_empty()
        {
            out.push(Suggestion::new(
                "Self-collisions between robot parts",
                "Increase spacing between links to eliminate self-collisions; move joints further apart",
            ));
        }
        for issue in &diagnostics.issues {
            let explosion = issue.to_lowercase().contains("explod");
            let covered = out.iter().any(|s| s.text.to_lowercase().contains("unstable"));
            if explosion && !covered {
                out.push(Suggestion::new(
                    "Robot structure is unstable (explodes)",
                    "Reduce joint effort values and fix joint limits to prevent the robot from flying apart",
                ));
            }
        }
    }

    if out.is_empty() {
        out.extend([
            Suggestion::new("Make the legs shorter", "Make the legs shorter"),
            Suggestion::new("Make the legs longer", "Make the legs longer"),
            Suggestion::new(
                "Make it heavier and more sturdy",
                "Increase the mass and make the robot sturdier",
            ),
            Suggestion::new(
                "Make it lighter and more agile",
                "Decrease the mass and make the robot lighter",
            ),
            Suggestion::new(
                "Widen the stance",
                "Widen the stance by moving legs further apart",
            ),
        ]);
    }

    out
}
