//! End-to-end processing of generated robot descriptions.
//!
//! ```text
//! raw text ─► extract ─► parse ─► validate ─► emit MJCF / SDF
//!                                              │
//!                                              └► simulate ─► score
//! ```

use tracing::{debug, info};

use crate::converter::TargetFormat;
use crate::converter::mjcf::{MjcfOptions, robot_to_mjcf_with};
use crate::converter::sdf::robot_to_sdf;
use crate::error::Result;
use crate::extract::DocumentExtractor;
use crate::oracle::{SimulationOracle, spawn_pose};
use crate::parser::parse_urdf_str;
use crate::score::{
    Diagnostics, ScoreBreakdown, SimulationMetrics, Suggestion, Terrain, compute_score,
    suggestions,
};
use crate::types::KinematicTree;
use crate::validation::{StructuralValidator, ValidationConfig};

/// Result of simulating and scoring a description.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Metrics derived from the simulator report.
    pub metrics: SimulationMetrics,
    /// Problems spotted in the report.
    pub diagnostics: Diagnostics,
    /// Composite score.
    pub score: ScoreBreakdown,
    /// Refinements to offer the author.
    pub suggestions: Vec<Suggestion>,
}

/// Extract, parse, validate, and convert URDF documents.
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: DocumentExtractor,
    validator: StructuralValidator,
    mjcf: MjcfOptions,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline with the given validation thresholds.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            extractor: DocumentExtractor::urdf(),
            validator: StructuralValidator::new(config),
            mjcf: MjcfOptions::default(),
        }
    }

    /// Use these options for MJCF output.
    #[must_use]
    pub fn with_mjcf_options(mut self, options: MjcfOptions) -> Self {
        self.mjcf = options;
        self
    }

    /// Extract, parse and validate a raw URDF response.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed documents and a validation error
    /// for documents that fail a structural check.
    pub fn prepare(&self, raw: &str) -> Result<KinematicTree> {
        let document = self.extractor.extract(raw);
        let tree = parse_urdf_str(document)?;
        self.validator.validate(&tree)?;
        debug!(
            robot = %tree.name(),
            links = tree.links().len(),
            joints = tree.joints().len(),
            "description accepted"
        );
        Ok(tree)
    }

    /// Emit a prepared tree in `format`.
    #[must_use]
    pub fn emit(&self, tree: &KinematicTree, format: TargetFormat) -> String {
        match format {
            TargetFormat::Mjcf => robot_to_mjcf_with(tree, &self.mjcf),
            TargetFormat::Sdf => robot_to_sdf(tree),
        }
    }

    /// Prepare a raw URDF response and convert it to `format`.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::prepare`].
    pub fn convert(&self, raw: &str, format: TargetFormat) -> Result<String> {
        let tree = self.prepare(raw)?;
        Ok(self.emit(&tree, format))
    }

    /// Convert a prepared tree for `oracle`, run it on `terrain` and score
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulator fails.
    pub fn evaluate(
        &self,
        tree: &KinematicTree,
        oracle: &dyn SimulationOracle,
        terrain: Terrain,
    ) -> Result<Evaluation> {
        let document = self.emit(tree, oracle.format());
        let spawn = spawn_pose(terrain);
        let report = oracle.simulate(&document, &spawn, terrain)?;

        let metrics = SimulationMetrics::from_report(&spawn, &report, terrain);
        let diagnostics = Diagnostics::from_report(&report);
        let score = compute_score(&metrics);
        let suggestions = suggestions(&metrics, Some(&diagnostics));

        info!(
            robot = %tree.name(),
            %terrain,
            score = score.final_score,
            label = %score.label(),
            "evaluated"
        );
        Ok(Evaluation {
            metrics,
            diagnostics,
            score,
            suggestions,
        })
    }
}
