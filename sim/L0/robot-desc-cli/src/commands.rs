//! Subcommand implementations.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use robot_desc::{
    DocumentExtractor, MjcfOptions, Pipeline, SimulationMetrics, TargetFormat, Terrain,
    ValidationConfig, compute_score, suggestions,
};

use crate::Thresholds;

impl Thresholds {
    pub(crate) fn config(&self) -> ValidationConfig {
        ValidationConfig::default()
            .with_min_joint_distance(self.min_joint_distance)
            .with_min_offset(self.min_offset)
            .with_min_effort(self.min_effort)
            .with_mass_check(!self.no_mass_check)
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn convert(
    input: &Path,
    format: TargetFormat,
    output: Option<&Path>,
    include_visuals: bool,
    thresholds: &Thresholds,
) -> Result<()> {
    let raw = read_input(input)?;
    let pipeline = Pipeline::new(thresholds.config())
        .with_mjcf_options(MjcfOptions::default().with_visuals(include_visuals));

    let document = match pipeline.convert(&raw, format) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            bail!("Conversion failed");
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} ({} bytes)",
                "✓".green(),
                path.display(),
                document.len()
            );
        }
        None => print!("{document}"),
    }
    Ok(())
}

pub fn validate(input: &Path, thresholds: &Thresholds) -> Result<()> {
    let raw = read_input(input)?;
    let pipeline = Pipeline::new(thresholds.config());

    match pipeline.prepare(&raw) {
        Ok(tree) => {
            println!(
                "{} {} ({} links, {} joints)",
                "✓".green(),
                tree.name().bold(),
                tree.links().len(),
                tree.joints().len()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            bail!("Validation failed");
        }
    }
}

pub fn extract(input: &Path, root: &str) -> Result<()> {
    let raw = read_input(input)?;
    println!("{}", DocumentExtractor::new(root).extract(&raw));
    Ok(())
}

pub fn score(displacement: f64, tilt_cos: f64, final_z: f64, terrain: Terrain) {
    let metrics = SimulationMetrics {
        displacement,
        tilt_cos,
        final_z,
        terrain,
    };
    let breakdown = compute_score(&metrics);

    println!();
    println!("{}", "Simulation Score".bold());
    println!("{}", "================".bold());
    println!();
    println!("  Stability:    {:>5.1}", breakdown.stability);
    println!("  Uprightness:  {:>5.1}", breakdown.uprightness);
    println!("  Grounding:    {:>5.1}", breakdown.grounding);
    println!(
        "  Terrain:      {} (x{})",
        breakdown.terrain, breakdown.terrain_multiplier
    );
    println!();

    let label = breakdown.label();
    let headline = format!("{:.1} ({label})", breakdown.final_score);
    if breakdown.final_score >= 60.0 {
        println!("  {}", headline.green().bold());
    } else if breakdown.final_score >= 40.0 {
        println!("  {}", headline.yellow().bold());
    } else {
        println!("  {}", headline.red().bold());
    }

    println!();
    for suggestion in suggestions(&metrics, None) {
        println!("  {} {}", "•".cyan(), suggestion.text);
        println!("    {}", suggestion.prompt.dimmed());
    }
}
