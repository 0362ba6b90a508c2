//! Reader for `.campus` scene descriptions.
//!
//! Every non-empty line places one model:
//!
//! ```text
//! # mesh            texture          sx  sy  sz   rx  ry  rz  angle   tx   ty   tz
//! library.obj       library.bmp      1.0 1.0 1.0  0.0 1.0 0.0 1.5708  12.0 0.0 -30.0
//! ```
//!
//! `#` starts a comment. Relative asset paths are resolved against the directory of the scene file.
use std::fs;
use std::path::Path;
use anyhow::{anyhow, bail, Context};

use crate::config::AngleUnit;
use crate::placement::ModelPlacement;

const FIELD_COUNT: usize = 12;

/// Reads and parses a scene file.
pub fn load_campus(file_path: &Path, unit: AngleUnit) -> anyhow::Result<Vec<ModelPlacement>> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Could not read scene file {}", file_path.display()))?;
    let base_dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    let placements = parse_campus(&source, base_dir, unit)
        .with_context(|| format!("Invalid scene file {}", file_path.display()))?;
    log::info!("Loaded {} model placements from {}", placements.len(), file_path.display());
    Ok(placements)
}

/// Parses scene text, in file order.
///
/// # Arguments
///
/// * `source` - The scene text.
/// * `base_dir` - Directory relative mesh and texture paths are joined onto.
/// * `unit` - Unit of the angle column; degrees are converted to radians here.
pub fn parse_campus(source: &str, base_dir: &Path, unit: AngleUnit) -> anyhow::Result<Vec<ModelPlacement>> {
    let mut placements = Vec::new();

    for (number, line) in source.lines().enumerate() {
        let line = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let placement = parse_row(&fields, base_dir, unit)
            .with_context(|| format!("line {}", number + 1))?;
        placements.push(placement);
    }

    if placements.is_empty() {
        bail!("Scene contains no models");
    }
    Ok(placements)
}

fn parse_row(fields: &[&str], base_dir: &Path, unit: AngleUnit) -> anyhow::Result<ModelPlacement> {
    if fields.len() != FIELD_COUNT {
        bail!("Expected {} fields, found {}", FIELD_COUNT, fields.len());
    }

    let numbers = fields[2..]
        .iter()
        .map(|field| field.parse::<f32>().map_err(|_| anyhow!("Expected number, found \"{}\"", field)))
        .collect::<anyhow::Result<Vec<f32>>>()?;
    if let Some(bad) = numbers.iter().find(|n| !n.is_finite()) {
        bail!("Expected finite number, found {}", bad);
    }

    let rotation_angle = match unit {
        AngleUnit::Radians => numbers[6],
        AngleUnit::Degrees => numbers[6].to_radians(),
    };

    Ok(ModelPlacement {
        mesh: base_dir.join(fields[0]),
        texture: base_dir.join(fields[1]),
        scale: [numbers[0], numbers[1], numbers[2]],
        rotation_axis: [numbers[3], numbers[4], numbers[5]],
        rotation_angle,
        translation: [numbers[7], numbers[8], numbers[9]],
    })
}
