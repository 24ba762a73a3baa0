/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command line interface
//!
//! Reads a structure description in JSON, computes its powder pattern and
//! writes it to stdout as a text table or as JSON.

use crate::diffraction::{Pattern, PatternConfig, TwoThetaRange, Wavelength, XrdCalculator};
use crate::scattering::ScatteringTable;
use crate::structure::Structure;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output formats of the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "xrd-rs")]
#[command(about = "Simulate powder X-ray diffraction patterns from crystal structures")]
#[command(version)]
pub struct Cli {
    /// Structure description (JSON with "lattice" and "sites")
    pub structure: PathBuf,

    /// Pattern configuration (JSON); flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scattering-factor table (JSON) used instead of the built-in one
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Radiation source (e.g. CuKa, MoKa1) or wavelength in Å
    #[arg(short, long)]
    pub wavelength: Option<Wavelength>,

    /// 2θ window in degrees
    #[arg(short, long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub range: Option<Vec<f64>>,

    /// Intensity of the strongest peak
    #[arg(long)]
    pub scale_to: Option<f64>,

    /// Drop peaks at or below this fraction of the strongest one
    #[arg(long)]
    pub min_intensity: Option<f64>,

    /// Merge reflections closer than this in 2θ (degrees)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Report Lorentz-polarization corrected intensities without rescaling
    #[arg(long)]
    pub raw: bool,

    /// Evaluate on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration from the optional file with command line overrides applied
    pub fn pattern_config(&self) -> Result<PatternConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PatternConfig::default(),
        };

        if let Some(wavelength) = self.wavelength {
            config.wavelength = wavelength;
        }
        if let Some(range) = &self.range {
            let [min, max] = range.as_slice() else {
                bail!("--range takes exactly two values");
            };
            config.two_theta_range = TwoThetaRange::new(*min, *max)?;
        }
        if let Some(scale_to) = self.scale_to {
            config.scale_to = scale_to;
        }
        if let Some(fraction) = self.min_intensity {
            config.min_intensity_fraction = fraction;
        }
        if let Some(tolerance) = self.tolerance {
            config.two_theta_tolerance = tolerance;
        }
        if self.raw {
            config.scaled = false;
        }
        if self.serial {
            config.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn scattering_table(&self) -> Result<Arc<ScatteringTable>> {
        match &self.table {
            Some(path) => {
                let table = ScatteringTable::from_json_file(path).with_context(|| {
                    format!("Failed to load scattering table {}", path.display())
                })?;
                info!("Loaded {} species from {}", table.len(), path.display());
                Ok(Arc::new(table))
            }
            None => Ok(ScatteringTable::builtin()),
        }
    }
}

/// Read a structure description from a JSON file
pub fn load_structure(path: &Path) -> Result<Structure> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read structure file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse structure file {}", path.display()))
}

/// Read a pattern configuration from a JSON file
pub fn load_config(path: &Path) -> Result<PatternConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))
}

/// Write a pattern to `out` as a fixed-width text table
pub fn write_table<W: Write>(pattern: &Pattern, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "# wavelength {} Å, {} peaks{}",
        pattern.wavelength(),
        pattern.len(),
        if pattern.is_scaled() { "" } else { " (unscaled)" }
    )?;
    writeln!(
        out,
        "{:>10} {:>10} {:>12}  families",
        "2theta", "d", "intensity"
    )?;

    for peak in pattern {
        let families: Vec<String> = peak
            .families
            .iter()
            .map(|family| format!("{}x{}", family.hkl, family.multiplicity))
            .collect();
        writeln!(
            out,
            "{:>10.4} {:>10.5} {:>12.4}  {}",
            peak.two_theta,
            peak.d_spacing,
            peak.intensity,
            families.join(", ")
        )?;
    }
    Ok(())
}

/// Run the command described by `cli`, writing the pattern to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let structure = load_structure(&cli.structure)?;
    let config = cli.pattern_config()?;
    let table = cli.scattering_table()?;

    info!(
        "{} sites, species {:?}, wavelength {}",
        structure.num_sites(),
        structure.species(),
        config.wavelength
    );

    let mut calculator = XrdCalculator::with_table(table);
    calculator.set_config(config);
    let pattern = calculator
        .get_pattern(&structure)
        .with_context(|| format!("Failed to compute pattern of {}", cli.structure.display()))?;

    match cli.format {
        OutputFormat::Table => write_table(&pattern, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &pattern)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
