use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_INITIAL_POINTS;
use crate::database::MaterialDatabase;
use crate::material::MaterialSpec;
use crate::structure::{Polarization, Structure};


/// Layers as written in a configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StackConfig {
    pub materials: Vec<MaterialSpec>,
    pub layer_type: Vec<usize>,
    pub thickness: Vec<f64>,
}

/// Computation run by the command line tool.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Coefficient,
    Absorption,
    /// Angles in degrees.
    Angular {
        theta_min: f64,
        theta_max: f64,
        points: usize,
    },
    Spectrum {
        wavelength_min: f64,
        wavelength_max: f64,
        points: usize,
    },
    /// Gaussian beam field map. Lengths in nm, `beam_position` as a fraction of `width`.
    Field {
        waist: f64,
        width: f64,
        beam_position: f64,
        px: f64,
        py: f64,
    },
    Modes {
        neff_min: f64,
        neff_max: f64,
        #[serde(default = "default_initial_points")]
        initial_points: usize,
    },
    Map {
        real_min: f64,
        real_max: f64,
        imag_min: f64,
        imag_max: f64,
        n_real: usize,
        n_imag: usize,
    },
    Profile {
        n_eff: [f64; 2],
        pixel_size: f64,
    },
}

fn default_initial_points() -> usize {
    DEFAULT_INITIAL_POINTS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Wavelength in vacuum, nm.
    pub wavelength: f64,
    /// Angle of incidence in degrees.
    pub angle: f64,
    pub polarization: Polarization,
    pub stack: StackConfig,
    /// Material database, relative to the project root unless absolute.
    pub database: Option<PathBuf>,
    pub task: Task,
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

impl Settings {
    /// Angle of incidence in radians.
    pub fn incidence(&self) -> f64 {
        self.angle.to_radians()
    }

    /// Builds the stack, resolving named materials in the database if one is set.
    pub fn structure(&self) -> Result<Structure> {
        let database = match &self.database {
            Some(path) => Some(MaterialDatabase::from_file(path)?),
            None => None,
        };
        Structure::from_specs(
            &self.stack.materials,
            database.as_ref(),
            self.stack.layer_type.clone(),
            self.stack.thickness.clone(),
        )
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings: Config = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    resolve_database(&mut config, &root);
    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration from `config/local.toml` if it exists,
/// `config/default.toml` otherwise, then applies `LAMINA_*` environment
/// variables and the command line.
pub fn load_config() -> Result<Settings> {
    let args = CliArgs::parse();
    let root = retrieve_project_root()?;

    let config_file = match &args.config {
        Some(path) => path.clone(),
        None => {
            let local_config = root.join("config/local.toml");
            if local_config.exists() {
                local_config
            } else {
                root.join("config/default.toml")
            }
        }
    };
    tracing::info!("Using configuration: {}", config_file.display());

    let settings: Config = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("lamina").separator("__"))
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    apply_args(&mut config, &args);
    resolve_database(&mut config, &root);
    validate_config(&config)?;

    tracing::debug!("{:#?}", config);

    Ok(config)
}

fn apply_args(config: &mut Settings, args: &CliArgs) {
    if let Some(wavelength) = args.w {
        config.wavelength = wavelength;
    }
    if let Some(angle) = args.angle {
        config.angle = angle;
    }
    if let Some(polarization) = args.polarization {
        config.polarization = polarization;
    }
    if let Some(database) = &args.db {
        config.database = Some(database.clone());
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
}

fn resolve_database(config: &mut Settings, root: &Path) {
    config.database = config.database.take().map(|path| {
        if path.is_relative() {
            root.join(path)
        } else {
            path
        }
    });
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the LAMINA_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("LAMINA_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

pub fn validate_config(config: &Settings) -> Result<()> {
    ensure!(config.wavelength > 0.0, "Wavelength must be greater than 0");
    ensure!(
        config.stack.layer_type.len() >= 2,
        "The stack needs at least two layers"
    );
    ensure!(
        config.stack.layer_type.len() == config.stack.thickness.len(),
        "layer_type and thickness must have the same length"
    );
    match &config.task {
        Task::Angular { points, .. } | Task::Spectrum { points, .. } => {
            ensure!(*points > 0, "A sweep needs at least one point")
        }
        Task::Field { waist, width, px, py, .. } => {
            ensure!(*waist > 0.0 && *width > 0.0, "Beam waist and window width must be positive");
            ensure!(*px > 0.0 && *py > 0.0, "Pixel sizes must be positive");
        }
        Task::Profile { pixel_size, .. } => {
            ensure!(*pixel_size > 0.0, "Pixel size must be positive")
        }
        Task::Modes { initial_points, .. } => {
            ensure!(*initial_points > 0, "Mode search needs at least one starting point")
        }
        _ => {}
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "Lamina - optical response of planar multilayer stacks")]
pub struct CliArgs {
    /// Wavelength in vacuum, in nm.
    #[arg(short, long)]
    w: Option<f64>,

    /// Angle of incidence in degrees.
    #[arg(short, long)]
    angle: Option<f64>,

    /// Polarization: TE (s) or TM (p).
    #[arg(short, long)]
    polarization: Option<Polarization>,

    /// Configuration file to use instead of config/local.toml or config/default.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Material database file.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory the results are written to.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Wavelength: {:.3} nm
  - Angle: {:.3} deg
  - Polarization: {}
  - Layers: {:?}
  - Thickness: {:?}
  - Task: {:?}
  ",
            self.wavelength,
            self.angle,
            self.polarization,
            self.stack.layer_type,
            self.stack.thickness,
            self.task,
        )
    }
}
