//! Named material records loaded from a TOML file.
//!
//! Each top level table is one material, tagged with its `model`:
//!
//! ```toml
//! [Gold]
//! model = "BrendelBormann"
//! f0 = 0.770
//! gamma0 = 0.050
//! omega_p = 9.03
//! f = [0.054, 0.050, 0.312, 0.719, 1.648]
//! gamma = [0.074, 0.035, 0.083, 0.125, 0.179]
//! omega = [0.218, 2.885, 4.069, 6.137, 27.97]
//! sigma = [0.742, 0.349, 0.830, 1.246, 1.795]
//!
//! [SiO2]
//! model = "ExpData"
//! wavelength_list = [400.0, 500.0]
//! permittivities = [[2.161, 0.0], [2.138, 0.0]]
//!
//! [Silicon]
//! model = "CustomFunction"
//! function = "silicon"
//! ```
//!
//! Records that cannot be read are reported and left out, so one broken entry
//! does not make the whole database unusable.

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use num_complex::Complex64;
use serde::Deserialize;

use crate::{
    error::SolverError,
    material::{BrendelBormann, CustomFn, Material},
};


/// One database entry, as written in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model")]
pub enum MaterialRecord {
    ExpData {
        wavelength_list: Vec<f64>,
        permittivities: Vec<Complex64>,
    },
    BrendelBormann(BrendelBormann),
    CustomFunction {
        function: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MaterialDatabase {
    records: HashMap<String, MaterialRecord>,
    functions: HashMap<String, CustomFn>,
}

impl MaterialDatabase {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read material database {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse material database {}", path.display()))
    }

    /// Parses a database. A syntactically broken file is an error; a record
    /// that does not describe a known model is skipped with a warning.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = text.parse()?;
        let mut records = HashMap::new();
        for (name, value) in table {
            let record: std::result::Result<MaterialRecord, _> = value.try_into();
            match record {
                Ok(record) => {
                    records.insert(name, record);
                }
                Err(err) => {
                    tracing::warn!(material = %name, %err, "skipping malformed material record");
                }
            }
        }
        tracing::debug!(count = records.len(), "loaded material database");
        Ok(Self {
            records,
            functions: HashMap::new(),
        })
    }

    /// Makes `function` available to `CustomFunction` records referring to `name`.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(f64) -> Complex64 + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), CustomFn(Arc::new(function)));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Option<&MaterialRecord> {
        self.records.get(name)
    }

    /// Builds the material model stored under `name`.
    pub fn material(&self, name: &str) -> Result<Material> {
        let record = self
            .records
            .get(name)
            .ok_or_else(|| SolverError::UnknownMaterial(name.to_string()))?;

        match record {
            MaterialRecord::ExpData {
                wavelength_list,
                permittivities,
            } => Material::tabulated(wavelength_list.clone(), permittivities.clone())
                .with_context(|| format!("material '{}'", name)),
            MaterialRecord::BrendelBormann(model) => {
                model
                    .validate()
                    .with_context(|| format!("material '{}'", name))?;
                Ok(Material::BrendelBormann(model.clone()))
            }
            MaterialRecord::CustomFunction { function } => self
                .functions
                .get(function)
                .cloned()
                .map(Material::Custom)
                .ok_or_else(|| {
                    SolverError::InvalidMaterial(format!(
                        "material '{}' refers to unregistered function '{}'",
                        name, function
                    ))
                    .into()
                }),
        }
    }
}
