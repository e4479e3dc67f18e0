//! The layered stack under analysis.
//!
//! A [`Structure`] is an ordered list of layers from the top (incidence side)
//! to the bottom, both ends being semi-infinite media. Layers refer to an entry
//! of the material list, so a material used several times is only described
//! once. Thicknesses are in nm; the thickness of the top medium only matters
//! when a field map is drawn.

use std::{fmt, str::FromStr};

use anyhow::Result;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{
    database::MaterialDatabase,
    error::SolverError,
    material::{Material, MaterialSpec},
};


/// Polarization of the incident light. TE (s) has the electric field parallel
/// to the layers, TM (p) the magnetic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarization {
    #[serde(alias = "te", alias = "s")]
    TE,
    #[serde(alias = "tm", alias = "p")]
    TM,
}

impl From<i32> for Polarization {
    /// 0 is TE, anything else is TM.
    fn from(value: i32) -> Self {
        if value == 0 {
            Self::TE
        } else {
            Self::TM
        }
    }
}

impl FromStr for Polarization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "te" | "s" | "0" => Ok(Self::TE),
            "tm" | "p" | "1" => Ok(Self::TM),
            _ => Err(format!("unknown polarization '{}', expected TE or TM", s)),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TE => write!(f, "TE"),
            Self::TM => write!(f, "TM"),
        }
    }
}

/// Permittivity and permeability of every layer at one wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptics {
    pub epsilon: Vec<Complex64>,
    pub mu: Vec<Complex64>,
}

#[derive(Debug, Clone)]
pub struct Structure {
    pub materials: Vec<Material>,
    pub layer_type: Vec<usize>,
    pub thickness: Vec<f64>,
}

impl Structure {
    pub fn new(materials: Vec<Material>, layer_type: Vec<usize>, thickness: Vec<f64>) -> Result<Self> {
        if layer_type.len() < 2 {
            return Err(SolverError::InvalidStructure(format!(
                "a stack needs at least the two outer media, got {} layers",
                layer_type.len()
            ))
            .into());
        }
        if layer_type.len() != thickness.len() {
            return Err(SolverError::InvalidStructure(format!(
                "{} layer types but {} thicknesses",
                layer_type.len(),
                thickness.len()
            ))
            .into());
        }
        if let Some(index) = layer_type.iter().find(|&&index| index >= materials.len()) {
            return Err(SolverError::InvalidStructure(format!(
                "layer refers to material {} but only {} materials are defined",
                index,
                materials.len()
            ))
            .into());
        }
        if let Some(h) = thickness.iter().find(|h| !h.is_finite() || **h < 0.0) {
            return Err(
                SolverError::InvalidStructure(format!("invalid layer thickness {}", h)).into(),
            );
        }

        Ok(Self {
            materials,
            layer_type,
            thickness,
        })
    }

    /// Builds a structure from material specifications. Specifications that
    /// cannot be resolved are reported and dropped, which shifts the indices of
    /// the following materials: check `materials.len()` when that matters.
    pub fn from_specs(
        specs: &[MaterialSpec],
        database: Option<&MaterialDatabase>,
        layer_type: Vec<usize>,
        thickness: Vec<f64>,
    ) -> Result<Self> {
        let materials: Vec<Material> = specs
            .iter()
            .filter_map(|spec| match Material::from_spec(spec, database) {
                Ok(material) => Some(material),
                Err(err) => {
                    tracing::warn!(?spec, "skipping material: {:#}", err);
                    None
                }
            })
            .collect();

        Self::new(materials, layer_type, thickness)
    }

    /// Number of layers, outer media included.
    pub fn layers(&self) -> usize {
        self.layer_type.len()
    }

    /// Permittivity and permeability of every material, in material order.
    pub fn polarizability(&self, wavelength: f64) -> Result<(Vec<Complex64>, Vec<Complex64>)> {
        let epsilon = self
            .materials
            .iter()
            .map(|material| material.permittivity(wavelength))
            .collect::<Result<Vec<_>>>()?;
        let mu = self
            .materials
            .iter()
            .map(|material| material.permeability(wavelength))
            .collect();
        Ok((epsilon, mu))
    }

    /// Permittivity and permeability of every layer, top to bottom.
    pub fn layer_optics(&self, wavelength: f64) -> Result<LayerOptics> {
        let (epsilon, mu) = self.polarizability(wavelength)?;
        Ok(LayerOptics {
            epsilon: self.layer_type.iter().map(|&t| epsilon[t]).collect(),
            mu: self.layer_type.iter().map(|&t| mu[t]).collect(),
        })
    }
}
