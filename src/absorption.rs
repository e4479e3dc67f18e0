//! Power absorbed in each layer of an illuminated stack.
//!
//! The flux of the Poynting vector is evaluated at the top and at the bottom of
//! every layer from the field coefficients of the cascade. What enters a layer
//! and does not leave it has been absorbed.

use anyhow::Result;
use itertools::Itertools;
use nalgebra::Matrix2;
use num_complex::Complex64;
use serde::Serialize;

use crate::{
    cascade,
    coefficient::{Coefficients, Stack},
    powers::Powers,
    structure::{Polarization, Structure},
};


/// Absorbed fraction of the incident power in every layer, top to bottom,
/// along with the coefficients of the stack for the same illumination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Absorption {
    pub absorbed: Vec<f64>,
    pub coefficients: Coefficients,
}

impl Absorption {
    pub fn powers(&self) -> Powers {
        Powers {
            reflected: self.coefficients.reflectance,
            transmitted: self.coefficients.transmittance,
            absorbed: self.absorbed.clone(),
        }
    }
}

/// Flux of the Poynting vector through the horizontal plane at each position of
/// the chain, normalised by the incident flux.
fn poynting_flux(
    stack: &Stack,
    coefficients: &[Matrix2<Complex64>],
    polarization: Polarization,
) -> Vec<Complex64> {
    coefficients
        .iter()
        .enumerate()
        .map(|(k, i)| {
            // two positions per layer: its top, then its bottom
            let w = k / 2;
            let down = i[(0, 0)];
            let up = i[(1, 0)];
            let ratio = stack.gamma[w] / stack.f[w];
            // E and H of the tangential pair, up to a common factor
            let flux = match polarization {
                Polarization::TE => (down + up) * ((down - up) * ratio).conj(),
                Polarization::TM => (down - up) * ratio * (down + up).conj(),
            };
            Complex64::new(flux.re, 0.0) * stack.f[0] / stack.gamma[0]
        })
        .collect()
}

/// Fraction of the power of a plane wave of `wavelength` nm, arriving at
/// `incidence` radians, absorbed in each layer.
pub fn absorption(
    structure: &Structure,
    wavelength: f64,
    incidence: f64,
    polarization: Polarization,
) -> Result<Absorption> {
    let stack = Stack::illuminated(structure, wavelength, incidence, polarization)?;
    let blocks = stack.blocks();
    let partial = cascade::from_top(&blocks)?;
    let coefficients = cascade::field_coefficients(&blocks)?;

    let flux = poynting_flux(&stack, &coefficients, polarization);
    let absorbed = flux
        .iter()
        .tuple_windows()
        .step_by(2)
        .map(|(top, bottom)| (top - bottom).norm())
        .collect();

    Ok(Absorption {
        absorbed,
        coefficients: stack.coefficients(&partial[partial.len() - 1]),
    })
}
