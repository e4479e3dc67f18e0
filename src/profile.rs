//! Vertical shape of a guided mode.

use std::f64::consts::PI;

use anyhow::{anyhow, Result};
use ndarray::Array1;
use num_complex::Complex64;

use crate::{
    cascade,
    coefficient::Stack,
    fresnel,
    snell::Regime,
    structure::{Polarization, Structure},
};


/// Field of a mode sampled along the depth of the stack, the top medium being
/// drawn over its nominal thickness.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeProfile {
    /// Depth below the top of the drawn region, nm.
    pub depth: Array1<f64>,
    pub field: Array1<Complex64>,
}

/// Profile of the mode of effective index `n_eff`, normalised to a unit
/// amplitude on the first interface, sampled every `pixel_size` nm.
pub fn profile(
    structure: &Structure,
    n_eff: Complex64,
    wavelength: f64,
    polarization: Polarization,
    pixel_size: f64,
) -> Result<ModeProfile> {
    if pixel_size.is_nan() || pixel_size <= 0.0 {
        return Err(anyhow!("pixel size must be positive, got {}", pixel_size));
    }

    let optics = structure.layer_optics(wavelength)?;
    let k0 = 2.0 * PI / wavelength;
    let stack = Stack::new(
        &optics,
        polarization,
        k0,
        n_eff * k0,
        Regime::ModeSearch,
        structure.thickness.clone(),
    );

    // Only an outgoing wave in the top medium. Its unit amplitude fixes the
    // down-going amplitude just below the first interface.
    let b1 = stack.gamma[0] / stack.f[0];
    let b2 = stack.gamma[1] / stack.f[1];
    let scale = (b2 - b1) / (2.0 * b2);

    let below = fresnel::sequence(&stack.gamma[1..], &stack.f[1..], &stack.thickness[1..]);
    let coefficients = cascade::field_coefficients(&below)?;

    let mut depth = Vec::new();
    let mut field = Vec::new();
    let mut offset = 0.0;
    for (k, (&d, &gamma)) in stack.thickness.iter().zip(&stack.gamma).enumerate() {
        let ny = (d / pixel_size).floor() as usize;
        let (down, up) = if k == 0 {
            (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0))
        } else {
            (
                scale * coefficients[2 * (k - 1)][(0, 0)],
                scale * coefficients[2 * (k - 1) + 1][(1, 0)],
            )
        };
        for m in 0..ny {
            let h = (m + 1) as f64 * d / ny as f64;
            depth.push(offset + h);
            field.push(
                down * (Complex64::i() * gamma * h).exp()
                    + up * (Complex64::i() * gamma * (d - h)).exp(),
            );
        }
        offset += d;
    }
    tracing::debug!(samples = field.len(), "mode profile");

    Ok(ModeProfile {
        depth: Array1::from_vec(depth),
        field: Array1::from_vec(field),
    })
}
