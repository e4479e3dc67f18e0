//! Reflection and transmission of a plane wave by the whole stack.

use std::f64::consts::PI;

use anyhow::Result;
use nalgebra::Matrix2;
use num_complex::Complex64;
use serde::Serialize;

use crate::{
    cascade, fresnel,
    snell::{self, Regime},
    structure::{LayerOptics, Polarization, Structure},
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::material::Material;
    use approx::assert_abs_diff_eq;

    fn slab(n: f64, thickness: f64) -> Structure {
        Structure::new(
            vec![
                Material::constant(Complex64::new(1.0, 0.0)),
                Material::constant(Complex64::new(n * n, 0.0)),
            ],
            vec![0, 1, 0],
            vec![0.0, thickness, 0.0],
        )
        .unwrap()
    }

    fn interface(n1: f64, n2: f64) -> Structure {
        Structure::new(
            vec![
                Material::constant(Complex64::new(n1 * n1, 0.0)),
                Material::constant(Complex64::new(n2 * n2, 0.0)),
            ],
            vec![0, 1],
            vec![0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn fresnel_te() {
        let (n1, n2) = (1.0, 1.5);
        let theta_i = 30.0_f64.to_radians();
        let theta_t = (n1 * theta_i.sin() / n2).asin();
        let (ci, ct) = (theta_i.cos(), theta_t.cos());

        let c = coefficient(&interface(n1, n2), 600.0, theta_i, Polarization::TE).unwrap();
        let r = (n1 * ci - n2 * ct) / (n1 * ci + n2 * ct);
        let t = 2.0 * n1 * ci / (n1 * ci + n2 * ct);
        assert_abs_diff_eq!(c.r.re, r, epsilon = 1e-12);
        assert_abs_diff_eq!(c.r.im, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.t.re, t, epsilon = 1e-12);
        assert_abs_diff_eq!(c.transmittance, t * t * n2 * ct / (n1 * ci), epsilon = 1e-12);
        assert_abs_diff_eq!(c.reflectance + c.transmittance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fresnel_tm() {
        let (n1, n2) = (1.0, 1.5);
        let theta_i = 50.0_f64.to_radians();
        let theta_t = (n1 * theta_i.sin() / n2).asin();
        let (ci, ct) = (theta_i.cos(), theta_t.cos());

        // magnetic field amplitudes
        let c = coefficient(&interface(n1, n2), 600.0, theta_i, Polarization::TM).unwrap();
        let r = (n2 * ci - n1 * ct) / (n2 * ci + n1 * ct);
        let t = 2.0 * n2 * ci / (n2 * ci + n1 * ct);
        assert_abs_diff_eq!(c.r.re, r, epsilon = 1e-12);
        assert_abs_diff_eq!(c.t.re, t, epsilon = 1e-12);
        assert_abs_diff_eq!(c.reflectance + c.transmittance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn brewster_angle() {
        let theta_b = 1.5_f64.atan();
        let c = coefficient(&interface(1.0, 1.5), 500.0, theta_b, Polarization::TM).unwrap();
        assert!(c.reflectance < 1e-12, "R: {}", c.reflectance);
    }

    #[test]
    fn thin_film_interference() {
        let n = 1.5;
        let d = 200.0;
        for wavelength in [600.0, 500.0, 437.0] {
            let c = coefficient(&slab(n, d), wavelength, 0.0, Polarization::TE).unwrap();

            let r12: f64 = (1.0 - n) / (1.0 + n);
            let r23 = -r12;
            let delta = 2.0 * PI * n * d / wavelength;
            let cos = (2.0 * delta).cos();
            let expected = (r12 * r12 + r23 * r23 + 2.0 * r12 * r23 * cos)
                / (1.0 + r12 * r12 * r23 * r23 + 2.0 * r12 * r23 * cos);

            assert_abs_diff_eq!(c.reflectance, expected, epsilon = 1e-6);
            assert_abs_diff_eq!(c.reflectance + c.transmittance, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn phase_reference_ignores_top_thickness() {
        let mut drawn = slab(1.5, 120.0);
        let reference = coefficient(&drawn, 550.0, 0.3, Polarization::TE).unwrap();
        drawn.thickness[0] = 750.0;
        let shifted = coefficient(&drawn, 550.0, 0.3, Polarization::TE).unwrap();
        assert_eq!(reference, shifted);
    }

    #[test]
    fn total_internal_reflection() {
        let c = coefficient(&interface(1.5, 1.0), 600.0, 60.0_f64.to_radians(), Polarization::TE)
            .unwrap();
        assert_abs_diff_eq!(c.reflectance, 1.0, epsilon = 1e-12);
    }
}

/// Amplitude and energy coefficients of the stack. `r` is referenced to the
/// first interface and `t` to the last one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coefficients {
    pub r: Complex64,
    pub t: Complex64,
    pub reflectance: f64,
    /// Only meaningful when the bottom medium is lossless.
    pub transmittance: f64,
}

/// Everything the scattering solvers need about the stack for one wavevector.
#[derive(Debug, Clone)]
pub(crate) struct Stack {
    /// Quantity whose ratio to gamma is continuous: mu in TE, epsilon in TM.
    pub f: Vec<Complex64>,
    pub gamma: Vec<Complex64>,
    pub thickness: Vec<f64>,
}

impl Stack {
    pub fn new(
        optics: &LayerOptics,
        polarization: Polarization,
        k0: f64,
        alpha: Complex64,
        regime: Regime,
        thickness: Vec<f64>,
    ) -> Self {
        let f = match polarization {
            Polarization::TE => optics.mu.clone(),
            Polarization::TM => optics.epsilon.clone(),
        };
        let gamma = snell::vertical_wavevectors(&optics.epsilon, &optics.mu, k0, alpha, regime);
        Self {
            f,
            gamma,
            thickness,
        }
    }

    /// Stack lit from the top medium at `incidence` radians, phase referenced
    /// at the first interface.
    pub fn illuminated(
        structure: &Structure,
        wavelength: f64,
        incidence: f64,
        polarization: Polarization,
    ) -> Result<Self> {
        let optics = structure.layer_optics(wavelength)?;
        let k0 = 2.0 * PI / wavelength;
        let alpha = snell::horizontal_wavevector(optics.epsilon[0], optics.mu[0], k0, incidence);
        Ok(Self::new(
            &optics,
            polarization,
            k0,
            alpha,
            Regime::Illumination,
            reference_thickness(structure),
        ))
    }

    pub fn layers(&self) -> usize {
        self.gamma.len()
    }

    pub fn blocks(&self) -> Vec<Matrix2<Complex64>> {
        fresnel::sequence(&self.gamma, &self.f, &self.thickness)
    }

    /// Reads the coefficients off the product of all blocks but the last.
    pub fn coefficients(&self, total: &Matrix2<Complex64>) -> Coefficients {
        let g = self.layers();
        let r = total[(0, 0)];
        let t = total[(1, 0)];
        let ratio = self.gamma[g - 1] * self.f[0] / (self.gamma[0] * self.f[g - 1]);
        Coefficients {
            r,
            t,
            reflectance: r.norm_sqr(),
            transmittance: t.norm_sqr() * ratio.re,
        }
    }
}

/// Layer thicknesses with the top medium collapsed onto the first interface.
pub(crate) fn reference_thickness(structure: &Structure) -> Vec<f64> {
    let mut thickness = structure.thickness.clone();
    thickness[0] = 0.0;
    thickness
}

/// Reflection and transmission of the stack for a plane wave of `wavelength`
/// nm arriving at `incidence` radians.
pub fn coefficient(
    structure: &Structure,
    wavelength: f64,
    incidence: f64,
    polarization: Polarization,
) -> Result<Coefficients> {
    let stack = Stack::illuminated(structure, wavelength, incidence, polarization)?;
    let partial = cascade::from_top(&stack.blocks())?;
    Ok(stack.coefficients(&partial[partial.len() - 1]))
}
