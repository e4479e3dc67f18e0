//! Coefficients of the stack over a range of angles or wavelengths.
//!
//! Unlike the single-point solvers, the sweeps take their angles in degrees.
//! Points are independent and evaluated in parallel.

use anyhow::Result;
use indicatif::ProgressBar;
use ndarray::Array1;
use rayon::prelude::*;

use crate::{
    coefficient::{coefficient, Coefficients},
    result::Sweep,
    structure::{Polarization, Structure},
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::material::Material;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn coated_glass() -> Structure {
        Structure::new(
            vec![
                Material::constant(Complex64::new(1.0, 0.0)),
                Material::constant(Complex64::new(1.9, 0.0)),
                Material::constant(Complex64::new(2.25, 0.0)),
            ],
            vec![0, 1, 2],
            vec![0.0, 80.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn angles_are_degrees() {
        let structure = coated_glass();
        let sweep = angular(&structure, 600.0, Polarization::TM, 0.0, 60.0, 3, None).unwrap();
        assert_eq!(sweep.x.to_vec(), vec![0.0, 30.0, 60.0]);

        let direct = coefficient(&structure, 600.0, std::f64::consts::FRAC_PI_6, Polarization::TM)
            .unwrap();
        assert_relative_eq!(sweep.reflectance[1], direct.reflectance, max_relative = 1e-12);
        assert_relative_eq!(sweep.r[1].re, direct.r.re, max_relative = 1e-12);
    }

    #[test]
    fn spectrum_follows_wavelength() {
        let structure = coated_glass();
        let sweep = spectrum(&structure, 20.0, Polarization::TE, 400.0, 800.0, 5, None).unwrap();
        assert_eq!(sweep.len(), 5);
        for (k, wavelength) in sweep.x.iter().enumerate() {
            let direct =
                coefficient(&structure, *wavelength, 20.0_f64.to_radians(), Polarization::TE)
                    .unwrap();
            assert_eq!(sweep.transmittance[k], direct.transmittance);
        }
    }

    #[test]
    fn progress_counts_every_point() {
        let pb = ProgressBar::hidden();
        angular(&coated_glass(), 600.0, Polarization::TE, 0.0, 80.0, 9, Some(&pb)).unwrap();
        assert_eq!(pb.position(), 9);
        spectrum(&coated_glass(), 0.0, Polarization::TE, 400.0, 800.0, 4, Some(&pb)).unwrap();
        assert_eq!(pb.position(), 13);
    }
}

/// Evaluates `solve` at every point of `x`, ticking `progress` if given.
fn evaluate<F>(x: Array1<f64>, progress: Option<&ProgressBar>, solve: F) -> Result<Sweep>
where
    F: Fn(f64) -> Result<Coefficients> + Sync,
{
    let coefficients = x
        .to_vec()
        .par_iter()
        .map(|&point| {
            let result = solve(point);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Sweep::new(x, &coefficients))
}

/// Coefficients for `n` angles of incidence between `theta_min` and
/// `theta_max` degrees.
pub fn angular(
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
    theta_min: f64,
    theta_max: f64,
    n: usize,
    progress: Option<&ProgressBar>,
) -> Result<Sweep> {
    evaluate(Array1::linspace(theta_min, theta_max, n), progress, |theta| {
        coefficient(structure, wavelength, theta.to_radians(), polarization)
    })
}

/// Coefficients for `n` wavelengths between `wavelength_min` and
/// `wavelength_max` nm at a fixed `angle` in degrees.
pub fn spectrum(
    structure: &Structure,
    angle: f64,
    polarization: Polarization,
    wavelength_min: f64,
    wavelength_max: f64,
    n: usize,
    progress: Option<&ProgressBar>,
) -> Result<Sweep> {
    let incidence = angle.to_radians();
    evaluate(Array1::linspace(wavelength_min, wavelength_max, n), progress, |wavelength| {
        coefficient(structure, wavelength, incidence, polarization)
    })
}
