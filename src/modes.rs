//! Guided modes of the stack.
//!
//! A guided mode exists without illumination, so it shows up as a pole of the
//! reflection coefficient when the horizontal wavevector `alpha` is allowed to
//! be complex. The searches below look for zeros of `1/r` instead, which are
//! easier to approach numerically. The boundary wavevectors use the
//! [`Regime::ModeSearch`] branch so that leaky modes are reachable too.

use std::f64::consts::PI;

use anyhow::Result;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::{
    cascade,
    coefficient::{reference_thickness, Stack},
    config::{
        GRADIENT_STEP_FRACTION, MAX_SEARCH_STEPS, MODE_SEPARATION, MODE_TOLERANCE,
        SEARCH_STEP_FRACTION,
    },
    error::{is_singularity, SolverError},
    snell::Regime,
    structure::{Polarization, Structure},
};


/// Result of a root search, `estimate` being a horizontal wavevector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub estimate: Complex64,
    /// Objective at `estimate`.
    pub value: f64,
    pub steps: usize,
    pub converged: bool,
}

impl SearchOutcome {
    pub fn effective_index(&self, wavelength: f64) -> Complex64 {
        self.estimate * wavelength / (2.0 * PI)
    }

    /// `NonConvergence` when the search stopped on its step budget.
    pub fn status(&self) -> std::result::Result<(), SolverError> {
        if self.converged {
            Ok(())
        } else {
            Err(SolverError::NonConvergence {
                steps: self.steps,
                value: self.value,
            })
        }
    }
}

/// `|r|` over a grid of complex effective indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeMap {
    pub real: Array1<f64>,
    pub imag: Array1<f64>,
    /// Indexed by (real, imag).
    pub values: Array2<f64>,
}

fn reflection(
    alpha: Complex64,
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
) -> Result<Complex64> {
    let optics = structure.layer_optics(wavelength)?;
    let k0 = 2.0 * PI / wavelength;
    let stack = Stack::new(
        &optics,
        polarization,
        k0,
        alpha,
        Regime::ModeSearch,
        reference_thickness(structure),
    );
    let partial = cascade::from_top(&stack.blocks())?;
    Ok(partial[partial.len() - 1][(0, 0)])
}

/// `1/r` of the stack for a complex horizontal wavevector `alpha`.
pub fn inverse_reflection(
    alpha: Complex64,
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
) -> Result<Complex64> {
    Ok(reflection(alpha, structure, wavelength, polarization)?.inv())
}

/// `1/|r|`, zero on a guided mode.
pub fn dispersion(
    alpha: Complex64,
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
) -> Result<f64> {
    Ok(1.0 / reflection(alpha, structure, wavelength, polarization)?.norm())
}

/// Reads a singular cascade as a root of the objective.
fn or_root<T>(value: Result<T>, root: T) -> Result<T> {
    match value {
        Err(err) if is_singularity(&err) => Ok(root),
        other => other,
    }
}

/// Evaluates `|r|` on a `n_real` x `n_imag` grid of effective indices.
pub fn map(
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
    real_bounds: (f64, f64),
    imag_bounds: (f64, f64),
    n_real: usize,
    n_imag: usize,
) -> Result<ModeMap> {
    let k0 = 2.0 * PI / wavelength;
    let real = Array1::linspace(real_bounds.0, real_bounds.1, n_real);
    let imag = Array1::linspace(imag_bounds.0, imag_bounds.1, n_imag);

    let mut values = Array2::<f64>::zeros((n_real, n_imag));
    for ((i, j), value) in values.indexed_iter_mut() {
        let alpha = Complex64::new(real[i], imag[j]) * k0;
        let objective = or_root(dispersion(alpha, structure, wavelength, polarization), 0.0)?;
        *value = 1.0 / objective;
    }

    Ok(ModeMap { real, imag, values })
}

/// Steepest descent of [`dispersion`] in the complex `alpha` plane from
/// `start`, until the objective drops below `tol` or `step_max` steps are spent.
pub fn steepest(
    start: Complex64,
    tol: f64,
    step_max: usize,
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
) -> Result<SearchOutcome> {
    let objective =
        |z: Complex64| or_root(dispersion(z, structure, wavelength, polarization), 0.0);

    // a start at the origin still needs a finite step
    let scale = if start.norm() > 0.0 {
        start.norm()
    } else {
        2.0 * PI / wavelength
    };
    // escape directions for flat regions, reproducible for a given start
    let mut rng = StdRng::seed_from_u64(start.re.to_bits() ^ start.im.to_bits().rotate_left(32));

    let mut z = start;
    let mut delta = SEARCH_STEP_FRACTION * scale;
    let mut dz = GRADIENT_STEP_FRACTION * delta;
    let mut current = objective(z)?;
    let mut steps = 0;

    while current > tol && steps < step_max {
        let grad = Complex64::new(
            objective(z + dz)? - current,
            objective(z + Complex64::new(0.0, dz))? - current,
        ) / dz;
        let z_new = if grad.is_finite() && grad.norm() > 0.0 {
            z - delta * grad / grad.norm()
        } else {
            z + Complex64::from_polar(delta, 2.0 * PI * rng.random::<f64>())
        };

        let value_new = objective(z_new)?;
        if value_new.is_nan() || value_new > current {
            delta /= 2.0;
            dz /= 2.0;
        } else {
            current = value_new;
            z = z_new;
        }
        steps += 1;
    }

    let outcome = SearchOutcome {
        estimate: z,
        value: current,
        steps,
        converged: current <= tol,
    };
    if let Err(err) = outcome.status() {
        tracing::warn!(start = %start, estimate = %z, "{}", err);
    }
    Ok(outcome)
}

/// Müller's method on [`inverse_reflection`] from three starting wavevectors.
pub fn muller(
    starts: [Complex64; 3],
    tol: f64,
    step_max: usize,
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
) -> Result<SearchOutcome> {
    let zero = Complex64::new(0.0, 0.0);
    let objective =
        |z: Complex64| or_root(inverse_reflection(z, structure, wavelength, polarization), zero);

    let [mut x0, mut x1, mut x2] = starts;
    let mut f0 = objective(x0)?;
    let mut f1 = objective(x1)?;
    let mut f2 = objective(x2)?;
    let mut steps = 0;

    while f2.norm() > tol && steps < step_max {
        let q = (x2 - x1) / (x1 - x0);
        let a = q * f2 - q * (1.0 + q) * f1 + q * q * f0;
        let b = (2.0 * q + 1.0) * f2 - (1.0 + q) * (1.0 + q) * f1 + q * q * f0;
        let c = (1.0 + q) * f2;

        let root = (b * b - 4.0 * a * c).sqrt();
        let denominator = if (b + root).norm() > (b - root).norm() {
            b + root
        } else {
            b - root
        };
        if denominator.norm() == 0.0 {
            break;
        }

        let x3 = x2 - (x2 - x1) * 2.0 * c / denominator;
        (x0, x1, x2) = (x1, x2, x3);
        (f0, f1) = (f1, f2);
        f2 = objective(x3)?;
        steps += 1;
    }

    let outcome = SearchOutcome {
        estimate: x2,
        value: f2.norm(),
        steps,
        converged: f2.norm() <= tol,
    };
    if let Err(err) = outcome.status() {
        tracing::warn!(estimate = %x2, "{}", err);
    }
    Ok(outcome)
}

/// Effective indices of the guided modes reached by steepest descent from
/// `initial_points` real starting indices spread over `[neff_min, neff_max]`.
pub fn guided_modes(
    structure: &Structure,
    wavelength: f64,
    polarization: Polarization,
    neff_min: f64,
    neff_max: f64,
    initial_points: usize,
) -> Result<Vec<Complex64>> {
    let k0 = 2.0 * PI / wavelength;
    let mut modes: Vec<Complex64> = Vec::new();

    for neff in Array1::linspace(neff_min, neff_max, initial_points) {
        let outcome = steepest(
            Complex64::new(neff * k0, 0.0),
            MODE_TOLERANCE,
            MAX_SEARCH_STEPS,
            structure,
            wavelength,
            polarization,
        )?;
        let alpha = outcome.estimate;
        if !alpha.is_finite() {
            continue;
        }
        if modes
            .iter()
            .all(|mode| (mode - alpha).norm() > MODE_SEPARATION * k0)
        {
            tracing::debug!(neff = %(alpha / k0), steps = outcome.steps, "new mode");
            modes.push(alpha);
        }
    }

    Ok(modes.into_iter().map(|alpha| alpha / k0).collect())
}
