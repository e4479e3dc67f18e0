//! Field map of a Gaussian beam inside the stack.
//!
//! The beam is expanded on the plane waves of a horizontally periodic window.
//! Each plane wave goes through the scattering cascade on its own and the
//! vertical profiles are superposed with their horizontal phase. Lengths are
//! normalised by the window width internally.

use std::f64::consts::PI;

use anyhow::{anyhow, Result};
use nalgebra::Matrix2;
use ndarray::{Array1, Array2, Zip};
use num_complex::Complex64;

use crate::{
    beam::{Beam, Window},
    cascade,
    coefficient::Stack,
    config::BEAM_TRUNCATION,
    snell::{self, Regime},
    structure::Structure,
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{material::Material, structure::Polarization};

    fn uniform() -> Structure {
        Structure::new(
            vec![Material::constant(Complex64::new(1.0, 0.0))],
            vec![0, 0],
            vec![600.0, 600.0],
        )
        .unwrap()
    }

    #[test]
    fn map_dimensions() {
        let structure = Structure::new(
            vec![
                Material::constant(Complex64::new(1.0, 0.0)),
                Material::constant(Complex64::new(2.25, 0.0)),
            ],
            vec![0, 1, 1, 0],
            vec![600.0, 40.0, 200.0, 600.0],
        )
        .unwrap();
        let beam = Beam::new(600.0, 0.2, Polarization::TE, 1000.0);
        let window = Window::new(6000.0, 0.5, 100.0, 50.0);
        let map = field(&structure, &beam, &window).unwrap();
        // the 40 nm layer is thinner than a pixel and is not drawn
        assert_eq!(map.dim(), (12 + 4 + 12, 60));
        assert!(map.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_plane_wave() {
        // a waist much larger than the window keeps a single harmonic
        let beam = Beam::new(600.0, 0.3, Polarization::TM, 60000.0);
        let window = Window::new(6000.0, 0.5, 100.0, 50.0);
        let map = field(&uniform(), &beam, &window).unwrap();
        for value in map.iter() {
            assert!((value.norm() - 1.0).abs() < 1e-12, "{}", value);
        }
    }

    #[test]
    fn beam_is_centred() {
        let beam = Beam::new(600.0, 0.0, Polarization::TE, 1000.0);
        let window = Window::new(6000.0, 0.25, 100.0, 50.0);
        let map = field(&uniform(), &beam, &window).unwrap();
        let first = map.row(0);
        let peak = first
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(x, _)| x)
            .unwrap();
        assert!((peak as i64 - 15).abs() <= 2, "peak at column {}", peak);
    }

    #[test]
    fn degenerate_window_is_rejected() {
        let beam = Beam::new(600.0, 0.2, Polarization::TE, 1000.0);
        for window in [
            Window::new(6000.0, 0.5, 100.0, 0.0),
            Window::new(6000.0, 0.5, -1.0, 50.0),
            Window::new(f64::INFINITY, 0.5, 100.0, 50.0),
        ] {
            assert!(field(&uniform(), &beam, &window).is_err(), "{:?}", window);
        }
        let narrow = Beam::new(600.0, 0.2, Polarization::TE, 0.0);
        let window = Window::new(6000.0, 0.5, 100.0, 50.0);
        assert!(field(&uniform(), &narrow, &window).is_err());
    }

    #[test]
    fn standing_wave_above_an_interface() {
        let structure = Structure::new(
            vec![
                Material::constant(Complex64::new(1.0, 0.0)),
                Material::constant(Complex64::new(2.25, 0.0)),
            ],
            vec![0, 1],
            vec![600.0, 600.0],
        )
        .unwrap();
        let beam = Beam::new(600.0, 0.0, Polarization::TE, 60000.0);
        let window = Window::new(6000.0, 0.5, 100.0, 10.0);
        let map = field(&structure, &beam, &window).unwrap();
        assert_eq!(map.nrows(), 120);

        let r = crate::coefficient::coefficient(&structure, 600.0, 0.0, Polarization::TE)
            .unwrap()
            .r;
        // last row of the top medium lies on the interface
        let above = map[(59, 0)].norm();
        let below = map[(60, 0)].norm();
        assert!((above - (1.0 + r).norm()).abs() < 1e-9, "{} vs {}", above, 1.0 + r);
        // E is continuous and the transmitted wave keeps its modulus
        assert!((above - below).abs() < 1e-9, "{} vs {}", above, below);

        let peak = (0..60).map(|y| map[(y, 0)].norm()).fold(0.0, f64::max);
        assert!((peak - (1.0 + r.norm())).abs() < 2e-3, "peak {}", peak);
    }
}

/// Vertical samples of one harmonic, top to bottom. Sample `m` of a layer lies
/// `(m + 1)` pixels below its top.
fn vertical_profile(
    stack: &Stack,
    coefficients: &[Matrix2<Complex64>],
    samples: &[usize],
) -> Array1<Complex64> {
    let mut column = Vec::with_capacity(samples.iter().sum());
    for (k, &ny) in samples.iter().enumerate() {
        let d = stack.thickness[k];
        let gamma = stack.gamma[k];
        let down = coefficients[2 * k][(0, 0)];
        let up = coefficients[2 * k + 1][(1, 0)];
        for m in 0..ny {
            let h = (m + 1) as f64 * d / ny as f64;
            column.push(
                down * (Complex64::i() * gamma * h).exp()
                    + up * (Complex64::i() * gamma * (d - h)).exp(),
            );
        }
    }
    Array1::from_vec(column)
}

/// Total field of `beam` over `window`, one row per vertical pixel and one
/// column per horizontal pixel. The component is E in TE and H in TM, normalised
/// to the amplitude of the incident beam.
pub fn field(structure: &Structure, beam: &Beam, window: &Window) -> Result<Array2<Complex64>> {
    for (name, value) in [
        ("wavelength", beam.wavelength),
        ("beam waist", beam.waist),
        ("window width", window.width),
        ("horizontal pixel size", window.px),
        ("vertical pixel size", window.py),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(anyhow!("{} must be positive and finite, got {}", name, value));
        }
    }
    let optics = structure.layer_optics(beam.wavelength)?;
    let width = window.width;

    let samples: Vec<usize> = structure
        .thickness
        .iter()
        .map(|h| (h / window.py).floor() as usize)
        .collect();
    let rows: usize = samples.iter().sum();
    let nx = window.nx();
    let nmod = (BEAM_TRUNCATION * width / beam.waist).floor() as i64;
    tracing::debug!(rows, columns = nx, harmonics = 2 * nmod + 1, "drawing field map");

    let k0 = 2.0 * PI * width / beam.wavelength;
    let waist = beam.waist / width;
    let thickness: Vec<f64> = structure.thickness.iter().map(|h| h / width).collect();
    let alpha0 = snell::horizontal_wavevector(optics.epsilon[0], optics.mu[0], k0, beam.incidence);
    let positions = Array1::from_iter((0..nx).map(|x| x as f64 / nx as f64));

    let mut map = Array2::<Complex64>::zeros((rows, nx));
    for j in -nmod..=nmod {
        let j = j as f64;
        let amplitude = (-(waist * PI * j).powi(2)).exp()
            * Complex64::new(0.0, -2.0 * PI * j * window.beam_position).exp();
        let alpha = alpha0 + 2.0 * PI * j;

        let stack = Stack::new(
            &optics,
            beam.polarization,
            k0,
            alpha,
            Regime::Illumination,
            thickness.clone(),
        );
        let coefficients = cascade::field_coefficients(&stack.blocks())?;
        let column = vertical_profile(&stack, &coefficients, &samples);
        let row = positions.mapv(|x| (Complex64::i() * alpha * x).exp());

        Zip::indexed(&mut map).for_each(|(y, x), value| {
            *value += amplitude * column[y] * row[x];
        });
    }

    Ok(map)
}
