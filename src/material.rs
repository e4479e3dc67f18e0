//! Wavelength-dependent optical constants of the materials in a stack.
//!
//! Every material answers two questions for a vacuum wavelength in nm: its
//! relative permittivity and its relative permeability. The model behind the
//! answer is chosen once, when the material is built:
//!
//! - [`Material::Constant`]: non-dispersive dielectric or metal
//! - [`Material::Magnetic`]: non-dispersive medium with a permeability, possibly
//!   negative-index
//! - [`Material::Tabulated`]: experimental data, interpolated linearly
//! - [`Material::BrendelBormann`]: Drude term plus Voigt-broadened oscillators
//! - [`Material::Custom`]: any closure of the wavelength
//!
//! Queries outside the validity range of a model are not errors; tabulated data
//! is simply held at its end values.

use std::{
    f64::consts::{PI, SQRT_2},
    fmt,
    sync::{Arc, OnceLock},
};

use anyhow::Result;
use ndarray::{Array1, Ix1, OwnedRepr};
use ndarray_interp::interp1d::{Interp1D, Interp1DBuilder, Linear};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{
    config::{FADDEEVA_TERMS, HC_OVER_E},
    database::MaterialDatabase,
    error::SolverError,
};

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn faddeeva_reference_values() {
        let w0 = faddeeva(Complex64::new(0.0, 0.0));
        assert_abs_diff_eq!(w0.re, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(w0.im, 0.0, epsilon = 1e-10);

        // e * erfc(1)
        let wi = faddeeva(Complex64::new(0.0, 1.0));
        assert_abs_diff_eq!(wi.re, 0.427_583_576_155_807, epsilon = 1e-8);
        assert_abs_diff_eq!(wi.im, 0.0, epsilon = 1e-8);

        // exp(-1) + 2i/sqrt(pi) * dawson(1)
        let w1 = faddeeva(Complex64::new(1.0, 0.0));
        assert_abs_diff_eq!(w1.re, 0.367_879_441_171_442, epsilon = 1e-8);
        assert_abs_diff_eq!(w1.im, 0.607_157_705_841_394, epsilon = 1e-8);
    }

    #[test]
    fn faddeeva_lower_half_plane() {
        // w(-z) = 2 exp(-z^2) - w(z)
        let z = Complex64::new(0.7, 0.4);
        let lhs = faddeeva(-z);
        let rhs = 2.0 * (-z * z).exp() - faddeeva(z);
        assert_abs_diff_eq!(lhs.re, rhs.re, epsilon = 1e-10);
        assert_abs_diff_eq!(lhs.im, rhs.im, epsilon = 1e-10);
    }

    #[test]
    fn constant_materials() {
        let glass = Material::from_spec(&MaterialSpec::Permittivity(2.25), None).unwrap();
        assert_eq!(glass.permittivity(500.0).unwrap(), Complex64::new(2.25, 0.0));
        assert_eq!(glass.permeability(500.0), Complex64::new(1.0, 0.0));

        let nim = Material::from_spec(
            &MaterialSpec::Magnetic {
                permittivity: -1.0,
                permeability: -1.0,
            },
            None,
        )
        .unwrap();
        assert_eq!(nim.permeability(700.0), Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn tabulated_interpolates_and_clamps() {
        let table = Material::tabulated(
            vec![400.0, 500.0, 600.0],
            vec![
                Complex64::new(2.0, 0.2),
                Complex64::new(3.0, 0.4),
                Complex64::new(5.0, 0.0),
            ],
        )
        .unwrap();
        let mid = table.permittivity(450.0).unwrap();
        assert_abs_diff_eq!(mid.re, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.im, 0.3, epsilon = 1e-12);
        // outside the table the end values are returned
        assert_eq!(table.permittivity(300.0).unwrap(), Complex64::new(2.0, 0.2));
        assert_eq!(table.permittivity(900.0).unwrap(), Complex64::new(5.0, 0.0));
    }

    #[test]
    fn tabulated_rejects_bad_tables() {
        assert!(Material::tabulated(vec![400.0], vec![Complex64::new(1.0, 0.0)]).is_err());
        assert!(Material::tabulated(
            vec![500.0, 400.0],
            vec![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)]
        )
        .is_err());
    }

    #[test]
    fn drude_limit_of_brendel_bormann() {
        // without oscillators only the free-electron term is left
        let bb = BrendelBormann::new(1.0, 0.0, 5.0, vec![], vec![], vec![], vec![]).unwrap();
        let wavelength = 600.0;
        let w = HC_OVER_E / wavelength;
        let eps = bb.permittivity(wavelength);
        assert_abs_diff_eq!(eps.re, 1.0 - 25.0 / (w * w), epsilon = 1e-10);
        assert_abs_diff_eq!(eps.im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn custom_function() {
        let cauchy = Material::custom(|wl| Complex64::new(1.5 + 4000.0 / (wl * wl), 0.0).powi(2));
        let eps = cauchy.permittivity(400.0).unwrap();
        assert_abs_diff_eq!(eps.re, 1.525 * 1.525, epsilon = 1e-12);
    }
}

/// A user supplied permittivity as a function of the wavelength in nm.
#[derive(Clone)]
pub struct CustomFn(pub Arc<dyn Fn(f64) -> Complex64 + Send + Sync>);

impl fmt::Debug for CustomFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomFn")
    }
}

/// How a material is written in a configuration file or handed to the
/// structure builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialSpec {
    /// Real, non-dispersive permittivity.
    Permittivity(f64),
    /// Complex, non-dispersive permittivity written as `[re, im]`.
    Complex(Complex64),
    /// Non-dispersive magnetic medium.
    Magnetic { permittivity: f64, permeability: f64 },
    /// Entry of the material database.
    Named(String),
}

#[derive(Debug, Clone)]
pub enum Material {
    Constant {
        permittivity: Complex64,
    },
    Magnetic {
        permittivity: Complex64,
        permeability: Complex64,
    },
    Tabulated(Tabulated),
    BrendelBormann(BrendelBormann),
    Custom(CustomFn),
}

impl Material {
    /// Resolves a specification into a material model. Names are looked up in
    /// `database`; without one every name is unknown.
    pub fn from_spec(spec: &MaterialSpec, database: Option<&MaterialDatabase>) -> Result<Self> {
        match spec {
            MaterialSpec::Permittivity(eps) => Ok(Self::constant(Complex64::new(*eps, 0.0))),
            MaterialSpec::Complex(eps) => Ok(Self::constant(*eps)),
            MaterialSpec::Magnetic {
                permittivity,
                permeability,
            } => Ok(Self::Magnetic {
                permittivity: Complex64::new(*permittivity, 0.0),
                permeability: Complex64::new(*permeability, 0.0),
            }),
            MaterialSpec::Named(name) => match database {
                Some(db) => db.material(name),
                None => Err(SolverError::UnknownMaterial(name.clone()).into()),
            },
        }
    }

    pub fn constant(permittivity: Complex64) -> Self {
        Self::Constant { permittivity }
    }

    pub fn magnetic(permittivity: Complex64, permeability: Complex64) -> Self {
        Self::Magnetic {
            permittivity,
            permeability,
        }
    }

    pub fn tabulated(wavelengths: Vec<f64>, permittivities: Vec<Complex64>) -> Result<Self> {
        Ok(Self::Tabulated(Tabulated::new(wavelengths, permittivities)?))
    }

    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(f64) -> Complex64 + Send + Sync + 'static,
    {
        Self::Custom(CustomFn(Arc::new(function)))
    }

    /// Relative permittivity at `wavelength` (nm).
    pub fn permittivity(&self, wavelength: f64) -> Result<Complex64> {
        match self {
            Self::Constant { permittivity } | Self::Magnetic { permittivity, .. } => {
                Ok(*permittivity)
            }
            Self::Tabulated(table) => table.permittivity(wavelength),
            Self::BrendelBormann(model) => Ok(model.permittivity(wavelength)),
            Self::Custom(function) => Ok((function.0)(wavelength)),
        }
    }

    /// Relative permeability at `wavelength` (nm). Only the magnetic model departs from 1.
    pub fn permeability(&self, _wavelength: f64) -> Complex64 {
        match self {
            Self::Magnetic { permeability, .. } => *permeability,
            _ => Complex64::new(1.0, 0.0),
        }
    }
}

type LinearInterp = Interp1D<OwnedRepr<f64>, OwnedRepr<f64>, Ix1, Linear>;

/// Measured permittivity on a strictly increasing wavelength grid.
#[derive(Clone)]
pub struct Tabulated {
    first: f64,
    last: f64,
    real: Arc<LinearInterp>,
    imag: Arc<LinearInterp>,
}

impl fmt::Debug for Tabulated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tabulated({} nm..{} nm)", self.first, self.last)
    }
}

fn linear(wavelengths: &Array1<f64>, values: Array1<f64>) -> Result<LinearInterp> {
    Ok(Interp1DBuilder::new(values)
        .x(wavelengths.clone())
        .strategy(Linear::new())
        .build()?)
}

impl Tabulated {
    pub fn new(wavelengths: Vec<f64>, permittivities: Vec<Complex64>) -> Result<Self> {
        if wavelengths.len() < 2 || wavelengths.len() != permittivities.len() {
            return Err(SolverError::InvalidMaterial(format!(
                "tabulated data needs at least two matching samples, got {} wavelengths and {} values",
                wavelengths.len(),
                permittivities.len()
            ))
            .into());
        }
        if wavelengths.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(SolverError::InvalidMaterial(
                "tabulated wavelengths must be strictly increasing".to_string(),
            )
            .into());
        }
        let first = wavelengths[0];
        let last = wavelengths[wavelengths.len() - 1];
        let wavelengths = Array1::from(wavelengths);
        Ok(Self {
            first,
            last,
            real: Arc::new(linear(&wavelengths, permittivities.iter().map(|eps| eps.re).collect())?),
            imag: Arc::new(linear(&wavelengths, permittivities.iter().map(|eps| eps.im).collect())?),
        })
    }

    /// Linear interpolation of the real and imaginary parts, held constant
    /// beyond the first and last samples.
    pub fn permittivity(&self, wavelength: f64) -> Result<Complex64> {
        let x = wavelength.clamp(self.first, self.last);
        Ok(Complex64::new(
            self.real.interp_scalar(x)?,
            self.imag.interp_scalar(x)?,
        ))
    }
}

/// Brendel & Bormann dispersion: a Drude free-electron term plus Lorentz
/// oscillators broadened by a gaussian distribution of resonance energies.
/// Energies are in eV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrendelBormann {
    pub f0: f64,
    pub gamma0: f64,
    pub omega_p: f64,
    pub f: Vec<f64>,
    pub gamma: Vec<f64>,
    pub omega: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl BrendelBormann {
    pub fn new(
        f0: f64,
        gamma0: f64,
        omega_p: f64,
        f: Vec<f64>,
        gamma: Vec<f64>,
        omega: Vec<f64>,
        sigma: Vec<f64>,
    ) -> Result<Self> {
        let model = Self {
            f0,
            gamma0,
            omega_p,
            f,
            gamma,
            omega,
            sigma,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.f.len();
        if self.gamma.len() != n || self.omega.len() != n || self.sigma.len() != n {
            return Err(SolverError::InvalidMaterial(format!(
                "Brendel-Bormann oscillator lists differ in length: f {}, gamma {}, omega {}, sigma {}",
                n,
                self.gamma.len(),
                self.omega.len(),
                self.sigma.len()
            ))
            .into());
        }
        if self.sigma.iter().any(|s| *s <= 0.0) {
            return Err(SolverError::InvalidMaterial(
                "Brendel-Bormann broadenings must be positive".to_string(),
            )
            .into());
        }
        Ok(())
    }

    pub fn permittivity(&self, wavelength: f64) -> Complex64 {
        let i = Complex64::i();
        let w = HC_OVER_E / wavelength;
        let wp2 = self.omega_p * self.omega_p;

        let chi_b: Complex64 = self
            .f
            .iter()
            .zip(&self.gamma)
            .zip(&self.omega)
            .zip(&self.sigma)
            .map(|(((&f, &gamma), &omega), &sigma)| {
                let a = (w * (w + i * gamma)).sqrt();
                let x = (a - omega) / (SQRT_2 * sigma);
                let y = (a + omega) / (SQRT_2 * sigma);
                i * PI.sqrt() * f * wp2 / (2.0 * SQRT_2 * a * sigma) * (faddeeva(x) + faddeeva(y))
            })
            .sum();

        let chi_f = -wp2 * self.f0 / (w * (w + i * self.gamma0));

        1.0 + chi_f + chi_b
    }
}

fn weideman_coefficients() -> &'static (f64, Vec<f64>) {
    static COEFFICIENTS: OnceLock<(f64, Vec<f64>)> = OnceLock::new();
    COEFFICIENTS.get_or_init(|| {
        let n = FADDEEVA_TERMS;
        let m = 2 * n as i64;
        let l = (n as f64 / SQRT_2).sqrt();
        let samples: Vec<(f64, f64)> = (-m + 1..m)
            .map(|k| {
                let theta = k as f64 * PI / m as f64;
                let t = l * (theta / 2.0).tan();
                (theta, (-t * t).exp() * (l * l + t * t))
            })
            .collect();
        let coefficients = (1..=n)
            .map(|j| {
                samples
                    .iter()
                    .map(|(theta, value)| value * (j as f64 * theta).cos())
                    .sum::<f64>()
                    / (2 * m) as f64
            })
            .collect();
        (l, coefficients)
    })
}

/// Faddeeva function w(z) = exp(-z²) erfc(-iz), from Weideman's rational
/// expansion in the upper half plane and the reflection formula below it.
pub fn faddeeva(z: Complex64) -> Complex64 {
    if z.im < 0.0 {
        return 2.0 * (-z * z).exp() - faddeeva(-z);
    }
    let (l, coefficients) = weideman_coefficients();
    let i = Complex64::i();
    let denominator = *l - i * z;
    let ratio = (*l + i * z) / denominator;
    let p = coefficients
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &a| acc * ratio + a);
    2.0 * p / (denominator * denominator) + 1.0 / (PI.sqrt() * denominator)
}
