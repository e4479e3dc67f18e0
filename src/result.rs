use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::{
    absorption::Absorption,
    coefficient::Coefficients,
    modes::ModeMap,
    profile::ModeProfile,
};

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn sweep_columns() {
        let c = Coefficients {
            r: Complex64::new(0.2, 0.0),
            t: Complex64::new(0.9, 0.1),
            reflectance: 0.04,
            transmittance: 0.96,
        };
        let sweep = Sweep::new(Array1::linspace(0.0, 10.0, 2), &[c, c]);
        assert_eq!(sweep.len(), 2);
        assert!(!sweep.is_empty());
        assert_eq!(sweep.t[1], Complex64::new(0.9, 0.1));
        assert_eq!(sweep.reflectance.to_vec(), vec![0.04, 0.04]);
    }
}

/// Coefficients of the stack along a swept variable `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub x: Array1<f64>,
    pub r: Array1<Complex64>,
    pub t: Array1<Complex64>,
    pub reflectance: Array1<f64>,
    pub transmittance: Array1<f64>,
}

impl Sweep {
    pub fn new(x: Array1<f64>, coefficients: &[Coefficients]) -> Self {
        Self {
            x,
            r: coefficients.iter().map(|c| c.r).collect(),
            t: coefficients.iter().map(|c| c.t).collect(),
            reflectance: coefficients.iter().map(|c| c.reflectance).collect(),
            transmittance: coefficients.iter().map(|c| c.transmittance).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Output of one task of the command line runner.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Coefficient(Coefficients),
    Absorption(Absorption),
    Angular(Sweep),
    Spectrum(Sweep),
    Field(Array2<Complex64>),
    Modes(Vec<Complex64>),
    Map(ModeMap),
    Profile {
        n_eff: Complex64,
        profile: ModeProfile,
    },
}
