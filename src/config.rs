use std::f64::consts::PI;

/// Objective value below which a guided-mode search is considered converged.
pub const MODE_TOLERANCE: f64 = 1e-10;
/// Default iteration budget for the steepest-descent and Müller searches.
pub const MAX_SEARCH_STEPS: usize = 1000;
/// Default number of real starting points seeded by `guided_modes`.
pub const DEFAULT_INITIAL_POINTS: usize = 40;
/// Two solutions closer than this multiple of k0 are the same mode.
pub const MODE_SEPARATION: f64 = 1e-5;
/// Initial descent step as a fraction of the starting point modulus.
pub const SEARCH_STEP_FRACTION: f64 = 1e-3;
/// Finite-difference step as a fraction of the descent step.
pub const GRADIENT_STEP_FRACTION: f64 = 1e-2;
/// Number of plane-wave harmonics per unit of width/waist; the last one is below 1e-3.
pub const BEAM_TRUNCATION: f64 = 0.8366;
/// Boundary wavevectors with a phase below this angle are moved to the other sheet.
pub const BRANCH_CUT_ANGLE: f64 = -PI / 5.0;
/// hc/e in eV·nm, converts a vacuum wavelength in nm to a photon energy in eV.
pub const HC_OVER_E: f64 = 6.62606957e-25 * 299792458.0 / 1.602176565e-19;
/// Number of terms in the rational expansion of the Faddeeva function.
pub const FADDEEVA_TERMS: usize = 64;
