//! Phase matching across the stack and the choice of square-root branch for
//! the vertical wavevectors.
//!
//! All layers share the horizontal wavevector `alpha`. The vertical one,
//! `gamma = sqrt(eps * mu * k0^2 - alpha^2)`, is only defined up to a sign, and
//! the sign decides whether a wave decays or grows, radiates or comes in. Every
//! solver picks it through [`select_branch`], so the rules below are the only
//! place where that decision is made:
//!
//! - top medium: principal root, negated for a negative-index medium
//! - interior layers: the root with a non-negative imaginary part
//! - bottom medium: the outgoing root, negated for a propagating wave in a
//!   negative-index medium
//! - guided-mode search: on top of the above, boundary roots whose phase is
//!   below -π/5 move to the other sheet so that leaky poles are not hidden
//!   behind the default cut

use num_complex::Complex64;

use crate::config::BRANCH_CUT_ANGLE;


/// Position of a layer in the stack, as far as branch selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Top,
    Interior,
    Bottom,
}

/// What the wavevectors are used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Plane wave incident from the top medium.
    Illumination,
    /// Complex `alpha` in search of a pole of the reflection coefficient.
    ModeSearch,
}

fn negative_index(epsilon: Complex64, mu: Complex64) -> bool {
    epsilon.re < 0.0 && mu.re < 0.0
}

/// Picks the physical sign of a principal square root `gamma`.
pub fn select_branch(
    gamma: Complex64,
    role: Role,
    epsilon: Complex64,
    mu: Complex64,
    regime: Regime,
) -> Complex64 {
    let gamma = match role {
        Role::Top if negative_index(epsilon, mu) => -gamma,
        Role::Interior if gamma.im < 0.0 => -gamma,
        Role::Bottom if negative_index(epsilon, mu) && gamma.re != 0.0 => -gamma,
        _ => gamma,
    };
    match (regime, role) {
        (Regime::ModeSearch, Role::Top | Role::Bottom) if gamma.arg() < BRANCH_CUT_ANGLE => -gamma,
        _ => gamma,
    }
}

/// Horizontal wavevector of a plane wave coming from the top medium at
/// `incidence` radians.
pub fn horizontal_wavevector(epsilon: Complex64, mu: Complex64, k0: f64, incidence: f64) -> Complex64 {
    (epsilon * mu).sqrt() * k0 * incidence.sin()
}

/// Vertical wavevector of every layer for the shared horizontal wavevector `alpha`.
pub fn vertical_wavevectors(
    epsilon: &[Complex64],
    mu: &[Complex64],
    k0: f64,
    alpha: Complex64,
    regime: Regime,
) -> Vec<Complex64> {
    let last = epsilon.len() - 1;
    epsilon
        .iter()
        .zip(mu)
        .enumerate()
        .map(|(k, (&eps, &mu))| {
            let role = if k == 0 {
                Role::Top
            } else if k == last {
                Role::Bottom
            } else {
                Role::Interior
            };
            let gamma = (eps * mu * k0 * k0 - alpha * alpha).sqrt();
            select_branch(gamma, role, eps, mu, regime)
        })
        .collect()
}
