//! Elementary scattering matrices of a layered stack.
//!
//! A scattering matrix maps the amplitudes entering a block (down-going from
//! above, up-going from below) onto the amplitudes leaving it (up-going above,
//! down-going below):
//!
//! ```text
//! [ up_above   ]   [ S00 S01 ] [ down_above ]
//! [ down_below ] = [ S10 S11 ] [ up_below   ]
//! ```
//!
//! A stack of `g` layers is described by `2g` such blocks: a swap that starts
//! the chain, then for each layer a propagation block followed by the interface
//! with the next layer, and a final propagation through the bottom medium.

use nalgebra::Matrix2;
use num_complex::Complex64;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn interface_between_identical_media_is_transparent() {
        let b = Complex64::new(0.01, 0.0);
        let s = interface(b, b);
        assert_eq!(s[(0, 0)], Complex64::new(0.0, 0.0));
        assert_eq!(s[(1, 1)], Complex64::new(0.0, 0.0));
        assert_eq!(s[(0, 1)], Complex64::new(1.0, 0.0));
        assert_eq!(s[(1, 0)], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn sequence_layout() {
        let gamma = vec![Complex64::new(1.0, 0.0); 3];
        let f = vec![Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0), Complex64::new(1.0, 0.0)];
        let thickness = vec![0.0, 1.0, 0.0];
        let seq = sequence(&gamma, &f, &thickness);
        assert_eq!(seq.len(), 6);
        assert_eq!(seq[0], swap());
        // zero thickness propagation is a swap as well
        assert_eq!(seq[1], swap());
        let phase = Complex64::new(0.0, 1.0).exp();
        assert!((seq[3][(0, 1)] - phase).norm() < 1e-15);
        assert!((seq[3][(1, 0)] - phase).norm() < 1e-15);
    }
}

/// Block that exchanges its two ports, used to start a cascade.
pub fn swap() -> Matrix2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    Matrix2::new(zero, one, one, zero)
}

/// Propagation over a homogeneous layer: both waves pick up `exp(i * phase)`.
pub fn propagation(phase: Complex64) -> Matrix2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let t = (Complex64::i() * phase).exp();
    Matrix2::new(zero, t, t, zero)
}

/// Fresnel block of an interface between an upper medium with `b1 = gamma1 / f1`
/// and a lower medium with `b2 = gamma2 / f2`, where `f` is the permeability in
/// TE and the permittivity in TM.
pub fn interface(b1: Complex64, b2: Complex64) -> Matrix2<Complex64> {
    let sum = b1 + b2;
    Matrix2::new(
        (b1 - b2) / sum,
        2.0 * b2 / sum,
        2.0 * b1 / sum,
        (b2 - b1) / sum,
    )
}

/// The `2g` blocks of a stack with vertical wavevectors `gamma`, boundary
/// quantities `f` and `thickness`, all given per layer.
pub fn sequence(gamma: &[Complex64], f: &[Complex64], thickness: &[f64]) -> Vec<Matrix2<Complex64>> {
    let g = gamma.len();
    let mut blocks = Vec::with_capacity(2 * g);
    blocks.push(swap());
    for k in 0..g - 1 {
        blocks.push(propagation(gamma[k] * thickness[k]));
        blocks.push(interface(gamma[k] / f[k], gamma[k + 1] / f[k + 1]));
    }
    blocks.push(propagation(gamma[g - 1] * thickness[g - 1]));
    blocks
}
