//! Combination of scattering matrices.
//!
//! Blocks are chained with the Redheffer star product. Unlike a product of
//! transfer matrices, it only ever multiplies bounded quantities, so thick or
//! absorbing layers do not overflow.

use anyhow::Result;
use nalgebra::Matrix2;
use num_complex::Complex64;

use crate::error::SolverError;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{error::is_singularity, fresnel};

    fn close(a: &Matrix2<Complex64>, b: &Matrix2<Complex64>) -> bool {
        (a - b).iter().all(|d| d.norm() < 1e-12)
    }

    #[test]
    fn swap_is_neutral() {
        let s = fresnel::interface(Complex64::new(1.0, 0.2), Complex64::new(1.7, 0.0));
        let swapped = cascade(&fresnel::swap(), &s).unwrap();
        assert!(close(&swapped, &s));
    }

    #[test]
    fn associativity() {
        let a = fresnel::interface(Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.1));
        let b = fresnel::propagation(Complex64::new(2.3, 0.05));
        let c = fresnel::interface(Complex64::new(1.5, 0.1), Complex64::new(0.4, 2.0));

        let left = cascade(&cascade(&a, &b).unwrap(), &c).unwrap();
        let right = cascade(&a, &cascade(&b, &c).unwrap()).unwrap();
        assert!(close(&left, &right), "left: {}, right: {}", left, right);
    }

    #[test]
    fn singular_denominator() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let a = Matrix2::new(zero, one, one, one);
        let b = Matrix2::new(one, one, one, zero);
        let err = cascade(&a, &b).unwrap_err();
        assert!(is_singularity(&err));
    }

    #[test]
    fn coefficients_cover_every_position() {
        let gamma = vec![Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0), Complex64::new(1.0, 0.0)];
        let f = vec![Complex64::new(1.0, 0.0); 3];
        let seq = fresnel::sequence(&gamma, &f, &[0.0, 2.0, 0.0]);
        let coefficients = field_coefficients(&seq).unwrap();
        assert_eq!(coefficients.len(), seq.len());
        // unit incident wave at the top, nothing coming up from the bottom
        assert!((coefficients[0][(0, 0)] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(coefficients[seq.len() - 1][(1, 0)].norm() < 1e-12);
    }
}

/// Star product of an upper block `a` with a lower block `b`.
pub fn cascade(a: &Matrix2<Complex64>, b: &Matrix2<Complex64>) -> Result<Matrix2<Complex64>> {
    let denominator = Complex64::new(1.0, 0.0) - b[(0, 0)] * a[(1, 1)];
    let t = denominator.inv();
    if denominator.norm_sqr() == 0.0 || !t.is_finite() {
        return Err(SolverError::singular("cascade", denominator).into());
    }
    Ok(Matrix2::new(
        a[(0, 0)] + a[(0, 1)] * b[(0, 0)] * a[(1, 0)] * t,
        a[(0, 1)] * b[(0, 1)] * t,
        b[(1, 0)] * a[(1, 0)] * t,
        b[(1, 1)] + a[(1, 1)] * b[(0, 1)] * b[(1, 0)] * t,
    ))
}

/// Partial products from the top: element `k` combines blocks `0..=k`.
/// The last block is left out, so the result has one element less than `blocks`.
pub fn from_top(blocks: &[Matrix2<Complex64>]) -> Result<Vec<Matrix2<Complex64>>> {
    let mut partial = Vec::with_capacity(blocks.len() - 1);
    partial.push(blocks[0]);
    for block in &blocks[1..blocks.len() - 1] {
        let next = cascade(&partial[partial.len() - 1], block)?;
        partial.push(next);
    }
    Ok(partial)
}

/// Partial products from the bottom: element `k` combines the last `k + 1` blocks.
/// The first block is left out.
pub fn from_bottom(blocks: &[Matrix2<Complex64>]) -> Result<Vec<Matrix2<Complex64>>> {
    let n = blocks.len();
    let mut partial = Vec::with_capacity(n - 1);
    partial.push(blocks[n - 1]);
    for block in blocks[1..n - 1].iter().rev() {
        let next = cascade(block, &partial[partial.len() - 1])?;
        partial.push(next);
    }
    Ok(partial)
}

/// Wave amplitudes at every position of the chain, position `k` lying just
/// below block `k`.
///
/// Column 0 holds the down-going (row 0) and up-going (row 1) amplitudes for a
/// unit wave incident from the top, column 1 those for a unit wave incident
/// from the bottom. The last position, below the bottom medium, only carries
/// the transmitted down-going wave.
pub fn field_coefficients(blocks: &[Matrix2<Complex64>]) -> Result<Vec<Matrix2<Complex64>>> {
    let n = blocks.len();
    let top = from_top(blocks)?;
    let bottom = from_bottom(blocks)?;
    let zero = Complex64::new(0.0, 0.0);

    let mut coefficients = Vec::with_capacity(n);
    for (k, a) in top.iter().enumerate() {
        let h = &bottom[n - k - 2];
        let denominator = Complex64::new(1.0, 0.0) - a[(1, 1)] * h[(0, 0)];
        let t = denominator.inv();
        if denominator.norm_sqr() == 0.0 || !t.is_finite() {
            return Err(SolverError::singular("field coefficients", denominator).into());
        }
        coefficients.push(Matrix2::new(
            a[(1, 0)] * t,
            a[(1, 1)] * h[(0, 1)] * t,
            a[(1, 0)] * h[(0, 0)] * t,
            h[(0, 1)] * t,
        ));
    }

    let last = coefficients[n - 2];
    let phase = blocks[n - 1][(0, 1)];
    coefficients.push(Matrix2::new(last[(0, 0)] * phase, last[(0, 1)] * phase, zero, zero));
    Ok(coefficients)
}
