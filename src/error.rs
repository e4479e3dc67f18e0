//! Classified failures of the multilayer solver.
//!
//! Entry points return `anyhow::Result`; the variants below travel inside the
//! `anyhow::Error` and can be recovered with `downcast_ref::<SolverError>()`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// A scattering-matrix combination hit a vanishing denominator.
    #[error("numerical singularity in {stage}: denominator {denominator}")]
    NumericalSingularity {
        stage: &'static str,
        denominator: String,
    },

    /// The layer description is inconsistent with itself or with the material list.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// A material name could not be found in the database.
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    /// A material description was found but could not be turned into a model.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// A root search ran out of steps before reaching its tolerance.
    #[error("search did not converge after {steps} steps (objective {value:e})")]
    NonConvergence { steps: usize, value: f64 },
}

impl SolverError {
    pub fn singular(stage: &'static str, denominator: num_complex::Complex64) -> Self {
        Self::NumericalSingularity {
            stage,
            denominator: format!("{denominator}"),
        }
    }
}

/// Returns true if `err` wraps a [`SolverError::NumericalSingularity`].
pub fn is_singularity(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SolverError>(),
        Some(SolverError::NumericalSingularity { .. })
    )
}
