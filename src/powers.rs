//! Energy budget of an illuminated stack.
//!
//! For a unit incident flux, the reflected, transmitted and absorbed fractions
//! add up to one. Whatever is left over is numerical error, or the sign that
//! the budget does not apply (a lossy bottom medium makes the transmitted
//! fraction meaningless).

use std::fmt;

use serde::Serialize;


/// Fractions of the incident power, one absorbed value per layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Powers {
    pub reflected: f64,
    pub transmitted: f64,
    pub absorbed: Vec<f64>,
}

impl Powers {
    pub fn total_absorbed(&self) -> f64 {
        self.absorbed.iter().sum()
    }

    /// Incident power not accounted for by reflection, transmission and absorption.
    pub fn missing(&self) -> f64 {
        1.0 - (self.reflected + self.transmitted + self.total_absorbed())
    }
}

impl fmt::Display for Powers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Powers:")?;
        writeln!(f, "  Reflected:        {:.6}", self.reflected)?;
        writeln!(f, "  Transmitted:      {:.6}", self.transmitted)?;
        for (k, absorbed) in self.absorbed.iter().enumerate() {
            writeln!(f, "  Absorbed [{:>3}]:  {:.6}", k, absorbed)?;
        }
        writeln!(f, "  Absorbed total:   {:.6}", self.total_absorbed())?;
        writeln!(f, "  Missing:          {:.6}", self.missing())
    }
}
