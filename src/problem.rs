use std::time::Instant;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use num_complex::Complex64;

use crate::{
    absorption::absorption,
    beam::{Beam, Window},
    coefficient::coefficient,
    field::field,
    modes, output,
    profile::profile,
    result::Solution,
    settings::{Settings, Task},
    structure::Structure,
    sweep,
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::settings;

    #[test]
    fn solves_every_task() {
        let base = settings::load_default_config().unwrap();
        let tasks = [
            Task::Coefficient,
            Task::Absorption,
            Task::Angular {
                theta_min: 0.0,
                theta_max: 80.0,
                points: 9,
            },
            Task::Spectrum {
                wavelength_min: 450.0,
                wavelength_max: 750.0,
                points: 4,
            },
            Task::Field {
                waist: 1000.0,
                width: 4000.0,
                beam_position: 0.5,
                px: 200.0,
                py: 100.0,
            },
            Task::Map {
                real_min: 1.0,
                real_max: 1.4,
                imag_min: 0.0,
                imag_max: 0.05,
                n_real: 4,
                n_imag: 2,
            },
        ];
        for task in tasks {
            let mut settings = base.clone();
            settings.task = task;
            let mut problem = Problem::new(settings).unwrap();
            problem.solve().unwrap();
            assert!(problem.solution.is_some());
        }
    }

    #[test]
    fn writeup_needs_a_solution() {
        let problem = Problem::new(settings::load_default_config().unwrap()).unwrap();
        assert!(problem.writeup().is_err());
    }
}

/// One configured computation on one stack.
#[derive(Debug, Clone)]
pub struct Problem {
    pub settings: Settings,
    pub structure: Structure,
    pub solution: Option<Solution>,
}

fn progress_bar(n: usize, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(n as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
        )?
        .progress_chars("█▇▆▅▄▃▂▁"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

impl Problem {
    pub fn new(settings: Settings) -> Result<Self> {
        let structure = settings.structure()?;
        Ok(Self {
            settings,
            structure,
            solution: None,
        })
    }

    /// Runs the configured task.
    pub fn solve(&mut self) -> Result<&Solution> {
        let start = Instant::now();
        let s = &self.settings;
        let structure = &self.structure;
        tracing::info!("Solving {:?}...", s.task);

        let solution = match &s.task {
            Task::Coefficient => Solution::Coefficient(coefficient(
                structure,
                s.wavelength,
                s.incidence(),
                s.polarization,
            )?),
            Task::Absorption => {
                let result = absorption(structure, s.wavelength, s.incidence(), s.polarization)?;
                tracing::info!("\n{}", result.powers());
                Solution::Absorption(result)
            }
            Task::Angular {
                theta_min,
                theta_max,
                points,
            } => {
                let pb = progress_bar(*points, "angle")?;
                let sweep = sweep::angular(
                    structure,
                    s.wavelength,
                    s.polarization,
                    *theta_min,
                    *theta_max,
                    *points,
                    Some(&pb),
                )?;
                pb.finish();
                Solution::Angular(sweep)
            }
            Task::Spectrum {
                wavelength_min,
                wavelength_max,
                points,
            } => {
                let pb = progress_bar(*points, "wavelength")?;
                let sweep = sweep::spectrum(
                    structure,
                    s.angle,
                    s.polarization,
                    *wavelength_min,
                    *wavelength_max,
                    *points,
                    Some(&pb),
                )?;
                pb.finish();
                Solution::Spectrum(sweep)
            }
            Task::Field {
                waist,
                width,
                beam_position,
                px,
                py,
            } => {
                let beam = Beam::new(s.wavelength, s.incidence(), s.polarization, *waist);
                let window = Window::new(*width, *beam_position, *px, *py);
                Solution::Field(field(structure, &beam, &window)?)
            }
            Task::Modes {
                neff_min,
                neff_max,
                initial_points,
            } => {
                let found = modes::guided_modes(
                    structure,
                    s.wavelength,
                    s.polarization,
                    *neff_min,
                    *neff_max,
                    *initial_points,
                )?;
                tracing::info!("Found {} guided modes: {:?}", found.len(), found);
                Solution::Modes(found)
            }
            Task::Map {
                real_min,
                real_max,
                imag_min,
                imag_max,
                n_real,
                n_imag,
            } => Solution::Map(modes::map(
                structure,
                s.wavelength,
                s.polarization,
                (*real_min, *real_max),
                (*imag_min, *imag_max),
                *n_real,
                *n_imag,
            )?),
            Task::Profile { n_eff, pixel_size } => {
                let n_eff = Complex64::new(n_eff[0], n_eff[1]);
                Solution::Profile {
                    n_eff,
                    profile: profile(structure, n_eff, s.wavelength, s.polarization, *pixel_size)?,
                }
            }
        };

        if let Solution::Coefficient(c) = &solution {
            tracing::info!(
                "r = {:.6}, t = {:.6}, R = {:.6}, T = {:.6}",
                c.r,
                c.t,
                c.reflectance,
                c.transmittance
            );
        }
        tracing::info!("Time taken: {:.2?}", start.elapsed());

        Ok(self.solution.insert(solution))
    }

    /// Writes the solution to the configured output directory.
    pub fn writeup(&self) -> Result<()> {
        let solution = self
            .solution
            .as_ref()
            .ok_or_else(|| anyhow!("nothing to write, the problem has not been solved"))?;
        output::writeup(&self.settings.output, &self.settings, solution)?;
        tracing::info!("Results written to {}", self.settings.output.display());
        Ok(())
    }
}
