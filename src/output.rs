use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use ndarray::Array2;
use num_complex::Complex64;
use serde_json::json;

use crate::{
    absorption::Absorption,
    coefficient::Coefficients,
    modes::ModeMap,
    profile::ModeProfile,
    result::{Solution, Sweep},
    settings::Settings,
};

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn lines(buffer: Vec<u8>) -> Vec<String> {
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn sweep_columns() {
        let c = Coefficients {
            r: Complex64::new(0.5, -0.5),
            t: Complex64::new(0.25, 0.0),
            reflectance: 0.5,
            transmittance: 0.5,
        };
        let sweep = Sweep::new(Array1::linspace(0.0, 1.0, 3), &[c, c, c]);
        let mut buffer = Vec::new();
        write_sweep(&mut buffer, "angle", &sweep).unwrap();
        let lines = lines(buffer);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("# angle"));
        let values: Vec<f64> = lines[2]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(values, vec![0.5, 0.5, 0.5, -0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn field_rows() {
        let field = Array2::from_elem((2, 3), Complex64::new(3.0, 4.0));
        let mut buffer = Vec::new();
        write_complex_grid(&mut buffer, &field, |v| v.norm()).unwrap();
        let lines = lines(buffer);
        assert_eq!(lines, vec!["5 5 5", "5 5 5"]);
    }
}

fn header(settings: &Settings) -> String {
    format!(
        "# lamina {} - {}\n# wavelength {} nm, angle {} deg, {}\n",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        settings.wavelength,
        settings.angle,
        settings.polarization,
    )
}

fn create(dir: &Path, name: &str, settings: &Settings) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "{}", header(settings))?;
    Ok(writer)
}

/// Writes one line per point: x, R, Re(r), Im(r), Re(t), Im(t), T.
pub fn write_sweep<W: Write>(writer: &mut W, variable: &str, sweep: &Sweep) -> Result<()> {
    writeln!(writer, "# {} R Re(r) Im(r) Re(t) Im(t) T", variable)?;
    for k in 0..sweep.len() {
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            sweep.x[k],
            sweep.reflectance[k],
            sweep.r[k].re,
            sweep.r[k].im,
            sweep.t[k].re,
            sweep.t[k].im,
            sweep.transmittance[k]
        )?;
    }
    Ok(())
}

/// Writes `part` of every value of `grid`, one line per row.
pub fn write_complex_grid<W, F>(writer: &mut W, grid: &Array2<Complex64>, part: F) -> Result<()>
where
    W: Write,
    F: Fn(&Complex64) -> f64,
{
    for row in grid.outer_iter() {
        let line: Vec<String> = row.iter().map(|v| part(v).to_string()).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

fn write_map<W: Write>(writer: &mut W, map: &ModeMap) -> Result<()> {
    writeln!(writer, "# Re(neff) Im(neff) |r|")?;
    for ((i, j), value) in map.values.indexed_iter() {
        writeln!(writer, "{} {} {}", map.real[i], map.imag[j], value)?;
    }
    Ok(())
}

fn write_profile<W: Write>(writer: &mut W, profile: &ModeProfile) -> Result<()> {
    writeln!(writer, "# depth Re(field) Im(field)")?;
    for (depth, value) in profile.depth.iter().zip(profile.field.iter()) {
        writeln!(writer, "{} {} {}", depth, value.re, value.im)?;
    }
    Ok(())
}

fn coefficients_json(c: &Coefficients) -> serde_json::Value {
    json!({
        "r": [c.r.re, c.r.im],
        "t": [c.t.re, c.t.im],
        "reflectance": c.reflectance,
        "transmittance": c.transmittance,
    })
}

fn summary(settings: &Settings, solution: &Solution) -> serde_json::Value {
    let result = match solution {
        Solution::Coefficient(c) => coefficients_json(c),
        Solution::Absorption(Absorption {
            absorbed,
            coefficients,
        }) => json!({
            "absorbed": absorbed,
            "coefficients": coefficients_json(coefficients),
        }),
        Solution::Angular(sweep) | Solution::Spectrum(sweep) => json!({ "points": sweep.len() }),
        Solution::Field(field) => json!({ "rows": field.nrows(), "columns": field.ncols() }),
        Solution::Modes(modes) => json!({
            "effective_indices": modes.iter().map(|n| [n.re, n.im]).collect::<Vec<_>>(),
        }),
        Solution::Map(map) => json!({ "shape": [map.real.len(), map.imag.len()] }),
        Solution::Profile { n_eff, profile } => json!({
            "n_eff": [n_eff.re, n_eff.im],
            "samples": profile.field.len(),
        }),
    };
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "date": chrono::Local::now().to_rfc3339(),
        "wavelength": settings.wavelength,
        "angle": settings.angle,
        "polarization": settings.polarization.to_string(),
        "layer_type": settings.stack.layer_type,
        "thickness": settings.stack.thickness,
        "result": result,
    })
}

/// Writes the files of `solution` and a `summary.json` to `dir`.
pub fn writeup(dir: &Path, settings: &Settings, solution: &Solution) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    match solution {
        Solution::Coefficient(_) => {}
        Solution::Absorption(absorption) => {
            let mut writer = create(dir, "absorption", settings)?;
            writeln!(writer, "# layer absorbed")?;
            for (k, a) in absorption.absorbed.iter().enumerate() {
                writeln!(writer, "{} {}", k, a)?;
            }
        }
        Solution::Angular(sweep) => {
            write_sweep(&mut create(dir, "angular", settings)?, "angle", sweep)?;
        }
        Solution::Spectrum(sweep) => {
            write_sweep(&mut create(dir, "spectrum", settings)?, "wavelength", sweep)?;
        }
        Solution::Field(field) => {
            write_complex_grid(&mut create(dir, "field_real", settings)?, field, |v| v.re)?;
            write_complex_grid(&mut create(dir, "field_abs", settings)?, field, |v| v.norm())?;
        }
        Solution::Modes(modes) => {
            let mut writer = create(dir, "modes", settings)?;
            writeln!(writer, "# Re(neff) Im(neff)")?;
            for n in modes {
                writeln!(writer, "{} {}", n.re, n.im)?;
            }
        }
        Solution::Map(map) => write_map(&mut create(dir, "map", settings)?, map)?,
        Solution::Profile { profile, .. } => {
            write_profile(&mut create(dir, "profile", settings)?, profile)?
        }
    }

    let path = dir.join("summary.json");
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary(settings, solution))?;
    Ok(())
}
