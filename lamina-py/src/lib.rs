use lamina::{
    config::DEFAULT_INITIAL_POINTS,
    material::Material,
    structure::{Polarization, Structure},
};
use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: anyhow::Error) -> PyErr {
    PyValueError::new_err(format!("{:#}", err))
}

/// A stack of non-dispersive layers, top medium first.
#[pyclass(name = "Structure")]
#[derive(Debug, Clone)]
struct PyStructure {
    inner: Structure,
}

#[pymethods]
impl PyStructure {
    /// `permittivities` lists the materials, `layer_type` refers to them for
    /// each layer and `thickness` is in nm.
    #[new]
    fn new(
        permittivities: Vec<Complex64>,
        layer_type: Vec<usize>,
        thickness: Vec<f64>,
    ) -> PyResult<Self> {
        let materials = permittivities.into_iter().map(Material::constant).collect();
        let inner = Structure::new(materials, layer_type, thickness).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn __len__(&self) -> usize {
        self.inner.layers()
    }

    #[getter]
    fn thickness(&self) -> Vec<f64> {
        self.inner.thickness.clone()
    }
}

/// Returns (r, t, R, T). The incidence is in radians, polarization 0 is TE.
#[pyfunction]
fn coefficient(
    structure: &PyStructure,
    wavelength: f64,
    incidence: f64,
    polarization: i32,
) -> PyResult<(Complex64, Complex64, f64, f64)> {
    let c = lamina::coefficient::coefficient(
        &structure.inner,
        wavelength,
        incidence,
        Polarization::from(polarization),
    )
    .map_err(to_py_err)?;
    Ok((c.r, c.t, c.reflectance, c.transmittance))
}

/// Returns (absorbed per layer, r, t, R, T).
#[pyfunction]
fn absorption(
    structure: &PyStructure,
    wavelength: f64,
    incidence: f64,
    polarization: i32,
) -> PyResult<(Vec<f64>, Complex64, Complex64, f64, f64)> {
    let a = lamina::absorption::absorption(
        &structure.inner,
        wavelength,
        incidence,
        Polarization::from(polarization),
    )
    .map_err(to_py_err)?;
    let c = a.coefficients;
    Ok((a.absorbed, c.r, c.t, c.reflectance, c.transmittance))
}

/// Effective indices of the guided modes found between `neff_min` and `neff_max`.
#[pyfunction]
#[pyo3(signature = (structure, wavelength, polarization, neff_min, neff_max, initial_points = DEFAULT_INITIAL_POINTS))]
fn guided_modes(
    py: Python<'_>,
    structure: &PyStructure,
    wavelength: f64,
    polarization: i32,
    neff_min: f64,
    neff_max: f64,
    initial_points: usize,
) -> PyResult<Vec<Complex64>> {
    py.allow_threads(|| {
        lamina::modes::guided_modes(
            &structure.inner,
            wavelength,
            Polarization::from(polarization),
            neff_min,
            neff_max,
            initial_points,
        )
    })
    .map_err(to_py_err)
}

#[pymodule]
fn _lamina_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyStructure>()?;
    m.add_function(wrap_pyfunction!(coefficient, m)?)?;
    m.add_function(wrap_pyfunction!(absorption, m)?)?;
    m.add_function(wrap_pyfunction!(guided_modes, m)?)?;
    Ok(())
}
