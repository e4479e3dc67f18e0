use crate::structure::Polarization;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn horizontal_samples() {
        let window = Window::new(1000.0, 0.5, 30.0, 10.0);
        assert_eq!(window.nx(), 33);
        let window = Window::new(1000.0, 0.5, 2000.0, 10.0);
        assert_eq!(window.nx(), 0);
    }
}

/// Gaussian beam illuminating the stack from the top medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    /// Wavelength in vacuum, nm.
    pub wavelength: f64,
    /// Angle of incidence in radians.
    pub incidence: f64,
    pub polarization: Polarization,
    /// Horizontal waist, nm.
    pub waist: f64,
}

impl Beam {
    pub fn new(wavelength: f64, incidence: f64, polarization: Polarization, waist: f64) -> Self {
        Self {
            wavelength,
            incidence,
            polarization,
            waist,
        }
    }
}

/// Region of the stack rendered by a field map. The map is periodic
/// horizontally with period `width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Horizontal extent, nm.
    pub width: f64,
    /// Position of the beam center as a fraction of `width`.
    pub beam_position: f64,
    /// Horizontal pixel size, nm.
    pub px: f64,
    /// Vertical pixel size, nm.
    pub py: f64,
}

impl Window {
    pub fn new(width: f64, beam_position: f64, px: f64, py: f64) -> Self {
        Self {
            width,
            beam_position,
            px,
            py,
        }
    }

    /// Number of horizontal samples.
    pub fn nx(&self) -> usize {
        (self.width / self.px).floor() as usize
    }
}
