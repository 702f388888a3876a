// Copyright @yucwang 2026

use crate::math::constants::{Float, Matrix3f, Vector3f, VectorXf};
use crate::math::spectrum::Spectrum;

/// Colour matching weights resampled onto one channel's wavelength bins.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatchingTable {
    pub x: VectorXf,
    pub y: VectorXf,
    pub z: VectorXf,
}

/// Spectral to tristimulus to display conversion used by the render loops.
pub trait ColorPipeline: Send + Sync {
    fn resample(&self, min_wavelength: Float, max_wavelength: Float, num_samples: usize) -> ColorMatchingTable;

    fn to_tristimulus(&self, spectrum: &Spectrum, table: &ColorMatchingTable) -> Vector3f {
        Vector3f::new(spectrum.samples.dot(&table.x),
                      spectrum.samples.dot(&table.y),
                      spectrum.samples.dot(&table.z))
    }

    fn to_display(&self, tristimulus: &Vector3f) -> Vector3f;
}

const CIE_MIN_WAVELENGTH: Float = 360.0;
const CIE_MAX_WAVELENGTH: Float = 830.0;
const SUBSAMPLES_PER_BIN: usize = 16;

// Piecewise gaussian with separate left/right widths.
fn lobe(lambda: Float, mu: Float, sigma_left: Float, sigma_right: Float) -> Float {
    let sigma = if lambda < mu { sigma_left } else { sigma_right };
    let t = (lambda - mu) / sigma;
    (-0.5 * t * t).exp()
}

/// Multi-lobe analytic fit of the CIE 1931 2-degree observer.
fn cie_xyz(lambda: Float) -> Vector3f {
    if lambda < CIE_MIN_WAVELENGTH || lambda > CIE_MAX_WAVELENGTH {
        return Vector3f::zeros();
    }
    let x = 1.056 * lobe(lambda, 599.8, 37.9, 31.0)
        + 0.362 * lobe(lambda, 442.0, 16.0, 26.7)
        - 0.065 * lobe(lambda, 501.1, 20.4, 26.2);
    let y = 0.821 * lobe(lambda, 568.8, 46.9, 40.5)
        + 0.286 * lobe(lambda, 530.9, 16.3, 31.1);
    let z = 1.217 * lobe(lambda, 437.0, 11.8, 36.0)
        + 0.681 * lobe(lambda, 459.0, 26.0, 13.8);
    Vector3f::new(x, y, z)
}

fn srgb_transfer(v: Float) -> Float {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// CIE XYZ accumulation with sRGB display output.
pub struct CieColorPipeline {
    y_integral: Float,
    xyz_to_rgb: Matrix3f,
}

impl Default for CieColorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CieColorPipeline {
    pub fn new() -> Self {
        let steps = (CIE_MAX_WAVELENGTH - CIE_MIN_WAVELENGTH) as usize;
        let y_integral = (0..steps)
            .map(|i| cie_xyz(CIE_MIN_WAVELENGTH + i as Float + 0.5).y)
            .sum();

        Self {
            y_integral,
            xyz_to_rgb: Matrix3f::new( 3.2404542, -1.5371385, -0.4985314,
                                      -0.9692660,  1.8760108,  0.0415560,
                                       0.0556434, -0.2040259,  1.0572252),
        }
    }
}

impl ColorPipeline for CieColorPipeline {
    fn resample(&self, min_wavelength: Float, max_wavelength: Float, num_samples: usize) -> ColorMatchingTable {
        let mut table = ColorMatchingTable {
            x: VectorXf::zeros(num_samples),
            y: VectorXf::zeros(num_samples),
            z: VectorXf::zeros(num_samples),
        };
        if num_samples == 0 {
            return table;
        }

        let delta = (max_wavelength - min_wavelength) / num_samples as Float;
        let sub_delta = delta / SUBSAMPLES_PER_BIN as Float;
        for i in 0..num_samples {
            let bin_start = min_wavelength + delta * i as Float;
            let mut sum = Vector3f::zeros();
            for j in 0..SUBSAMPLES_PER_BIN {
                sum += cie_xyz(bin_start + sub_delta * (j as Float + 0.5));
            }
            // bin-averaged weight times bin width, normalised so a unit
            // spectrum over the visible range has Y = 1
            let weight = sum * (sub_delta / self.y_integral);
            table.x[i] = weight.x;
            table.y[i] = weight.y;
            table.z[i] = weight.z;
        }
        table
    }

    fn to_display(&self, tristimulus: &Vector3f) -> Vector3f {
        let linear = self.xyz_to_rgb * tristimulus;
        linear.map(|v| srgb_transfer(v.max(0.0)).min(1.0))
    }
}
