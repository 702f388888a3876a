// Copyright 2020 @TwoCookingMice

use super::constants::{Float, VectorXf};

/// Radiance sampled into equal-width wavelength bins over
/// `[min_wavelength, max_wavelength)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    min_wavelength: Float,
    max_wavelength: Float,
    pub samples: VectorXf,
}

impl Spectrum {
    pub fn new(min_wavelength: Float, max_wavelength: Float, num_samples: usize) -> Self {
        Self { min_wavelength, max_wavelength, samples: VectorXf::zeros(num_samples) }
    }

    pub fn from_fn<F: Fn(Float) -> Float>(min_wavelength: Float,
                                          max_wavelength: Float,
                                          num_samples: usize,
                                          f: F) -> Self {
        let mut spectrum = Self::new(min_wavelength, max_wavelength, num_samples);
        for i in 0..num_samples {
            spectrum.samples[i] = f(spectrum.wavelength(i));
        }
        spectrum
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn delta_wavelength(&self) -> Float {
        (self.max_wavelength - self.min_wavelength) / (self.samples.len().max(1) as Float)
    }

    /// Centre wavelength of bin `index`.
    pub fn wavelength(&self, index: usize) -> Float {
        self.min_wavelength + self.delta_wavelength() * (index as Float + 0.5)
    }

    pub fn add_weighted(&mut self, weight: Float, other: &Spectrum) {
        self.samples.axpy(weight, &other.samples, 1.0);
    }

    pub fn scale(&mut self, factor: Float) {
        self.samples *= factor;
    }
}
