// Copyright @yucwang 2026

use crate::core::config::RenderSettings;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;
use crate::math::transform::Transform;

/// Wavelength sub-range and path settings shared by every ray of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTemplate {
    pub min_wavelength: Float,
    pub max_wavelength: Float,
    pub num_samples: usize,
    pub extinction_prob: Float,
    pub min_depth: u32,
    pub max_depth: u32,
}

impl RayTemplate {
    pub fn new_spectrum(&self) -> Spectrum {
        Spectrum::new(self.min_wavelength, self.max_wavelength, self.num_samples)
    }

    pub fn spawn(&self, origin: Vector3f, direction: Vector3f) -> SpectralRay {
        SpectralRay { ray: Ray3f::new(origin, direction, None, None), template: *self }
    }
}

/// A geometric ray carrying the spectral template it was spawned from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralRay {
    pub ray: Ray3f,
    pub template: RayTemplate,
}

impl SpectralRay {
    pub fn transformed(&self, transform: &Transform) -> SpectralRay {
        SpectralRay { ray: transform.apply_ray(&self.ray), template: self.template }
    }
}

/// Split `[0, spectral_samples)` into `spectral_rays` consecutive bin ranges.
///
/// A fractional cursor advances by `samples / rays` and is rounded (ties to
/// even) to give each upper boundary, so the ranges always cover every bin
/// exactly once even when the division is not even.
pub fn partition_bins(spectral_samples: usize, spectral_rays: usize) -> Vec<(usize, usize)> {
    let step = spectral_samples as f64 / spectral_rays as f64;
    let mut ranges = Vec::with_capacity(spectral_rays);
    let mut cursor = 0.0f64;
    let mut start = 0usize;

    for channel in 0..spectral_rays {
        cursor += step;
        let end = if channel + 1 == spectral_rays {
            spectral_samples
        } else {
            (cursor.round_ties_even() as usize).min(spectral_samples)
        };
        ranges.push((start, end));
        start = end;
    }

    ranges
}

/// Build one template per channel for the snapshot's wavelength range.
pub fn generate_ray_templates(settings: &RenderSettings) -> Vec<RayTemplate> {
    let delta_wavelength = (settings.max_wavelength - settings.min_wavelength)
        / settings.spectral_samples as Float;

    partition_bins(settings.spectral_samples, settings.spectral_rays)
        .into_iter()
        .map(|(start, end)| RayTemplate {
            min_wavelength: settings.min_wavelength + delta_wavelength * start as Float,
            max_wavelength: if end == settings.spectral_samples {
                settings.max_wavelength
            } else {
                settings.min_wavelength + delta_wavelength * end as Float
            },
            num_samples: end - start,
            extinction_prob: settings.extinction_prob,
            min_depth: settings.min_depth,
            max_depth: settings.max_depth,
        })
        .collect()
}
