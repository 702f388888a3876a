// Copyright @yucwang 2026

use crate::core::color::ColorPipeline;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

/// Tristimulus running estimate and its display-space copy.
///
/// Repeated observations fold in as an exact weighted mean: before new
/// samples arrive the buffer is rescaled by `accumulated / total`, and each
/// contribution is added with weight `added / total`.
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    tristimulus: Bitmap,
    display: Bitmap,
    accumulated_samples: usize,
    added_weight: Float,
}

impl FrameAccumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            tristimulus: Bitmap::new(width, height),
            display: Bitmap::new(width, height),
            accumulated_samples: 0,
            added_weight: 1.0,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.tristimulus.dimensions()
    }

    pub fn tristimulus(&self) -> &Bitmap {
        &self.tristimulus
    }

    pub fn display(&self) -> &Bitmap {
        &self.display
    }

    pub fn accumulated_samples(&self) -> usize {
        self.accumulated_samples
    }

    /// Drop all state and reallocate for the given pixel grid.
    pub fn reset(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// Rescale the existing estimate to make room for `new_samples` more
    /// samples per pixel. Returns the weight each new contribution takes.
    pub fn begin_observation(&mut self, new_samples: usize) -> Float {
        let total = (self.accumulated_samples + new_samples) as f64;
        let previous_weight = (self.accumulated_samples as f64 / total) as Float;
        self.added_weight = (new_samples as f64 / total) as Float;
        self.tristimulus.scale(previous_weight);
        self.added_weight
    }

    /// Fold one channel's tristimulus contribution into pixel `(x, y)` and
    /// refresh the matching display pixel.
    pub fn add(&mut self, x: usize, y: usize, tristimulus: &Vector3f, color: &dyn ColorPipeline) {
        let pixel = &mut self.tristimulus[(x, y)];
        *pixel += tristimulus * self.added_weight;
        let current = *pixel;
        self.display[(x, y)] = color.to_display(&current);
    }

    pub fn end_observation(&mut self, new_samples: usize) {
        self.accumulated_samples += new_samples;
    }
}
