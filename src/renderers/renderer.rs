// Copyright @yucwang 2021

use crate::core::color::{ColorMatchingTable, ColorPipeline};
use crate::core::config::RenderSettings;
use crate::core::error::RenderError;
use crate::core::frame::FrameAccumulator;
use crate::core::progress::{self, DisplayThrottle, ProgressState, RenderSink};
use crate::core::ray_template::RayTemplate;
use crate::core::sampler::PixelSampler;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;

use rand::RngCore;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Everything one observation needs, frozen for its duration.
pub struct RenderJob<'a> {
    pub settings: &'a RenderSettings,
    pub templates: &'a [RayTemplate],
    pub sampler: PixelSampler<'a>,
    pub color: &'a dyn ColorPipeline,
}

/// One pixel's contribution for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResult {
    pub x: usize,
    pub y: usize,
    pub tristimulus: Vector3f,
    pub ray_count: u64,
}

pub trait Renderer {
    /// Render every channel of `job` into `frame`. The frame must already be
    /// rescaled for this observation.
    fn render(&self, job: &RenderJob, frame: &mut FrameAccumulator, sink: &mut dyn RenderSink) -> Result<(), RenderError>;
}

/// Sample one pixel and convert it to tristimulus. A panic inside the
/// generator, tracer or colour pipeline comes back as `PixelPanicked`.
pub fn sample_pixel(job: &RenderJob,
                    x: usize,
                    y: usize,
                    template: &RayTemplate,
                    table: &ColorMatchingTable,
                    rng: &mut dyn RngCore) -> Result<PixelResult, RenderError> {
    panic::catch_unwind(AssertUnwindSafe(|| -> Result<PixelResult, RenderError> {
        let (spectrum, ray_count) = job.sampler
            .sample(x, y, template, rng)
            .map_err(|source| RenderError::Tracing { x, y, source })?;
        let tristimulus = job.color.to_tristimulus(&spectrum, table);
        Ok(PixelResult { x, y, tristimulus, ray_count })
    }))
    .unwrap_or_else(|payload| Err(RenderError::PixelPanicked { x, y, message: panic_message(payload.as_ref()) }))
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        String::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

/// Progress and live-preview bookkeeping shared by both render loops.
pub struct RenderMonitor<'s> {
    progress: ProgressState,
    display: DisplayThrottle,
    sink: &'s mut dyn RenderSink,
}

impl<'s> RenderMonitor<'s> {
    pub fn start(settings: &RenderSettings, channels: usize, frame: &Bitmap, sink: &'s mut dyn RenderSink) -> Self {
        let now = Instant::now();
        let display = DisplayThrottle::start(settings.display_progress, settings.display_update_time, frame, now, sink);
        let progress = ProgressState::start(settings.width, settings.height, channels, now);
        Self { progress, display, sink }
    }

    /// `pixel` is the number of pixels already finished in `channel`.
    pub fn pixel_done(&mut self, channel: usize, pixel: usize, ray_count: u64, frame: &Bitmap) {
        let now = Instant::now();
        self.display.update(frame, now, self.sink);
        self.progress = progress::report(self.progress, channel, pixel, ray_count, now, self.sink);
    }

    pub fn finish(self, frame: &Bitmap) {
        progress::finish(&self.progress, Instant::now(), self.sink);
        self.display.finish(frame, self.sink);
    }
}
