// Copyright @yucwang 2021

use crate::core::error::RenderError;
use crate::core::frame::FrameAccumulator;
use crate::core::progress::RenderSink;
use crate::core::rng::worker_rng;

use super::renderer::{sample_pixel, RenderJob, RenderMonitor, Renderer};

/// Single-threaded render loop; visits pixels in row-major order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialRenderer;

impl Renderer for SerialRenderer {
    fn render(&self, job: &RenderJob, frame: &mut FrameAccumulator, sink: &mut dyn RenderSink) -> Result<(), RenderError> {
        let settings = job.settings;
        let (width, height) = (settings.width, settings.height);
        let mut rng = worker_rng(settings.seed, 0);
        let mut monitor = RenderMonitor::start(settings, job.templates.len(), frame.display(), sink);

        for (channel, template) in job.templates.iter().enumerate() {
            let table = job.color.resample(template.min_wavelength, template.max_wavelength, template.num_samples);

            for y in 0..height {
                for x in 0..width {
                    let result = sample_pixel(job, x, y, template, &table, &mut rng)?;
                    frame.add(x, y, &result.tristimulus, job.color);
                    monitor.pixel_done(channel, x + width * y, result.ray_count, frame.display());
                }
            }
        }

        monitor.finish(frame.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CameraConfig;
    use crate::core::error::TraceError;
    use crate::core::progress::NullSink;
    use crate::core::ray_template::generate_ray_templates;
    use crate::core::sampler::PixelSampler;
    use crate::fixtures::{PixelOriginGenerator, PixelValueWorld, SumPipeline};
    use crate::math::transform::Transform;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_serial_stops_at_first_failure() {
        let mut config = CameraConfig::new((3, 3), 1.0, 4, 2, 1, 1).unwrap();
        config.display_progress = false;
        let settings = config.settings().unwrap();
        let templates = generate_ray_templates(&settings);
        let generator = PixelOriginGenerator::default();
        let world = PixelValueWorld::failing_at(1, 1);
        let job = RenderJob {
            settings: &settings,
            templates: &templates,
            sampler: PixelSampler::new(&generator, &world, Transform::default(), (3, 3), 1, 1.0),
            color: &SumPipeline,
        };

        let mut frame = FrameAccumulator::new(3, 3);
        match SerialRenderer.render(&job, &mut frame, &mut NullSink) {
            Err(RenderError::Tracing { x: 1, y: 1, source: TraceError::Tracer(_) }) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
        // Row-major: (0,0), (1,0), (2,0), (0,1), (1,1).
        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
        assert!(frame.tristimulus()[(1, 1)].iter().all(|v| *v == 0.0));
        assert!(frame.tristimulus()[(0, 1)].x > 0.0);
    }

    #[test]
    fn test_serial_reports_tracer_panic() {
        let mut config = CameraConfig::new((3, 2), 1.0, 3, 1, 2, 1).unwrap();
        config.display_progress = false;
        let settings = config.settings().unwrap();
        let templates = generate_ray_templates(&settings);
        let generator = PixelOriginGenerator::default();
        let world = PixelValueWorld::panicking_at(2, 1);
        let job = RenderJob {
            settings: &settings,
            templates: &templates,
            sampler: PixelSampler::new(&generator, &world, Transform::default(), (3, 2), 2, 1.0),
            color: &SumPipeline,
        };

        let mut frame = FrameAccumulator::new(3, 2);
        match SerialRenderer.render(&job, &mut frame, &mut NullSink) {
            Err(RenderError::PixelPanicked { x: 2, y: 1, message }) => assert!(message.contains("tracer blew up")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
