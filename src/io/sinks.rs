// Copyright @yucwang 2026

use crate::core::progress::{ProgressReport, RenderSink};
use crate::io::image_utils;
use crate::math::bitmap::Bitmap;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Progress lines through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn on_progress(&mut self, report: &ProgressReport) {
        log::info!("{}", report.message());
    }

    fn on_complete(&mut self, elapsed: Duration) {
        log::info!("Render complete - time elapsed {:.3}s", elapsed.as_secs_f64());
    }
}

/// Terminal progress bar over all channel/pixel work units.
pub struct ProgressBarSink {
    bar: Option<ProgressBar>,
}

impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBarSink {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self, total_work: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total_work as u64);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        })
    }
}

impl RenderSink for ProgressBarSink {
    fn on_progress(&mut self, report: &ProgressReport) {
        let bar = self.bar(report.total_work);
        bar.set_position(report.work_done as u64);
        bar.set_message(format!("channel {}/{}, line {}/{}, {:.1}k rays",
                                report.channel, report.channels, report.line, report.lines,
                                report.ray_count as f64 / 1000.0));
    }

    fn on_complete(&mut self, elapsed: Duration) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        log::info!("Render complete - time elapsed {:.3}s", elapsed.as_secs_f64());
    }
}

/// Live preview written to an image file on every frame update.
pub struct PreviewSink {
    path: PathBuf,
    updates: usize,
}

impl PreviewSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), updates: 0 }
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl RenderSink for PreviewSink {
    fn on_frame_update(&mut self, frame: &Bitmap) {
        match image_utils::save_bitmap(frame, &self.path) {
            Ok(()) => {
                self.updates += 1;
                log::debug!("Preview {} written to {}.", self.updates, self.path.display());
            }
            Err(e) => log::warn!("Preview update failed: {}.", e),
        }
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn RenderSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }
}

impl RenderSink for MultiSink {
    fn on_progress(&mut self, report: &ProgressReport) {
        for sink in self.sinks.iter_mut() {
            sink.on_progress(report);
        }
    }

    fn on_frame_update(&mut self, frame: &Bitmap) {
        for sink in self.sinks.iter_mut() {
            sink.on_frame_update(frame);
        }
    }

    fn on_complete(&mut self, elapsed: Duration) {
        for sink in self.sinks.iter_mut() {
            sink.on_complete(elapsed);
        }
    }
}
