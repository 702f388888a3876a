// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;

use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Progress counters carried between render-loop iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    pub total_work: usize,
    pub total_pixels: usize,
    pub channels: usize,
    pub width: usize,
    pub height: usize,
    pub ray_count: u64,
    pub start_time: Instant,
    pub last_report: Instant,
}

/// One throttled progress line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub completion: f64,
    pub channel: usize,
    pub channels: usize,
    pub line: usize,
    pub lines: usize,
    pub pixel: usize,
    pub pixels: usize,
    pub work_done: usize,
    pub total_work: usize,
    /// Ray segments traced since the previous report.
    pub ray_count: u64,
    pub elapsed: Duration,
}

impl ProgressReport {
    pub fn message(&self) -> String {
        format!("{:.2}% complete (channel {}/{}, line {}/{}, pixel {}/{}, {:.1}k rays)",
                self.completion, self.channel, self.channels, self.line, self.lines,
                self.pixel, self.pixels, self.ray_count as f64 / 1000.0)
    }
}

/// Receives progress and frame updates from the render loops.
pub trait RenderSink {
    fn on_progress(&mut self, _report: &ProgressReport) {}

    fn on_frame_update(&mut self, _frame: &Bitmap) {}

    fn on_complete(&mut self, _elapsed: Duration) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {}

impl ProgressState {
    pub fn start(width: usize, height: usize, channels: usize, now: Instant) -> Self {
        let total_pixels = width * height;
        Self {
            total_work: total_pixels * channels,
            total_pixels,
            channels,
            width,
            height,
            ray_count: 0,
            start_time: now,
            last_report: now,
        }
    }
}

/// Accumulate `ray_delta` and emit a report if more than a second has passed
/// since the previous one. `pixel` counts pixels finished within `channel`.
pub fn report(state: ProgressState,
              channel: usize,
              pixel: usize,
              ray_delta: u64,
              now: Instant,
              sink: &mut dyn RenderSink) -> ProgressState {
    let mut state = state;
    state.ray_count += ray_delta;

    if now.saturating_duration_since(state.last_report) > REPORT_INTERVAL {
        let work_done = state.total_pixels * channel + pixel;
        let width = state.width.max(1);
        let report = ProgressReport {
            completion: 100.0 * work_done as f64 / state.total_work.max(1) as f64,
            channel: channel + 1,
            channels: state.channels,
            line: (pixel + width) / width,
            lines: state.height,
            pixel: pixel + 1,
            pixels: state.total_pixels,
            work_done,
            total_work: state.total_work,
            ray_count: state.ray_count,
            elapsed: now.saturating_duration_since(state.start_time),
        };
        sink.on_progress(&report);
        state.ray_count = 0;
        state.last_report = now;
    }

    state
}

pub fn finish(state: &ProgressState, now: Instant, sink: &mut dyn RenderSink) {
    sink.on_complete(now.saturating_duration_since(state.start_time));
}

/// Gates live-preview refreshes to at most one per interval.
#[derive(Debug, Clone, Copy)]
pub struct DisplayThrottle {
    enabled: bool,
    interval: Duration,
    last_refresh: Instant,
}

impl DisplayThrottle {
    /// Refreshes immediately if enabled.
    pub fn start(enabled: bool, interval: Duration, frame: &Bitmap, now: Instant, sink: &mut dyn RenderSink) -> Self {
        if enabled {
            sink.on_frame_update(frame);
        }
        Self { enabled, interval, last_refresh: now }
    }

    pub fn update(&mut self, frame: &Bitmap, now: Instant, sink: &mut dyn RenderSink) {
        if self.enabled && now.saturating_duration_since(self.last_refresh) > self.interval {
            log::info!("Refreshing display...");
            sink.on_frame_update(frame);
            self.last_refresh = now;
        }
    }

    pub fn finish(&self, frame: &Bitmap, sink: &mut dyn RenderSink) {
        if self.enabled {
            sink.on_frame_update(frame);
        }
    }
}
