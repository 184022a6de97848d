//! The fill animation driver.
//!
//! An [`AnimationRun`] is the interpolation context for one `update` call.
//! It is created from the currently rendered fill offset and the new target,
//! then stepped once per display refresh. Each step yields a [`Frame`] with
//! the eased fill offset and the linearly interpolated numeric value.

mod timing;

pub use timing::{EasingFunction, EASING_NAMES};

/// Display refresh rate the iteration count is derived from.
pub const REFRESH_RATE_HZ: f32 = 60.0;

/// Assumed interval between two display refreshes, in milliseconds.
pub fn refresh_interval_ms() -> f32 {
    1000.0 / REFRESH_RATE_HZ
}

/// Number of refresh callbacks that fit into `duration_ms`.
///
/// A run fires `iteration_count + 1` frames, iterations `0..=iteration_count`.
pub fn iteration_count(duration_ms: f32) -> u32 {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return 0;
    }
    (duration_ms * REFRESH_RATE_HZ / 1000.0).floor() as u32
}

/// Pixel offset along an axis of `axis_size` for a progress percentage.
pub fn target_offset(progress: f32, axis_size: f32) -> f32 {
    progress / 100.0 * axis_size
}

/// One interpolated step of an animation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Iteration this frame was produced for
    pub iteration: u32,
    /// `iteration / iteration_count`, unclamped
    pub change_percent: f32,
    /// Eased fill offset in logical pixels
    pub offset: f32,
    /// Linearly interpolated progress value for the numeric display
    pub numeric: f32,
    /// True on the first frame of the run whose offset equals the axis size
    pub completes: bool,
    /// True when no further frame follows
    pub is_last: bool,
}

/// Interpolation context for a single animation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRun {
    start_offset: f32,
    target_offset: f32,
    delta: f32,
    progress: f32,
    previous_progress: f32,
    axis_size: f32,
    iteration: u32,
    iteration_count: u32,
    completed: bool,
}

impl AnimationRun {
    /// Plan a run from the rendered `start_offset` towards `progress` percent.
    ///
    /// The numeric value interpolates from `previous_progress` regardless of
    /// where the fill currently is.
    pub fn new(
        start_offset: f32,
        progress: f32,
        previous_progress: f32,
        axis_size: f32,
        iteration_count: u32,
    ) -> Self {
        let target_offset = target_offset(progress, axis_size);
        Self {
            start_offset,
            target_offset,
            delta: target_offset - start_offset,
            progress,
            previous_progress,
            axis_size,
            iteration: 0,
            iteration_count,
            completed: false,
        }
    }

    pub fn start_offset(&self) -> f32 {
        self.start_offset
    }

    pub fn target_offset(&self) -> f32 {
        self.target_offset
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn axis_size(&self) -> f32 {
        self.axis_size
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Whether every frame of the run has been produced.
    pub fn is_finished(&self) -> bool {
        self.iteration > self.iteration_count
    }

    /// Carry the run over into a resized axis.
    ///
    /// The start offset keeps its reveal fraction and the target is projected
    /// onto the new size, so the remaining frames converge on the new geometry.
    pub fn fit_axis(&mut self, axis_size: f32) {
        if axis_size == self.axis_size {
            return;
        }
        self.start_offset = if self.axis_size > 0.0 {
            self.start_offset / self.axis_size * axis_size
        } else {
            0.0
        };
        self.target_offset = target_offset(self.progress, axis_size);
        self.delta = self.target_offset - self.start_offset;
        self.axis_size = axis_size;
    }

    /// Produce the next frame, or `None` once the run is finished.
    pub fn step(&mut self, easing: &EasingFunction) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }

        let change_percent = if self.iteration_count == 0 {
            1.0
        } else {
            self.iteration as f32 / self.iteration_count as f32
        };
        let factor = easing.evaluate(change_percent);
        let offset = if factor == 1.0 {
            self.target_offset
        } else {
            self.start_offset + factor * self.delta
        };
        let numeric =
            self.previous_progress + (self.progress - self.previous_progress) * change_percent;

        // An empty axis is trivially "full" and must not count as reaching 100%
        let completes = !self.completed && self.axis_size > 0.0 && offset == self.axis_size;
        self.completed |= completes;

        let frame = Frame {
            iteration: self.iteration,
            change_percent,
            offset,
            numeric,
            completes,
            is_last: self.iteration == self.iteration_count,
        };
        self.iteration += 1;
        Some(frame)
    }
}
