//! Frame statistics
//!
//! [`Statistics`] is the read-only snapshot the performance overlay displays. It is
//! produced by the host once per frame; [`FrameTimer`] is a ready-made producer.

use std::time::{Duration, Instant};

use crate::settings::UserSettings;

/// How often the displayed frame rate is refreshed, in seconds
const FRAME_RATE_WINDOW: f32 = 0.25;

/// Per-frame statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    /// Framebuffer width and height in pixels
    pub framebuffer_size: [u32; 2],
    /// Frames per second
    pub frame_rate: f32,
    /// Giga-rays per second
    pub ray_rate: f32,
    /// Samples per pixel accumulated so far
    pub total_samples: u32,
}

/// Frame timing and sample accounting for producing [`Statistics`]
pub struct FrameTimer {
    last_frame: Instant,
    delta_time: f32,
    window_elapsed: f32,
    window_frames: u32,
    frame_rate: f32,
    total_samples: u32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            window_elapsed: 0.0,
            window_frames: 0,
            frame_rate: 0.0,
            total_samples: 0,
        }
    }

    /// Advance by the wall-clock time since the previous call
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed);
    }

    /// Advance by an explicit frame duration
    pub fn advance(&mut self, elapsed: Duration) {
        self.delta_time = elapsed.as_secs_f32();
        self.window_elapsed += self.delta_time;
        self.window_frames += 1;

        if self.window_elapsed >= FRAME_RATE_WINDOW {
            self.frame_rate = self.window_frames as f32 / self.window_elapsed;
            self.window_elapsed = 0.0;
            self.window_frames = 0;
        }
    }

    /// Get the time since the previous frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the smoothed frame rate
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Record the samples traced this frame
    ///
    /// Without accumulation the counter only ever holds the latest frame's samples.
    pub fn record_samples(&mut self, settings: &UserSettings) {
        self.total_samples = if settings.accumulate_rays {
            self.total_samples.saturating_add(settings.number_of_samples)
        } else {
            settings.number_of_samples
        };
    }

    /// Discard accumulated samples
    pub fn reset_accumulation(&mut self) {
        self.total_samples = 0;
    }

    /// Build the snapshot for a framebuffer of the given size
    pub fn snapshot(&self, framebuffer_size: [u32; 2], settings: &UserSettings) -> Statistics {
        let pixels = f64::from(framebuffer_size[0]) * f64::from(framebuffer_size[1]);
        let rays_per_frame = pixels * f64::from(settings.number_of_samples);
        let ray_rate = if settings.is_ray_traced {
            (rays_per_frame * f64::from(self.frame_rate) / 1.0e9) as f32
        } else {
            0.0
        };

        Statistics {
            framebuffer_size,
            frame_rate: self.frame_rate,
            ray_rate,
            total_samples: self.total_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_rate_refreshes_per_window() {
        let mut timer = FrameTimer::new();
        assert_relative_eq!(timer.frame_rate(), 0.0);

        for _ in 0..15 {
            timer.advance(Duration::from_millis(20));
        }
        // 15 frames of 20 ms cross the 250 ms window once
        assert_relative_eq!(timer.frame_rate(), 50.0, epsilon = 0.5);
        assert_relative_eq!(timer.delta_time(), 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_samples_accumulate_only_when_enabled() {
        let mut timer = FrameTimer::new();
        let mut settings = UserSettings { number_of_samples: 4, accumulate_rays: true, ..UserSettings::default() };

        timer.record_samples(&settings);
        timer.record_samples(&settings);
        assert_eq!(timer.snapshot([1, 1], &settings).total_samples, 8);

        settings.accumulate_rays = false;
        timer.record_samples(&settings);
        assert_eq!(timer.snapshot([1, 1], &settings).total_samples, 4);

        timer.reset_accumulation();
        assert_eq!(timer.snapshot([1, 1], &settings).total_samples, 0);
    }

    #[test]
    fn test_ray_rate_in_giga_rays() {
        let mut timer = FrameTimer::new();
        for _ in 0..10 {
            timer.advance(Duration::from_millis(50));
        }
        let settings = UserSettings { number_of_samples: 10, ..UserSettings::default() };
        let stats = timer.snapshot([1000, 1000], &settings);

        // 1e6 pixels * 10 samples * 20 fps = 0.2 Gr/s
        assert_eq!(stats.framebuffer_size, [1000, 1000]);
        assert_relative_eq!(stats.ray_rate, 0.2, epsilon = 1e-3);

        let rasterized = UserSettings { is_ray_traced: false, ..settings };
        assert_relative_eq!(timer.snapshot([1000, 1000], &rasterized).ray_rate, 0.0);
    }
}
