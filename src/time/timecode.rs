use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::FrameRate;

/// Hours, minutes, seconds and frames of a timecode, without a rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Components {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u16,
}

impl Components {
    pub fn new(hours: u8, minutes: u8, seconds: u8, frames: u16) -> Self {
        Components { hours, minutes, seconds, frames }
    }
}

impl fmt::Display for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// A timecode value at a real frame rate, wrapping at 24 hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timecode {
    components: Components,
    frame_rate: FrameRate,
}

impl Timecode {
    /// Creates a timecode, clamping each component into its valid range
    pub fn new(components: Components, frame_rate: FrameRate) -> Self {
        let components = Components {
            hours: components.hours.min(23),
            minutes: components.minutes.min(59),
            seconds: components.seconds.min(59),
            frames: components.frames.min(frame_rate.max_frame_number()),
        };
        Timecode { components, frame_rate }
    }

    /// Shorthand for [`Timecode::new`] from individual fields
    pub fn from_hmsf(hours: u8, minutes: u8, seconds: u8, frames: u16, frame_rate: FrameRate) -> Self {
        Timecode::new(Components::new(hours, minutes, seconds, frames), frame_rate)
    }

    /// 00:00:00:00 at `frame_rate`
    pub fn zero(frame_rate: FrameRate) -> Self {
        Timecode::new(Components::default(), frame_rate)
    }

    /// Builds a timecode from a frame count since midnight, wrapping at 24 hours
    pub fn from_total_frames(total_frames: i64, frame_rate: FrameRate) -> Self {
        let mut frames = total_frames.rem_euclid(frames_per_day(frame_rate));
        let base = frame_rate.nominal_fps() as i64;
        let drop = frame_rate.drop_frames_per_minute() as i64;

        if drop > 0 {
            let per_ten_minutes = base * 600 - drop * 9;
            let per_minute = base * 60 - drop;
            let tens = frames / per_ten_minutes;
            let remainder = frames % per_ten_minutes;

            frames += drop * 9 * tens;
            if remainder > drop {
                frames += drop * ((remainder - drop) / per_minute);
            }
        }

        let components = Components {
            hours: (frames / (base * 3600)) as u8,
            minutes: ((frames / (base * 60)) % 60) as u8,
            seconds: ((frames / base) % 60) as u8,
            frames: (frames % base) as u16,
        };
        Timecode::new(components, frame_rate)
    }

    pub fn components(&self) -> Components {
        self.components
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn hours(&self) -> u8 {
        self.components.hours
    }

    pub fn minutes(&self) -> u8 {
        self.components.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.components.seconds
    }

    pub fn frames(&self) -> u16 {
        self.components.frames
    }

    /// Frame count since midnight, accounting for drop-frame counting
    pub fn total_frames(&self) -> i64 {
        let base = self.frame_rate.nominal_fps() as i64;
        let c = &self.components;
        let total_minutes = c.hours as i64 * 60 + c.minutes as i64;
        let nominal = (total_minutes * 60 + c.seconds as i64) * base + c.frames as i64;

        let drop = self.frame_rate.drop_frames_per_minute() as i64;
        nominal - drop * (total_minutes - total_minutes / 10)
    }

    /// Returns this timecode moved by `frames` (negative moves backwards), wrapping at 24 hours
    pub fn advanced(&self, frames: i64) -> Self {
        Timecode::from_total_frames(self.total_frames() + frames, self.frame_rate)
    }

    /// Signed shortest distance in frames from `other` to `self`, across the 24 hour wrap.
    ///
    /// `other` is interpreted at this timecode's rate.
    pub fn frames_since(&self, other: &Timecode) -> i64 {
        let day = frames_per_day(self.frame_rate);
        let other = Timecode::new(other.components, self.frame_rate);
        let delta = (self.total_frames() - other.total_frames()).rem_euclid(day);
        if delta > day / 2 {
            delta - day
        } else {
            delta
        }
    }

    /// Wall-clock time elapsed since midnight at this rate
    pub fn real_time(&self) -> Duration {
        Duration::from_secs_f64(self.total_frames() as f64 / self.frame_rate.fps())
    }

    /// Returns the same components expressed at another rate, clamped as needed
    pub fn with_frame_rate(&self, frame_rate: FrameRate) -> Self {
        Timecode::new(self.components, frame_rate)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.frame_rate.is_drop() { ';' } else { ':' };
        let c = &self.components;
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            c.hours, c.minutes, c.seconds, separator, c.frames
        )
    }
}

/// Number of frames in 24 hours at `frame_rate`
fn frames_per_day(frame_rate: FrameRate) -> i64 {
    let base = frame_rate.nominal_fps() as i64;
    let drop = frame_rate.drop_frames_per_minute() as i64;
    (base * 600 - drop * 9) * 6 * 24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let tc = Timecode::from_hmsf(30, 75, 61, 40, FrameRate::Fps24);
        assert_eq!(tc.components(), Components::new(23, 59, 59, 23));

        let tc = Timecode::from_hmsf(1, 2, 3, 99, FrameRate::Fps100);
        assert_eq!(tc.frames(), 99);
    }

    #[test]
    fn test_advance_across_boundaries() {
        let tc = Timecode::from_hmsf(2, 3, 4, 8, FrameRate::Fps24);
        assert_eq!(tc.advanced(16).components(), Components::new(2, 3, 5, 0));
        assert_eq!(tc.advanced(2).components(), Components::new(2, 3, 4, 10));

        let tc = Timecode::from_hmsf(0, 59, 59, 29, FrameRate::Fps30);
        assert_eq!(tc.advanced(1).components(), Components::new(1, 0, 0, 0));
    }

    #[test]
    fn test_wrap_at_24_hours() {
        let tc = Timecode::from_hmsf(23, 59, 59, 23, FrameRate::Fps24);
        assert_eq!(tc.advanced(1), Timecode::zero(FrameRate::Fps24));

        let tc = Timecode::zero(FrameRate::Fps25);
        assert_eq!(tc.advanced(-2).components(), Components::new(23, 59, 59, 23));
    }

    #[test]
    fn test_drop_frame_skips_labels() {
        let tc = Timecode::from_hmsf(0, 0, 59, 29, FrameRate::Fps29_97d);
        assert_eq!(tc.advanced(1).components(), Components::new(0, 1, 0, 2));
        assert_eq!(tc.advanced(3).advanced(-3), tc);

        let tc = Timecode::from_hmsf(0, 9, 59, 29, FrameRate::Fps29_97d);
        assert_eq!(tc.advanced(1).components(), Components::new(0, 10, 0, 0));

        let tc = Timecode::from_hmsf(0, 0, 59, 59, FrameRate::Fps59_94d);
        assert_eq!(tc.advanced(1).components(), Components::new(0, 1, 0, 4));
    }

    #[test]
    fn test_drop_frame_total_frames() {
        // one hour of 29.97d is 107892 frames
        let tc = Timecode::from_hmsf(1, 0, 0, 0, FrameRate::Fps29_97d);
        assert_eq!(tc.total_frames(), 107_892);
        assert_eq!(Timecode::from_total_frames(107_892, FrameRate::Fps29_97d), tc);

        let tc = Timecode::from_hmsf(0, 1, 0, 2, FrameRate::Fps29_97d);
        assert_eq!(tc.total_frames(), 1800);
    }

    #[test]
    fn test_frames_since() {
        let a = Timecode::from_hmsf(2, 3, 4, 8, FrameRate::Fps24);
        let b = a.advanced(5);
        assert_eq!(b.frames_since(&a), 5);
        assert_eq!(a.frames_since(&b), -5);

        let late = Timecode::from_hmsf(23, 59, 59, 23, FrameRate::Fps24);
        let early = Timecode::zero(FrameRate::Fps24);
        assert_eq!(early.frames_since(&late), 1);
    }

    #[test]
    fn test_real_time() {
        let tc = Timecode::from_hmsf(0, 0, 1, 12, FrameRate::Fps24);
        assert_eq!(tc.real_time(), Duration::from_millis(1500));

        let tc = Timecode::from_hmsf(1, 0, 0, 0, FrameRate::Fps29_97d);
        let secs = tc.real_time().as_secs_f64();
        assert!((secs - 3599.9964).abs() < 0.001);
    }

    #[test]
    fn test_display() {
        let tc = Timecode::from_hmsf(2, 3, 4, 8, FrameRate::Fps24);
        assert_eq!(tc.to_string(), "02:03:04:08");

        let tc = Timecode::from_hmsf(1, 0, 0, 2, FrameRate::Fps29_97d);
        assert_eq!(tc.to_string(), "01:00:00;02");
    }
}
