//! Frame scaling between MTC rates and real frame rates
//!
//! MTC can only carry 24, 25, 29.97d and 30 fps. Faster rates are sent as
//! their base MTC rate and scaled back up on receipt, using the quarter-frame
//! piece index to recover the frames that fall between transmitted values.

use super::{FrameRate, MtcFrameRate};

/// Size of one quarter-frame piece in MTC frames
const QUARTER_FRAME: f64 = 0.25;

/// 24.98 fps is carried as MTC-24 with this ratio
const FPS_24_98_SCALE: f64 = 25.0 / 24.0;

/// Correction applied when mapping 24.98 fps back onto MTC-24
const FPS_24_98_INVERSE_CORRECTION: f64 = 0.001;

impl MtcFrameRate {
    /// Scales a raw MTC frame number plus elapsed quarter-frames to a frame
    /// count at `to`.
    ///
    /// Returns `None` when `to` is not carried as this MTC rate. The integer
    /// part of the result is the frame number; the fractional part is the
    /// fraction of a frame contributed by the quarter-frames.
    ///
    /// Negative raw frames are clamped to 0 and quarter-frames to at most 7.
    pub fn scaled_frames(&self, raw_frames: i64, quarter_frames: u8, to: FrameRate) -> Option<f64> {
        if !self.is_derived(to) {
            return None;
        }

        let raw_frames = raw_frames.max(0) as f64;
        let quarter_frames = quarter_frames.min(7) as f64;

        if self.direct_equivalent_frame_rate() == to {
            return Some(raw_frames + quarter_frames * QUARTER_FRAME);
        }

        if to == FrameRate::Fps24_98 {
            return Some(raw_frames * FPS_24_98_SCALE);
        }

        Some((raw_frames + quarter_frames * QUARTER_FRAME) * to.mtc_scale_factor())
    }
}

impl FrameRate {
    /// Ratio of this rate's frame numbers to its MTC rate's frame numbers
    pub fn mtc_scale_factor(&self) -> f64 {
        match self {
            FrameRate::Fps24_98 => FPS_24_98_SCALE,
            _ => self.nominal_fps() as f64 / self.mtc_frame_rate().fps_for_scaling() as f64,
        }
    }

    /// Maps a frame count at this rate onto raw MTC frames and elapsed
    /// quarter-frames at this rate's MTC rate.
    ///
    /// MTC groups always start on an even raw frame, so the count is split
    /// at two-frame boundaries.
    pub fn scaled_frames_to_mtc(&self, frames: f64) -> (i64, u8) {
        let factor = match self {
            FrameRate::Fps24_98 => FPS_24_98_SCALE - FPS_24_98_INVERSE_CORRECTION,
            _ => self.mtc_scale_factor(),
        };

        let scaled = frames / factor;
        let fraction = scaled % 2.0;
        let raw_frames = (scaled - fraction) as i64;
        let quarter_frames = (fraction / QUARTER_FRAME) as u8;

        (raw_frames, quarter_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_scale_factors() {
        let expected = [
            (FrameRate::Fps23_976, 1.0),
            (FrameRate::Fps24, 1.0),
            (FrameRate::Fps25, 1.0),
            (FrameRate::Fps29_97, 1.0),
            (FrameRate::Fps29_97d, 1.0),
            (FrameRate::Fps30, 1.0),
            (FrameRate::Fps30d, 1.0),
            (FrameRate::Fps47_952, 2.0),
            (FrameRate::Fps48, 2.0),
            (FrameRate::Fps50, 2.0),
            (FrameRate::Fps59_94, 2.0),
            (FrameRate::Fps59_94d, 2.0),
            (FrameRate::Fps60, 2.0),
            (FrameRate::Fps60d, 2.0),
            (FrameRate::Fps95_904, 4.0),
            (FrameRate::Fps96, 4.0),
            (FrameRate::Fps100, 4.0),
            (FrameRate::Fps119_88, 4.0),
            (FrameRate::Fps119_88d, 4.0),
            (FrameRate::Fps120, 4.0),
            (FrameRate::Fps120d, 4.0),
        ];
        for (rate, factor) in expected {
            assert_eq!(rate.mtc_scale_factor(), factor, "{}", rate);
        }
        assert_close(FrameRate::Fps24_98.mtc_scale_factor(), 1.041666);
    }

    #[test]
    fn test_scaled_frames_direct_equivalent() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(0, 0, FrameRate::Fps24), Some(0.0));
        assert_eq!(mtc.scaled_frames(12, 0, FrameRate::Fps24), Some(12.0));
        assert_eq!(mtc.scaled_frames(12, 1, FrameRate::Fps24), Some(12.25));
        assert_eq!(mtc.scaled_frames(12, 4, FrameRate::Fps24), Some(13.0));
        assert_eq!(mtc.scaled_frames(12, 7, FrameRate::Fps24), Some(13.75));

        let mtc = MtcFrameRate::Mtc2997d;
        assert_eq!(mtc.scaled_frames(22, 2, FrameRate::Fps29_97d), Some(22.5));
    }

    #[test]
    fn test_scaled_frames_same_base_rate() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(12, 0, FrameRate::Fps23_976), Some(12.0));
        assert_eq!(mtc.scaled_frames(12, 3, FrameRate::Fps23_976), Some(12.75));

        let mtc = MtcFrameRate::Mtc30;
        assert_eq!(mtc.scaled_frames(28, 6, FrameRate::Fps29_97), Some(29.5));
    }

    #[test]
    fn test_scaled_frames_double_rates() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(0, 0, FrameRate::Fps48), Some(0.0));
        assert_eq!(mtc.scaled_frames(12, 0, FrameRate::Fps48), Some(24.0));
        assert_eq!(mtc.scaled_frames(12, 1, FrameRate::Fps48), Some(24.5));
        assert_eq!(mtc.scaled_frames(12, 2, FrameRate::Fps48), Some(25.0));
        assert_eq!(mtc.scaled_frames(12, 7, FrameRate::Fps48), Some(27.5));

        let mtc = MtcFrameRate::Mtc25;
        assert_eq!(mtc.scaled_frames(24, 4, FrameRate::Fps50), Some(50.0));

        let mtc = MtcFrameRate::Mtc2997d;
        assert_eq!(mtc.scaled_frames(10, 5, FrameRate::Fps59_94d), Some(22.5));
    }

    #[test]
    fn test_scaled_frames_quad_rates() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(12, 0, FrameRate::Fps96), Some(48.0));
        assert_eq!(mtc.scaled_frames(12, 1, FrameRate::Fps96), Some(49.0));
        assert_eq!(mtc.scaled_frames(12, 7, FrameRate::Fps96), Some(55.0));

        let mtc = MtcFrameRate::Mtc25;
        assert_eq!(mtc.scaled_frames(20, 3, FrameRate::Fps100), Some(83.0));

        let mtc = MtcFrameRate::Mtc30;
        assert_eq!(mtc.scaled_frames(28, 7, FrameRate::Fps120), Some(119.0));
    }

    #[test]
    fn test_scaled_frames_24_98() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(0, 0, FrameRate::Fps24_98), Some(0.0));
        assert_close(mtc.scaled_frames(12, 0, FrameRate::Fps24_98).unwrap(), 12.5);
        assert_close(mtc.scaled_frames(22, 0, FrameRate::Fps24_98).unwrap(), 22.916666);
        // quarter-frames do not subdivide 24.98
        assert_close(mtc.scaled_frames(22, 6, FrameRate::Fps24_98).unwrap(), 22.916666);
    }

    #[test]
    fn test_scaled_frames_edge_cases() {
        let mtc = MtcFrameRate::Mtc24;
        assert_eq!(mtc.scaled_frames(-1, 0, FrameRate::Fps24), Some(0.0));
        assert_eq!(mtc.scaled_frames(60, 0, FrameRate::Fps24), Some(60.0));
        assert_eq!(mtc.scaled_frames(0, 8, FrameRate::Fps24), Some(7.0 * 0.25));
        assert_eq!(mtc.scaled_frames(0, 255, FrameRate::Fps48), Some(3.5));
    }

    #[test]
    fn test_scaled_frames_incompatible() {
        assert_eq!(MtcFrameRate::Mtc24.scaled_frames(12, 0, FrameRate::Fps25), None);
        assert_eq!(MtcFrameRate::Mtc24.scaled_frames(12, 0, FrameRate::Fps29_97), None);
        assert_eq!(MtcFrameRate::Mtc30.scaled_frames(12, 0, FrameRate::Fps29_97d), None);
        assert_eq!(MtcFrameRate::Mtc2997d.scaled_frames(12, 0, FrameRate::Fps30), None);
        assert_eq!(MtcFrameRate::Mtc25.scaled_frames(12, 0, FrameRate::Fps48), None);
    }

    #[test]
    fn test_inverse_zero() {
        for rate in FrameRate::ALL {
            assert_eq!(rate.scaled_frames_to_mtc(0.0), (0, 0), "{}", rate);
        }
    }

    #[test]
    fn test_inverse_spot_checks() {
        assert_eq!(FrameRate::Fps24.scaled_frames_to_mtc(5.0), (4, 4));
        assert_eq!(FrameRate::Fps48.scaled_frames_to_mtc(5.0), (2, 2));
        assert_eq!(FrameRate::Fps120.scaled_frames_to_mtc(7.0), (0, 7));
        assert_eq!(FrameRate::Fps100.scaled_frames_to_mtc(99.0), (24, 3));

        assert_eq!(FrameRate::Fps24_98.scaled_frames_to_mtc(12.5), (12, 0));
        assert_eq!(FrameRate::Fps24_98.scaled_frames_to_mtc(22.916667), (22, 0));
        assert_eq!(FrameRate::Fps24_98.scaled_frames_to_mtc(24.98), (24, 0));
    }

    #[test]
    fn test_roundtrip_all_rates() {
        for rate in FrameRate::ALL {
            if rate == FrameRate::Fps24_98 {
                continue;
            }
            let mtc = rate.mtc_frame_rate();

            for frame in 0..=rate.max_frame_number() {
                let (raw, quarter_frames) = rate.scaled_frames_to_mtc(frame as f64);
                let scaled = mtc
                    .scaled_frames(raw, quarter_frames, rate)
                    .unwrap();
                assert_eq!(scaled, frame as f64, "{} frame {}", rate, frame);
            }
        }
    }
}
