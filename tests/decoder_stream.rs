use mtc_sync::protocol::{MtcMessage, QuarterFrame};
use mtc_sync::{Direction, FrameRate, MtcDecoder, MtcFrameRate, Timecode};

/// Data bytes of a forward stream of `groups` groups starting at `start`
fn forward_stream(start: Timecode, rate: MtcFrameRate, groups: usize) -> Vec<u8> {
    let mut timecode = start;
    let mut bytes = Vec::with_capacity(groups * 8);
    for _ in 0..groups {
        let frames = timecode.frames() as u8;
        bytes.extend_from_slice(&[
            frames & 0x0F,
            0x10 | (frames >> 4),
            0x20 | (timecode.seconds() & 0x0F),
            0x30 | (timecode.seconds() >> 4),
            0x40 | (timecode.minutes() & 0x0F),
            0x50 | (timecode.minutes() >> 4),
            0x60 | (timecode.hours() & 0x0F),
            0x70 | (rate.bits() << 1) | (timecode.hours() >> 4),
        ]);
        timecode = timecode.advanced(2);
    }
    bytes
}

fn decode(decoder: &mut MtcDecoder, bytes: &[u8]) -> Vec<Timecode> {
    bytes
        .iter()
        .filter_map(|b| {
            decoder
                .consume(MtcMessage::QuarterFrame(QuarterFrame::from_data_byte(*b)))
                .event
                .map(|e| e.timecode)
        })
        .collect()
}

#[test]
fn test_continuous_24fps_across_second() {
    let start = Timecode::from_hmsf(1, 0, 0, 16, FrameRate::Fps24);
    let bytes = forward_stream(start, MtcFrameRate::Mtc24, 8);

    let mut decoder = MtcDecoder::default();
    let timecodes = decode(&mut decoder, &bytes);

    // The first group only fills the buffer
    assert_eq!(timecodes.len(), 7 * 8);
    for (i, timecode) in timecodes.iter().enumerate() {
        assert_eq!(*timecode, start.advanced(2 + i as i64 / 4), "event {}", i);
    }
    assert_eq!(decoder.direction(), Direction::Forwards);
    assert_eq!(decoder.timecode().to_string(), "01:00:01:07");
}

#[test]
fn test_continuous_30fps_across_minute() {
    let start = Timecode::from_hmsf(0, 9, 59, 20, FrameRate::Fps30);
    let bytes = forward_stream(start, MtcFrameRate::Mtc30, 10);

    let mut decoder = MtcDecoder::new(Some(FrameRate::Fps30));
    let timecodes = decode(&mut decoder, &bytes);

    assert_eq!(timecodes.len(), 9 * 8);
    for (i, timecode) in timecodes.iter().enumerate() {
        assert_eq!(*timecode, start.advanced(2 + i as i64 / 4), "event {}", i);
    }
    assert!(timecodes.iter().any(|tc| tc.minutes() == 10));
}

#[test]
fn test_double_rate_output() {
    let start = Timecode::from_hmsf(2, 0, 0, 0, FrameRate::Fps24);
    let bytes = forward_stream(start, MtcFrameRate::Mtc24, 6);

    let mut decoder = MtcDecoder::new(Some(FrameRate::Fps48));
    let timecodes = decode(&mut decoder, &bytes);
    let expected_start = Timecode::from_hmsf(2, 0, 0, 0, FrameRate::Fps48);

    assert_eq!(timecodes.len(), 5 * 8);
    for (i, timecode) in timecodes.iter().enumerate() {
        assert_eq!(timecode.frame_rate(), FrameRate::Fps48);
        assert_eq!(*timecode, expected_start.advanced(4 + i as i64 / 2), "event {}", i);
    }
}

#[test]
fn test_stream_rate_switch() {
    let mut bytes = forward_stream(Timecode::from_hmsf(0, 0, 1, 0, FrameRate::Fps24), MtcFrameRate::Mtc24, 3);
    bytes.extend(forward_stream(Timecode::from_hmsf(0, 0, 2, 0, FrameRate::Fps30), MtcFrameRate::Mtc30, 3));

    let mut decoder = MtcDecoder::default();
    let changes: Vec<MtcFrameRate> = bytes
        .iter()
        .filter_map(|b| {
            decoder
                .consume(QuarterFrame::from_data_byte(*b).into())
                .mtc_frame_rate_changed
        })
        .collect();

    assert_eq!(changes, vec![MtcFrameRate::Mtc24, MtcFrameRate::Mtc30]);
    assert_eq!(decoder.timecode().frame_rate(), FrameRate::Fps30);
}
