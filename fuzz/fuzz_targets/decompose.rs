#![no_main]
use libfuzzer_sys::fuzz_target;
use slotplan_libs::time::{FrameLength, Framed, TimeWindow};

fuzz_target!(|data: (Vec<TimeWindow>, FrameLength)| {
    let (windows, length) = data;

    let frames = windows.iter().framed(length);

    assert!(
        frames.iter().all(|f| f.duration() == length.duration()),
        "Duration should be the same for all frames"
    );

    for window in windows.iter() {
        let frames = window.decompose(length);
        let expected = window.duration().num_minutes() / i64::from(length.minutes());
        assert_eq!(frames.len() as i64, expected, "Frames should tile {:?}", window);

        if let Some(first) = frames.first() {
            assert_eq!(first.start(), window.start());
        }
        assert!(
            frames.windows(2).all(|pair| pair[0].end() == pair[1].start()),
            "Frames should be contiguous"
        );
        assert!(
            frames.iter().all(|f| f.end() <= window.end()),
            "Each frame should be within its window"
        );
    }
});
