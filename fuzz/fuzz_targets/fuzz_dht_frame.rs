//! Fuzz target: `decode_frame`
//!
//! Decodes arbitrary 5-byte DHT11 frames.  Only frames with a matching
//! checksum may decode, and decoded values must stay within what the
//! byte layout can express.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use airfan::sensors::climate::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(frame) = data.get(..5).and_then(|s| <&[u8; 5]>::try_from(s).ok()) else {
        return;
    };

    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    match decode_frame(frame) {
        Ok(sample) => {
            assert_eq!(sum, frame[4]);
            assert!((0.0..=281.0).contains(&sample.humidity_pct));
            assert!(sample.temperature_c.abs() <= 268.0);
        }
        Err(_) => assert_ne!(sum, frame[4]),
    }
});
