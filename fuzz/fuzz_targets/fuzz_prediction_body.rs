//! Fuzz target: `decode_prediction`
//!
//! Feeds arbitrary bytes as a forecast service response body and asserts
//! that decoding never panics and only ever yields finite values.
//!
//! cargo fuzz run fuzz_prediction_body

#![no_main]

use airfan::prediction::decode_prediction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(prediction) = decode_prediction(data) {
        assert!(prediction.predicted_ppm.is_finite());
    }
});
