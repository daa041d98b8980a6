#![no_main]
use digirle::rle::{self, DecodeOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let permissive = rle::decode(data);
    let strict = rle::decode_with(data, DecodeOptions::strict());

    // Strict acceptance implies permissive acceptance with the same output.
    if let Ok(out) = &strict {
        assert_eq!(permissive.as_ref().ok(), Some(out));
        assert!(rle::is_well_formed(data));
    }
});
