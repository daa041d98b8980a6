#![no_main]
use digirle::rle::{self, FrameOptions, frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing garbage as a frame must fail cleanly.
    let _ = frame::decode_framed(data);
    let _ = rle::inspect(data);

    if data.is_empty() {
        return;
    }
    let checksum = data[0] & 1 != 0;
    let payload = &data[1..];
    let framed = frame::encode_framed(payload, FrameOptions { checksum });
    assert_eq!(frame::decode_framed(&framed).unwrap(), payload);
});
