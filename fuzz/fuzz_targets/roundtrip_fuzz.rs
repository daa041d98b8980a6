#![no_main]
use digirle::rle;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let encoded = rle::encode(data);
    assert_eq!(encoded.len(), rle::encoded_len(data));
    assert!(rle::is_well_formed(&encoded));

    let decoded = rle::decode(&encoded).unwrap();
    assert_eq!(decoded, data);
});
