use digirle::rle::{self, DecodeError, DecodeOptions, FrameOptions};
use proptest::collection::vec;
use proptest::prelude::*;

/// Buffers built from a few long runs, so run splitting is exercised.
fn runny_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec((any::<u8>(), 1usize..40), 0..32).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(b, n)| std::iter::repeat_n(b, n))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(input in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let encoded = rle::encode(&input);
        prop_assert_eq!(rle::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn prop_roundtrip_long_runs(input in runny_bytes()) {
        let encoded = rle::encode(&input);
        prop_assert_eq!(rle::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn prop_count_digits_are_one_to_nine(input in runny_bytes()) {
        let encoded = rle::encode(&input);
        prop_assert!(encoded.chunks(2).all(|t| (b'1'..=b'9').contains(&t[1])));
        prop_assert!(rle::is_well_formed(&encoded));
    }

    #[test]
    fn prop_length_is_twice_token_count(input in runny_bytes()) {
        let encoded = rle::encode(&input);
        prop_assert_eq!(encoded.len() % 2, 0);
        prop_assert_eq!(encoded.len(), 2 * rle::tokens(&encoded).count());
        prop_assert_eq!(encoded.len(), rle::encoded_len(&input));
    }

    #[test]
    fn prop_run_splitting(byte in any::<u8>(), n in 1usize..200) {
        let encoded = rle::encode(&vec![byte; n]);
        let tokens: Vec<_> = rle::tokens(&encoded).map(Result::unwrap).collect();
        prop_assert_eq!(tokens.len(), n.div_ceil(9));
        let (last, full) = tokens.split_last().unwrap();
        prop_assert!(full.iter().all(|t| t.byte == byte && t.count == 9));
        prop_assert_eq!(last.byte, byte);
        prop_assert_eq!(last.count as usize, (n - 1) % 9 + 1);
    }

    #[test]
    fn prop_odd_length_is_truncated(data in proptest::collection::vec(b'1'..=b'9', 0..64)) {
        let mut odd = data;
        if odd.len().is_multiple_of(2) {
            odd.push(b'x');
        }
        let err = rle::decode(&odd).unwrap_err();
        prop_assert_eq!(err, DecodeError::Truncated { offset: odd.len() - 1 });
    }

    #[test]
    fn prop_decoder_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = rle::decode(&data);
        let _ = rle::decode_with(&data, DecodeOptions::strict());
        let _ = rle::frame::decode_framed(&data);
        let _ = rle::inspect(&data);
    }

    #[test]
    fn prop_framed_roundtrip(input in runny_bytes(), checksum in any::<bool>()) {
        let framed = rle::frame::encode_framed(&input, FrameOptions { checksum });
        prop_assert_eq!(rle::detect(&framed), rle::Format::Framed);
        prop_assert_eq!(rle::frame::decode_framed(&framed).unwrap(), input);
    }

    #[test]
    fn prop_encoded_output_always_looks_encoded(input in vec(any::<u8>(), 1..256)) {
        prop_assert!(rle::looks_encoded(&rle::encode(&input)));
    }
}
